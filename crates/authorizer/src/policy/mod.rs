//! Authorization policy: endpoint rule table and decision synthesis.

pub mod decision;
pub mod table;

pub use decision::{Decision, Effect};
pub use table::{enforce_scope, match_rule, EndpointRule};
