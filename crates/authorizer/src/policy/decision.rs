//! Authorization decision synthesis.
//!
//! Builds the IAM-style policy document the gateway consumes. The shape
//! is machine-checked on the gateway side, so field names and the
//! single-statement structure are load-bearing and covered by tests.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// Policy language version expected by the gateway.
const POLICY_VERSION: &str = "2012-10-17";

/// The one action an authorizer decision grants or blocks.
const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Whether the request may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single policy statement covering exactly one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Resource")]
    pub resource: String,
}

/// The policy document wrapping the statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

/// The complete decision returned to the gateway.
///
/// Allow carries the principal and the identity context for downstream
/// handlers; Deny carries neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "principalId", skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(rename = "policyDocument")]
    pub policy_document: PolicyDocument,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Identity>,
}

impl Decision {
    /// Build an Allow decision carrying the caller identity.
    pub fn allow(resource: &str, identity: Identity) -> Self {
        Self {
            principal_id: Some(identity.identifier.clone()),
            policy_document: policy_document(Effect::Allow, resource),
            context: Some(identity),
        }
    }

    /// Build a Deny decision. No identity context is attached.
    pub fn deny(resource: &str) -> Self {
        Self {
            principal_id: None,
            policy_document: policy_document(Effect::Deny, resource),
            context: None,
        }
    }

    /// The effect of the single statement.
    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map_or(Effect::Deny, |s| s.effect)
    }
}

fn policy_document(effect: Effect, resource: &str) -> PolicyDocument {
    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![PolicyStatement {
            action: INVOKE_ACTION.to_string(),
            effect,
            resource: resource.to_string(),
        }],
    }
}
