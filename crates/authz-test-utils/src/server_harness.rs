//! Test server harness for E2E testing
//!
//! Provides `TestAuthorizerServer` for spawning real authorizer service
//! instances in tests.

use authorizer::authorizer::Authorizer;
use authorizer::config::Config;
use authorizer::routes::{self, AppState};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

// The global metrics recorder can only be installed once per process, but
// every test spawns its own server. All harness instances share one handle.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            routes::init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Test harness for spawning the authorizer service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_e2e() -> Result<(), anyhow::Error> {
///     let idp = MockIdp::start().await;
///     let server = TestAuthorizerServer::spawn(&idp.issuer(), "forms-api").await?;
///
///     let response = reqwest::get(&format!("{}/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAuthorizerServer {
    addr: SocketAddr,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestAuthorizerServer {
    /// Spawn a new service instance trusting the given issuer and audience.
    ///
    /// The server binds to a random available port (127.0.0.1:0) and runs
    /// in the background until the harness is dropped.
    pub async fn spawn(issuer: &str, audience: &str) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            ("TRUSTED_ISSUER".to_string(), issuer.to_string()),
            ("TOKEN_AUDIENCE".to_string(), audience.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState {
            authorizer: Authorizer::from_config(&config),
        });

        // Build routes using the service's real route builder
        let app = routes::build_routes(state, metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// POST a request description to `/v1/authorize` and return the
    /// decision document as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON, which
    /// indicates broken test setup.
    pub async fn authorize(
        &self,
        method: &str,
        path: &str,
        authorization: Option<&str>,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "method": method,
            "path": path,
        });
        if let Some(header) = authorization {
            body["authorization"] = serde_json::Value::String(header.to_string());
        }

        let response = self
            .client
            .post(format!("{}/v1/authorize", self.url()))
            .json(&body)
            .send()
            .await
            .expect("authorize request failed");

        assert_eq!(response.status(), 200, "authorize endpoint must return 200");

        response
            .json()
            .await
            .expect("authorize response was not JSON")
    }
}

impl Drop for TestAuthorizerServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task so the port is released
        // as soon as the test completes.
        self._handle.abort();
    }
}
