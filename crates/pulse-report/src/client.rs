//! Status-page HTTP client.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use pulse_state::ServiceStatus;

/// Errors from a status-page interaction.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("status page request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status page returned {0}")]
    RemoteStatus(reqwest::StatusCode),
}

/// Component status code understood by the status page.
pub fn component_code(status: ServiceStatus) -> u8 {
    match status {
        ServiceStatus::Online => 1,
        ServiceStatus::Slow => 2,
        ServiceStatus::Offline => 3,
        ServiceStatus::Incident => 4,
    }
}

/// Client for a Cachet-style components API.
#[derive(Clone)]
pub struct StatusPageClient {
    api: String,
    token: String,
    client: reqwest::Client,
}

impl StatusPageClient {
    pub fn new(api: impl Into<String>, token: impl Into<String>) -> Self {
        let api = api.into().trim_end_matches('/').to_string();
        Self {
            api,
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn component_url(&self, id: &str) -> String {
        format!("{}/components/{id}", self.api)
    }

    /// The component status code currently shown on the status page.
    pub async fn current_status(&self, id: &str) -> Result<u8, ReportError> {
        let response = self.client.get(self.component_url(id)).send().await?;
        if !response.status().is_success() {
            return Err(ReportError::RemoteStatus(response.status()));
        }
        let envelope: ComponentEnvelope = response.json().await?;
        Ok(envelope.data.status)
    }

    /// Push a status transition for a component.
    ///
    /// Skips the PUT when the page already shows the target code, so
    /// repeated pushes of the same status are idempotent.
    pub async fn push(&self, id: &str, status: ServiceStatus) -> Result<(), ReportError> {
        let code = component_code(status);
        let current = self.current_status(id).await?;
        if current == code {
            debug!(component = %id, code, "status page already up to date");
            return Ok(());
        }

        let response = self
            .client
            .put(self.component_url(id))
            .header("X-Cachet-Token", self.token.as_str())
            .json(&json!({ "status": code }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ReportError::RemoteStatus(response.status()));
        }
        debug!(component = %id, code, "status page updated");
        Ok(())
    }
}

#[derive(Deserialize)]
struct ComponentEnvelope {
    data: ComponentData,
}

#[derive(Deserialize)]
struct ComponentData {
    status: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    /// In-memory stand-in for the status-page API.
    #[derive(Clone)]
    struct Remote {
        status: Arc<Mutex<u8>>,
        puts: Arc<Mutex<Vec<(String, u8, Option<String>)>>>,
        fail_updates: Arc<Mutex<bool>>,
    }

    impl Remote {
        fn new(status: u8) -> Self {
            Self {
                status: Arc::new(Mutex::new(status)),
                puts: Arc::new(Mutex::new(Vec::new())),
                fail_updates: Arc::new(Mutex::new(false)),
            }
        }
    }

    async fn get_component(
        State(remote): State<Remote>,
        Path(_id): Path<String>,
    ) -> Json<serde_json::Value> {
        let status = *remote.status.lock().unwrap();
        Json(json!({ "data": { "status": status } }))
    }

    async fn put_component(
        State(remote): State<Remote>,
        Path(id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        if *remote.fail_updates.lock().unwrap() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        let token = headers
            .get("X-Cachet-Token")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let code = body["status"].as_u64().unwrap_or(0) as u8;
        remote.puts.lock().unwrap().push((id, code, token));
        *remote.status.lock().unwrap() = code;
        StatusCode::OK
    }

    async fn serve(remote: Remote) -> String {
        let app = Router::new()
            .route(
                "/api/v1/components/{id}",
                get(get_component).put(put_component),
            )
            .with_state(remote);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/v1")
    }

    #[test]
    fn component_codes() {
        assert_eq!(component_code(ServiceStatus::Online), 1);
        assert_eq!(component_code(ServiceStatus::Slow), 2);
        assert_eq!(component_code(ServiceStatus::Offline), 3);
        assert_eq!(component_code(ServiceStatus::Incident), 4);
    }

    #[tokio::test]
    async fn push_updates_component_with_token() {
        let remote = Remote::new(1);
        let api = serve(remote.clone()).await;
        let client = StatusPageClient::new(api.as_str(), "secret");

        client.push("web", ServiceStatus::Offline).await.unwrap();

        let puts = remote.puts.lock().unwrap();
        assert_eq!(
            puts.as_slice(),
            &[("web".to_string(), 3, Some("secret".to_string()))]
        );
    }

    #[tokio::test]
    async fn push_is_a_noop_when_remote_matches() {
        let remote = Remote::new(2);
        let api = serve(remote.clone()).await;
        let client = StatusPageClient::new(api.as_str(), "secret");

        client.push("web", ServiceStatus::Slow).await.unwrap();

        assert!(remote.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_surfaces_remote_status() {
        let remote = Remote::new(1);
        *remote.fail_updates.lock().unwrap() = true;
        let api = serve(remote.clone()).await;
        let client = StatusPageClient::new(api.as_str(), "secret");

        let err = client.push("web", ServiceStatus::Incident).await.unwrap_err();
        assert!(matches!(err, ReportError::RemoteStatus(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        // Port 1 is never listening.
        let client = StatusPageClient::new("http://127.0.0.1:1/api/v1", "secret");
        let err = client.push("web", ServiceStatus::Online).await.unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)));
    }

    #[tokio::test]
    async fn current_status_reads_the_envelope() {
        let remote = Remote::new(4);
        let api = serve(remote.clone()).await;
        let client = StatusPageClient::new(api.as_str(), "secret");

        assert_eq!(client.current_status("web").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn trailing_slash_in_api_base_is_tolerated() {
        let remote = Remote::new(1);
        let api = serve(remote.clone()).await;
        let client = StatusPageClient::new(format!("{api}/"), "secret");

        client.push("web", ServiceStatus::Offline).await.unwrap();
        assert_eq!(remote.puts.lock().unwrap().len(), 1);
    }
}
