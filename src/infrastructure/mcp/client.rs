//! # MCP Client
//!
//! HTTP client for the companion file service (`raze-mcp`). Reads and listings degrade
//! to `None` on any failure; writes and commands surface a typed `ServiceError`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::ServiceError;
use crate::domain::traits::CompanionService;
use crate::domain::types::{CommandOutput, FileContent};

const HEALTH_TIMEOUT: Duration = Duration::from_millis(1000);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    path: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<&'a str>,
}

/// MCP client for invoking file tools on the companion service
#[derive(Debug, Clone)]
pub struct McpClient {
    base_url: String,
    port: u16,
    http: Client,
}

impl McpClient {
    /// Client for the service on `127.0.0.1:<port>`
    pub fn new(port: u16) -> Self {
        Self::with_base_url(&format!("http://127.0.0.1:{}", port))
    }

    /// Client for an arbitrary base URL (used by tests against a mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        let port = reqwest::Url::parse(base_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .unwrap_or(0);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            port,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Option<serde_json::Value> {
        let response = match self
            .http
            .get(self.url(path))
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("GET {} failed: {}", path, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("GET {} returned {}: {}", path, status, body);
            return None;
        }

        match response.json().await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("GET {} returned undecodable body: {}", path, e);
                None
            }
        }
    }

    /// Turn a non-success response into `ServiceError::Status`, keeping the body text.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CompanionService for McpClient {
    async fn read_file(&self, path: &str) -> Option<FileContent> {
        let value = self.get_json("/read_file", &[("path", path)]).await?;
        serde_json::from_value(value)
            .map_err(|e| tracing::warn!("read_file {} missing content: {}", path, e))
            .ok()
    }

    async fn write_file(
        &self,
        path: &str,
        content: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        let response = self
            .http
            .post(self.url("/write_file"))
            .timeout(REQUEST_TIMEOUT)
            .json(&WriteRequest { path, content })
            .send()
            .await?;
        let response = Self::check(response).await?;

        // Acks are informational; a body that is not JSON still counts as success.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    async fn list_directory(&self, path: &str) -> Option<serde_json::Value> {
        self.get_json("/list_directory", &[("path", path)]).await
    }

    async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
    ) -> Result<CommandOutput, ServiceError> {
        let response = self
            .http
            .post(self.url("/execute_command"))
            .timeout(COMMAND_TIMEOUT)
            .json(&ExecuteRequest { command, cwd })
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn health(&self) -> bool {
        let response = match self
            .http
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            return false;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => body.get("status").and_then(|s| s.as_str()) == Some("ok"),
            Err(_) => false,
        }
    }

    fn port(&self) -> u16 {
        self.port
    }
}

/// Type alias for a shared companion service handle
pub type SharedCompanion = Arc<dyn CompanionService>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = McpClient::new(7878);
        assert_eq!(client.base_url(), "http://127.0.0.1:7878");
        assert_eq!(client.port(), 7878);

        let custom = McpClient::with_base_url("http://localhost:9100/");
        assert_eq!(custom.base_url(), "http://localhost:9100");
        assert_eq!(custom.port(), 9100);
    }

    #[tokio::test]
    async fn test_read_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/read_file"))
            .and(query_param("path", "./index.html"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"content": "<h1>hi</h1>"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        let file = client.read_file("./index.html").await.unwrap();
        assert_eq!(file.content, "<h1>hi</h1>");
    }

    #[tokio::test]
    async fn test_read_file_failure_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/read_file"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        assert!(client.read_file("./missing.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_write_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/write_file"))
            .and(body_json(json!({"path": "./a.txt", "content": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        let ack = client.write_file("./a.txt", "hi").await.unwrap();
        assert_eq!(ack, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_write_file_error_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/write_file"))
            .respond_with(ResponseTemplate::new(403).set_body_string("outside workspace"))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        match client.write_file("../etc/passwd", "x").await {
            Err(ServiceError::Status { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "outside workspace");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_directory() {
        let mock_server = MockServer::start().await;
        let listing = json!({"path": ".", "entries": [{"name": "src", "kind": "dir"}]});

        Mock::given(method("GET"))
            .and(path("/list_directory"))
            .and(query_param("path", "."))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing.clone()))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        assert_eq!(client.list_directory(".").await, Some(listing));
    }

    #[tokio::test]
    async fn test_execute_command() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/execute_command"))
            .and(body_json(json!({"command": "echo hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"stdout": "hi\n", "stderr": "", "exit_code": 0}),
            ))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        let output = client.execute_command("echo hi", None).await.unwrap();
        assert_eq!(output.stdout, "hi\n");
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_health() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        assert!(client.health().await);
    }

    #[tokio::test]
    async fn test_health_requires_ok_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "starting"})))
            .mount(&mock_server)
            .await;

        let client = McpClient::with_base_url(&mock_server.uri());
        assert!(!client.health().await);
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        // Nothing listens on port 9 (discard) on a test machine.
        let client = McpClient::with_base_url("http://127.0.0.1:9");
        assert!(!client.health().await);
        assert!(client.read_file("x").await.is_none());
        assert!(matches!(
            client.write_file("x", "y").await,
            Err(ServiceError::Transport(_))
        ));
    }
}
