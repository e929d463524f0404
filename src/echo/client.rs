//! Client side of the echo exchange
//!
//! The sequencer talks to the endpoint through the `EchoClient` trait so
//! tests can substitute a scripted collaborator.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::protocol::{ChatReply, ChatRequest, CHAT_PATH};

/// Failures of a single echo exchange
#[derive(Debug, thiserror::Error)]
pub enum EchoError {
    #[error("Failed to send message: {0}")]
    Transport(String),

    #[error("Failed to send message (HTTP {0})")]
    Status(u16),

    #[error("Malformed reply from server: {0}")]
    MalformedReply(String),
}

/// Collaborator that turns a message into a reply
#[async_trait]
pub trait EchoClient: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, EchoError>;
}

/// `EchoClient` backed by the HTTP echo endpoint
pub struct HttpEchoClient {
    client: reqwest::Client,
    url: String,
}

impl HttpEchoClient {
    /// Create a client for the endpoint rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EchoError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EchoError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EchoClient for HttpEchoClient {
    async fn send(&self, message: &str) -> Result<String, EchoError> {
        let request = ChatRequest {
            message: message.to_owned(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EchoError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, url = %self.url, "echo response received");

        if !status.is_success() {
            return Err(EchoError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EchoError::Transport(e.to_string()))?;

        let reply: ChatReply = serde_json::from_slice(&body)
            .map_err(|e| EchoError::MalformedReply(e.to_string()))?;

        reply
            .reply
            .ok_or_else(|| EchoError::MalformedReply("missing `reply` field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> HttpEchoClient {
        HttpEchoClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = HttpEchoClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://localhost:3000/api/chat");
    }

    #[tokio::test]
    async fn test_send_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({ "message": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hello" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).send("hello").await.unwrap();
        assert_eq!(reply, "hello");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, EchoError::Status(500)));
        assert_eq!(err.to_string(), "Failed to send message (HTTP 500)");
    }

    #[tokio::test]
    async fn test_missing_reply_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "echo": "hi" })))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, EchoError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, EchoError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = HttpEchoClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, EchoError::Transport(_)));
    }
}
