//! Echo endpoint wire format
//!
//! All bodies are JSON. The reply field is optional on the client side so a
//! body without a usable reply can be reported as malformed instead of
//! failing inside the deserializer.

use serde::{Deserialize, Serialize};

/// Path of the echo endpoint, relative to the server root
pub const CHAT_PATH: &str = "/api/chat";

/// Path of the readiness check
pub const HEALTH_PATH: &str = "/api/health";

/// Body of a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body of a successful chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

/// Body of a rejected request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
