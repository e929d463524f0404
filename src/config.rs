//! Configuration loading and management

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::speech::RecognitionConfig;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LANGUAGE: &str = "en-US";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the local echo endpoint binds to
    pub bind_addr: SocketAddr,

    /// Whether to run the local echo endpoint at all
    pub serve: bool,

    /// Base URL the chat client sends messages to; `None` means the local
    /// endpoint
    pub endpoint: Option<String>,

    /// Per-request timeout for the echo exchange
    pub request_timeout: Duration,

    /// Dictation settings
    pub speech: RecognitionConfig,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("ECHO_CHAT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("ECHO_CHAT_BIND is not a socket address: {bind}"))?;

        let serve = match lookup("ECHO_CHAT_SERVE") {
            Some(value) => parse_bool("ECHO_CHAT_SERVE", &value)?,
            None => true,
        };

        let endpoint = lookup("ECHO_CHAT_ENDPOINT");
        if let Some(url) = &endpoint {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("ECHO_CHAT_ENDPOINT must be an http(s) URL: {url}");
            }
        }

        if endpoint.is_none() && !serve {
            bail!("ECHO_CHAT_SERVE is off but no ECHO_CHAT_ENDPOINT is set");
        }

        let timeout_secs = match lookup("ECHO_CHAT_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("ECHO_CHAT_TIMEOUT_SECS is not a number: {value}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let continuous = match lookup("ECHO_CHAT_SPEECH_CONTINUOUS") {
            Some(value) => parse_bool("ECHO_CHAT_SPEECH_CONTINUOUS", &value)?,
            None => false,
        };

        let language =
            lookup("ECHO_CHAT_SPEECH_LANG").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            bind_addr,
            serve,
            endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            speech: RecognitionConfig::new(continuous, language),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be a boolean, got {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert!(config.serve);
        assert!(config.endpoint.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.speech, RecognitionConfig::default());
    }

    #[test]
    fn test_config_overrides() {
        let config = load_with(&[
            ("ECHO_CHAT_BIND", "0.0.0.0:8080"),
            ("ECHO_CHAT_SERVE", "no"),
            ("ECHO_CHAT_ENDPOINT", "https://echo.example.com"),
            ("ECHO_CHAT_TIMEOUT_SECS", "3"),
            ("ECHO_CHAT_SPEECH_CONTINUOUS", "true"),
            ("ECHO_CHAT_SPEECH_LANG", "fr-FR"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.serve);
        assert_eq!(config.endpoint.as_deref(), Some("https://echo.example.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(config.speech.continuous);
        assert_eq!(config.speech.language, "fr-FR");
    }

    #[test]
    fn test_remote_only_needs_endpoint() {
        assert!(load_with(&[("ECHO_CHAT_SERVE", "false")]).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load_with(&[("ECHO_CHAT_BIND", "localhost")]).is_err());
        assert!(load_with(&[("ECHO_CHAT_SERVE", "maybe")]).is_err());
        assert!(load_with(&[("ECHO_CHAT_ENDPOINT", "ftp://x")]).is_err());
        assert!(load_with(&[("ECHO_CHAT_TIMEOUT_SECS", "soon")]).is_err());
    }
}
