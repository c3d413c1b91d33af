// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sura recipe backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Sura configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuraConfig {
    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bedrock completion provider settings.
    #[serde(default)]
    pub bedrock: BedrockConfig,

    /// Knowledge-base retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chat orchestration settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Trending store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Bedrock completion provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BedrockConfig {
    /// AWS region the runtime endpoint lives in.
    #[serde(default = "default_region")]
    pub region: String,

    /// Model identifier passed on the invoke path.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Session token. `None` falls back to the `AWS_SESSION_TOKEN`
    /// environment variable at provider construction time.
    #[serde(default)]
    pub session_token: Option<String>,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Anthropic-on-Bedrock wire version string.
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            model_id: default_model_id(),
            session_token: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            anthropic_version: default_anthropic_version(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_model_id() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f64 {
    0.2
}

fn default_top_p() -> f64 {
    0.6
}

fn default_anthropic_version() -> String {
    "bedrock-2023-05-31".to_string()
}

/// Knowledge-base retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Knowledge-base identifier. `None` disables retrieval entirely --
    /// recipe generation proceeds ungrounded, which is not an error.
    #[serde(default)]
    pub knowledge_base_id: Option<String>,

    /// Number of nearest documents to fetch per retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_base_id: None,
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

/// Chat orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Maximum completion attempts per conversation (credential-expiry retry budget).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between retry attempts, in seconds.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Overall wall-clock budget per conversation, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent provider conversations admitted.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_backoff_secs: default_retry_backoff_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            log_level: default_log_level(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_secs() -> u64 {
    1
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Trending store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "sura.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SuraConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.bedrock.region, "us-east-1");
        assert_eq!(config.bedrock.max_tokens, 4096);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.retrieval.knowledge_base_id.is_none());
        assert_eq!(config.chat.max_attempts, 3);
        assert_eq!(config.chat.retry_backoff_secs, 1);
        assert_eq!(config.chat.request_timeout_secs, 120);
        assert_eq!(config.storage.database_path, "sura.db");
    }

    #[test]
    fn partial_section_fills_in_defaults() {
        let config: SuraConfig = toml::from_str(
            r#"
            [bedrock]
            model_id = "anthropic.claude-3-haiku-20240307-v1:0"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.bedrock.model_id,
            "anthropic.claude-3-haiku-20240307-v1:0"
        );
        assert_eq!(config.bedrock.region, "us-east-1");
        assert_eq!(config.bedrock.max_tokens, 4096);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result: Result<SuraConfig, _> = toml::from_str(
            r#"
            [chat]
            max_atempts = 5
            "#,
        );
        assert!(result.is_err());
    }
}
