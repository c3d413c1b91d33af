// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, positive budgets, and sampling
//! parameter ranges.

use crate::diagnostic::ConfigError;
use crate::model::SuraConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SuraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate server.host is not empty and looks like an IP or hostname.
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate bedrock identifiers are not empty.
    if config.bedrock.region.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bedrock.region must not be empty".to_string(),
        });
    }
    if config.bedrock.model_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bedrock.model_id must not be empty".to_string(),
        });
    }

    // Validate sampling parameter ranges.
    if !(0.0..=1.0).contains(&config.bedrock.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bedrock.temperature must be within [0.0, 1.0], got {}",
                config.bedrock.temperature
            ),
        });
    }
    if !(0.0..=1.0).contains(&config.bedrock.top_p) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bedrock.top_p must be within [0.0, 1.0], got {}",
                config.bedrock.top_p
            ),
        });
    }
    if config.bedrock.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "bedrock.max_tokens must be at least 1".to_string(),
        });
    }

    // A configured knowledge base must not be blank -- absence is expressed
    // by omitting the key, not by an empty string.
    if let Some(ref kb) = config.retrieval.knowledge_base_id
        && kb.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "retrieval.knowledge_base_id must not be blank; omit it to disable retrieval"
                .to_string(),
        });
    }
    if config.retrieval.top_k == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.top_k must be at least 1".to_string(),
        });
    }

    // Validate chat orchestration bounds.
    if config.chat.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.max_attempts must be at least 1".to_string(),
        });
    }
    if config.chat.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.request_timeout_secs must be at least 1".to_string(),
        });
    }
    if config.chat.max_concurrent_requests == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.max_concurrent_requests must be at least 1".to_string(),
        });
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.chat.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.log_level must be one of {valid_levels:?}, got `{}`",
                config.chat.log_level
            ),
        });
    }

    // Validate database_path is not empty.
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
