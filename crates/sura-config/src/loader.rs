// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./sura.toml` > `~/.config/sura/sura.toml` >
//! `/etc/sura/sura.toml`, with environment variable overrides via the
//! `SURA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SuraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sura/sura.toml` (system-wide)
/// 3. `~/.config/sura/sura.toml` (user XDG config)
/// 4. `./sura.toml` (local directory)
/// 5. `SURA_*` environment variables
pub fn load_config() -> Result<SuraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuraConfig::default()))
        .merge(Toml::file("/etc/sura/sura.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sura/sura.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sura.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SuraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SuraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SURA_RETRIEVAL_KNOWLEDGE_BASE_ID` must
/// map to `retrieval.knowledge_base_id`, not `retrieval.knowledge.base.id`.
fn env_provider() -> Env {
    Env::prefixed("SURA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SURA_BEDROCK_MODEL_ID -> "bedrock_model_id"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("bedrock_", "bedrock.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
