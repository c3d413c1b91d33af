// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sura recipe backend.

use thiserror::Error;

/// The primary error type used across all Sura crates.
#[derive(Debug, Error)]
pub enum SuraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Completion provider errors (HTTP failure, malformed response, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transient credential expiry reported by the completion provider.
    ///
    /// Kept distinct from [`SuraError::Provider`] because it is the only error
    /// class the chat engine retries.
    #[error("provider credentials expired: {message}")]
    CredentialExpired { message: String },

    /// Knowledge-base retrieval errors (backend unreachable, bad response).
    #[error("retrieval error: {message}")]
    Retrieval {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SuraError {
    /// Returns true when this error should trigger a fresh completion attempt.
    pub fn is_credential_expiry(&self) -> bool {
        matches!(self, SuraError::CredentialExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_expiry_is_the_only_retryable_class() {
        let expired = SuraError::CredentialExpired {
            message: "token expired".into(),
        };
        assert!(expired.is_credential_expiry());

        let provider = SuraError::Provider {
            message: "bad model id".into(),
            source: None,
        };
        assert!(!provider.is_credential_expiry());

        let timeout = SuraError::Timeout {
            duration: std::time::Duration::from_secs(120),
        };
        assert!(!timeout.is_credential_expiry());
    }

    #[test]
    fn display_includes_message() {
        let err = SuraError::Retrieval {
            message: "knowledge base unreachable".into(),
            source: None,
        };
        assert!(err.to_string().contains("knowledge base unreachable"));
    }
}
