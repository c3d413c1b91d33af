// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Bedrock runtime.
//!
//! Provides [`BedrockClient`] which handles request construction,
//! authentication, and both streaming and non-streaming invoke calls.
//! Credential expiry is detected here and surfaced as
//! [`SuraError::CredentialExpired`] so the chat engine can retry.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use sura_core::{PromptPayload, SuraError};
use tracing::debug;

use crate::sse::{self, StreamEvent};
use crate::types::{ApiMessage, InvokeRequest, InvokeResponse};

/// Marker AWS puts in 403 bodies when the session token has lapsed.
const EXPIRED_TOKEN_MARKER: &str = "ExpiredTokenException";

/// Generation parameters applied to every invoke body.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

/// HTTP client for the Bedrock runtime endpoint of one region.
///
/// Construction is cheap, pure configuration binding: the chat engine builds
/// a fresh client per attempt instead of holding a long-lived one, which
/// removes stale-credential state by construction.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: reqwest::Client,
    model_id: String,
    params: GenerationParams,
    base_url: String,
}

impl BedrockClient {
    /// Creates a new Bedrock runtime client.
    ///
    /// # Arguments
    /// * `region` - AWS region used to derive the runtime endpoint
    /// * `session_token` - bearer credential for the runtime
    /// * `model_id` - model identifier placed on the invoke path
    /// * `params` - generation parameters for every request
    pub fn new(
        region: &str,
        session_token: &str,
        model_id: String,
        params: GenerationParams,
    ) -> Result<Self, SuraError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {session_token}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&bearer).map_err(|e| {
                SuraError::Config(format!("invalid session token header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| SuraError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model_id,
            params,
            base_url: format!("https://bedrock-runtime.{region}.amazonaws.com"),
        })
    }

    /// Returns the model identifier this client invokes.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Builds the invoke body from an assembled prompt.
    fn invoke_body(&self, prompt: &PromptPayload) -> InvokeRequest {
        let system = if prompt.system.is_empty() {
            None
        } else {
            Some(prompt.system.clone())
        };
        InvokeRequest {
            anthropic_version: self.params.anthropic_version.clone(),
            max_tokens: self.params.max_tokens,
            system,
            messages: prompt
                .messages
                .iter()
                .map(|turn| ApiMessage {
                    role: turn.role.to_string(),
                    content: turn.content.clone(),
                })
                .collect(),
            temperature: self.params.temperature,
            top_p: self.params.top_p,
        }
    }

    /// Issues one streaming invoke and returns the SSE event stream.
    ///
    /// Not restartable: a retry requires a fresh call with a freshly built
    /// body (the chat engine owns that loop).
    pub async fn invoke_stream(
        &self,
        prompt: &PromptPayload,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, SuraError>> + Send>>, SuraError>
    {
        let body = self.invoke_body(prompt);
        let url = format!(
            "{}/model/{}/invoke-with-response-stream",
            self.base_url, self.model_id
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuraError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model_id, "streaming invoke response received");

        if status.is_success() {
            return Ok(sse::parse_sse_stream(response));
        }

        Err(error_from_response(status, response).await)
    }

    /// Issues one non-streaming invoke and returns the parsed response.
    pub async fn invoke(&self, prompt: &PromptPayload) -> Result<InvokeResponse, SuraError> {
        let body = self.invoke_body(prompt);
        let url = format!("{}/model/{}/invoke", self.base_url, self.model_id);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuraError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model_id, "invoke response received");

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        let text = response.text().await.map_err(|e| SuraError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&text).map_err(|e| SuraError::Provider {
            message: format!("failed to parse invoke response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

/// Converts a non-success HTTP response into the appropriate error.
///
/// 401/403 bodies mentioning the expired-token marker become
/// [`SuraError::CredentialExpired`]; everything else is a fatal provider
/// error and is never retried.
async fn error_from_response(status: StatusCode, response: reqwest::Response) -> SuraError {
    let body = response.text().await.unwrap_or_default();
    if is_credential_expiry(status, &body) {
        return SuraError::CredentialExpired {
            message: format!("runtime returned {status}: {body}"),
        };
    }
    SuraError::Provider {
        message: format!("runtime returned {status}: {body}"),
        source: None,
    }
}

/// Returns true when a status/body pair indicates a lapsed session token.
fn is_credential_expiry(status: StatusCode, body: &str) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    ) && body.contains(EXPIRED_TOKEN_MARKER)
}
