// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bedrock runtime request/response types and SSE event types.
//!
//! The Bedrock Anthropic surface speaks the Messages wire format: an invoke
//! body with `anthropic_version`, and a streaming response of
//! `message_start` / `content_block_delta` / `message_stop` events.

use serde::{Deserialize, Serialize};

/// The body POSTed to `/model/{id}/invoke` and
/// `/model/{id}/invoke-with-response-stream`.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeRequest {
    /// Wire version marker required by the Bedrock Anthropic surface.
    pub anthropic_version: String,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// System instructions (omitted when empty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Conversation messages, oldest first.
    pub messages: Vec<ApiMessage>,

    /// Sampling temperature.
    pub temperature: f64,

    /// Nucleus sampling cutoff.
    pub top_p: f64,
}

/// A single message in the Messages wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// A full response from the non-streaming invoke call.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeResponse {
    /// Content blocks in the response.
    pub content: Vec<ResponseContentBlock>,
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    #[serde(default)]
    pub usage: ApiUsage,
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    /// Number of input tokens consumed.
    #[serde(default)]
    pub input_tokens: u32,
    /// Number of output tokens generated.
    #[serde(default)]
    pub output_tokens: u32,
}

// --- SSE event types ---

/// SSE event: message_start
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageStart {
    /// Initial message metadata.
    pub message: SseMessageInfo,
}

/// Metadata carried by a message_start event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageInfo {
    /// Model that is generating the response.
    #[serde(default)]
    pub model: Option<String>,
    /// Initial usage statistics.
    #[serde(default)]
    pub usage: ApiUsage,
}

/// SSE event: content_block_delta
#[derive(Debug, Clone, Deserialize)]
pub struct SseContentBlockDelta {
    /// Index of the content block being updated.
    pub index: usize,
    /// The delta update.
    pub delta: SseDelta,
}

/// A delta update within a content block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SseDelta {
    /// Text delta -- appends text to the current block.
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
}

/// SSE event: content_block_stop
#[derive(Debug, Clone, Deserialize)]
pub struct SseContentBlockStop {
    /// Index of the content block that stopped.
    pub index: usize,
}

/// SSE event: message_delta
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageDelta {
    /// Delta information (stop reason, etc.).
    pub delta: SseMessageDeltaInfo,
    /// Updated usage statistics.
    pub usage: Option<ApiUsage>,
}

/// Delta information for a message_delta event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageDeltaInfo {
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
}

/// SSE event: error
#[derive(Debug, Clone, Deserialize)]
pub struct SseError {
    /// Error details.
    pub error: SseErrorDetail,
}

/// Error detail within an SSE error event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}
