// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bedrock completion provider for the Sura recipe backend.
//!
//! This crate implements [`CompletionProvider`] over the Bedrock runtime,
//! converting the provider's SSE event stream into [`StreamFragment`]s and
//! detecting mid-stream credential expiry.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::stream::StreamExt;
use sura_config::model::BedrockConfig;
use sura_core::{CompletionProvider, FragmentStream, PromptPayload, StreamFragment, SuraError};
use tracing::info;

use crate::client::{BedrockClient, GenerationParams};
use crate::sse::StreamEvent;
use crate::types::ResponseContentBlock;

/// SSE error event type emitted when the session token lapses mid-stream.
const EXPIRED_EVENT_TYPE: &str = "expired_token_exception";

/// Bedrock provider implementing [`CompletionProvider`].
///
/// Session token resolution order: config -> `AWS_SESSION_TOKEN` env var ->
/// error. Intended to be constructed fresh per attempt through the chat
/// engine's provider factory; construction binds configuration only and
/// performs no I/O.
pub struct BedrockProvider {
    client: BedrockClient,
}

impl BedrockProvider {
    /// Creates a new Bedrock provider from the given configuration.
    pub fn new(config: &BedrockConfig) -> Result<Self, SuraError> {
        let token = resolve_session_token(&config.session_token)?;
        let client = BedrockClient::new(
            &config.region,
            &token,
            config.model_id.clone(),
            GenerationParams {
                anthropic_version: config.anthropic_version.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
            },
        )?;

        info!(
            model = config.model_id.as_str(),
            region = config.region.as_str(),
            "Bedrock provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client (for testing).
    pub fn with_client(client: BedrockClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionProvider for BedrockProvider {
    async fn stream(&self, prompt: &PromptPayload) -> Result<FragmentStream, SuraError> {
        let event_stream = self.client.invoke_stream(prompt).await?;

        // Fused mapping: once a terminal item has been emitted, any trailing
        // provider events are swallowed so consumers see a clean sequence.
        let mut finished = false;
        let fragments = event_stream.filter_map(move |result| {
            let item = if finished {
                None
            } else {
                map_event(result, &mut finished)
            };
            async move { item }
        });

        Ok(Box::pin(fragments))
    }

    async fn complete(&self, prompt: &PromptPayload) -> Result<String, SuraError> {
        let response = self.client.invoke(prompt).await?;
        let text = response
            .content
            .iter()
            .map(|block| match block {
                ResponseContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

/// Maps one SSE event to a fragment-stream item, updating the fuse when a
/// terminal item is produced.
fn map_event(
    result: Result<StreamEvent, SuraError>,
    finished: &mut bool,
) -> Option<Result<StreamFragment, SuraError>> {
    match result {
        Ok(StreamEvent::ContentBlockDelta(delta)) => {
            let types::SseDelta::TextDelta { text } = delta.delta;
            Some(Ok(StreamFragment::Text(text)))
        }
        Ok(StreamEvent::MessageStop) => {
            *finished = true;
            Some(Ok(StreamFragment::End))
        }
        Ok(StreamEvent::Error(err)) if err.error.type_ == EXPIRED_EVENT_TYPE => {
            *finished = true;
            Some(Err(SuraError::CredentialExpired {
                message: err.error.message,
            }))
        }
        Ok(StreamEvent::Error(err)) => {
            *finished = true;
            Some(Err(SuraError::Provider {
                message: format!("{}: {}", err.error.type_, err.error.message),
                source: None,
            }))
        }
        // message_start, content_block_stop, message_delta, ping: metadata only.
        Ok(_) => None,
        Err(e) => {
            *finished = true;
            Some(Err(e))
        }
    }
}

/// Resolves the session token from config or environment.
fn resolve_session_token(config_token: &Option<String>) -> Result<String, SuraError> {
    if let Some(token) = config_token
        && !token.is_empty()
    {
        return Ok(token.clone());
    }

    std::env::var("AWS_SESSION_TOKEN").map_err(|_| {
        SuraError::Config(
            "Bedrock session token not found. Set bedrock.session_token in config or the AWS_SESSION_TOKEN environment variable.".into(),
        )
    })
}
