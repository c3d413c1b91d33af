// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Bedrock streaming invoke responses.
//!
//! Converts a reqwest response byte stream into typed [`StreamEvent`]
//! variants using the `eventsource-stream` crate for SSE protocol
//! compliance.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use sura_core::SuraError;

use crate::types::{
    SseContentBlockDelta, SseContentBlockStop, SseError, SseMessageDelta, SseMessageStart,
};

/// Typed SSE events from the Bedrock streaming protocol.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Initial message metadata (model, usage).
    MessageStart(SseMessageStart),
    /// Incremental update to a content block (text delta).
    ContentBlockDelta(SseContentBlockDelta),
    /// A content block has finished.
    ContentBlockStop(SseContentBlockStop),
    /// Message-level delta (stop_reason, usage update).
    MessageDelta(SseMessageDelta),
    /// The message is complete.
    MessageStop,
    /// Keep-alive ping.
    Ping,
    /// Provider error during streaming.
    Error(SseError),
}

/// Parses a reqwest streaming response into a stream of typed [`StreamEvent`]s.
///
/// Each SSE event is deserialized into the matching variant based on the
/// event name. Unknown event types are silently skipped so that provider-side
/// protocol additions do not break the stream.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, SuraError>> + Send>> {
    let byte_stream = response.bytes_stream();
    let event_stream = byte_stream.eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let parsed = match event.event.as_str() {
                    "message_start" => serde_json::from_str::<SseMessageStart>(&event.data)
                        .map(StreamEvent::MessageStart)
                        .map_err(|e| SuraError::Provider {
                            message: format!("failed to parse message_start: {e}"),
                            source: Some(Box::new(e)),
                        }),
                    "content_block_delta" => {
                        serde_json::from_str::<SseContentBlockDelta>(&event.data)
                            .map(StreamEvent::ContentBlockDelta)
                            .map_err(|e| SuraError::Provider {
                                message: format!("failed to parse content_block_delta: {e}"),
                                source: Some(Box::new(e)),
                            })
                    }
                    "content_block_stop" => {
                        serde_json::from_str::<SseContentBlockStop>(&event.data)
                            .map(StreamEvent::ContentBlockStop)
                            .map_err(|e| SuraError::Provider {
                                message: format!("failed to parse content_block_stop: {e}"),
                                source: Some(Box::new(e)),
                            })
                    }
                    "message_delta" => serde_json::from_str::<SseMessageDelta>(&event.data)
                        .map(StreamEvent::MessageDelta)
                        .map_err(|e| SuraError::Provider {
                            message: format!("failed to parse message_delta: {e}"),
                            source: Some(Box::new(e)),
                        }),
                    "message_stop" => Ok(StreamEvent::MessageStop),
                    "ping" => Ok(StreamEvent::Ping),
                    "error" => serde_json::from_str::<SseError>(&event.data)
                        .map(StreamEvent::Error)
                        .map_err(|e| SuraError::Provider {
                            message: format!("failed to parse error event: {e}"),
                            source: Some(Box::new(e)),
                        }),
                    // Unknown event types (content_block_start and future
                    // additions) carry nothing this client consumes.
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(SuraError::Provider {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Helper: serve raw SSE text through wiremock to get a real
    /// reqwest::Response with a streaming body.
    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn parse_content_block_delta() {
        let sse = "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Kimchi\"}}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let event = stream.next().await.unwrap().unwrap();
        match event {
            StreamEvent::ContentBlockDelta(delta) => {
                assert_eq!(delta.index, 0);
                let crate::types::SseDelta::TextDelta { ref text } = delta.delta;
                assert_eq!(text, "Kimchi");
            }
            other => panic!("expected ContentBlockDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_message_stop() {
        let sse = "event: message_stop\ndata: {}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let event = stream.next().await.unwrap().unwrap();
        assert!(matches!(event, StreamEvent::MessageStop));
    }

    #[tokio::test]
    async fn unknown_events_are_skipped() {
        let sse = "event: content_block_start\ndata: {\"index\":0}\n\nevent: message_stop\ndata: {}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        // content_block_start is skipped; first yielded item is message_stop.
        let event = stream.next().await.unwrap().unwrap();
        assert!(matches!(event, StreamEvent::MessageStop));
    }

    #[tokio::test]
    async fn parse_error_event() {
        let sse = "event: error\ndata: {\"error\":{\"type\":\"expired_token_exception\",\"message\":\"token expired\"}}\n\n";
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let event = stream.next().await.unwrap().unwrap();
        match event {
            StreamEvent::Error(err) => {
                assert_eq!(err.error.type_, "expired_token_exception");
                assert_eq!(err.error.message, "token expired");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_full_generation_sequence() {
        let sse = concat!(
            "event: message_start\ndata: {\"message\":{\"model\":\"claude\",\"usage\":{\"input_tokens\":10}}}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Chicken \"}}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"rice\"}}\n\n",
            "event: content_block_stop\ndata: {\"index\":0}\n\n",
            "event: message_delta\ndata: {\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":25}}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        let response = mock_sse_response(sse).await;
        let mut stream = parse_sse_stream(response);

        let mut kinds = Vec::new();
        while let Some(event) = stream.next().await {
            kinds.push(match event.unwrap() {
                StreamEvent::MessageStart(_) => "start",
                StreamEvent::ContentBlockDelta(_) => "delta",
                StreamEvent::ContentBlockStop(_) => "block_stop",
                StreamEvent::MessageDelta(_) => "message_delta",
                StreamEvent::MessageStop => "stop",
                StreamEvent::Ping => "ping",
                StreamEvent::Error(_) => "error",
            });
        }
        assert_eq!(
            kinds,
            vec!["start", "delta", "delta", "block_stop", "message_delta", "stop"]
        );
    }
}
