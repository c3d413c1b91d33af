// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunked plain-text streaming for POST /api/chat/stream.
//!
//! Fragments are forwarded to the transport as they arrive. Once headers are
//! committed there is no out-of-band error channel, so a terminal error is
//! signaled in-band as a literal `<error>...</error>` chunk followed by end
//! of body. Nothing on this path can raise past the transport.

use std::convert::Infallible;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::{StreamExt, future};
use sura_core::{ChatRequest, StreamFragment};
use tracing::debug;

use crate::server::GatewayState;

/// POST /api/chat/stream
///
/// Streams raw assistant text chunks in generation order.
pub async fn post_chat_stream(
    State(state): State<GatewayState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    debug!(
        request_id = request_id.as_str(),
        language = %request.language,
        first_turn = request.is_first_turn(),
        "starting streamed conversation"
    );

    let fragments = state.engine.stream_chat(request);
    let chunks = fragments.scan(false, |done, fragment| {
        if *done {
            return future::ready(None);
        }
        future::ready(match fragment {
            StreamFragment::Text(text) => Some(Ok::<Bytes, Infallible>(Bytes::from(text))),
            StreamFragment::Error(message) => {
                *done = true;
                Some(Ok(Bytes::from(error_chunk(&message))))
            }
            StreamFragment::End => None,
        })
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(chunks),
    )
        .into_response()
}

/// The in-band error marker chunk.
fn error_chunk(message: &str) -> String {
    format!("<error>{message}</error>")
}
