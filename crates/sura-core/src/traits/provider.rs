// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for hosted LLM integrations.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::SuraError;
use crate::types::{PromptPayload, StreamFragment};

/// A lazy, forward-only, single-pass fragment sequence. Not restartable:
/// a fresh attempt requires a fresh [`CompletionProvider::stream`] call.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<StreamFragment, SuraError>> + Send>>;

/// Adapter for a hosted completion provider.
///
/// Implementations own the network call, convert the provider's event stream
/// into [`StreamFragment`]s, and surface mid-stream failures as a single
/// terminal stream item -- never a panic, because by the time an error is
/// known the transport may already have forwarded earlier fragments.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues one streaming request and returns the fragment sequence.
    ///
    /// A pre-stream credential failure is returned as
    /// [`SuraError::CredentialExpired`]; a mid-stream one terminates the
    /// sequence with the same error as its final item.
    async fn stream(&self, prompt: &PromptPayload) -> Result<FragmentStream, SuraError>;

    /// Issues one non-streaming request and returns the full assistant text.
    async fn complete(&self, prompt: &PromptPayload) -> Result<String, SuraError>;
}
