// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration core for the Sura recipe backend.
//!
//! Owns the pieces with real state and failure modes: the first-turn vs.
//! follow-up session distinction, the retrieval decision gated on it, prompt
//! assembly, and the bounded credential-expiry retry around the streaming
//! provider call.

pub mod engine;
pub mod preview;
pub mod prompt;

pub use engine::{ChatEngine, ChatResponse, ChatStream, ChatTuning, ProviderFactory};
pub use preview::{RecipePreview, parse_preview};
