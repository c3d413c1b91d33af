// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sura recipe backend.
//!
//! This crate provides the foundational trait definitions, error type, and
//! domain types used throughout the Sura workspace. The provider and
//! retrieval crates implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SuraError;
pub use traits::{CompletionProvider, DocumentRetriever, FragmentStream};
pub use types::{
    ChatRequest, ConversationTurn, Language, PromptPayload, RetrievedDocument, Role,
    StreamFragment, TrendingIngredient, TrendingRecipe,
};
