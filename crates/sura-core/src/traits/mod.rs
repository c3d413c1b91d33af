// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the provider and retrieval crates.

pub mod provider;
pub mod retriever;

pub use provider::{CompletionProvider, FragmentStream};
pub use retriever::DocumentRetriever;
