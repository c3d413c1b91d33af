// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base retrieval for the Sura recipe backend.
//!
//! Wraps the document-retrieval service behind [`DocumentRetriever`] and
//! provides the pure context formatter used to fold retrieved snippets into
//! a prompt. Retrieval happens at most once per conversation (the first turn
//! only); that rule lives in the chat engine, not here.

pub mod format;
pub mod retriever;

pub use format::{CONTEXT_SEPARATOR, format_docs};
pub use retriever::KnowledgeBaseRetriever;

// Re-exported so downstream crates name the trait through the crate that
// implements it, matching how call sites read.
pub use sura_core::DocumentRetriever;
