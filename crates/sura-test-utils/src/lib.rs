// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic test doubles for the Sura workspace.
//!
//! Provides a scripted [`MockProvider`] and [`MockRetriever`] so the chat
//! engine and gateway can be exercised end-to-end without network access.

pub mod mock_provider;
pub mod mock_retriever;

pub use mock_provider::{MockOutcome, MockProvider};
pub use mock_retriever::MockRetriever;
