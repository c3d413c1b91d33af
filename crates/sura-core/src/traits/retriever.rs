// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document retriever trait for knowledge-base grounding.

use async_trait::async_trait;

use crate::error::SuraError;
use crate::types::RetrievedDocument;

/// Adapter for an external document-retrieval service.
///
/// Callers decide *when* retrieval happens (first turn only) and how failures
/// degrade; implementations only perform the lookup.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Returns the ranked nearest matches for a query.
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, SuraError>;
}
