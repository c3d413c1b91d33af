// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock document retriever for deterministic testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sura_core::{DocumentRetriever, RetrievedDocument, SuraError};

/// A retriever that returns canned documents or a scripted failure, and
/// counts how many times it was invoked (for retrieval-gating assertions).
pub struct MockRetriever {
    documents: Vec<RetrievedDocument>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockRetriever {
    /// A retriever that always succeeds with the given document texts.
    pub fn with_documents(texts: Vec<&str>) -> Self {
        Self {
            documents: texts
                .into_iter()
                .map(|text| RetrievedDocument { text: text.into() })
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A retriever that always fails.
    pub fn failing() -> Self {
        Self {
            documents: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of retrieve calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRetriever for MockRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<RetrievedDocument>, SuraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SuraError::Retrieval {
                message: "mock retrieval failure".into(),
                source: None,
            });
        }
        Ok(self.documents.clone())
    }
}
