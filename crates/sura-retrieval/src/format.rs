// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context formatter: turns retrieved reference snippets into one bounded
//! text blob for prompt inclusion.

use sura_core::RetrievedDocument;
use tracing::debug;

/// Visible separator between reference snippets in the formatted context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Formats retrieved documents into a single context string.
///
/// Pure and total: each text is trimmed, empty ones are dropped, survivors
/// are joined with [`CONTEXT_SEPARATOR`] in input order. An empty result is
/// the empty string, never an error.
pub fn format_docs(docs: &[RetrievedDocument]) -> String {
    let formatted: Vec<&str> = docs
        .iter()
        .map(|doc| doc.text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    if formatted.is_empty() {
        debug!("no usable documents retrieved");
        return String::new();
    }

    debug!(count = formatted.len(), "formatted retrieved documents");
    formatted.join(CONTEXT_SEPARATOR)
}
