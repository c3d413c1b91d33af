// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort preview extraction from the assistant's recipe XML.
//!
//! The model is instructed to answer inside a `<recipe>` document. Rather
//! than a strict XML parse, this scans for the two labeled sections the
//! preview needs -- the ingredients block and the timed cooking-method
//! title -- so a slightly malformed document still yields a preview.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sura_core::Language;

static RE_INGREDIENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ingredients>\s*(.*?)\s*</ingredients>").expect("static regex")
});

static RE_TIME_ENG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((Total estimated time:[^)]*)\)").expect("static regex"));

static RE_TIME_KOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((총 예상 시간:[^)]*)\)").expect("static regex"));

/// Derived preview of a generated recipe: total cooking time and the
/// ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePreview {
    pub total_time: String,
    pub ingredients: Vec<String>,
}

/// Extracts a preview from the assistant's output.
///
/// Returns `None` when the output contains no `<recipe>` document at all
/// (error markers, refusals, free text). Otherwise best-effort: a missing
/// ingredients block yields an empty list and a missing time yields the
/// language-appropriate "no information" string. Never fails.
pub fn parse_preview(output: &str, language: Language) -> Option<RecipePreview> {
    if !output.contains("<recipe>") {
        return None;
    }

    // Clamp to the recipe document; the model occasionally echoes text
    // around it despite instructions.
    let start = output.find("<recipe>").unwrap_or(0);
    let end = output
        .find("</recipe>")
        .map(|pos| pos + "</recipe>".len())
        .unwrap_or(output.len());
    let recipe = &output[start..end];

    let ingredients = RE_INGREDIENTS
        .captures(recipe)
        .and_then(|caps| caps.get(1))
        .map(|block| {
            block
                .as_str()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let time_re: &Regex = if language.is_english() {
        &RE_TIME_ENG
    } else {
        &RE_TIME_KOR
    };
    let total_time = time_re
        .captures(recipe)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| {
            if language.is_english() {
                "Information not available".to_string()
            } else {
                "정보 없음".to_string()
            }
        });

    Some(RecipePreview {
        total_time,
        ingredients,
    })
}
