// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Sura workspace.

use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One user or assistant message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Response language for recipe generation.
///
/// Exactly two values are supported. Anything that is not (case-insensitively)
/// `"eng"` coerces to [`Language::Kor`] -- the documented fallback, applied at
/// parse time so no downstream code ever sees an unrecognized language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Kor,
    Eng,
}

impl Language {
    /// Total conversion from arbitrary caller input. Never fails.
    pub fn coerce(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("eng") {
            Language::Eng
        } else {
            Language::Kor
        }
    }

    pub fn is_english(self) -> bool {
        matches!(self, Language::Eng)
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::coerce(s))
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Language::coerce(&raw))
    }
}

/// An inbound chat request. Stateless: the full history is resupplied by the
/// caller on every call; no server-side conversation identity exists.
///
/// On follow-up turns (non-empty history) the first element of `ingredients`
/// carries the free-text follow-up question rather than an ingredient. This
/// overload is preserved from the source protocol for wire compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub chat_history: Vec<ConversationTurn>,
}

impl ChatRequest {
    /// A first turn is a request whose supplied history is empty.
    pub fn is_first_turn(&self) -> bool {
        self.chat_history.is_empty()
    }
}

/// A reference snippet returned by the knowledge-base retriever.
/// Created per-request, consumed by the context formatter, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedDocument {
    pub text: String,
}

/// The fully assembled outbound request to the completion provider.
///
/// Built fresh per attempt and never mutated in place, so retries are
/// reproducible even though the upstream call is not idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub messages: Vec<ConversationTurn>,
}

/// One unit of incremental assistant output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Incremental assistant text.
    Text(String),
    /// Clean end of the stream.
    End,
    /// Terminal error; no further fragments follow.
    Error(String),
}

/// A row of the `hot_recipes` trending table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRecipe {
    pub ranking: i64,
    pub recipe_name: String,
    pub image_url: Option<String>,
    pub cook_time: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_detail_ko: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_detail_en: Option<String>,
}

/// A row of the `grocery_sales` trending-ingredient table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingIngredient {
    pub ranking: i64,
    pub ingredient_name: String,
    pub total_quantity: i64,
}
