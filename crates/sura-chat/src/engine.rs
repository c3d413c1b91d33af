// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: retrieval gating, prompt assembly, and bounded
//! credential-expiry retry around the completion provider.
//!
//! One conversation is one spawned task. Fragments flow through an mpsc
//! channel; dropping the consumer cancels the task and with it the in-flight
//! provider call. No state is shared between conversations beyond the
//! admission semaphore and the read-only configuration.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use sura_core::{
    ChatRequest, CompletionProvider, DocumentRetriever, Language, StreamFragment, SuraError,
};
use sura_retrieval::format_docs;
use tokio::sync::{Semaphore, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::preview::{RecipePreview, parse_preview};
use crate::prompt;

/// Builds a completion provider for one attempt.
///
/// Provider construction is cheap configuration binding, so each attempt gets
/// a fresh instance; a lapsed credential can never outlive the attempt that
/// saw it.
pub type ProviderFactory =
    Arc<dyn Fn() -> Result<Arc<dyn CompletionProvider>, SuraError> + Send + Sync>;

/// The caller-facing fragment sequence. Errors are already folded into
/// terminal [`StreamFragment::Error`] items; this stream itself never fails.
pub type ChatStream = Pin<Box<dyn Stream<Item = StreamFragment> + Send>>;

/// Orchestration knobs, all defaulted to the reference behavior.
#[derive(Debug, Clone)]
pub struct ChatTuning {
    /// Completion attempts per conversation (credential-expiry retry budget).
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub retry_backoff: Duration,
    /// Wall-clock budget for one whole conversation.
    pub request_timeout: Duration,
    /// Concurrent conversations admitted to the provider.
    pub max_concurrent: usize,
}

impl Default for ChatTuning {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
            max_concurrent: 16,
        }
    }
}

/// Response body of the non-streaming chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub full_recipe: String,
    pub preview: Option<RecipePreview>,
}

/// The per-process conversation engine. Cheap to clone; clones share the
/// admission semaphore and configuration.
#[derive(Clone)]
pub struct ChatEngine {
    provider_factory: ProviderFactory,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    tuning: ChatTuning,
    permits: Arc<Semaphore>,
}

impl ChatEngine {
    /// Creates an engine. `retriever: None` disables grounding entirely.
    pub fn new(
        provider_factory: ProviderFactory,
        retriever: Option<Arc<dyn DocumentRetriever>>,
        tuning: ChatTuning,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(tuning.max_concurrent));
        Self {
            provider_factory,
            retriever,
            tuning,
            permits,
        }
    }

    /// Streams one conversation. Never fails: every failure path terminates
    /// the stream with a single [`StreamFragment::Error`].
    pub fn stream_chat(&self, request: ChatRequest) -> ChatStream {
        let (tx, rx) = mpsc::channel::<StreamFragment>(16);
        let engine = self.clone();

        tokio::spawn(async move {
            let timeout = engine.tuning.request_timeout;
            if tokio::time::timeout(timeout, engine.drive_stream(request, tx.clone()))
                .await
                .is_err()
            {
                warn!(timeout_secs = timeout.as_secs(), "conversation exceeded wall-clock budget");
                let _ = tx
                    .send(StreamFragment::Error(format!(
                        "recipe generation timed out after {}s",
                        timeout.as_secs()
                    )))
                    .await;
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    /// Runs one conversation to completion, forwarding fragments into `tx`.
    ///
    /// A failed send means the caller disconnected: stop producing, drop the
    /// provider stream, release the permit.
    async fn drive_stream(&self, request: ChatRequest, tx: mpsc::Sender<StreamFragment>) {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                let _ = tx
                    .send(StreamFragment::Error("service is shutting down".into()))
                    .await;
                return;
            }
        };

        let context = self.gather_context(&request).await;
        let mut last_expiry = String::new();

        for attempt in 1..=self.tuning.max_attempts {
            // Rebuilt from scratch every attempt: the request is immutable,
            // so retries are reproducible.
            let payload = prompt::assemble(&request, &context);

            let provider = match (self.provider_factory)() {
                Ok(provider) => provider,
                Err(e) => {
                    // Construction failures cannot succeed on retry.
                    warn!(error = %e, "provider construction failed");
                    let _ = tx.send(StreamFragment::Error(e.to_string())).await;
                    return;
                }
            };

            match provider.stream(&payload).await {
                Ok(mut fragments) => {
                    let mut expired: Option<String> = None;
                    while let Some(item) = fragments.next().await {
                        match item {
                            Ok(StreamFragment::Text(text)) => {
                                if tx.send(StreamFragment::Text(text)).await.is_err() {
                                    debug!("caller disconnected mid-stream");
                                    return;
                                }
                            }
                            Ok(StreamFragment::End) => {
                                let _ = tx.send(StreamFragment::End).await;
                                return;
                            }
                            Ok(StreamFragment::Error(message)) => {
                                let _ = tx.send(StreamFragment::Error(message)).await;
                                return;
                            }
                            Err(e) if e.is_credential_expiry() => {
                                expired = Some(e.to_string());
                                break;
                            }
                            Err(e) => {
                                let _ = tx.send(StreamFragment::Error(e.to_string())).await;
                                return;
                            }
                        }
                    }

                    match expired {
                        // Clean end of stream; an explicit End event is not
                        // required of providers.
                        None => {
                            let _ = tx.send(StreamFragment::End).await;
                            return;
                        }
                        Some(message) => last_expiry = message,
                    }
                }
                Err(e) if e.is_credential_expiry() => last_expiry = e.to_string(),
                Err(e) => {
                    let _ = tx.send(StreamFragment::Error(e.to_string())).await;
                    return;
                }
            }

            if attempt == self.tuning.max_attempts {
                warn!(attempt, "credential-expiry retry budget exhausted");
                let _ = tx
                    .send(StreamFragment::Error(format!(
                        "recipe generation failed after {attempt} attempts: {last_expiry}"
                    )))
                    .await;
                return;
            }

            // Fragments already forwarded stay with the caller; the next
            // attempt regenerates from the beginning.
            warn!(attempt, "provider credentials expired, retrying");
            tokio::time::sleep(self.tuning.retry_backoff).await;
        }
    }

    /// Runs one non-streaming conversation. Never fails: errors become an
    /// inline `<error>` body with no preview.
    pub async fn complete_chat(&self, request: ChatRequest) -> ChatResponse {
        let timeout = self.tuning.request_timeout;
        let language = request.language;
        match tokio::time::timeout(timeout, self.drive_complete(request)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "conversation exceeded wall-clock budget");
                error_response(
                    language,
                    &format!("recipe generation timed out after {}s", timeout.as_secs()),
                )
            }
        }
    }

    async fn drive_complete(&self, request: ChatRequest) -> ChatResponse {
        let language = request.language;
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return error_response(language, "service is shutting down"),
        };

        let context = self.gather_context(&request).await;
        let mut last_expiry = String::new();

        for attempt in 1..=self.tuning.max_attempts {
            let payload = prompt::assemble(&request, &context);

            let provider = match (self.provider_factory)() {
                Ok(provider) => provider,
                Err(e) => return error_response(language, &e.to_string()),
            };

            match provider.complete(&payload).await {
                Ok(full_recipe) => {
                    let preview = parse_preview(&full_recipe, language);
                    return ChatResponse {
                        full_recipe,
                        preview,
                    };
                }
                Err(e) if e.is_credential_expiry() => last_expiry = e.to_string(),
                Err(e) => return error_response(language, &e.to_string()),
            }

            if attempt == self.tuning.max_attempts {
                warn!(attempt, "credential-expiry retry budget exhausted");
                return error_response(
                    language,
                    &format!("recipe generation failed after {attempt} attempts: {last_expiry}"),
                );
            }

            warn!(attempt, "provider credentials expired, retrying");
            tokio::time::sleep(self.tuning.retry_backoff).await;
        }

        error_response(language, "recipe generation failed")
    }

    /// Retrieval gating: first turn only, with ingredients, with a
    /// configured backend. Failures degrade to a sentinel context string,
    /// never to a user-facing error.
    async fn gather_context(&self, request: &ChatRequest) -> String {
        if !request.is_first_turn() || request.ingredients.is_empty() {
            return String::new();
        }
        let Some(retriever) = &self.retriever else {
            debug!("retrieval not configured, generating ungrounded");
            return String::new();
        };

        let query = prompt::retrieval_query(request.language, &request.ingredients);
        match retriever.retrieve(&query).await {
            Ok(docs) => {
                info!(count = docs.len(), "knowledge base documents retrieved");
                format_docs(&docs)
            }
            Err(e) => {
                warn!(error = %e, "knowledge base retrieval failed, continuing ungrounded");
                prompt::retrieval_failure_sentinel(request.language).to_string()
            }
        }
    }
}

/// Builds the inline-error response body for the non-streaming endpoint.
fn error_response(language: Language, message: &str) -> ChatResponse {
    let localized = if language.is_english() {
        format!("An error occurred: {message}")
    } else {
        format!("레시피 생성 중 오류: {message}")
    };
    ChatResponse {
        full_recipe: format!("<error>{localized}</error>"),
        preview: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sura_core::{ConversationTurn, Role};
    use sura_test_utils::{MockOutcome, MockProvider, MockRetriever};

    fn factory_for(provider: &Arc<MockProvider>) -> ProviderFactory {
        let provider = provider.clone();
        Arc::new(move || Ok(provider.clone() as Arc<dyn CompletionProvider>))
    }

    fn fast_tuning() -> ChatTuning {
        ChatTuning {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
            max_concurrent: 4,
        }
    }

    fn first_turn_request(ingredients: &[&str]) -> ChatRequest {
        ChatRequest {
            language: Language::Eng,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            chat_history: vec![],
        }
    }

    async fn collect(stream: ChatStream) -> Vec<StreamFragment> {
        stream.collect::<Vec<_>>().await
    }

    fn text_of(fragments: &[StreamFragment]) -> String {
        fragments
            .iter()
            .filter_map(|f| match f {
                StreamFragment::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn happy_path_streams_all_fragments() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![MockOutcome::Stream(vec![
            "Chicken ".into(),
            "fried ".into(),
            "rice.".into(),
        ])]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["chicken", "rice"]))).await;
        assert_eq!(text_of(&fragments), "Chicken fried rice.");
        assert_eq!(fragments.last(), Some(&StreamFragment::End));
        assert!(!fragments.iter().any(|f| matches!(f, StreamFragment::Error(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn retries_twice_then_succeeds_within_budget() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::ExpireBeforeStream,
            MockOutcome::ExpireBeforeStream,
            MockOutcome::Stream(vec!["recovered".into()]),
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["kimchi"]))).await;
        assert_eq!(text_of(&fragments), "recovered");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_emit_exactly_one_error_and_no_text() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::ExpireBeforeStream,
            MockOutcome::ExpireBeforeStream,
            MockOutcome::ExpireBeforeStream,
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["kimchi"]))).await;
        assert_eq!(provider.calls(), 3);
        assert!(text_of(&fragments).is_empty());
        let errors: Vec<_> = fragments
            .iter()
            .filter(|f| matches!(f, StreamFragment::Error(_)))
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn mid_stream_expiry_replays_from_start() {
        // The documented duplication semantics: partial output from the
        // failed attempt stays with the caller, followed by the full fresh
        // answer from the retry.
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::ExpireMidStream(vec!["stale partial ".into()]),
            MockOutcome::Stream(vec!["fresh full answer".into()]),
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["rice"]))).await;
        assert_eq!(text_of(&fragments), "stale partial fresh full answer");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn fatal_provider_error_is_not_retried() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::Fail("quota exceeded".into()),
            MockOutcome::Stream(vec!["never reached".into()]),
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["rice"]))).await;
        assert_eq!(provider.calls(), 1);
        assert!(matches!(
            fragments.as_slice(),
            [StreamFragment::Error(message)] if message.contains("quota exceeded")
        ));
    }

    #[tokio::test]
    async fn follow_up_turn_never_invokes_retrieval() {
        let provider = Arc::new(MockProvider::new());
        let retriever = Arc::new(MockRetriever::with_documents(vec!["doc"]));
        let engine = ChatEngine::new(
            factory_for(&provider),
            Some(retriever.clone() as Arc<dyn DocumentRetriever>),
            fast_tuning(),
        );

        let request = ChatRequest {
            language: Language::Eng,
            ingredients: vec!["Can I substitute tofu?".into()],
            chat_history: vec![
                ConversationTurn::user("chicken, rice"),
                ConversationTurn::assistant("<recipe>...</recipe>"),
            ],
        };
        let _ = collect(engine.stream_chat(request)).await;

        assert_eq!(retriever.calls(), 0);
        let prompts = provider.recorded_prompts();
        let last_turn = prompts[0].messages.last().unwrap().clone();
        assert_eq!(last_turn.role, Role::User);
        assert_eq!(last_turn.content, "Can I substitute tofu?");
    }

    #[tokio::test]
    async fn first_turn_with_ingredients_grounds_the_prompt() {
        let provider = Arc::new(MockProvider::new());
        let retriever = Arc::new(MockRetriever::with_documents(vec![
            "Kimchi jjigae uses aged kimchi.",
        ]));
        let engine = ChatEngine::new(
            factory_for(&provider),
            Some(retriever.clone() as Arc<dyn DocumentRetriever>),
            fast_tuning(),
        );

        let _ = collect(engine.stream_chat(first_turn_request(&["kimchi"]))).await;

        assert_eq!(retriever.calls(), 1);
        let prompts = provider.recorded_prompts();
        let user_text = &prompts[0].messages[0].content;
        assert!(user_text.contains("<context>"));
        assert!(user_text.contains("Kimchi jjigae uses aged kimchi."));
        assert!(user_text.contains("K-Food recipe using these ingredients: [kimchi]"));
    }

    #[tokio::test]
    async fn first_turn_without_ingredients_skips_retrieval() {
        let provider = Arc::new(MockProvider::new());
        let retriever = Arc::new(MockRetriever::with_documents(vec!["doc"]));
        let engine = ChatEngine::new(
            factory_for(&provider),
            Some(retriever.clone() as Arc<dyn DocumentRetriever>),
            fast_tuning(),
        );

        let _ = collect(engine.stream_chat(first_turn_request(&[]))).await;
        assert_eq!(retriever.calls(), 0);
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_to_sentinel_context() {
        let provider = Arc::new(MockProvider::new());
        let retriever = Arc::new(MockRetriever::failing());
        let engine = ChatEngine::new(
            factory_for(&provider),
            Some(retriever.clone() as Arc<dyn DocumentRetriever>),
            fast_tuning(),
        );

        let fragments = collect(engine.stream_chat(first_turn_request(&["kimchi"]))).await;
        // No error surfaced to the caller.
        assert!(!fragments.iter().any(|f| matches!(f, StreamFragment::Error(_))));

        let prompts = provider.recorded_prompts();
        assert!(prompts[0].messages[0]
            .content
            .contains("Knowledge Base retrieval failed."));
    }

    #[tokio::test]
    async fn retries_rebuild_an_identical_payload() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::ExpireBeforeStream,
            MockOutcome::Stream(vec!["ok".into()]),
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let _ = collect(engine.stream_chat(first_turn_request(&["rice"]))).await;
        let prompts = provider.recorded_prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn wall_clock_timeout_yields_inline_error() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![MockOutcome::Hang]));
        let tuning = ChatTuning {
            request_timeout: Duration::from_millis(50),
            ..fast_tuning()
        };
        let engine = ChatEngine::new(factory_for(&provider), None, tuning);

        let fragments = collect(engine.stream_chat(first_turn_request(&["rice"]))).await;
        assert!(matches!(
            fragments.as_slice(),
            [StreamFragment::Error(message)] if message.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn provider_construction_failure_is_terminal_without_network() {
        let factory: ProviderFactory = Arc::new(|| {
            Err(SuraError::Config("session token not found".into()))
        });
        let engine = ChatEngine::new(factory, None, fast_tuning());

        let fragments = collect(engine.stream_chat(first_turn_request(&["rice"]))).await;
        assert!(matches!(
            fragments.as_slice(),
            [StreamFragment::Error(message)] if message.contains("session token")
        ));
    }

    #[tokio::test]
    async fn complete_chat_returns_recipe_with_preview() {
        let recipe = "<recipe><ingredients>\n- Rice (1 bowl)\n</ingredients>\
                      <section><title>2. Cooking Method (Total estimated time: 10 minutes)</title></section></recipe>";
        let provider = Arc::new(MockProvider::with_outcomes(vec![MockOutcome::Stream(vec![
            recipe.into(),
        ])]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let response = engine.complete_chat(first_turn_request(&["rice"])).await;
        assert_eq!(response.full_recipe, recipe);
        let preview = response.preview.unwrap();
        assert_eq!(preview.total_time, "Total estimated time: 10 minutes");
        assert_eq!(preview.ingredients, vec!["- Rice (1 bowl)"]);
    }

    #[tokio::test]
    async fn complete_chat_retries_and_then_reports_inline_error() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::ExpireBeforeStream,
            MockOutcome::ExpireBeforeStream,
            MockOutcome::ExpireBeforeStream,
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let response = engine.complete_chat(first_turn_request(&["rice"])).await;
        assert_eq!(provider.calls(), 3);
        assert!(response.full_recipe.starts_with("<error>"));
        assert!(response.full_recipe.ends_with("</error>"));
        assert!(response.preview.is_none());
    }

    #[tokio::test]
    async fn concurrent_conversations_are_independent() {
        let provider = Arc::new(MockProvider::with_outcomes(vec![
            MockOutcome::Stream(vec!["first".into()]),
            MockOutcome::Stream(vec!["second".into()]),
        ]));
        let engine = ChatEngine::new(factory_for(&provider), None, fast_tuning());

        let (a, b) = tokio::join!(
            collect(engine.stream_chat(first_turn_request(&["a"]))),
            collect(engine.stream_chat(first_turn_request(&["b"]))),
        );
        let mut texts = vec![text_of(&a), text_of(&b)];
        texts.sort();
        assert_eq!(texts, vec!["first".to_string(), "second".to_string()]);
    }
}
