// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements [`CompletionProvider`] with a FIFO queue of
//! scripted attempt outcomes, enabling fast, CI-runnable tests of the retry
//! orchestration without external API calls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use sura_core::{CompletionProvider, FragmentStream, PromptPayload, StreamFragment, SuraError};

/// One scripted attempt outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Yield each text as a fragment, then end cleanly.
    Stream(Vec<String>),
    /// Yield each text as a fragment, then fail with credential expiry.
    ExpireMidStream(Vec<String>),
    /// Fail with credential expiry before any fragment is produced.
    ExpireBeforeStream,
    /// Fail fatally (non-retryable) before any fragment is produced.
    Fail(String),
    /// Never yield anything (for timeout tests).
    Hang,
}

/// A mock provider that pops one [`MockOutcome`] per attempt.
///
/// When the queue is empty, attempts succeed with a default "mock recipe"
/// response. Every attempt records the payload it was given and bumps the
/// call counter, so tests can assert both attempt counts and exact prompts.
pub struct MockProvider {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    prompts: Mutex<Vec<PromptPayload>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Creates a mock provider with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a mock provider pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of attempts made so far (stream and complete combined).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payloads received so far, one per attempt, in order.
    pub fn recorded_prompts(&self) -> Vec<PromptPayload> {
        self.prompts.lock().expect("prompt lock poisoned").clone()
    }

    fn next_outcome(&self, prompt: &PromptPayload) -> MockOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt lock poisoned")
            .push(prompt.clone());
        self.outcomes
            .lock()
            .expect("outcome lock poisoned")
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Stream(vec!["mock recipe".to_string()]))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn expired() -> SuraError {
    SuraError::CredentialExpired {
        message: "The security token included in the request is expired".into(),
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn stream(&self, prompt: &PromptPayload) -> Result<FragmentStream, SuraError> {
        match self.next_outcome(prompt) {
            MockOutcome::Stream(texts) => {
                let items: Vec<Result<StreamFragment, SuraError>> = texts
                    .into_iter()
                    .map(|t| Ok(StreamFragment::Text(t)))
                    .chain(std::iter::once(Ok(StreamFragment::End)))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            MockOutcome::ExpireMidStream(texts) => {
                let items: Vec<Result<StreamFragment, SuraError>> = texts
                    .into_iter()
                    .map(|t| Ok(StreamFragment::Text(t)))
                    .chain(std::iter::once(Err(expired())))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            MockOutcome::ExpireBeforeStream => Err(expired()),
            MockOutcome::Fail(message) => Err(SuraError::Provider {
                message,
                source: None,
            }),
            MockOutcome::Hang => {
                Ok(Box::pin(stream::pending::<Result<StreamFragment, SuraError>>()))
            }
        }
    }

    async fn complete(&self, prompt: &PromptPayload) -> Result<String, SuraError> {
        match self.next_outcome(prompt) {
            MockOutcome::Stream(texts) => Ok(texts.concat()),
            MockOutcome::ExpireMidStream(_) | MockOutcome::ExpireBeforeStream => Err(expired()),
            MockOutcome::Fail(message) => Err(SuraError::Provider {
                message,
                source: None,
            }),
            MockOutcome::Hang => std::future::pending().await,
        }
    }
}
