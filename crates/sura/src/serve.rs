// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sura serve` command implementation.
//!
//! Wires configuration into the trending store, the knowledge-base
//! retriever, the Bedrock provider factory, the chat engine, and the
//! gateway, then serves until the process exits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sura_bedrock::BedrockProvider;
use sura_chat::{ChatEngine, ChatTuning, ProviderFactory};
use sura_config::SuraConfig;
use sura_config::model::BedrockConfig;
use sura_core::{CompletionProvider, DocumentRetriever, SuraError};
use sura_gateway::{GatewayState, ServerConfig};
use sura_retrieval::KnowledgeBaseRetriever;
use sura_storage::Database;
use tracing::{info, warn};

/// Runs the `sura serve` command.
pub async fn run_serve(config: SuraConfig) -> Result<(), SuraError> {
    init_tracing(&config.chat.log_level);

    info!("starting sura serve");

    // Open the trending store (runs migrations).
    let db = Database::open(&config.storage.database_path).await?;

    // Knowledge-base retriever: absence of an id disables retrieval, not an
    // error. A missing session token also disables it -- every retrieve
    // would fail and degrade to the sentinel anyway.
    let retriever: Option<Arc<dyn DocumentRetriever>> =
        match (&config.retrieval.knowledge_base_id, session_token(&config.bedrock)) {
            (Some(kb_id), Some(token)) => {
                let retriever = KnowledgeBaseRetriever::new(
                    &config.bedrock.region,
                    &token,
                    kb_id.clone(),
                    config.retrieval.top_k,
                )?;
                info!(kb = kb_id.as_str(), top_k = config.retrieval.top_k, "knowledge base retrieval enabled");
                Some(Arc::new(retriever) as Arc<dyn DocumentRetriever>)
            }
            (Some(_), None) => {
                warn!("knowledge base configured but no session token available, retrieval disabled");
                None
            }
            (None, _) => {
                info!("knowledge base not configured, retrieval disabled");
                None
            }
        };

    // The provider is rebuilt per attempt from immutable configuration, so a
    // lapsed credential never outlives the attempt that saw it.
    let bedrock_config = config.bedrock.clone();
    let provider_factory: ProviderFactory = Arc::new(move || {
        BedrockProvider::new(&bedrock_config)
            .map(|provider| Arc::new(provider) as Arc<dyn CompletionProvider>)
    });

    let tuning = ChatTuning {
        max_attempts: config.chat.max_attempts,
        retry_backoff: Duration::from_secs(config.chat.retry_backoff_secs),
        request_timeout: Duration::from_secs(config.chat.request_timeout_secs),
        max_concurrent: config.chat.max_concurrent_requests,
    };
    info!(
        max_attempts = tuning.max_attempts,
        backoff_secs = config.chat.retry_backoff_secs,
        timeout_secs = config.chat.request_timeout_secs,
        "chat engine configured"
    );
    let engine = ChatEngine::new(provider_factory, retriever, tuning);

    let state = GatewayState {
        engine,
        db,
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    sura_gateway::start_server(&server_config, state).await?;

    info!("sura serve shutdown complete");
    Ok(())
}

/// Resolves the shared session token: config value, then environment.
fn session_token(config: &BedrockConfig) -> Option<String> {
    config
        .session_token
        .clone()
        .filter(|token| !token.is_empty())
        .or_else(|| std::env::var("AWS_SESSION_TOKEN").ok())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sura={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
