// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base retriever over the Bedrock agent runtime.
//!
//! Performs one vector-search retrieve call per invocation. Callers own the
//! gating (first turn only) and the graceful-degradation contract; this type
//! only performs the lookup and reports failures as [`SuraError::Retrieval`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use sura_core::{DocumentRetriever, RetrievedDocument, SuraError};
use tracing::debug;

/// Retrieve call body: query text plus vector-search result count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveBody<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Debug, Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: usize,
}

/// Retrieve response. Parsed defensively: any result missing a usable text
/// field becomes an empty document (dropped later by the formatter) rather
/// than a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrieveResult>,
}

#[derive(Debug, Default, Deserialize)]
struct RetrieveResult {
    #[serde(default)]
    content: RetrieveContent,
}

#[derive(Debug, Default, Deserialize)]
struct RetrieveContent {
    #[serde(default)]
    text: String,
}

/// Retriever for one configured knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseRetriever {
    client: reqwest::Client,
    knowledge_base_id: String,
    top_k: usize,
    base_url: String,
}

impl KnowledgeBaseRetriever {
    /// Creates a retriever for the given knowledge base.
    pub fn new(
        region: &str,
        session_token: &str,
        knowledge_base_id: String,
        top_k: usize,
    ) -> Result<Self, SuraError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {session_token}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&bearer).map_err(|e| {
                SuraError::Config(format!("invalid session token header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SuraError::Retrieval {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            knowledge_base_id,
            top_k,
            base_url: format!("https://bedrock-agent-runtime.{region}.amazonaws.com"),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl DocumentRetriever for KnowledgeBaseRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, SuraError> {
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.base_url, self.knowledge_base_id
        );
        let body = RetrieveBody {
            retrieval_query: RetrievalQuery { text: query },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: self.top_k,
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuraError::Retrieval {
                message: format!("retrieve request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuraError::Retrieval {
                message: format!("knowledge base returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: RetrieveResponse =
            response.json().await.map_err(|e| SuraError::Retrieval {
                message: format!("failed to parse retrieve response: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(
            kb = self.knowledge_base_id.as_str(),
            count = parsed.retrieval_results.len(),
            "knowledge base retrieve complete"
        );

        Ok(parsed
            .retrieval_results
            .into_iter()
            .map(|result| RetrievedDocument {
                text: result.content.text,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_retriever(base_url: &str) -> KnowledgeBaseRetriever {
        KnowledgeBaseRetriever::new("us-east-1", "test-token", "KB12345".into(), 5)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    #[test]
    fn base_url_derives_from_region() {
        let retriever =
            KnowledgeBaseRetriever::new("ap-northeast-2", "tok", "KB1".into(), 5).unwrap();
        assert_eq!(
            retriever.base_url,
            "https://bedrock-agent-runtime.ap-northeast-2.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn retrieve_sends_query_and_result_count() {
        let server = MockServer::start().await;
        let response_body = serde_json::json!({
            "retrievalResults": [
                {"content": {"text": "Kimchi jjigae uses aged kimchi."}},
                {"content": {"text": "Bulgogi marinade: soy, sugar, pear."}}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/knowledgebases/KB12345/retrieve"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "retrievalQuery": {"text": "K-Food recipe using these ingredients: [kimchi]"},
                "retrievalConfiguration": {
                    "vectorSearchConfiguration": {"numberOfResults": 5}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let retriever = test_retriever(&server.uri());
        let docs = retriever
            .retrieve("K-Food recipe using these ingredients: [kimchi]")
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "Kimchi jjigae uses aged kimchi.");
    }

    #[tokio::test]
    async fn odd_shaped_results_become_empty_documents() {
        let server = MockServer::start().await;
        let response_body = serde_json::json!({
            "retrievalResults": [
                {"content": {"text": "usable"}},
                {"content": {}},
                {"score": 0.4}
            ]
        });

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let retriever = test_retriever(&server.uri());
        let docs = retriever.retrieve("query").await.unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].text, "usable");
        assert_eq!(docs[1].text, "");
        assert_eq!(docs[2].text, "");
    }

    #[tokio::test]
    async fn empty_index_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"retrievalResults": []})),
            )
            .mount(&server)
            .await;

        let retriever = test_retriever(&server.uri());
        let docs = retriever.retrieve("anything").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_a_retrieval_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"message":"internal failure"}"#),
            )
            .mount(&server)
            .await;

        let retriever = test_retriever(&server.uri());
        let err = retriever.retrieve("anything").await.unwrap_err();
        assert!(matches!(err, SuraError::Retrieval { .. }));
    }
}
