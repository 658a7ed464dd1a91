//! Answer service client (`POST /api/chat`).
//!
//! The controller talks to the answer service through the [`AnswerService`]
//! trait; [`HttpAnswerClient`] is the production implementation against the
//! support desk backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::core::session::{ActionLink, Citation};
use crate::services::shared::{
    ServiceResult, build_http_client, classify_reqwest_error, decode_json,
};

/// Boundary contract for submitting a question and receiving an answer.
pub trait AnswerService: Send + Sync {
    fn submit_question(
        &self,
        question: &str,
        agent_id: Option<&str>,
    ) -> impl Future<Output = ServiceResult<AnswerResponse>> + Send;
}

/// Request body for the chat endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<&'a str>,
}

/// Context ticket retrieved by the backend to ground its answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrievedContext {
    pub ticket_id: String,
    #[serde(default)]
    pub original_query: String,
    #[serde(default)]
    pub resolution: String,
    pub similarity_score: f32,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<RetrievedContext> for Citation {
    fn from(context: RetrievedContext) -> Self {
        Citation {
            ticket_id: context.ticket_id,
            similarity_score: context.similarity_score,
        }
    }
}

/// Follow-up action proposed by the backend alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionLinkPayload {
    pub label: String,
    pub tool_call: String,
    #[serde(default)]
    pub is_tool_action: bool,
}

impl From<ActionLinkPayload> for ActionLink {
    fn from(payload: ActionLinkPayload) -> Self {
        ActionLink {
            label: payload.label,
            tool_call: payload.tool_call,
            is_tool_action: payload.is_tool_action,
        }
    }
}

/// Response body of the chat endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default)]
    pub requires_human: bool,
    #[serde(default)]
    pub sources: Vec<RetrievedContext>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub action_links: Vec<ActionLinkPayload>,
}

/// HTTP client for the chat endpoint.
pub struct HttpAnswerClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAnswerClient {
    /// Creates a client from resolved connection settings.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be resolved.
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let base_url = crate::services::resolve_base_url(
            config.base_url.as_deref(),
            crate::config::BASE_URL_ENV_VAR,
        )?;
        Ok(Self {
            http: build_http_client(config.timeout()),
            base_url,
        })
    }
}

impl AnswerService for HttpAnswerClient {
    fn submit_question(
        &self,
        question: &str,
        agent_id: Option<&str>,
    ) -> impl Future<Output = ServiceResult<AnswerResponse>> + Send {
        let url = format!("{}/api/chat", self.base_url);
        let request = self.http.post(url).json(&ChatRequest { question, agent_id });
        async move {
            debug!(agent_id, "submitting question");
            let response = request
                .send()
                .await
                .map_err(|e| classify_reqwest_error(&e))?;
            decode_json(response).await
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::services::shared::ServiceErrorKind;

    fn client_for(server: &MockServer) -> HttpAnswerClient {
        HttpAnswerClient::new(&ServiceConfig {
            base_url: Some(server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_question_decodes_full_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(serde_json::json!({
                "question": "How do I reset my password?",
                "agent_id": "it-support",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "Use the portal",
                "requires_human": false,
                "sources": [
                    {"ticket_id": "T-1001", "original_query": "reset pw",
                     "resolution": "portal", "similarity_score": 0.91,
                     "category": "accounts"}
                ],
                "confidence": 0.9,
                "action_links": [
                    {"label": "Create a ticket", "tool_call": "createServiceNowTicket",
                     "is_tool_action": true}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .submit_question("How do I reset my password?", Some("it-support"))
            .await
            .unwrap();

        assert_eq!(response.answer, "Use the portal");
        assert!(!response.requires_human);
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].ticket_id, "T-1001");
        assert!((response.confidence - 0.9).abs() < f32::EPSILON);
        assert_eq!(response.action_links[0].tool_call, "createServiceNowTicket");
    }

    #[tokio::test]
    async fn test_submit_question_defaults_optional_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"answer": "Just this"})),
            )
            .mount(&server)
            .await;

        let response = client_for(&server)
            .submit_question("hi", None)
            .await
            .unwrap();
        assert_eq!(response.answer, "Just this");
        assert!(!response.requires_human);
        assert!(response.sources.is_empty());
        assert!(response.action_links.is_empty());
    }

    #[tokio::test]
    async fn test_error_body_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                serde_json::json!({"detail": "Agent 'billing' not found"}),
            ))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_question("hi", Some("billing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::ApiError);
        assert_eq!(err.backend_detail(), Some("Agent 'billing' not found"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_question("hi", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Parse);
    }
}
