//! HTTP client for the narrative-intelligence service.
//!
//! One service hosts every collaborator (embeddings, object scanning,
//! relation extraction, scene generation, navigation, outcomes, motives);
//! this client implements each port against its endpoint. Failures are
//! surfaced immediately, there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use worldgraph_domain::{Embedding, RelationTriple, UserId};

use crate::infrastructure::ports::{
    CollaboratorError, EmbeddingPort, InteractionRequest, MotivePort, NavigationPort,
    NavigationReply, ObjectScanPort, OutcomePort, OutcomeReply, RelationExtractionPort,
    SceneGenerationPort, ScannedObject, SelfActionRequest,
};

/// Default narrative service base URL.
pub const DEFAULT_NARRATIVE_SERVICE_URL: &str = "http://localhost:8000";

/// Default request timeout; scene generation and outcomes run a model.
pub const DEFAULT_NARRATIVE_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct NarrativeServiceClient {
    client: Client,
    base_url: String,
}

impl NarrativeServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, R>(
        &self,
        service: &'static str,
        path: &str,
        body: &B,
    ) -> Result<R, CollaboratorError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(service, %url, "Calling narrative service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Unreachable {
                service,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            tracing::debug!(service, status = status.as_u16(), %detail, "Narrative service error");
            return Err(CollaboratorError::Status {
                service,
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse {
                service,
                message: e.to_string(),
            })
    }

    async fn first_vector<B>(
        &self,
        service: &'static str,
        path: &str,
        body: &B,
    ) -> Result<Embedding, CollaboratorError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let vectors: Vec<VectorEntry> = self.post(service, path, body).await?;
        let entry = vectors
            .into_iter()
            .next()
            .ok_or_else(|| CollaboratorError::InvalidResponse {
                service,
                message: "empty vector list".to_string(),
            })?;
        Embedding::from_f64(entry.vector).map_err(|e| CollaboratorError::InvalidResponse {
            service,
            message: e.to_string(),
        })
    }
}

impl Default for NarrativeServiceClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_NARRATIVE_SERVICE_URL,
            Duration::from_secs(DEFAULT_NARRATIVE_TIMEOUT_SECS),
        )
    }
}

/// Upstream `detail` or `message` field of an error body, else the raw body.
fn error_detail(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|json| {
        ["detail", "message"].iter().find_map(|key| match json.get(*key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
    });
    field.unwrap_or_else(|| body.trim().to_string())
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct DescriptionsRequest<'a> {
    descriptions: [&'a str; 1],
}

#[derive(Deserialize)]
struct VectorEntry {
    vector: Vec<f64>,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerateSceneRequest<'a> {
    entry_term: &'a str,
    external_objects: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateSceneResponse {
    scene: String,
}

#[derive(Serialize)]
struct MovementRequest<'a> {
    user_id: String,
    command: &'a str,
}

// =============================================================================
// Port Implementations
// =============================================================================

#[async_trait]
impl EmbeddingPort for NarrativeServiceClient {
    async fn embed(&self, text: &str) -> Result<Embedding, CollaboratorError> {
        let body = DescriptionsRequest { descriptions: [text] };
        self.first_vector("embedding", "/vectorize/descriptions", &body)
            .await
    }
}

#[async_trait]
impl ObjectScanPort for NarrativeServiceClient {
    async fn scan(&self, text: &str) -> Result<Vec<ScannedObject>, CollaboratorError> {
        self.post("object_scan", "/scan_objects", &TextRequest { text })
            .await
    }
}

#[async_trait]
impl RelationExtractionPort for NarrativeServiceClient {
    async fn extract(&self, text: &str) -> Result<Vec<RelationTriple>, CollaboratorError> {
        self.post("relation_extraction", "/relationship", &TextRequest { text })
            .await
    }
}

#[async_trait]
impl SceneGenerationPort for NarrativeServiceClient {
    async fn generate(
        &self,
        entry_term: &str,
        external_objects: Vec<String>,
    ) -> Result<String, CollaboratorError> {
        let body = GenerateSceneRequest {
            entry_term,
            external_objects,
        };
        let reply: GenerateSceneResponse = self
            .post("scene_generation", "/generate/inner_scene", &body)
            .await?;
        Ok(reply.scene)
    }
}

#[async_trait]
impl NavigationPort for NarrativeServiceClient {
    async fn navigate(
        &self,
        user_id: UserId,
        command: &str,
    ) -> Result<NavigationReply, CollaboratorError> {
        let body = MovementRequest {
            user_id: user_id.to_string(),
            command,
        };
        self.post("navigation", "/movement", &body).await
    }
}

#[async_trait]
impl OutcomePort for NarrativeServiceClient {
    async fn resolve_self_action(
        &self,
        request: SelfActionRequest,
    ) -> Result<OutcomeReply, CollaboratorError> {
        self.post("outcome", "/roll_user_action", &request).await
    }

    async fn resolve_interaction(
        &self,
        request: InteractionRequest,
    ) -> Result<OutcomeReply, CollaboratorError> {
        self.post("outcome", "/roll_dice", &request).await
    }
}

#[async_trait]
impl MotivePort for NarrativeServiceClient {
    async fn extract_motives(&self, text: &str) -> Result<serde_json::Value, CollaboratorError> {
        self.post("motive", "/extract_motives", &TextRequest { text })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use worldgraph_domain::EMBEDDING_DIMENSIONS;

    async fn serve(router: Router) -> NarrativeServiceClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        NarrativeServiceClient::new(&format!("http://{addr}/"), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn embed_posts_single_description_and_validates_dimensions() {
        let router = Router::new().route(
            "/vectorize/descriptions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"descriptions": ["the library"]}));
                Json(json!([{"vector": vec![0.5; EMBEDDING_DIMENSIONS]}]))
            }),
        );
        let client = serve(router).await;

        let vector = client.embed("the library").await.unwrap();
        assert_eq!(vector.as_slice().len(), EMBEDDING_DIMENSIONS);
    }

    #[tokio::test]
    async fn short_vector_is_an_invalid_response() {
        let router = Router::new().route(
            "/vectorize/descriptions",
            post(|| async { Json(json!([{"vector": [0.1, 0.2, 0.3]}])) }),
        );
        let client = serve(router).await;

        let err = client.embed("a lantern").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::InvalidResponse { service: "embedding", .. }));
    }

    #[tokio::test]
    async fn error_status_carries_upstream_detail() {
        let router = Router::new().route(
            "/generate/inner_scene",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"detail": "model is loading"})),
                )
            }),
        );
        let client = serve(router).await;

        let err = client.generate("the library", vec![]).await.unwrap_err();
        match err {
            CollaboratorError::Status {
                service,
                status,
                detail,
            } => {
                assert_eq!(service, "scene_generation");
                assert_eq!(status, 503);
                assert_eq!(detail, "model is loading");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn navigation_sends_user_id_and_command() {
        let user_id = UserId::new();
        let expected = user_id.to_string();
        let router = Router::new().route(
            "/movement",
            post(move |Json(body): Json<Value>| async move {
                assert_eq!(body["user_id"], expected);
                assert_eq!(body["command"], "go to the library");
                Json(json!({
                    "success": false,
                    "message": "destination not found: the library"
                }))
            }),
        );
        let client = serve(router).await;

        let reply = client.navigate(user_id, "go to the library").await.unwrap();
        assert!(!reply.success);
        assert_eq!(reply.failure_text(), "destination not found: the library");
    }

    #[tokio::test]
    async fn self_action_uses_roll_user_action_payload() {
        let router = Router::new().route(
            "/roll_user_action",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(
                    body,
                    json!({
                        "persona": "a cautious merchant",
                        "action": "search the stall",
                        "related_objects": []
                    })
                );
                Json(json!({"outcome": "the merchant finds nothing", "roll": 3}))
            }),
        );
        let client = serve(router).await;

        let reply = client
            .resolve_self_action(SelfActionRequest {
                persona: "a cautious merchant".into(),
                action: "search the stall".into(),
                related_objects: vec![],
            })
            .await
            .unwrap();
        assert_eq!(reply.outcome, "the merchant finds nothing");
        assert_eq!(reply.metadata["roll"], 3);
    }

    #[tokio::test]
    async fn unreachable_service_is_reported_as_such() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client =
            NarrativeServiceClient::new(&format!("http://{addr}"), Duration::from_secs(2));

        let err = client.scan("a dusty room").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Unreachable { service: "object_scan", .. }));
    }

    #[test]
    fn error_detail_falls_back_to_message_then_body() {
        assert_eq!(error_detail(r#"{"message": "bad command"}"#), "bad command");
        assert_eq!(error_detail(r#"{"detail": [{"loc": "text"}]}"#), r#"[{"loc":"text"}]"#);
        assert_eq!(error_detail("upstream exploded\n"), "upstream exploded");
    }
}
