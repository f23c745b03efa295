//! HTTP routes.
//!
//! Request bodies use camelCase keys. Handlers only translate between JSON
//! and use-case calls.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use worldgraph_domain::{
    AccountId, Embedding, Object, ObjectId, PolarPosition, RelationTriple, Scene, SceneId, User,
    UserId,
};

use super::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::app::App;
use crate::infrastructure::ports::{
    EntryLink, GraphNode, GraphSnapshot, ObjectRelationship, RelatedObject,
};
use crate::use_cases::action::ActionResult;
use crate::use_cases::management::{AccountSession, NewObject};
use crate::use_cases::movement::{MovementOutcome, Relocation, Similar};

const DEFAULT_SIMILAR_LIMIT: usize = 10;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Scenes
        .route("/api/scenes", post(create_scene))
        .route("/api/scenes/similar", post(similar_scenes))
        .route("/api/scenes/{id}", get(get_scene))
        .route("/api/scenes/{id}/objects", get(scene_objects))
        .route("/api/scenes/{id}/position", put(update_scene_position))
        // Objects
        .route("/api/objects", post(create_object))
        .route("/api/objects/relationships", post(create_object_relationship))
        .route("/api/objects/{id}", get(get_object))
        .route("/api/objects/{id}/relationships", get(object_relationships))
        // Users
        .route("/api/users", post(create_user))
        .route("/api/users/similar", post(similar_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/introduction", put(update_introduction))
        .route("/api/users/{id}/position", put(update_user_position))
        .route("/api/users/{id}/position-with-scene", put(relocate_user))
        .route("/api/users/{id}/current-scene", get(current_scene))
        .route("/api/{node_type}/{id}/position", put(update_position))
        // Entries
        .route("/api/entries", post(create_entry))
        .route("/api/entries/{node_id}/{node_type}", get(entries))
        // Accounts
        .route("/api/accounts", post(find_or_create_account))
        .route(
            "/api/accounts/{id}/users",
            get(account_users).post(add_account_user),
        )
        // Actions
        .route("/api/actions/movement", post(movement))
        .route("/api/actions/self-action", post(self_action))
        .route("/api/actions/action", post(interaction))
        .route("/api/actions/extract", post(extract_relations))
        .route("/api/actions/objects/{user_id}", get(related_objects))
        .route("/api/motives/extract", post(extract_motives))
        // Graph
        .route("/api/graph", get(graph_snapshot))
}

async fn health() -> &'static str {
    "OK"
}

fn parse_vector(vector: Option<Vec<f32>>) -> Result<Option<Embedding>, ApiError> {
    vector.map(Embedding::new).transpose().map_err(ApiError::from)
}

// =============================================================================
// Scenes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSceneRequest {
    description: String,
    polar_position: PolarPosition,
    #[serde(default)]
    embedding_vector: Option<Vec<f32>>,
}

async fn create_scene(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<CreateSceneRequest>,
) -> Result<(StatusCode, Json<Scene>), ApiError> {
    let vector = parse_vector(body.embedding_vector)?;
    let scene = app
        .use_cases
        .management
        .scene
        .create(&body.description, body.polar_position, vector)
        .await?;
    Ok((StatusCode::CREATED, Json(scene)))
}

async fn get_scene(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Scene>, ApiError> {
    let scene = app
        .use_cases
        .management
        .scene
        .get(SceneId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Scene not found: {id}")))?;
    Ok(Json(scene))
}

async fn scene_objects(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Object>>, ApiError> {
    let objects = app
        .use_cases
        .management
        .scene
        .objects(SceneId::from_uuid(id))
        .await?;
    Ok(Json(objects))
}

#[derive(Debug, Deserialize)]
struct SimilarRequest {
    vector: Vec<f32>,
    #[serde(default = "default_similar_limit")]
    limit: usize,
}

fn default_similar_limit() -> usize {
    DEFAULT_SIMILAR_LIMIT
}

async fn similar_scenes(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<SimilarRequest>,
) -> Result<Json<Vec<Similar<Scene>>>, ApiError> {
    let vector = Embedding::new(body.vector)?;
    let hits = app
        .use_cases
        .movement
        .resolver
        .find_similar_scenes(&vector, body.limit)
        .await?;
    Ok(Json(hits))
}

// =============================================================================
// Objects
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateObjectRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    embedding_vector: Option<Vec<f32>>,
    #[serde(default)]
    refinable: bool,
    #[serde(default)]
    interactable: bool,
    #[serde(default)]
    scene_id: Option<Uuid>,
    #[serde(default)]
    is_entry: bool,
}

async fn create_object(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<CreateObjectRequest>,
) -> Result<(StatusCode, Json<Object>), ApiError> {
    let input = NewObject {
        name: body.name,
        description: body.description,
        embedding_vector: parse_vector(body.embedding_vector)?,
        refinable: body.refinable,
        interactable: body.interactable,
        scene_id: body.scene_id.map(SceneId::from_uuid),
        is_entry: body.is_entry,
    };
    let object = app.use_cases.management.object.create(input).await?;
    Ok((StatusCode::CREATED, Json(object)))
}

async fn get_object(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Object>, ApiError> {
    let object = app
        .use_cases
        .management
        .object
        .get(ObjectId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Object not found: {id}")))?;
    Ok(Json(object))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRelationshipRequest {
    from_id: Uuid,
    to_id: Uuid,
    relation_type: String,
}

async fn create_object_relationship(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<CreateRelationshipRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let relation = app
        .use_cases
        .management
        .object
        .create_relationship(
            ObjectId::from_uuid(body.from_id),
            ObjectId::from_uuid(body.to_id),
            &body.relation_type,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "fromId": body.from_id,
            "toId": body.to_id,
            "relationType": relation.as_str(),
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipQuery {
    relation_type: Option<String>,
}

async fn object_relationships(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<RelationshipQuery>,
) -> Result<Json<Vec<ObjectRelationship>>, ApiError> {
    let relationships = app
        .use_cases
        .management
        .object
        .relationships(ObjectId::from_uuid(id), query.relation_type.as_deref())
        .await?;
    Ok(Json(relationships))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    #[serde(default)]
    introduction: String,
    #[serde(default)]
    polar_position: Option<PolarPosition>,
    #[serde(default)]
    embedding_vector: Option<Vec<f32>>,
}

async fn create_user(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let vector = parse_vector(body.embedding_vector)?;
    let user = app
        .use_cases
        .management
        .user
        .create(&body.introduction, body.polar_position, vector)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = app
        .use_cases
        .management
        .user
        .get(UserId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {id}")))?;
    Ok(Json(user))
}

async fn similar_users(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<SimilarRequest>,
) -> Result<Json<Vec<Similar<User>>>, ApiError> {
    let vector = Embedding::new(body.vector)?;
    let hits = app
        .use_cases
        .movement
        .resolver
        .find_similar_users(&vector, body.limit)
        .await?;
    Ok(Json(hits))
}

#[derive(Debug, Deserialize)]
struct IntroductionRequest {
    introduction: String,
}

async fn update_introduction(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<IntroductionRequest>,
) -> Result<Json<User>, ApiError> {
    let user = app
        .use_cases
        .management
        .user
        .update_introduction(UserId::from_uuid(id), &body.introduction)
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelocateRequest {
    polar_position: PolarPosition,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

async fn relocate_user(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RelocateRequest>,
) -> Result<Json<Relocation>, ApiError> {
    let vector = parse_vector(body.vector)?;
    let relocation = app
        .use_cases
        .movement
        .resolver
        .relocate(UserId::from_uuid(id), body.polar_position, vector)
        .await?;
    Ok(Json(relocation))
}

async fn current_scene(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Scene>, ApiError> {
    let scene = app
        .use_cases
        .management
        .user
        .current_scene(UserId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} is not located in any scene")))?;
    Ok(Json(scene))
}

// =============================================================================
// Positions
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionRequest {
    polar_position: PolarPosition,
}

async fn update_position(
    State(app): State<Arc<App>>,
    ApiPath((node_type, id)): ApiPath<(String, Uuid)>,
    ApiJson(body): ApiJson<PositionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let node = app
        .use_cases
        .management
        .graph
        .update_position(&node_type, id, body.polar_position)
        .await?;
    Ok(Json(serde_json::to_value(node).map_err(|e| ApiError::Internal(e.to_string()))?))
}

async fn update_scene_position(
    state: State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    body: ApiJson<PositionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    update_position(state, ApiPath(("Scene".to_string(), id)), body).await
}

async fn update_user_position(
    state: State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    body: ApiJson<PositionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    update_position(state, ApiPath(("User".to_string(), id)), body).await
}

// =============================================================================
// Entries
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEntryRequest {
    from_id: Uuid,
    to_id: Uuid,
    from_type: String,
    to_type: String,
}

async fn create_entry(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryLink>), ApiError> {
    let link = app
        .use_cases
        .management
        .graph
        .create_entry(body.from_id, body.to_id, &body.from_type, &body.to_type)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn entries(
    State(app): State<Arc<App>>,
    ApiPath((node_id, node_type)): ApiPath<(Uuid, String)>,
) -> Result<Json<Vec<GraphNode>>, ApiError> {
    let nodes = app
        .use_cases
        .management
        .graph
        .entries(node_id, &node_type)
        .await?;
    Ok(Json(nodes))
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRequest {
    external_auth_id: String,
    #[serde(default)]
    email: String,
    username: String,
}

async fn find_or_create_account(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<AccountRequest>,
) -> Result<(StatusCode, Json<AccountSession>), ApiError> {
    let session = app
        .use_cases
        .management
        .account
        .find_or_create(&body.external_auth_id, &body.email, &body.username)
        .await?;
    let status = if session.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(session)))
}

async fn add_account_user(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<IntroductionRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = app
        .use_cases
        .management
        .account
        .add_user(AccountId::from_uuid(id), &body.introduction)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn account_users(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app
        .use_cases
        .management
        .account
        .list_users(AccountId::from_uuid(id))
        .await?;
    Ok(Json(users))
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementRequest {
    user_id: Uuid,
    text: String,
}

async fn movement(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<MovementRequest>,
) -> Result<Json<MovementOutcome>, ApiError> {
    let outcome = app
        .use_cases
        .movement
        .world
        .navigate(UserId::from_uuid(body.user_id), &body.text)
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelfActionRequest {
    user_id: Uuid,
    action: String,
}

async fn self_action(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<SelfActionRequest>,
) -> Result<Json<ActionResult>, ApiError> {
    let result = app
        .use_cases
        .action
        .resolver
        .self_action(UserId::from_uuid(body.user_id), &body.action)
        .await?;
    Ok(Json(result))
}

/// Optional caller-supplied target of an interaction.
#[derive(Debug, Default, Deserialize)]
struct ActionTarget {
    #[serde(default)]
    target_relation: Option<RelationTriple>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionRequest {
    user_id: Uuid,
    text: String,
    #[serde(default)]
    action: Option<ActionTarget>,
}

async fn interaction(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<InteractionRequest>,
) -> Result<Json<ActionResult>, ApiError> {
    let target = body.action.and_then(|a| a.target_relation);
    let result = app
        .use_cases
        .action
        .resolver
        .interact(UserId::from_uuid(body.user_id), &body.text, target)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
}

async fn extract_relations(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<TextRequest>,
) -> Result<Json<Vec<RelationTriple>>, ApiError> {
    let relations = app
        .use_cases
        .action
        .resolver
        .extract_relations(&body.text)
        .await?;
    Ok(Json(relations))
}

async fn related_objects(
    State(app): State<Arc<App>>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<RelatedObject>>, ApiError> {
    let related = app
        .use_cases
        .action
        .resolver
        .related_objects(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(related))
}

async fn extract_motives(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<TextRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let motives = app
        .use_cases
        .action
        .resolver
        .extract_motives(&body.text)
        .await?;
    Ok(Json(motives))
}

// =============================================================================
// Graph
// =============================================================================

async fn graph_snapshot(State(app): State<Arc<App>>) -> Result<Json<GraphSnapshot>, ApiError> {
    Ok(Json(app.use_cases.management.graph.snapshot().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Collaborators, Repositories};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockAccountRepo, MockEmbeddingPort, MockGraphRepo, MockMotivePort, MockNavigationPort,
        MockObjectRepo, MockObjectScanPort, MockOutcomePort, MockRelationExtractionPort,
        MockSceneGenerationPort, MockSceneRepo, MockTraceRepo, MockUserRepo, NavigationReply,
        RepoError,
    };
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use mockall::predicate::*;
    use tower::ServiceExt;
    use worldgraph_domain::EMBEDDING_DIMENSIONS;

    #[derive(Default)]
    struct Ports {
        scene: MockSceneRepo,
        object: MockObjectRepo,
        user: MockUserRepo,
        account: MockAccountRepo,
        trace: MockTraceRepo,
        graph: MockGraphRepo,
        navigation: MockNavigationPort,
        extraction: MockRelationExtractionPort,
    }

    impl Ports {
        fn router(self) -> Router {
            let repos = Repositories {
                scene: Arc::new(self.scene),
                object: Arc::new(self.object),
                user: Arc::new(self.user),
                account: Arc::new(self.account),
                trace: Arc::new(self.trace),
                graph: Arc::new(self.graph),
            };
            let collaborators = Collaborators {
                embedding: Arc::new(MockEmbeddingPort::new()),
                scan: Arc::new(MockObjectScanPort::new()),
                extraction: Arc::new(self.extraction),
                generation: Arc::new(MockSceneGenerationPort::new()),
                navigation: Arc::new(self.navigation),
                outcome: Arc::new(MockOutcomePort::new()),
                motives: Arc::new(MockMotivePort::new()),
            };
            let app = App::from_parts(repos, collaborators, Arc::new(FixedClock(Utc::now())));
            routes().with_state(Arc::new(app))
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = Ports::default()
            .router()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_scene_returns_the_public_shape() {
        let mut ports = Ports::default();
        ports.scene.expect_save().times(1).returning(|_| Ok(()));

        let response = ports
            .router()
            .oneshot(json_request(
                "POST",
                "/api/scenes",
                serde_json::json!({
                    "description": "a lighthouse",
                    "polarPosition": {"radius": 3.0, "angle": 1.0}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["description"], "a lighthouse");
        assert_eq!(body["polarPosition"]["radius"], 3.0);
    }

    #[tokio::test]
    async fn wrong_vector_dimension_is_a_validation_error() {
        let mut ports = Ports::default();
        ports.scene.expect_save().never();

        let response = ports
            .router()
            .oneshot(json_request(
                "POST",
                "/api/scenes",
                serde_json::json!({
                    "description": "a lighthouse",
                    "polarPosition": {"radius": 3.0, "angle": 1.0},
                    "embeddingVector": [0.1, 0.2]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "ValidationError");
    }

    #[tokio::test]
    async fn missing_field_is_a_validation_error() {
        let response = Ports::default()
            .router()
            .oneshot(json_request(
                "POST",
                "/api/actions/movement",
                serde_json::json!({ "text": "go north" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let mut ports = Ports::default();
        ports.user.expect_get().never();

        let response = ports
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/users/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "ValidationError");
        assert!(body["detail"].as_str().unwrap().contains("not-a-uuid"));
    }

    #[tokio::test]
    async fn missing_scene_is_404() {
        let mut ports = Ports::default();
        ports.scene.expect_get().returning(|_| Ok(None));

        let response = ports
            .router()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/scenes/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "NotFoundError");
    }

    #[tokio::test]
    async fn relocation_consistency_violation_is_409() {
        let user = User::new("a sailor", None, None, Utc::now()).unwrap();
        let user_id = user.id;
        let scene = Scene::new("dock", PolarPosition::origin(), None, Utc::now()).unwrap();

        let mut ports = Ports::default();
        ports
            .user
            .expect_get()
            .returning(move |_| Ok(Some(user.clone())));
        ports
            .scene
            .expect_list()
            .returning(move || Ok(vec![scene.clone()]));
        ports
            .user
            .expect_relocate()
            .returning(|_, _| Err(RepoError::consistency("2 LOCATED_AT edges")));

        let response = ports
            .router()
            .oneshot(json_request(
                "PUT",
                &format!("/api/users/{user_id}/position-with-scene"),
                serde_json::json!({ "polarPosition": {"radius": 0.0, "angle": 0.0} }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_relationship_type_never_reaches_the_store() {
        let mut ports = Ports::default();
        ports.object.expect_create_relationship().never();

        let response = ports
            .router()
            .oneshot(json_request(
                "POST",
                "/api/objects/relationships",
                serde_json::json!({
                    "fromId": Uuid::new_v4(),
                    "toId": Uuid::new_v4(),
                    "relationType": "OWNS]->() DETACH DELETE (x"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn movement_that_stays_reports_the_message() {
        let user = User::new("a sailor", None, None, Utc::now()).unwrap();
        let user_id = user.id;

        let mut ports = Ports::default();
        ports
            .user
            .expect_get()
            .returning(move |_| Ok(Some(user.clone())));
        ports
            .navigation
            .expect_navigate()
            .with(eq(user_id), eq("look around"))
            .returning(|_, _| {
                Ok(NavigationReply {
                    success: true,
                    message: "you stay where you are".into(),
                    ..Default::default()
                })
            });

        let response = ports
            .router()
            .oneshot(json_request(
                "POST",
                "/api/actions/movement",
                serde_json::json!({ "userId": user_id, "text": "look around" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "stayed");
        assert_eq!(body["message"], "you stay where you are");
    }

    #[tokio::test]
    async fn extraction_outage_is_502() {
        let mut ports = Ports::default();
        ports.extraction.expect_extract().returning(|_| {
            Err(crate::infrastructure::ports::CollaboratorError::Unreachable {
                service: "relation_extraction",
                message: "connection refused".into(),
            })
        });

        let response = ports
            .router()
            .oneshot(json_request(
                "POST",
                "/api/actions/extract",
                serde_json::json!({ "text": "the cat sits on the mat" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"], "CollaboratorError");
    }

    #[tokio::test]
    async fn similar_scenes_reject_short_vectors_and_accept_full_ones() {
        let mut ports = Ports::default();
        ports.scene.expect_list().times(1).returning(|| Ok(vec![]));
        let router = ports.router();

        let short = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/scenes/similar",
                serde_json::json!({ "vector": [1.0], "limit": 3 }),
            ))
            .await
            .unwrap();
        assert_eq!(short.status(), StatusCode::BAD_REQUEST);

        let full = router
            .oneshot(json_request(
                "POST",
                "/api/scenes/similar",
                serde_json::json!({ "vector": vec![0.5; EMBEDDING_DIMENSIONS], "limit": 3 }),
            ))
            .await
            .unwrap();
        assert_eq!(full.status(), StatusCode::OK);
        assert_eq!(body_json(full).await, serde_json::json!([]));
    }
}
