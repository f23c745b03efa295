//! Action resolution pipeline.
//!
//! `validate -> gather context -> resolve outcome -> record trace -> scan objects`
//!
//! Only a missing persona, a missing current scene, an outcome failure and a
//! failed trace write abort the pipeline. Context lookups and object
//! scanning degrade to empty lists. The outcome text is scanned before the
//! trace is written so the trace can carry the scanned object names; the
//! objects themselves are created after the trace.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use worldgraph_domain::{Object, RelationTriple, Scene, Trace, UserId};

use crate::infrastructure::ports::{
    ClockPort, CollaboratorError, EmbeddingPort, InteractionRequest, MotivePort, ObjectRepo,
    ObjectScanPort, OutcomePort, OutcomeReply, PortalOrigin, RelatedObject,
    RelationExtractionPort, RepoError, ScannedObject, SceneRepo, SelfActionRequest, TraceRepo,
    UserRepo,
};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The outcome collaborator could not resolve the action.
    #[error("Action resolution failed: {0}")]
    Resolution(#[source] CollaboratorError),
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ActionError {
    fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// Result of a resolved action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// Objects around the user, for self-actions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_objects: Vec<RelatedObject>,
    /// The relation acted upon, for interactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_relation: Option<RelationTriple>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_relations: Vec<RelationTriple>,
    pub roll_result: OutcomeReply,
    /// Absent when the outcome text was empty.
    pub trace: Option<Trace>,
    pub objects: Vec<Object>,
}

pub struct ActionCollaborators {
    pub outcome: Arc<dyn OutcomePort>,
    pub extraction: Arc<dyn RelationExtractionPort>,
    pub scan: Arc<dyn ObjectScanPort>,
    pub embedding: Arc<dyn EmbeddingPort>,
    pub motives: Arc<dyn MotivePort>,
}

struct ActionContext {
    user_id: UserId,
    persona: String,
    scene: Scene,
}

pub struct ActionResolver {
    collaborators: ActionCollaborators,
    scene: Arc<dyn SceneRepo>,
    object: Arc<dyn ObjectRepo>,
    user: Arc<dyn UserRepo>,
    trace: Arc<dyn TraceRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ActionResolver {
    pub fn new(
        collaborators: ActionCollaborators,
        scene: Arc<dyn SceneRepo>,
        object: Arc<dyn ObjectRepo>,
        user: Arc<dyn UserRepo>,
        trace: Arc<dyn TraceRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            collaborators,
            scene,
            object,
            user,
            trace,
            clock,
        }
    }

    /// Resolve an action the user performs on their own, in the context of
    /// the objects around them.
    pub async fn self_action(
        &self,
        user_id: UserId,
        action: &str,
    ) -> Result<ActionResult, ActionError> {
        let action = require_action(action)?;
        let context = self.gather_context(user_id).await?;

        let related_objects = match self.user.related_objects(user_id).await {
            Ok(related) => dedup_related(related),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Related objects unavailable");
                Vec::new()
            }
        };

        let request = SelfActionRequest {
            persona: context.persona.clone(),
            action: action.to_string(),
            related_objects: related_objects.clone(),
        };
        let reply = self
            .collaborators
            .outcome
            .resolve_self_action(request)
            .await
            .map_err(ActionError::Resolution)?;

        let (trace, objects) = self.record(&context, action, &reply).await?;
        Ok(ActionResult {
            related_objects,
            target_relation: None,
            env_relations: Vec::new(),
            roll_result: reply,
            trace,
            objects,
        })
    }

    /// Resolve an interaction with something in the scene.
    ///
    /// Relations extracted from `text` take precedence over `target`; with
    /// neither, an all-empty relation is sent.
    pub async fn interact(
        &self,
        user_id: UserId,
        text: &str,
        target: Option<RelationTriple>,
    ) -> Result<ActionResult, ActionError> {
        let text = require_action(text)?;
        let context = self.gather_context(user_id).await?;

        let extracted = match self.collaborators.extraction.extract(text).await {
            Ok(triples) => triples,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Relation extraction failed");
                Vec::new()
            }
        };
        let target_relation = extracted
            .into_iter()
            .next()
            .or(target)
            .unwrap_or_default();

        let env_relations = match self.scene.environment_relations(context.scene.id).await {
            Ok(relations) => relations,
            Err(e) => {
                tracing::warn!(scene_id = %context.scene.id, error = %e, "Scene relations unavailable");
                Vec::new()
            }
        };

        let request = InteractionRequest {
            persona: context.persona.clone(),
            target_relation: target_relation.clone(),
            env_relations: env_relations.clone(),
        };
        let reply = self
            .collaborators
            .outcome
            .resolve_interaction(request)
            .await
            .map_err(ActionError::Resolution)?;

        let (trace, objects) = self.record(&context, text, &reply).await?;
        Ok(ActionResult {
            related_objects: Vec::new(),
            target_relation: Some(target_relation),
            env_relations,
            roll_result: reply,
            trace,
            objects,
        })
    }

    /// The objects a self-action would be resolved against.
    pub async fn related_objects(&self, user_id: UserId) -> Result<Vec<RelatedObject>, ActionError> {
        self.user
            .get(user_id)
            .await?
            .ok_or_else(|| ActionError::not_found("User", user_id))?;
        Ok(dedup_related(self.user.related_objects(user_id).await?))
    }

    pub async fn extract_relations(&self, text: &str) -> Result<Vec<RelationTriple>, ActionError> {
        let text = require_text(text)?;
        Ok(self.collaborators.extraction.extract(text).await?)
    }

    pub async fn extract_motives(&self, text: &str) -> Result<serde_json::Value, ActionError> {
        let text = require_text(text)?;
        Ok(self.collaborators.motives.extract_motives(text).await?)
    }

    async fn gather_context(&self, user_id: UserId) -> Result<ActionContext, ActionError> {
        let user = self
            .user
            .get(user_id)
            .await?
            .ok_or_else(|| ActionError::not_found("User", user_id))?;
        let persona = user
            .persona()
            .ok_or_else(|| ActionError::not_found("Persona", user_id))?
            .to_string();
        let scene = self
            .user
            .current_scene(user_id)
            .await?
            .ok_or_else(|| ActionError::not_found("Scene", format!("current scene of {user_id}")))?;

        Ok(ActionContext {
            user_id,
            persona,
            scene,
        })
    }

    async fn record(
        &self,
        context: &ActionContext,
        action: &str,
        reply: &OutcomeReply,
    ) -> Result<(Option<Trace>, Vec<Object>), ActionError> {
        let outcome = reply.outcome.trim();
        if outcome.is_empty() {
            tracing::info!(user_id = %context.user_id, "Empty outcome, no trace recorded");
            return Ok((None, Vec::new()));
        }

        let scanned: Vec<ScannedObject> = match self.collaborators.scan.scan(outcome).await {
            Ok(scanned) => scanned
                .into_iter()
                .filter(|s| !s.object.trim().is_empty())
                .collect(),
            Err(e) => {
                tracing::warn!(
                    scene_id = %context.scene.id,
                    error = %e,
                    "Object scan of outcome failed, recording trace without objects"
                );
                Vec::new()
            }
        };

        let now = self.clock.now();
        let names = scanned.iter().map(|s| s.object.trim().to_string()).collect();
        let trace = Trace::new(outcome, action, names, now);
        self.trace.record(context.scene.id, &trace).await?;
        tracing::info!(
            user_id = %context.user_id,
            scene_id = %context.scene.id,
            trace_id = %trace.id,
            "Recorded action trace"
        );

        let mut objects = Vec::with_capacity(scanned.len());
        for entry in scanned {
            let vector = match self.collaborators.embedding.embed(&entry.object).await {
                Ok(vector) => Some(vector),
                Err(e) => {
                    tracing::warn!(object = %entry.object, error = %e, "Embedding failed, storing object without vector");
                    None
                }
            };
            let object = match Object::new(&entry.object, None, vector, now) {
                Ok(object) => object.with_flags(entry.refinable, entry.interactable),
                Err(e) => {
                    tracing::warn!(object = %entry.object, error = %e, "Skipping invalid scanned object");
                    continue;
                }
            };
            match self
                .object
                .create_in_scene(context.scene.id, &object, Some(PortalOrigin::Action))
                .await
            {
                Ok(()) => objects.push(object),
                Err(e) => {
                    tracing::warn!(object = %object.name, error = %e, "Failed to create outcome object");
                }
            }
        }

        Ok((Some(trace), objects))
    }
}

fn require_action(action: &str) -> Result<&str, ActionError> {
    let action = action.trim();
    if action.is_empty() {
        return Err(ActionError::InvalidInput(
            "action text cannot be empty".to_string(),
        ));
    }
    Ok(action)
}

fn require_text(text: &str) -> Result<&str, ActionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ActionError::InvalidInput("text cannot be empty".to_string()));
    }
    Ok(text)
}

fn dedup_related(related: Vec<RelatedObject>) -> Vec<RelatedObject> {
    let mut seen = HashSet::new();
    related
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
