//! Scene resolution for users.
//!
//! Picks the scene a user should stand in (exact position, then vector or
//! spatial ranking) and points their `LOCATED_AT` edge at it. The edge swap
//! itself happens in one store transaction; see `UserRepo::relocate`.

use std::sync::Arc;

use serde::Serialize;
use worldgraph_domain::{
    rank_by_similarity, select_scene, spatial_distance, Embedding, PolarPosition, Scene,
    SelectionMethod, SimilarityMetric, User, UserId,
};

use crate::infrastructure::ports::{ClockPort, LocationUpdate, RepoError, SceneRepo, UserRepo};

/// Outcome of a relocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relocation {
    pub scene: Scene,
    pub method: SelectionMethod,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A ranked top-k hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Similar<T> {
    #[serde(flatten)]
    pub item: T,
    pub similarity: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RelocationError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No scenes exist to relocate into")]
    NoScenes,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct SceneResolver {
    scene: Arc<dyn SceneRepo>,
    user: Arc<dyn UserRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SceneResolver {
    pub fn new(
        scene: Arc<dyn SceneRepo>,
        user: Arc<dyn UserRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { scene, user, clock }
    }

    /// Move a user to `position` and locate them in the best-matching scene.
    ///
    /// The position and vector are persisted on the user in the same
    /// transaction as the edge replacement.
    pub async fn relocate(
        &self,
        user_id: UserId,
        position: PolarPosition,
        vector: Option<Embedding>,
    ) -> Result<Relocation, RelocationError> {
        position
            .validate()
            .map_err(|e| RelocationError::InvalidInput(e.to_string()))?;
        self.require_user(user_id).await?;

        let scenes = self.scene.list().await?;
        let rank =
            select_scene(&scenes, &position, vector.as_ref()).ok_or(RelocationError::NoScenes)?;

        let update = LocationUpdate {
            scene_id: rank.scene.id,
            score: rank.score,
            vector: vector.clone(),
            position: Some(position),
            created_at: self.clock.now(),
        };
        self.user.relocate(user_id, &update).await?;

        tracing::info!(
            user_id = %user_id,
            scene_id = %rank.scene.id,
            method = ?rank.method,
            distance = rank.distance,
            "Relocated user by position"
        );

        Ok(Relocation {
            scene: rank.scene.clone(),
            method: rank.method,
            distance: rank.distance,
            score: rank.score,
        })
    }

    /// Locate a user in a scene chosen by the caller.
    pub async fn relocate_to(
        &self,
        user: &User,
        scene: Scene,
    ) -> Result<Relocation, RelocationError> {
        let update = LocationUpdate::to_scene(scene.id, self.clock.now());
        self.user.relocate(user.id, &update).await?;

        let distance = user
            .polar_position
            .map(|p| spatial_distance(&p, &scene.polar_position))
            .unwrap_or(0.0);
        tracing::info!(user_id = %user.id, scene_id = %scene.id, "Relocated user to scene");

        Ok(Relocation {
            scene,
            method: SelectionMethod::Direct,
            distance,
            score: None,
        })
    }

    /// Scenes most similar to `vector` by cosine similarity.
    pub async fn find_similar_scenes(
        &self,
        vector: &Embedding,
        limit: usize,
    ) -> Result<Vec<Similar<Scene>>, RelocationError> {
        let scenes = self.scene.list().await?;
        let hits = rank_by_similarity(
            &scenes,
            |s| s.embedding_vector.as_ref(),
            vector,
            SimilarityMetric::Cosine,
            limit,
        );
        Ok(hits
            .into_iter()
            .map(|hit| Similar {
                item: hit.item.clone(),
                similarity: hit.score,
            })
            .collect())
    }

    /// Users most similar to `vector` by raw dot product.
    pub async fn find_similar_users(
        &self,
        vector: &Embedding,
        limit: usize,
    ) -> Result<Vec<Similar<User>>, RelocationError> {
        let users = self.user.list().await?;
        let hits = rank_by_similarity(
            &users,
            |u| u.embedding_vector.as_ref(),
            vector,
            SimilarityMetric::Dot,
            limit,
        );
        Ok(hits
            .into_iter()
            .map(|hit| Similar {
                item: hit.item.clone(),
                similarity: hit.score,
            })
            .collect())
    }

    pub(crate) async fn require_user(&self, user_id: UserId) -> Result<User, RelocationError> {
        self.user
            .get(user_id)
            .await?
            .ok_or_else(|| RelocationError::NotFound {
                entity_type: "User",
                id: user_id.to_string(),
            })
    }
}
