//! Scene CRUD operations.

use std::sync::Arc;

use worldgraph_domain::{Embedding, Object, PolarPosition, Scene, SceneId};

use crate::infrastructure::ports::{ClockPort, SceneRepo};

use super::ManagementError;

pub struct SceneCrud {
    scene: Arc<dyn SceneRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SceneCrud {
    pub fn new(scene: Arc<dyn SceneRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { scene, clock }
    }

    pub async fn get(&self, scene_id: SceneId) -> Result<Option<Scene>, ManagementError> {
        Ok(self.scene.get(scene_id).await?)
    }

    pub async fn create(
        &self,
        description: &str,
        polar_position: PolarPosition,
        embedding_vector: Option<Embedding>,
    ) -> Result<Scene, ManagementError> {
        let scene = Scene::new(description, polar_position, embedding_vector, self.clock.now())?;
        self.scene.save(&scene).await?;
        tracing::info!(scene_id = %scene.id, "Created scene");
        Ok(scene)
    }

    /// Objects `CONTAINS`-linked to the scene.
    pub async fn objects(&self, scene_id: SceneId) -> Result<Vec<Object>, ManagementError> {
        if self.scene.get(scene_id).await?.is_none() {
            return Err(ManagementError::not_found("Scene", scene_id));
        }
        Ok(self.scene.list_objects(scene_id).await?)
    }

    pub async fn update_position(
        &self,
        scene_id: SceneId,
        polar_position: PolarPosition,
    ) -> Result<Scene, ManagementError> {
        polar_position.validate()?;
        Ok(self.scene.update_position(scene_id, polar_position).await?)
    }
}
