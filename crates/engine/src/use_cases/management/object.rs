//! Object CRUD and object-to-object relationships.

use std::sync::Arc;

use worldgraph_domain::{Embedding, Object, ObjectId, ObjectRelationType, SceneId};

use crate::infrastructure::ports::{ClockPort, ObjectRelationship, ObjectRepo, PortalOrigin};

use super::ManagementError;

/// Input for [`ObjectCrud::create`].
#[derive(Debug, Clone, Default)]
pub struct NewObject {
    pub name: String,
    pub description: Option<String>,
    pub embedding_vector: Option<Embedding>,
    pub refinable: bool,
    pub interactable: bool,
    /// When set, the object is created `CONTAINS`-linked to this scene.
    pub scene_id: Option<SceneId>,
    /// Also mark the object as a portal into `scene_id`.
    pub is_entry: bool,
}

pub struct ObjectCrud {
    object: Arc<dyn ObjectRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ObjectCrud {
    pub fn new(object: Arc<dyn ObjectRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { object, clock }
    }

    pub async fn get(&self, object_id: ObjectId) -> Result<Option<Object>, ManagementError> {
        Ok(self.object.get(object_id).await?)
    }

    pub async fn create(&self, input: NewObject) -> Result<Object, ManagementError> {
        let object = Object::new(
            &input.name,
            input.description.as_deref(),
            input.embedding_vector,
            self.clock.now(),
        )?
        .with_flags(input.refinable, input.interactable);

        match input.scene_id {
            Some(scene_id) => {
                let portal = input.is_entry.then_some(PortalOrigin::Scanned);
                self.object.create_in_scene(scene_id, &object, portal).await?;
            }
            None if input.is_entry => {
                return Err(ManagementError::InvalidInput(
                    "isEntry requires a sceneId".to_string(),
                ));
            }
            None => self.object.save(&object).await?,
        }
        Ok(object)
    }

    /// Create a typed edge between two objects. `relation_type` must name an
    /// [`ObjectRelationType`].
    pub async fn create_relationship(
        &self,
        from: ObjectId,
        to: ObjectId,
        relation_type: &str,
    ) -> Result<ObjectRelationType, ManagementError> {
        let relation: ObjectRelationType = relation_type.parse()?;
        self.object.create_relationship(from, to, relation).await?;
        tracing::debug!(from = %from, to = %to, relation = %relation, "Created object relationship");
        Ok(relation)
    }

    pub async fn relationships(
        &self,
        object_id: ObjectId,
        relation_type: Option<&str>,
    ) -> Result<Vec<ObjectRelationship>, ManagementError> {
        let relation = relation_type
            .filter(|t| !t.trim().is_empty())
            .map(str::parse::<ObjectRelationType>)
            .transpose()?;
        Ok(self.object.relationships(object_id, relation).await?)
    }
}
