//! User CRUD operations.

use std::sync::Arc;

use worldgraph_domain::{Embedding, PolarPosition, Scene, User, UserId};

use crate::infrastructure::ports::{ClockPort, RelatedObject, UserRepo};

use super::ManagementError;

pub struct UserCrud {
    user: Arc<dyn UserRepo>,
    clock: Arc<dyn ClockPort>,
}

impl UserCrud {
    pub fn new(user: Arc<dyn UserRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { user, clock }
    }

    pub async fn get(&self, user_id: UserId) -> Result<Option<User>, ManagementError> {
        Ok(self.user.get(user_id).await?)
    }

    pub async fn create(
        &self,
        introduction: &str,
        polar_position: Option<PolarPosition>,
        embedding_vector: Option<Embedding>,
    ) -> Result<User, ManagementError> {
        let user = User::new(introduction, polar_position, embedding_vector, self.clock.now())?;
        self.user.save(&user).await?;
        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    pub async fn update_position(
        &self,
        user_id: UserId,
        polar_position: PolarPosition,
    ) -> Result<User, ManagementError> {
        polar_position.validate()?;
        Ok(self.user.update_position(user_id, polar_position).await?)
    }

    pub async fn update_introduction(
        &self,
        user_id: UserId,
        introduction: &str,
    ) -> Result<User, ManagementError> {
        Ok(self
            .user
            .update_introduction(user_id, introduction.trim())
            .await?)
    }

    /// Scene the user is located at; `Ok(None)` when the user has no location yet.
    pub async fn current_scene(&self, user_id: UserId) -> Result<Option<Scene>, ManagementError> {
        self.require(user_id).await?;
        Ok(self.user.current_scene(user_id).await?)
    }

    pub async fn related_objects(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RelatedObject>, ManagementError> {
        self.require(user_id).await?;
        Ok(self.user.related_objects(user_id).await?)
    }

    async fn require(&self, user_id: UserId) -> Result<User, ManagementError> {
        self.user
            .get(user_id)
            .await?
            .ok_or_else(|| ManagementError::not_found("User", user_id))
    }
}
