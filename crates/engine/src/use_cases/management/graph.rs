//! Operations addressed by node label: portals, positions, export.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use worldgraph_domain::{NodeLabel, PolarPosition, Scene, SceneId, User, UserId};

use crate::infrastructure::ports::{
    EntryLink, GraphNode, GraphRepo, GraphSnapshot, NodeRef, SceneRepo, UserRepo,
};

use super::ManagementError;

/// A positioned node after its position changed.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PositionedNode {
    Scene(Scene),
    User(User),
}

pub struct GraphOps {
    graph: Arc<dyn GraphRepo>,
    scene: Arc<dyn SceneRepo>,
    user: Arc<dyn UserRepo>,
}

impl GraphOps {
    pub fn new(
        graph: Arc<dyn GraphRepo>,
        scene: Arc<dyn SceneRepo>,
        user: Arc<dyn UserRepo>,
    ) -> Self {
        Self { graph, scene, user }
    }

    /// Create an `ENTRY_TO` edge between any two nodes.
    pub async fn create_entry(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        from_type: &str,
        to_type: &str,
    ) -> Result<EntryLink, ManagementError> {
        let from = NodeRef::new(from_id, from_type.parse()?);
        let to = NodeRef::new(to_id, to_type.parse()?);
        Ok(self.graph.create_entry(from, to).await?)
    }

    /// Nodes holding an `ENTRY_TO` into the given node.
    pub async fn entries(
        &self,
        node_id: Uuid,
        node_type: &str,
    ) -> Result<Vec<GraphNode>, ManagementError> {
        let node = NodeRef::new(node_id, node_type.parse()?);
        Ok(self.graph.entries(node).await?)
    }

    /// Move a Scene or User. Other labels carry no position.
    pub async fn update_position(
        &self,
        node_type: &str,
        id: Uuid,
        position: PolarPosition,
    ) -> Result<PositionedNode, ManagementError> {
        position.validate()?;
        let label: NodeLabel = node_type.parse()?;
        match label {
            NodeLabel::Scene => Ok(PositionedNode::Scene(
                self.scene
                    .update_position(SceneId::from_uuid(id), position)
                    .await?,
            )),
            NodeLabel::User => Ok(PositionedNode::User(
                self.user
                    .update_position(UserId::from_uuid(id), position)
                    .await?,
            )),
            other => Err(ManagementError::InvalidInput(format!(
                "{other} nodes have no position"
            ))),
        }
    }

    pub async fn snapshot(&self) -> Result<GraphSnapshot, ManagementError> {
        Ok(self.graph.snapshot().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockGraphRepo, MockSceneRepo, MockUserRepo};

    fn ops(graph: MockGraphRepo, scene: MockSceneRepo, user: MockUserRepo) -> GraphOps {
        GraphOps::new(Arc::new(graph), Arc::new(scene), Arc::new(user))
    }

    #[tokio::test]
    async fn entry_labels_are_parsed_before_the_store_is_touched() {
        let mut graph = MockGraphRepo::new();
        graph.expect_create_entry().never();

        let err = ops(graph, MockSceneRepo::new(), MockUserRepo::new())
            .create_entry(Uuid::new_v4(), Uuid::new_v4(), "Object", "Scene) DETACH DELETE (n")
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn entry_accepts_plural_lowercase_labels() {
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());
        let mut graph = MockGraphRepo::new();
        graph
            .expect_create_entry()
            .withf(move |a, b| {
                *a == NodeRef::new(from, NodeLabel::Object) && *b == NodeRef::new(to, NodeLabel::Scene)
            })
            .returning(|a, b| {
                Ok(EntryLink {
                    from: GraphNode {
                        id: a.id.to_string(),
                        label: "door".into(),
                        node_type: "Object".into(),
                    },
                    to: GraphNode {
                        id: b.id.to_string(),
                        label: "cellar".into(),
                        node_type: "Scene".into(),
                    },
                })
            });

        let link = ops(graph, MockSceneRepo::new(), MockUserRepo::new())
            .create_entry(from, to, "objects", "scene")
            .await
            .unwrap();
        assert_eq!(link.to.label, "cellar");
    }

    #[tokio::test]
    async fn objects_cannot_be_positioned() {
        let err = ops(MockGraphRepo::new(), MockSceneRepo::new(), MockUserRepo::new())
            .update_position("object", Uuid::new_v4(), PolarPosition::origin())
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::InvalidInput(_)));
    }
}
