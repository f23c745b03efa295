//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    narrative::NarrativeServiceClient,
    neo4j::Neo4jRepositories,
    ports::{
        AccountRepo, ClockPort, EmbeddingPort, GraphRepo, MotivePort, NavigationPort,
        ObjectRepo, ObjectScanPort, OutcomePort, RelationExtractionPort, SceneGenerationPort,
        SceneRepo, TraceRepo, UserRepo,
    },
};
use crate::use_cases::{
    self,
    action::{ActionCollaborators, ActionResolver},
    management::{AccountCrud, GraphOps, ObjectCrud, SceneCrud, UserCrud},
    movement::{NavigationCollaborators, SceneResolver, WorldGenerator},
};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub management: use_cases::ManagementUseCases,
    pub movement: use_cases::MovementUseCases,
    pub action: use_cases::ActionUseCases,
}

/// Graph store ports, one per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub scene: Arc<dyn SceneRepo>,
    pub object: Arc<dyn ObjectRepo>,
    pub user: Arc<dyn UserRepo>,
    pub account: Arc<dyn AccountRepo>,
    pub trace: Arc<dyn TraceRepo>,
    pub graph: Arc<dyn GraphRepo>,
}

impl From<Neo4jRepositories> for Repositories {
    fn from(repos: Neo4jRepositories) -> Self {
        Self {
            scene: repos.scene,
            object: repos.object,
            user: repos.user,
            account: repos.account,
            trace: repos.trace,
            graph: repos.graph,
        }
    }
}

/// Narrative collaborator ports.
#[derive(Clone)]
pub struct Collaborators {
    pub embedding: Arc<dyn EmbeddingPort>,
    pub scan: Arc<dyn ObjectScanPort>,
    pub extraction: Arc<dyn RelationExtractionPort>,
    pub generation: Arc<dyn SceneGenerationPort>,
    pub navigation: Arc<dyn NavigationPort>,
    pub outcome: Arc<dyn OutcomePort>,
    pub motives: Arc<dyn MotivePort>,
}

impl Collaborators {
    /// Every collaborator served by one narrative service.
    pub fn from_client(client: Arc<NarrativeServiceClient>) -> Self {
        Self {
            embedding: client.clone(),
            scan: client.clone(),
            extraction: client.clone(),
            generation: client.clone(),
            navigation: client.clone(),
            outcome: client.clone(),
            motives: client,
        }
    }
}

impl App {
    /// Create a new App backed by Neo4j and the narrative service.
    pub fn new(repos: Neo4jRepositories, narrative: Arc<NarrativeServiceClient>) -> Self {
        Self::from_parts(
            repos.into(),
            Collaborators::from_client(narrative),
            Arc::new(SystemClock::new()),
        )
    }

    /// Wire use cases from arbitrary port implementations.
    pub fn from_parts(
        repos: Repositories,
        collaborators: Collaborators,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let management = use_cases::ManagementUseCases::new(
            SceneCrud::new(repos.scene.clone(), clock.clone()),
            ObjectCrud::new(repos.object.clone(), clock.clone()),
            UserCrud::new(repos.user.clone(), clock.clone()),
            AccountCrud::new(repos.account.clone(), clock.clone()),
            GraphOps::new(repos.graph.clone(), repos.scene.clone(), repos.user.clone()),
        );

        let resolver = Arc::new(SceneResolver::new(
            repos.scene.clone(),
            repos.user.clone(),
            clock.clone(),
        ));
        let world = Arc::new(WorldGenerator::new(
            NavigationCollaborators {
                navigation: collaborators.navigation.clone(),
                generation: collaborators.generation.clone(),
                embedding: collaborators.embedding.clone(),
                scan: collaborators.scan.clone(),
            },
            repos.scene.clone(),
            repos.object.clone(),
            repos.user.clone(),
            resolver.clone(),
            clock.clone(),
        ));
        let movement = use_cases::MovementUseCases::new(resolver, world);

        let action = use_cases::ActionUseCases::new(Arc::new(ActionResolver::new(
            ActionCollaborators {
                outcome: collaborators.outcome,
                extraction: collaborators.extraction,
                scan: collaborators.scan,
                embedding: collaborators.embedding,
                motives: collaborators.motives,
            },
            repos.scene,
            repos.object,
            repos.user,
            repos.trace,
            clock,
        )));

        Self {
            use_cases: UseCases {
                management,
                movement,
                action,
            },
        }
    }
}
