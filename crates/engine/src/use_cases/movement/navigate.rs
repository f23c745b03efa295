//! Free-text navigation and on-demand world generation.
//!
//! A movement command goes to the navigation collaborator first. When it
//! fails to resolve the destination, the command is resolved locally with
//! one strategy chain that stops at the first hit:
//!
//! 1. exact scene description match (extracted phrase, else the command)
//! 2. pattern-extracted destination phrase, generated
//! 3. scene description contained in the command, or vice versa
//! 4. generation from the command text
//!
//! Generation embeds the new description, deduplicates by exact text,
//! decomposes the description into objects and relocates the user. Nothing
//! is rolled back on a mid-way collaborator failure; a retry reuses the
//! deduplicated scene and its existing objects.

use std::sync::Arc;

use serde::Serialize;
use worldgraph_domain::{Object, PolarPosition, Scene, User, UserId};

use super::destination::extract_destination;
use super::relocate::{Relocation, RelocationError, SceneResolver};
use crate::infrastructure::ports::{
    ClockPort, CollaboratorError, EmbeddingPort, NavigationPort, ObjectRepo, ObjectScanPort,
    PortalOrigin, RepoError, SceneGenerationPort, SceneRepo, UserRepo,
};

/// Result of a movement command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MovementOutcome {
    /// The user now stands in `scene`.
    Arrived(Arrival),
    /// Navigation succeeded without naming a scene; nothing moved.
    Stayed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub scene: Scene,
    pub objects: Vec<Object>,
    pub relocation: Relocation,
    /// True when the scene was created by this command.
    pub generated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("Relocation failed: {0}")]
    Relocation(#[from] RelocationError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Narrative collaborators used while navigating.
pub struct NavigationCollaborators {
    pub navigation: Arc<dyn NavigationPort>,
    pub generation: Arc<dyn SceneGenerationPort>,
    pub embedding: Arc<dyn EmbeddingPort>,
    pub scan: Arc<dyn ObjectScanPort>,
}

pub struct WorldGenerator {
    collaborators: NavigationCollaborators,
    scene: Arc<dyn SceneRepo>,
    object: Arc<dyn ObjectRepo>,
    user: Arc<dyn UserRepo>,
    resolver: Arc<SceneResolver>,
    clock: Arc<dyn ClockPort>,
}

impl WorldGenerator {
    pub fn new(
        collaborators: NavigationCollaborators,
        scene: Arc<dyn SceneRepo>,
        object: Arc<dyn ObjectRepo>,
        user: Arc<dyn UserRepo>,
        resolver: Arc<SceneResolver>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            collaborators,
            scene,
            object,
            user,
            resolver,
            clock,
        }
    }

    pub async fn navigate(
        &self,
        user_id: UserId,
        command: &str,
    ) -> Result<MovementOutcome, NavigationError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(NavigationError::InvalidInput(
                "movement text cannot be empty".to_string(),
            ));
        }
        let user = self
            .user
            .get(user_id)
            .await?
            .ok_or_else(|| NavigationError::NotFound {
                entity_type: "User",
                id: user_id.to_string(),
            })?;

        let failure = match self.collaborators.navigation.navigate(user_id, command).await {
            Ok(reply) if reply.success => {
                let Some(nearby) = reply.nearby_scenes.first() else {
                    return Ok(MovementOutcome::Stayed {
                        message: reply.message,
                    });
                };
                tracing::debug!(
                    user_id = %user_id,
                    scene = %nearby.description,
                    "Navigation named a nearby scene"
                );
                let description = described_by("navigation", &nearby.description)?;
                let arrival = self.materialize_and_move(&user, description).await?;
                return Ok(MovementOutcome::Arrived(arrival));
            }
            Ok(reply) => reply.failure_text().to_string(),
            Err(CollaboratorError::Status {
                status: 404,
                detail,
                ..
            }) => detail,
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            user_id = %user_id,
            %failure,
            "Navigation failed, resolving destination locally"
        );
        self.resolve_destination(&user, command, &failure)
            .await
            .map(MovementOutcome::Arrived)
    }

    async fn resolve_destination(
        &self,
        user: &User,
        command: &str,
        failure: &str,
    ) -> Result<Arrival, NavigationError> {
        let phrase = extract_destination(failure);
        let lookup = phrase.as_deref().unwrap_or(command);

        if let Some(scene) = self.scene.find_by_description(lookup).await? {
            tracing::debug!(scene_id = %scene.id, "Destination matched an existing scene");
            return self.arrive(user, scene).await;
        }

        if let Some(phrase) = phrase {
            return self.generate(user, &phrase).await;
        }

        if let Some(scene) = self.scene.find_by_containment(command).await? {
            tracing::debug!(scene_id = %scene.id, "Command mentions an existing scene");
            return self.arrive(user, scene).await;
        }

        self.generate(user, command).await
    }

    async fn generate(&self, user: &User, entry_term: &str) -> Result<Arrival, NavigationError> {
        let hints = match self.user.current_scene(user.id).await? {
            Some(current) => self
                .scene
                .list_objects(current.id)
                .await?
                .into_iter()
                .map(|o| o.name)
                .collect(),
            None => Vec::new(),
        };

        let description = self
            .collaborators
            .generation
            .generate(entry_term, hints)
            .await?;
        let description = described_by("scene_generation", &description)?;
        tracing::info!(user_id = %user.id, entry_term, "Generated scene description");

        self.materialize_and_move(user, description).await
    }

    async fn materialize_and_move(
        &self,
        user: &User,
        description: &str,
    ) -> Result<Arrival, NavigationError> {
        let position = user.polar_position.unwrap_or_else(PolarPosition::origin);
        let (scene, objects, created) = self.materialize(description, position).await?;
        let relocation = self.resolver.relocate_to(user, scene.clone()).await?;
        Ok(Arrival {
            scene,
            objects,
            relocation,
            generated: created,
        })
    }

    /// Find-or-create the scene for `description`, decomposing new scenes
    /// into objects. An existing scene is returned with its objects as-is.
    async fn materialize(
        &self,
        description: &str,
        position: PolarPosition,
    ) -> Result<(Scene, Vec<Object>, bool), NavigationError> {
        let description = description.trim();
        if let Some(existing) = self.scene.find_by_description(description).await? {
            let objects = self.scene.list_objects(existing.id).await?;
            tracing::debug!(scene_id = %existing.id, "Reusing scene with identical description");
            return Ok((existing, objects, false));
        }

        let now = self.clock.now();
        let vector = self.collaborators.embedding.embed(description).await?;
        let scene = Scene::new(description, position, Some(vector), now)
            .map_err(|e| NavigationError::InvalidInput(e.to_string()))?;
        self.scene.save(&scene).await?;

        let scanned = self.collaborators.scan.scan(description).await?;
        let mut objects = Vec::with_capacity(scanned.len());
        for entry in scanned {
            if entry.object.trim().is_empty() {
                tracing::warn!(scene_id = %scene.id, "Skipping scanned object without a name");
                continue;
            }
            let vector = self.collaborators.embedding.embed(&entry.object).await?;
            let object = Object::new(&entry.object, None, Some(vector), now)
                .map_err(|e| NavigationError::InvalidInput(e.to_string()))?
                .with_flags(entry.refinable, entry.interactable);
            let portal = entry.is_entry.then_some(PortalOrigin::Scanned);
            self.object.create_in_scene(scene.id, &object, portal).await?;
            objects.push(object);
        }

        tracing::info!(scene_id = %scene.id, objects = objects.len(), "Materialized scene");
        Ok((scene, objects, true))
    }

    async fn arrive(&self, user: &User, scene: Scene) -> Result<Arrival, NavigationError> {
        let objects = self.scene.list_objects(scene.id).await?;
        let relocation = self.resolver.relocate_to(user, scene.clone()).await?;
        Ok(Arrival {
            scene,
            objects,
            relocation,
            generated: false,
        })
    }
}

/// Scene text handed back by a collaborator, rejected when blank.
fn described_by<'a>(
    service: &'static str,
    description: &'a str,
) -> Result<&'a str, CollaboratorError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(CollaboratorError::InvalidResponse {
            service,
            message: "scene description is empty".to_string(),
        });
    }
    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockEmbeddingPort, MockNavigationPort, MockObjectRepo, MockObjectScanPort,
        MockSceneGenerationPort, MockSceneRepo, MockUserRepo, NavigationReply, NearbyScene,
        ScannedObject,
    };
    use chrono::Utc;
    use mockall::predicate::*;
    use std::sync::Mutex;
    use worldgraph_domain::{Embedding, EMBEDDING_DIMENSIONS};

    struct Mocks {
        navigation: MockNavigationPort,
        generation: MockSceneGenerationPort,
        embedding: MockEmbeddingPort,
        scan: MockObjectScanPort,
        scene: MockSceneRepo,
        object: MockObjectRepo,
        user: MockUserRepo,
    }

    impl Mocks {
        fn new(user: &User) -> Self {
            let mut users = MockUserRepo::new();
            let stored = user.clone();
            users
                .expect_get()
                .returning(move |_| Ok(Some(stored.clone())));
            Self {
                navigation: MockNavigationPort::new(),
                generation: MockSceneGenerationPort::new(),
                embedding: MockEmbeddingPort::new(),
                scan: MockObjectScanPort::new(),
                scene: MockSceneRepo::new(),
                object: MockObjectRepo::new(),
                user: users,
            }
        }

        fn fail_navigation(&mut self, message: &'static str) {
            self.navigation.expect_navigate().returning(move |_, _| {
                Ok(NavigationReply {
                    success: false,
                    message: message.to_string(),
                    ..Default::default()
                })
            });
        }

        fn build(self) -> WorldGenerator {
            let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(Utc::now()));
            let scene: Arc<dyn SceneRepo> = Arc::new(self.scene);
            let user: Arc<dyn UserRepo> = Arc::new(self.user);
            let resolver = Arc::new(SceneResolver::new(
                scene.clone(),
                user.clone(),
                clock.clone(),
            ));
            WorldGenerator::new(
                NavigationCollaborators {
                    navigation: Arc::new(self.navigation),
                    generation: Arc::new(self.generation),
                    embedding: Arc::new(self.embedding),
                    scan: Arc::new(self.scan),
                },
                scene,
                Arc::new(self.object),
                user,
                resolver,
                clock,
            )
        }
    }

    fn vector() -> Embedding {
        Embedding::new(vec![0.1; EMBEDDING_DIMENSIONS]).unwrap()
    }

    fn traveller() -> User {
        User::new(
            "a curious scholar",
            Some(PolarPosition::new(4.0, 0.5).unwrap()),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn existing(description: &str) -> Scene {
        Scene::new(description, PolarPosition::origin(), None, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn unknown_destination_is_generated_materialized_and_entered() {
        let user = traveller();
        let user_id = user.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("destination not found: the library");
        m.scene
            .expect_find_by_description()
            .with(eq("the library"))
            .returning(|_| Ok(None));
        m.user.expect_current_scene().returning(|_| Ok(None));
        m.generation
            .expect_generate()
            .with(eq("the library"), eq(Vec::<String>::new()))
            .times(1)
            .returning(|term, _| Ok(term.to_string()));
        m.embedding.expect_embed().returning(|_| Ok(vector()));
        m.scene
            .expect_save()
            .withf(|scene| {
                scene.description == "the library"
                    && scene.polar_position == PolarPosition::new(4.0, 0.5).unwrap()
                    && scene.embedding_vector.is_some()
            })
            .times(1)
            .returning(|_| Ok(()));
        m.scan.expect_scan().with(eq("the library")).returning(|_| {
            Ok(vec![
                ScannedObject {
                    object: "bookshelf".into(),
                    refinable: true,
                    interactable: false,
                    is_entry: false,
                },
                ScannedObject {
                    object: "reading room door".into(),
                    refinable: false,
                    interactable: true,
                    is_entry: true,
                },
            ])
        });
        m.object
            .expect_create_in_scene()
            .withf(|_, object, portal| {
                (object.name == "bookshelf") == portal.is_none()
                    && portal.map_or(true, |p| p == PortalOrigin::Scanned)
            })
            .times(2)
            .returning(|_, _, _| Ok(()));
        m.user
            .expect_relocate()
            .with(eq(user_id), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = m.build().navigate(user_id, "go to the library").await.unwrap();

        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert!(arrival.generated);
        assert_eq!(arrival.scene.description, "the library");
        assert_eq!(arrival.objects.len(), 2);
        assert_eq!(arrival.relocation.scene.id, arrival.scene.id);
    }

    #[tokio::test]
    async fn scan_failure_keeps_the_saved_scene_for_the_retry() {
        let user = traveller();
        let user_id = user.id;
        let saved: Arc<Mutex<Option<Scene>>> = Arc::default();

        let mut m = Mocks::new(&user);
        m.fail_navigation("destination not found: the archive");
        m.scene
            .expect_find_by_description()
            .with(eq("the archive"))
            .returning(|_| Ok(None));
        m.user.expect_current_scene().returning(|_| Ok(None));
        m.generation
            .expect_generate()
            .returning(|term, _| Ok(term.to_string()));
        m.embedding.expect_embed().times(1).returning(|_| Ok(vector()));
        let sink = saved.clone();
        m.scene.expect_save().times(1).returning(move |scene| {
            *sink.lock().unwrap() = Some(scene.clone());
            Ok(())
        });
        m.scan.expect_scan().times(1).returning(|_| {
            Err(CollaboratorError::Unreachable {
                service: "object_scan",
                message: "connection reset".into(),
            })
        });
        m.object.expect_create_in_scene().never();
        m.user.expect_relocate().never();

        let err = m.build().navigate(user_id, "go to the archive").await.unwrap_err();
        assert!(matches!(
            err,
            NavigationError::Collaborator(CollaboratorError::Unreachable { service: "object_scan", .. })
        ));

        let archive = saved.lock().unwrap().clone().expect("scene was saved");
        let archive_id = archive.id;
        let mut m = Mocks::new(&user);
        m.fail_navigation("destination not found: the archive");
        m.scene
            .expect_find_by_description()
            .with(eq("the archive"))
            .returning(move |_| Ok(Some(archive.clone())));
        m.scene
            .expect_list_objects()
            .with(eq(archive_id))
            .returning(|_| Ok(vec![]));
        m.generation.expect_generate().never();
        m.embedding.expect_embed().never();
        m.scan.expect_scan().never();
        m.scene.expect_save().never();
        m.user.expect_relocate().times(1).returning(|_, _| Ok(()));

        let outcome = m.build().navigate(user_id, "go to the archive").await.unwrap();
        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert!(!arrival.generated);
        assert_eq!(arrival.scene.id, archive_id);
    }

    #[tokio::test]
    async fn blank_generated_description_is_an_invalid_response() {
        let user = traveller();
        let user_id = user.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("destination not found: the void");
        m.scene.expect_find_by_description().returning(|_| Ok(None));
        m.user.expect_current_scene().returning(|_| Ok(None));
        m.generation
            .expect_generate()
            .returning(|_, _| Ok("   ".to_string()));
        m.embedding.expect_embed().never();
        m.scene.expect_save().never();
        m.user.expect_relocate().never();

        let err = m.build().navigate(user_id, "go to the void").await.unwrap_err();
        assert!(matches!(
            err,
            NavigationError::Collaborator(CollaboratorError::InvalidResponse {
                service: "scene_generation",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn existing_destination_is_entered_without_generation() {
        let user = traveller();
        let user_id = user.id;
        let library = existing("the library");
        let library_id = library.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("destination not found: the library");
        m.scene
            .expect_find_by_description()
            .with(eq("the library"))
            .returning(move |_| Ok(Some(library.clone())));
        m.scene
            .expect_list_objects()
            .with(eq(library_id))
            .returning(|_| Ok(vec![]));
        m.generation.expect_generate().never();
        m.scene.expect_save().never();
        m.user.expect_relocate().times(1).returning(|_, _| Ok(()));

        let outcome = m.build().navigate(user_id, "go to the library").await.unwrap();
        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert!(!arrival.generated);
        assert_eq!(arrival.scene.id, library_id);
    }

    #[tokio::test]
    async fn generated_text_matching_an_existing_scene_is_reused() {
        let user = traveller();
        let user_id = user.id;
        let room = existing("A quiet reading room");
        let room_id = room.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("unknown destination: reading room");
        m.scene
            .expect_find_by_description()
            .with(eq("reading room"))
            .returning(|_| Ok(None));
        m.scene
            .expect_find_by_description()
            .with(eq("A quiet reading room"))
            .returning(move |_| Ok(Some(room.clone())));
        m.scene.expect_list_objects().returning(|_| Ok(vec![]));
        m.user.expect_current_scene().returning(|_| Ok(None));
        m.generation
            .expect_generate()
            .returning(|_, _| Ok("A quiet reading room".to_string()));
        m.embedding.expect_embed().never();
        m.scan.expect_scan().never();
        m.scene.expect_save().never();
        m.user.expect_relocate().times(1).returning(|_, _| Ok(()));

        let outcome = m.build().navigate(user_id, "find a reading room").await.unwrap();
        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert!(!arrival.generated);
        assert_eq!(arrival.scene.id, room_id);
    }

    #[tokio::test]
    async fn command_containing_a_scene_name_relocates_directly() {
        let user = traveller();
        let user_id = user.id;
        let harbor = existing("harbor");
        let harbor_id = harbor.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("you cannot go that way");
        m.scene
            .expect_find_by_description()
            .with(eq("walk down to the harbor"))
            .returning(|_| Ok(None));
        m.scene
            .expect_find_by_containment()
            .with(eq("walk down to the harbor"))
            .returning(move |_| Ok(Some(harbor.clone())));
        m.scene.expect_list_objects().returning(|_| Ok(vec![]));
        m.generation.expect_generate().never();
        m.user.expect_relocate().times(1).returning(|_, _| Ok(()));

        let outcome = m
            .build()
            .navigate(user_id, "  walk down to the harbor ")
            .await
            .unwrap();
        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert_eq!(arrival.scene.id, harbor_id);
    }

    #[tokio::test]
    async fn generation_hints_come_from_the_current_scene() {
        let user = traveller();
        let user_id = user.id;
        let hall = existing("great hall");
        let hall_id = hall.id;
        let mut m = Mocks::new(&user);

        m.fail_navigation("nothing like that here");
        m.scene.expect_find_by_description().returning(|_| Ok(None));
        m.scene.expect_find_by_containment().returning(|_| Ok(None));
        m.user
            .expect_current_scene()
            .returning(move |_| Ok(Some(hall.clone())));
        m.scene
            .expect_list_objects()
            .with(eq(hall_id))
            .returning(|_| {
                Ok(vec![
                    Object::new("tapestry", None, None, Utc::now()).unwrap(),
                ])
            });
        m.generation
            .expect_generate()
            .withf(|term, hints| term == "climb the tower" && hints == &vec!["tapestry".to_string()])
            .times(1)
            .returning(|_, _| Err(CollaboratorError::Unreachable {
                service: "scene_generation",
                message: "connection refused".into(),
            }));
        m.embedding.expect_embed().never();
        m.user.expect_relocate().never();

        let err = m.build().navigate(user_id, "climb the tower").await.unwrap_err();
        assert!(matches!(err, NavigationError::Collaborator(CollaboratorError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn nearby_scene_on_success_is_entered() {
        let user = traveller();
        let user_id = user.id;
        let garden = existing("moonlit garden");
        let garden_id = garden.id;
        let mut m = Mocks::new(&user);

        m.navigation.expect_navigate().returning(|_, _| {
            Ok(NavigationReply {
                success: true,
                message: "you step outside".into(),
                nearby_scenes: vec![NearbyScene {
                    description: "moonlit garden".into(),
                }],
                ..Default::default()
            })
        });
        m.scene
            .expect_find_by_description()
            .with(eq("moonlit garden"))
            .returning(move |_| Ok(Some(garden.clone())));
        m.scene.expect_list_objects().returning(|_| Ok(vec![]));
        m.user.expect_relocate().times(1).returning(|_, _| Ok(()));

        let outcome = m.build().navigate(user_id, "step outside").await.unwrap();
        let MovementOutcome::Arrived(arrival) = outcome else {
            panic!("expected arrival");
        };
        assert_eq!(arrival.scene.id, garden_id);
    }

    #[tokio::test]
    async fn success_without_scenes_leaves_user_in_place() {
        let user = traveller();
        let user_id = user.id;
        let mut m = Mocks::new(&user);
        m.navigation.expect_navigate().returning(|_, _| {
            Ok(NavigationReply {
                success: true,
                message: "you pace around the room".into(),
                ..Default::default()
            })
        });
        m.user.expect_relocate().never();

        let outcome = m.build().navigate(user_id, "pace").await.unwrap();
        assert_eq!(
            outcome,
            MovementOutcome::Stayed {
                message: "you pace around the room".into()
            }
        );
    }

    #[tokio::test]
    async fn not_found_status_detail_is_treated_as_failure_text() {
        let user = traveller();
        let user_id = user.id;
        let crypt = existing("the crypt");
        let mut m = Mocks::new(&user);
        m.navigation.expect_navigate().returning(|_, _| {
            Err(CollaboratorError::Status {
                service: "navigation",
                status: 404,
                detail: "destination not found: the crypt".into(),
            })
        });
        m.scene
            .expect_find_by_description()
            .with(eq("the crypt"))
            .returning(move |_| Ok(Some(crypt.clone())));
        m.scene.expect_list_objects().returning(|_| Ok(vec![]));
        m.user.expect_relocate().returning(|_, _| Ok(()));

        assert!(m.build().navigate(user_id, "descend").await.is_ok());
    }

    #[tokio::test]
    async fn server_errors_from_navigation_propagate() {
        let user = traveller();
        let user_id = user.id;
        let mut m = Mocks::new(&user);
        m.navigation.expect_navigate().returning(|_, _| {
            Err(CollaboratorError::Status {
                service: "navigation",
                status: 500,
                detail: "boom".into(),
            })
        });
        m.scene.expect_find_by_description().never();

        let err = m.build().navigate(user_id, "go north").await.unwrap_err();
        assert!(matches!(err, NavigationError::Collaborator(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_before_navigation() {
        let mut users = MockUserRepo::new();
        users.expect_get().returning(|_| Ok(None));
        let mut m = Mocks::new(&traveller());
        m.user = users;
        m.navigation.expect_navigate().never();

        let err = m.build().navigate(UserId::new(), "go north").await.unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { entity_type: "User", .. }));
    }
}
