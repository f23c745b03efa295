//! Nearest-scene selection and similarity ranking.
//!
//! Pure functions over already-loaded entities. The engine loads candidates
//! from the graph and hands them here, so ordering rules are tested without
//! a database.

use std::cmp::Ordering;

use serde::Serialize;

use crate::entities::Scene;
use crate::value_objects::{cosine_similarity, dot, spatial_distance, Embedding, PolarPosition};

/// Added to the spatial distance before dividing, so a scene at distance 0
/// scores finitely.
pub const DISTANCE_EPSILON: f64 = 1e-6;

/// How a scene was chosen during relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Scene shares the exact requested position.
    Exact,
    /// Ranked by `dot(user, scene) / (distance + ε)`.
    Vector,
    /// Ranked by ascending spatial distance.
    Spatial,
    /// Named by the caller, no ranking involved.
    Direct,
}

/// A candidate scene with the numbers that ranked it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRank<'a> {
    pub scene: &'a Scene,
    pub distance: f64,
    /// Only set for [`SelectionMethod::Vector`].
    pub score: Option<f64>,
    pub method: SelectionMethod,
}

/// Oldest first, then by id, so equal candidates always resolve the same way.
fn creation_order(a: &Scene, b: &Scene) -> Ordering {
    a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
}

/// Rank every candidate for a user standing at `position`.
///
/// With a user vector, scenes carrying an embedding are scored and sorted by
/// descending score; scenes without one are left out. If no scene carries an
/// embedding the ranking falls back to distance. Without a user vector,
/// scenes are sorted by ascending distance.
pub fn rank_scenes<'a>(
    scenes: &'a [Scene],
    position: &PolarPosition,
    vector: Option<&Embedding>,
) -> Vec<SceneRank<'a>> {
    if let Some(user_vector) = vector {
        let mut scored: Vec<SceneRank<'a>> = scenes
            .iter()
            .filter_map(|scene| {
                let scene_vector = scene.embedding_vector.as_ref()?;
                let distance = spatial_distance(position, &scene.polar_position);
                Some(SceneRank {
                    scene,
                    distance,
                    score: Some(dot(user_vector, scene_vector) / (distance + DISTANCE_EPSILON)),
                    method: SelectionMethod::Vector,
                })
            })
            .collect();

        if !scored.is_empty() {
            scored.sort_by(|a, b| {
                let (sa, sb) = (a.score.unwrap_or(f64::MIN), b.score.unwrap_or(f64::MIN));
                sb.total_cmp(&sa)
                    .then_with(|| a.distance.total_cmp(&b.distance))
                    .then_with(|| creation_order(a.scene, b.scene))
            });
            return scored;
        }
    }

    let mut ranked: Vec<SceneRank<'a>> = scenes
        .iter()
        .map(|scene| SceneRank {
            scene,
            distance: spatial_distance(position, &scene.polar_position),
            score: None,
            method: SelectionMethod::Spatial,
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| creation_order(a.scene, b.scene))
    });
    ranked
}

/// Pick the scene a user at `position` should be located in.
///
/// A scene at exactly the same position always wins, regardless of vectors.
/// When several share it, the oldest is taken. Otherwise the top of
/// [`rank_scenes`] is returned. `None` only when `scenes` is empty.
pub fn select_scene<'a>(
    scenes: &'a [Scene],
    position: &PolarPosition,
    vector: Option<&Embedding>,
) -> Option<SceneRank<'a>> {
    let exact = scenes
        .iter()
        .filter(|scene| scene.polar_position == *position)
        .min_by(|a, b| creation_order(a, b));

    if let Some(scene) = exact {
        return Some(SceneRank {
            scene,
            distance: 0.0,
            score: None,
            method: SelectionMethod::Exact,
        });
    }

    rank_scenes(scenes, position, vector).into_iter().next()
}

/// Similarity measure for top-k queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Cosine,
    Dot,
}

impl SimilarityMetric {
    fn score(&self, a: &Embedding, b: &Embedding) -> Option<f64> {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Dot => Some(dot(a, b)),
        }
    }
}

/// An item paired with its similarity to the query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<'a, T> {
    pub item: &'a T,
    pub score: f64,
}

/// Top-`limit` items by similarity to `query`, highest first.
///
/// Items whose vector is absent are excluded rather than scored as zero, and
/// so are zero-magnitude vectors under cosine. Equal scores keep their input
/// order.
pub fn rank_by_similarity<'a, T, F>(
    items: &'a [T],
    vector_of: F,
    query: &Embedding,
    metric: SimilarityMetric,
    limit: usize,
) -> Vec<Scored<'a, T>>
where
    F: Fn(&T) -> Option<&Embedding>,
{
    let mut scored: Vec<Scored<'a, T>> = items
        .iter()
        .filter_map(|item| {
            let score = metric.score(query, vector_of(item)?)?;
            Some(Scored { item, score })
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}
