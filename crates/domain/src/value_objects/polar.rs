//! Polar world coordinates.
//!
//! Users and scenes are placed on a plane by `(radius, angle)` with the angle
//! in radians. Distances use the law of cosines so no Cartesian conversion
//! is ever stored.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A location expressed as radius and angle (radians).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarPosition {
    pub radius: f64,
    pub angle: f64,
}

impl PolarPosition {
    /// Create a validated position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either component is not finite
    /// or the radius is negative.
    pub fn new(radius: f64, angle: f64) -> Result<Self, DomainError> {
        let position = Self { radius, angle };
        position.validate()?;
        Ok(position)
    }

    pub const fn origin() -> Self {
        Self {
            radius: 0.0,
            angle: 0.0,
        }
    }

    /// Re-check a position that arrived through deserialization.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.radius.is_finite() || !self.angle.is_finite() {
            return Err(DomainError::validation(
                "polarPosition radius and angle must be finite numbers",
            ));
        }
        if self.radius < 0.0 {
            return Err(DomainError::validation(
                "polarPosition radius cannot be negative",
            ));
        }
        Ok(())
    }

    /// Distance to another position. See [`spatial_distance`].
    pub fn distance_to(&self, other: &PolarPosition) -> f64 {
        spatial_distance(self, other)
    }
}

/// Law-of-cosines distance between two polar positions:
/// `sqrt(r1² + r2² − 2·r1·r2·cos(|θ1−θ2|))`.
///
/// Symmetric in its arguments and exactly zero for identical positions.
/// Rounding can push the radicand a hair below zero for near-identical
/// points, so it is clamped.
pub fn spatial_distance(a: &PolarPosition, b: &PolarPosition) -> f64 {
    let delta = (a.angle - b.angle).abs();
    let squared = a.radius * a.radius + b.radius * b.radius
        - 2.0 * (a.radius * b.radius) * delta.cos();
    squared.max(0.0).sqrt()
}
