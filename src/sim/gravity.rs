//! Well gravity
//!
//! Softened inverse-square law: `strength / (d² + SOFTENING)` along the line
//! from orb to well. Repel uses the same magnitude with the sign flipped.

use glam::Vec2;

use super::state::{GravityWell, WellMode};
use crate::consts::{GRAVITY_STRENGTH, REPEL_STRENGTH, SOFTENING};
use crate::direction_and_distance;

/// Signed force numerator for a well mode
#[inline]
pub fn strength(mode: WellMode) -> f32 {
    match mode {
        WellMode::Attract => GRAVITY_STRENGTH,
        WellMode::Repel => -REPEL_STRENGTH,
    }
}

/// Acceleration the well applies to a body at `pos`
pub fn acceleration(well: &GravityWell, pos: Vec2) -> Vec2 {
    let (to_well, distance) = direction_and_distance(pos, well.pos);
    let magnitude = strength(well.mode) / (distance * distance + SOFTENING);
    to_well * magnitude
}
