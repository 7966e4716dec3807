//! Boundary and absorption tests
//!
//! Orbs bounce off the play-area walls inelastically. The well never bounces:
//! its growth radius reaching a wall ends the round.

use glam::Vec2;

use super::state::{Bounds, GravityWell, Orb};
use crate::consts::WALL_RESTITUTION;

/// Reflect a velocity about a surface normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Keep the orb inside the bounds, reflecting the velocity component that
/// crossed a wall and scaling it by the restitution.
pub fn bounce_orb(orb: &mut Orb, bounds: Bounds) {
    let clamped = bounds.clamp_circle(orb.pos, orb.radius);

    if clamped.x != orb.pos.x {
        // Pushed right off the left wall, or left off the right wall
        let normal = if clamped.x > orb.pos.x { Vec2::X } else { Vec2::NEG_X };
        if orb.vel.dot(normal) < 0.0 {
            orb.vel.x = reflect_velocity(orb.vel, normal).x * WALL_RESTITUTION;
        }
    }
    if clamped.y != orb.pos.y {
        let normal = if clamped.y > orb.pos.y { Vec2::Y } else { Vec2::NEG_Y };
        if orb.vel.dot(normal) < 0.0 {
            orb.vel.y = reflect_velocity(orb.vel, normal).y * WALL_RESTITUTION;
        }
    }

    orb.pos = clamped;
}

/// Whether the well's growth radius reaches past any wall
pub fn well_touches_wall(well: &GravityWell, bounds: Bounds) -> bool {
    let r = well.radius;
    well.pos.x - r < 0.0
        || well.pos.y - r < 0.0
        || well.pos.x + r > bounds.width
        || well.pos.y + r > bounds.height
}

/// Whether a GOLD orb is close enough to be absorbed.
/// Returns false for orbs that are not GOLD.
pub fn is_absorbed(orb: &Orb, well: &GravityWell) -> bool {
    orb.is_gold() && orb.pos.distance(well.pos) < well.absorb_radius()
}
