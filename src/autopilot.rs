//! Demo-mode driver
//!
//! Produces the input sample a player would: glide toward the nearest wild
//! orb, stay clear of the walls, and push tamed bombs away before they can
//! be swallowed.

use glam::Vec2;

use crate::sim::{Bounds, OrbKind, RoundState, Taming, TickInput};

/// Furthest the cursor moves in one frame (px)
const MAX_GLIDE_STEP: f32 = 8.0;
/// Clearance kept between the well's edge and every wall (px)
const WALL_MARGIN: f32 = 40.0;
/// Tamed bombs closer than grab radius plus this trigger a pinch (px)
const DANGER_MARGIN: f32 = 60.0;

/// Synthetic input for the current snapshot
pub fn drive(state: &RoundState, bounds: Bounds) -> TickInput {
    let well = &state.well;

    let in_danger = state.orbs.iter().any(|orb| {
        orb.kind == OrbKind::Bomb
            && matches!(orb.taming, Taming::Capturing | Taming::Gold)
            && orb.pos.distance(well.pos) < well.grab_radius() + DANGER_MARGIN
    });

    // Nearest NORMAL orb; ties go to the lower id (orbs are id-ordered)
    let target = state
        .orbs
        .iter()
        .filter(|orb| orb.kind == OrbKind::Normal && orb.pos.is_finite())
        .min_by(|a, b| {
            a.pos
                .distance_squared(well.pos)
                .total_cmp(&b.pos.distance_squared(well.pos))
        })
        .map(|orb| orb.pos)
        .unwrap_or_else(|| bounds.center());

    let start = safe_position(well.pos, well.radius, bounds);
    let glide = (target - start).clamp_length_max(MAX_GLIDE_STEP);
    let cursor = safe_position(start + glide, well.radius, bounds);

    TickInput {
        has_hand: true,
        cursor: Some(cursor),
        is_pinched: in_danger,
    }
}

/// Pull a well position in so its edge stays `WALL_MARGIN` from every wall
fn safe_position(pos: Vec2, radius: f32, bounds: Bounds) -> Vec2 {
    let pos = if pos.is_finite() { pos } else { bounds.center() };
    bounds.clamp_circle(pos, radius + WALL_MARGIN)
}
