//! Per-frame simulation step
//!
//! Order inside a tick is part of the contract; moving a stage shifts combo
//! and wave edge timing:
//! 1. wave bookkeeping, then combo timer
//! 2. particles and screen flash
//! 3. well growth decay
//! 4. each orb: absorption, gravity, taming, integration, wall bounce, trail
//! 5. spawning
//! 6. well wall contact (loss) and victory
//! 7. round clock

use glam::Vec2;

use super::collision::{bounce_orb, is_absorbed, well_touches_wall};
use super::combo::growth_bonus;
use super::gravity;
use super::particles;
use super::state::{Bounds, DeathReason, Orb, OrbKind, Phase, RoundState, WellMode};
use super::wave::spawn_orbs;
use crate::consts::*;
use crate::finite_or;

/// One sample from the input collaborator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Whether a hand (or pointer) was tracked this frame
    pub has_hand: bool,
    /// Cursor position in play-area pixels
    pub cursor: Option<Vec2>,
    /// Pinch (or button held) switches the well to repel
    pub is_pinched: bool,
}

/// Merge an input sample into the well.
///
/// Without a hand the well keeps its last position and mode. A missing or
/// non-finite cursor keeps the last position.
pub fn apply_input(state: &mut RoundState, input: &TickInput) {
    if !input.has_hand {
        return;
    }
    if let Some(cursor) = input.cursor.filter(|c| c.is_finite()) {
        state.well.pos = cursor;
    }
    state.well.mode = if input.is_pinched {
        WellMode::Repel
    } else {
        WellMode::Attract
    };
}

/// Clamp a wall-clock delta to what one tick may integrate
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Pure form of [`tick`]: the next snapshot, leaving `state` untouched
pub fn step(state: &RoundState, dt: f32, bounds: Bounds) -> RoundState {
    let mut next = state.clone();
    tick(&mut next, dt, bounds);
    next
}

/// Advance a playing round by `dt` seconds. Any other phase is left as is.
pub fn tick(state: &mut RoundState, dt: f32, bounds: Bounds) {
    if state.phase != Phase::Playing {
        return;
    }
    let dt = clamp_dt(dt);

    if state.bounds != bounds {
        fit_well_to_bounds(state, bounds);
    }

    state.wave.update(dt);
    state.combo.tick_timer(dt);

    particles::advance(&mut state.particles, dt);
    state.screen_flash = (state.screen_flash - FLASH_DECAY_PER_SEC * dt).max(0.0);

    decay_growth(state, dt);

    update_orbs(state, dt, bounds);

    if state.phase == Phase::Playing {
        spawn_orbs(state, bounds);
    }

    state.well.radius = state.growth_radius;
    if well_touches_wall(&state.well, bounds) {
        // No-op if a bomb already ended the round this tick
        state.end_round(DeathReason::Wall);
    } else if state.phase == Phase::Playing && state.growth_radius >= VICTORY_GROWTH_RADIUS {
        log::info!("Victory after {:.1}s", state.elapsed);
        state.phase = Phase::Victory;
    }

    state.elapsed += dt;
}

/// The play area changed size: pull the well back inside so a resize alone
/// never counts as wall contact
fn fit_well_to_bounds(state: &mut RoundState, bounds: Bounds) {
    let fitted = bounds.clamp_circle(state.well.pos, state.growth_radius);
    if fitted != state.well.pos {
        log::debug!(
            "Play area now {}x{}, well moved to ({:.0}, {:.0})",
            bounds.width,
            bounds.height,
            fitted.x,
            fitted.y
        );
        state.well.pos = fitted;
    }
    state.bounds = bounds;
}

/// Shrink the well toward its floor once the post-absorption coast is over
fn decay_growth(state: &mut RoundState, dt: f32) {
    let coasting = state
        .last_absorb_at
        .is_some_and(|t| state.elapsed - t < GROWTH_DECAY_DELAY_SECS);
    if !coasting {
        state.growth_radius =
            (state.growth_radius - GROWTH_DECAY_PER_SEC * dt).max(MIN_GROWTH_RADIUS);
    }
    state.well.radius = state.growth_radius;
}

fn update_orbs(state: &mut RoundState, dt: f32, bounds: Bounds) {
    let orbs = std::mem::take(&mut state.orbs);
    let mut survivors = Vec::with_capacity(orbs.len());
    let mut remaining = orbs.into_iter();

    for mut orb in remaining.by_ref() {
        if is_absorbed(&orb, &state.well) {
            if orb.kind == OrbKind::Bomb {
                log::debug!("Bomb {} absorbed", orb.id);
                state.end_round(DeathReason::Bomb);
                break;
            }
            absorb(state, &orb);
            continue;
        }

        let accel = gravity::acceleration(&state.well, orb.pos);
        let distance = orb.pos.distance(state.well.pos);
        orb.update_taming(state.well.mode, distance, state.well.grab_radius(), dt);

        orb.vel *= ORB_DAMPING;
        orb.vel += accel * dt;
        orb.vel = orb.vel.clamp_length_max(ORB_MAX_SPEED);
        orb.pos += orb.vel * dt;

        bounce_orb(&mut orb, bounds);

        if !(orb.pos.is_finite() && orb.vel.is_finite()) {
            recover_orb(&mut orb, bounds);
        }

        orb.record_trail();
        survivors.push(orb);
    }

    // Orbs after a lethal bomb are carried over untouched
    survivors.extend(remaining);
    state.orbs = survivors;
}

/// Reward a GOLD normal orb reaching the well's core
fn absorb(state: &mut RoundState, orb: &Orb) {
    let now = state.elapsed;
    state.combo.on_absorbed(orb.kind, now * 1000.0);

    state.growth_radius += GROWTH_PER_ABSORB + growth_bonus(state.combo.count);
    state.well.radius = state.growth_radius;
    state.last_absorb_at = Some(now);
    state.wave.record_absorption();

    let count = 10 + 6 * state.combo.tier();
    let burst = particles::burst(&mut state.rng, orb.pos, count, state.combo.tier_color());
    particles::push_capped(&mut state.particles, burst);

    if state.combo.count >= FLASH_COMBO_THRESHOLD {
        state.screen_flash = 1.0;
    }

    log::debug!(
        "Absorbed orb {} (combo {}, x{:.1}), well radius {:.1}",
        orb.id,
        state.combo.count,
        state.combo.multiplier,
        state.growth_radius
    );
}

/// Park an orb whose position or velocity went non-finite
fn recover_orb(orb: &mut Orb, bounds: Bounds) {
    let center = bounds.center();
    let last = orb.trail.back().map_or(center, |&p| finite_or(p, center));
    let fallback = bounds.clamp_circle(last, orb.radius);
    log::warn!(
        "Orb {} went non-finite (pos={:?}, vel={:?}), reset to {:?}",
        orb.id,
        orb.pos,
        orb.vel,
        fallback
    );
    orb.reset_to(fallback);
}
