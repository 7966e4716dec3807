//! Gravity Well - a black hole that tames orbs
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, taming, waves, combos, round state)
//! - `session`: Host-side round container (input merge, phase diffing, best time)
//! - `autopilot`: Demo-mode input producer
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key/value storage for best time, settings and snapshots
//! - `settings`: Host configuration

pub mod autopilot;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{PhaseChange, Session};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest time delta a single tick will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Attraction numerator of the softened inverse-square law
    pub const GRAVITY_STRENGTH: f32 = 4_000_000.0;
    /// Repulsion numerator (same magnitude as attraction, opposite sign)
    pub const REPEL_STRENGTH: f32 = 4_000_000.0;
    /// Added to squared distance so force stays finite at zero separation (px²)
    pub const SOFTENING: f32 = 2_500.0;

    /// Orb defaults
    pub const ORB_RADIUS: f32 = 9.0;
    pub const BOMB_RADIUS: f32 = 12.0;
    /// Multiplicative velocity damping applied once per tick
    pub const ORB_DAMPING: f32 = 0.995;
    pub const ORB_MAX_SPEED: f32 = 520.0;
    /// Velocity kept after bouncing off a wall
    pub const WALL_RESTITUTION: f32 = 0.7;

    /// Taming: orbs within (well radius + margin) get captured while attracting
    pub const GRAB_MARGIN: f32 = 90.0;
    pub const CAPTURE_TIME_SECS: f32 = 0.8;
    /// Capture progress lost per second once the orb drifts out of reach
    pub const CAPTURE_DECAY_PER_SEC: f32 = 0.6;
    /// GOLD orbs closer than this fraction of the well radius get absorbed
    pub const ABSORB_FRACTION: f32 = 0.9;

    /// Well growth
    pub const MIN_GROWTH_RADIUS: f32 = 28.0;
    pub const GROWTH_PER_ABSORB: f32 = 3.0;
    /// Growth coasts this long after an absorption before shrinking
    pub const GROWTH_DECAY_DELAY_SECS: f32 = 3.0;
    pub const GROWTH_DECAY_PER_SEC: f32 = 2.5;
    /// Well radius that wins the round (unreachable by default)
    pub const VICTORY_GROWTH_RADIUS: f32 = f32::INFINITY;

    /// Screen flash
    pub const FLASH_DECAY_PER_SEC: f32 = 2.5;
    pub const FLASH_COMBO_THRESHOLD: u32 = 5;
}

/// Normalized direction from `from` to `to` plus the distance between them.
///
/// Coincident points yield a zero direction rather than NaN.
#[inline]
pub fn direction_and_distance(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    (delta.normalize_or_zero(), distance)
}

/// Rotate a vector counter-clockwise by `radians`
#[inline]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}

/// `v` if both components are finite, otherwise `fallback`
#[inline]
pub fn finite_or(v: Vec2, fallback: Vec2) -> Vec2 {
    if v.is_finite() { v } else { fallback }
}
