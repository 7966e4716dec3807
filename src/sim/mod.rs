//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped time deltas only
//! - Seeded RNG carried inside the snapshot
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combo;
pub mod gravity;
pub mod particles;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{bounce_orb, is_absorbed, reflect_velocity, well_touches_wall};
pub use combo::{ComboState, growth_bonus, multiplier};
pub use particles::Particle;
pub use state::{
    Bounds, DeathReason, GravityWell, Orb, OrbKind, Phase, RoundState, TRAIL_LENGTH, Taming,
    WellMode,
};
pub use tick::{TickInput, apply_input, clamp_dt, step, tick};
pub use wave::{WaveConfig, WavePhase, WaveState, spawn_orbs, wave_config};
