//! Waves and density-based spawning
//!
//! A wave is a difficulty tier: how many NORMAL orbs to keep on screen, how
//! many absorptions advance it, and how likely a spawn is a bomb. Spawning
//! tops the NORMAL population up to the target one orb at a time, so faster
//! absorption means faster spawns, bounded by the cooldown.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Bounds, Orb, OrbKind, RoundState};
use crate::consts::{BOMB_RADIUS, ORB_RADIUS};
use crate::rotate;

const BASE_DENSITY: u32 = 4;
const MAX_DENSITY: u32 = 14;
const BASE_REQUIRED: u32 = 5;
const REQUIRED_PER_WAVE: u32 = 5;
const MAX_REQUIRED: u32 = 50;
const BASE_BOMB_CHANCE: f32 = 0.15;
const BOMB_CHANCE_PER_WAVE: f32 = 0.05;
const MAX_BOMB_CHANCE: f32 = 0.45;

/// How long the "Wave N" banner stays up (seconds)
pub const ANNOUNCEMENT_SECS: f32 = 2.0;
/// Minimum time between two spawns (seconds)
pub const SPAWN_COOLDOWN_SECS: f32 = 0.35;
const SPAWN_SPEED_MIN: f32 = 60.0;
const SPAWN_SPEED_MAX: f32 = 140.0;
/// Max deviation from the aim at the play-area center (radians)
const SPAWN_JITTER: f32 = 0.6;

/// Difficulty parameters for one wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    /// NORMAL orbs to keep alive
    pub target_density: u32,
    /// Absorptions needed to advance
    pub orbs_required: u32,
    /// Probability a spawn is a bomb
    pub bomb_chance: f32,
}

/// Config for a (1-based) wave number
pub fn wave_config(wave: u32) -> WaveConfig {
    let wave = wave.max(1);
    WaveConfig {
        target_density: (BASE_DENSITY + wave).min(MAX_DENSITY),
        orbs_required: (BASE_REQUIRED + REQUIRED_PER_WAVE * wave).min(MAX_REQUIRED),
        bomb_chance: (BASE_BOMB_CHANCE + BOMB_CHANCE_PER_WAVE * (wave - 1) as f32)
            .min(MAX_BOMB_CHANCE),
    }
}

/// What the wave UI is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    Announcement,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    /// 1-based wave number
    pub current: u32,
    pub target_density: u32,
    pub orbs_required: u32,
    pub orbs_absorbed: u32,
    /// Seconds of banner left
    pub announcement_timer: f32,
    pub phase: WavePhase,
    /// Round time of the last spawn (seconds)
    pub last_spawn_at: Option<f32>,
}

impl Default for WaveState {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveState {
    /// Wave 1, banner showing
    pub fn new() -> Self {
        let config = wave_config(1);
        Self {
            current: 1,
            target_density: config.target_density,
            orbs_required: config.orbs_required,
            orbs_absorbed: 0,
            announcement_timer: ANNOUNCEMENT_SECS,
            phase: WavePhase::Announcement,
            last_spawn_at: None,
        }
    }

    pub fn config(&self) -> WaveConfig {
        wave_config(self.current)
    }

    /// Advance the banner timer and run the level-up check
    pub fn update(&mut self, dt: f32) {
        if self.announcement_timer > 0.0 {
            self.announcement_timer = (self.announcement_timer - dt).max(0.0);
            if self.announcement_timer == 0.0 {
                self.phase = WavePhase::Playing;
            }
        }
        self.level_up_if_complete();
    }

    /// Count an absorption; levels up on the same call when the quota is met
    pub fn record_absorption(&mut self) {
        self.orbs_absorbed += 1;
        self.level_up_if_complete();
    }

    /// Returns true if the wave advanced
    pub fn level_up_if_complete(&mut self) -> bool {
        if self.orbs_absorbed < self.orbs_required {
            return false;
        }

        self.current += 1;
        self.orbs_absorbed = 0;
        let config = self.config();
        self.target_density = config.target_density;
        self.orbs_required = config.orbs_required;
        self.announcement_timer = ANNOUNCEMENT_SECS;
        self.phase = WavePhase::Announcement;
        log::info!(
            "Wave {}: density={}, required={}, bombs={:.0}%",
            self.current,
            config.target_density,
            config.orbs_required,
            config.bomb_chance * 100.0
        );
        true
    }

    /// Whether the spawner may emit an orb at round time `now`
    pub fn can_spawn(&self, normal_count: usize, now: f32) -> bool {
        let below_target = normal_count < self.target_density as usize;
        let cooled_down = self
            .last_spawn_at
            .is_none_or(|last| now - last >= SPAWN_COOLDOWN_SECS);
        below_target && cooled_down
    }
}

/// Spawn at most one orb this tick if the NORMAL population is below target
pub fn spawn_orbs(state: &mut RoundState, bounds: Bounds) {
    let now = state.elapsed;
    if !state.wave.can_spawn(state.normal_orb_count(), now) {
        return;
    }

    let bomb_chance = state.wave.config().bomb_chance;
    let kind = if state.rng.random_bool(bomb_chance as f64) {
        OrbKind::Bomb
    } else {
        OrbKind::Normal
    };
    let radius = match kind {
        OrbKind::Normal => ORB_RADIUS,
        OrbKind::Bomb => BOMB_RADIUS,
    };

    let pos = random_edge_point(&mut state.rng, bounds, radius);
    let aim = (bounds.center() - pos).normalize_or_zero();
    let jitter = state.rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER);
    let speed = state.rng.random_range(SPAWN_SPEED_MIN..=SPAWN_SPEED_MAX);
    let vel = rotate(aim, jitter) * speed;

    let id = state.next_entity_id();
    log::debug!("Spawned {:?} orb {} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
    let mut orb = Orb::new(id, kind, pos, vel);
    orb.record_trail();
    state.orbs.push(orb);
    state.wave.last_spawn_at = Some(now);
}

/// A random point on one of the four edges, inset by `radius`
fn random_edge_point<R: Rng>(rng: &mut R, bounds: Bounds, radius: f32) -> Vec2 {
    let along = rng.random::<f32>();
    let raw = match rng.random_range(0..4u8) {
        0 => Vec2::new(along * bounds.width, radius),
        1 => Vec2::new(bounds.width - radius, along * bounds.height),
        2 => Vec2::new(along * bounds.width, bounds.height - radius),
        _ => Vec2::new(radius, along * bounds.height),
    };
    bounds.clamp_circle(raw, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Phase;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn playing_state(seed: u64) -> RoundState {
        let mut state = RoundState::new(bounds(), seed, 0.0);
        state.ready();
        state.begin();
        state
    }

    #[test]
    fn test_wave_one_config() {
        let config = wave_config(1);
        assert_eq!(config.target_density, 5);
        assert_eq!(config.orbs_required, 10);
        assert!((config.bomb_chance - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_config_monotonic_and_capped() {
        let mut prev = wave_config(1);
        for wave in 2..60 {
            let config = wave_config(wave);
            assert!(config.target_density >= prev.target_density);
            assert!(config.orbs_required >= prev.orbs_required);
            assert!(config.bomb_chance >= prev.bomb_chance);
            prev = config;
        }
        assert_eq!(prev.target_density, MAX_DENSITY);
        assert_eq!(prev.orbs_required, MAX_REQUIRED);
        assert_eq!(prev.bomb_chance, MAX_BOMB_CHANCE);
    }

    #[test]
    fn test_level_up_exact_on_quota() {
        let mut wave = WaveState::new();
        for _ in 0..9 {
            wave.record_absorption();
        }
        assert_eq!(wave.current, 1);
        assert_eq!(wave.orbs_absorbed, 9);

        wave.record_absorption();
        assert_eq!(wave.current, 2);
        assert_eq!(wave.orbs_absorbed, 0);
        assert_eq!(wave.orbs_required, wave_config(2).orbs_required);
        assert_eq!(wave.target_density, wave_config(2).target_density);
        assert_eq!(wave.phase, WavePhase::Announcement);
        assert_eq!(wave.announcement_timer, ANNOUNCEMENT_SECS);
    }

    #[test]
    fn test_announcement_times_out() {
        let mut wave = WaveState::new();
        assert_eq!(wave.phase, WavePhase::Announcement);
        wave.update(ANNOUNCEMENT_SECS / 2.0);
        assert_eq!(wave.phase, WavePhase::Announcement);
        wave.update(ANNOUNCEMENT_SECS);
        assert_eq!(wave.phase, WavePhase::Playing);
        assert_eq!(wave.announcement_timer, 0.0);
    }

    #[test]
    fn test_cooldown_gates_spawning() {
        let mut wave = WaveState::new();
        assert!(wave.can_spawn(0, 0.0));
        wave.last_spawn_at = Some(1.0);
        assert!(!wave.can_spawn(0, 1.1));
        assert!(wave.can_spawn(0, 1.0 + SPAWN_COOLDOWN_SECS));
        // At target: never
        assert!(!wave.can_spawn(5, 100.0));
    }

    #[test]
    fn test_spawn_one_orb_inside_bounds_heading_inward() {
        let mut state = playing_state(3);
        spawn_orbs(&mut state, bounds());
        assert_eq!(state.orbs.len(), 1);
        assert_eq!(state.wave.last_spawn_at, Some(0.0));

        // Same tick again: cooldown blocks it
        spawn_orbs(&mut state, bounds());
        assert_eq!(state.orbs.len(), 1);

        let orb = &state.orbs[0];
        let b = bounds();
        assert!(orb.pos.x >= orb.radius && orb.pos.x <= b.width - orb.radius);
        assert!(orb.pos.y >= orb.radius && orb.pos.y <= b.height - orb.radius);
        // Within jitter of the center direction, so never heading outward
        let to_center = (b.center() - orb.pos).normalize();
        assert!(orb.vel.normalize().dot(to_center) > SPAWN_JITTER.cos() - 1e-3);
        let speed = orb.vel.length();
        assert!(speed >= SPAWN_SPEED_MIN - 0.01 && speed <= SPAWN_SPEED_MAX + 0.01);
    }

    #[test]
    fn test_spawn_point_lies_on_an_edge() {
        let b = bounds();
        for seed in 0..64 {
            let mut state = playing_state(seed);
            spawn_orbs(&mut state, b);
            let orb = &state.orbs[0];
            let r = orb.radius;
            let on_edge = orb.pos.x == r
                || orb.pos.x == b.width - r
                || orb.pos.y == r
                || orb.pos.y == b.height - r;
            assert!(on_edge, "seed {seed}: {:?} is not on an edge", orb.pos);
        }
    }

    #[test]
    fn test_spawn_mix_respects_bomb_chance() {
        let mut state = playing_state(11);
        let mut bombs = 0;
        let total = 2000;
        for i in 0..total {
            state.orbs.clear();
            state.elapsed = i as f32;
            spawn_orbs(&mut state, bounds());
            if state.orbs[0].kind == OrbKind::Bomb {
                bombs += 1;
            }
        }
        let rate = bombs as f32 / total as f32;
        assert!((rate - 0.15).abs() < 0.04, "bomb rate {rate}");
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_bombs_do_not_count_toward_density() {
        let mut state = playing_state(1);
        for _ in 0..5 {
            let id = state.next_entity_id();
            state
                .orbs
                .push(Orb::new(id, OrbKind::Bomb, Vec2::splat(100.0), Vec2::ZERO));
        }
        assert_eq!(state.normal_orb_count(), 0);
        spawn_orbs(&mut state, bounds());
        assert_eq!(state.orbs.len(), 6);
    }
}
