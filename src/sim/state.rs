//! Round state and core simulation types
//!
//! Everything needed to resume a round bit-for-bit lives here, including the
//! RNG, so a serialized snapshot is a complete save.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::particles::Particle;
use super::wave::WaveState;
use crate::consts::*;

/// Round lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed, no input seen yet
    Init,
    /// Waiting for the player to begin
    Start,
    /// Active gameplay, the only phase `tick` advances
    Playing,
    /// Round lost
    Result,
    /// Round won (unreachable with default tuning)
    Victory,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathReason {
    /// The well grew into a wall
    Wall,
    /// A tamed bomb was absorbed
    Bomb,
}

/// What the well is doing to orbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WellMode {
    #[default]
    Attract,
    Repel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrbKind {
    #[default]
    Normal,
    Bomb,
}

/// Taming progress of an orb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Taming {
    #[default]
    Wild,
    Capturing,
    Gold,
}

/// Play-area size in pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a circle's center so the circle stays inside the bounds.
    /// A circle wider than the bounds is centered on that axis.
    pub fn clamp_circle(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_axis(pos.x, radius, self.width),
            clamp_axis(pos.y, radius, self.height),
        )
    }
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if extent <= radius * 2.0 {
        extent / 2.0
    } else {
        value.clamp(radius, extent - radius)
    }
}

/// The player's gravity well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityWell {
    pub pos: Vec2,
    pub mode: WellMode,
    /// Mirrors `RoundState::growth_radius` after every tick
    pub radius: f32,
}

impl GravityWell {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            mode: WellMode::Attract,
            radius: MIN_GROWTH_RADIUS,
        }
    }

    /// Orbs closer than this start taming while attracting
    pub fn grab_radius(&self) -> f32 {
        self.radius + GRAB_MARGIN
    }

    /// GOLD orbs closer than this are absorbed
    pub fn absorb_radius(&self) -> f32 {
        self.radius * ABSORB_FRACTION
    }
}

/// Maximum number of trail points kept per orb
pub const TRAIL_LENGTH: usize = 10;

/// A free-floating orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub kind: OrbKind,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
    pub taming: Taming,
    /// 0..=1, reaches 1 exactly when the orb turns GOLD
    pub capture_progress: f32,
}

impl Orb {
    pub fn new(id: u32, kind: OrbKind, pos: Vec2, vel: Vec2) -> Self {
        let radius = match kind {
            OrbKind::Normal => ORB_RADIUS,
            OrbKind::Bomb => BOMB_RADIUS,
        };
        Self {
            id,
            pos,
            vel,
            radius,
            kind,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
            taming: Taming::Wild,
            capture_progress: 0.0,
        }
    }

    pub fn is_gold(&self) -> bool {
        self.taming == Taming::Gold
    }

    /// Append current position to the trail, evicting the oldest point
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    /// Advance the taming state machine. GOLD is terminal.
    pub fn update_taming(&mut self, mode: WellMode, distance: f32, grab_radius: f32, dt: f32) {
        if self.is_gold() {
            return;
        }

        match mode {
            WellMode::Repel => {
                self.taming = Taming::Wild;
                self.capture_progress = 0.0;
            }
            WellMode::Attract if distance < grab_radius => {
                self.taming = Taming::Capturing;
                self.capture_progress += dt / CAPTURE_TIME_SECS;
                if self.capture_progress >= 1.0 {
                    self.capture_progress = 1.0;
                    self.taming = Taming::Gold;
                }
            }
            WellMode::Attract => {
                if self.taming == Taming::Capturing {
                    self.capture_progress -= CAPTURE_DECAY_PER_SEC * dt;
                    if self.capture_progress <= 0.0 {
                        self.capture_progress = 0.0;
                        self.taming = Taming::Wild;
                    }
                }
            }
        }
    }

    /// Recover from a numeric fault: park the orb at `pos`, at rest and wild
    pub fn reset_to(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.taming = Taming::Wild;
        self.capture_progress = 0.0;
        self.trail.clear();
    }
}

/// Complete round snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: Phase,
    pub well: GravityWell,
    /// Active orbs (ascending id)
    pub orbs: Vec<Orb>,
    /// Visual particles (never read by gameplay)
    pub particles: Vec<Particle>,
    pub growth_radius: f32,
    /// Round time of the last absorption (seconds)
    pub last_absorb_at: Option<f32>,
    /// Round time (seconds)
    pub elapsed: f32,
    pub wave: WaveState,
    pub combo: ComboState,
    pub death_reason: Option<DeathReason>,
    /// Longest survived round so far (seconds), carried across resets
    pub best_time: f32,
    /// Full-screen flash intensity 0..=1
    pub screen_flash: f32,
    /// Play area the round was last advanced in
    pub bounds: Bounds,
    pub rng: Pcg32,
    next_id: u32,
}

impl RoundState {
    /// Build a fresh round in `Init` with the well centered in `bounds`
    pub fn new(bounds: Bounds, seed: u64, best_time: f32) -> Self {
        Self {
            phase: Phase::Init,
            well: GravityWell::new(bounds.center()),
            orbs: Vec::new(),
            particles: Vec::new(),
            growth_radius: MIN_GROWTH_RADIUS,
            last_absorb_at: None,
            elapsed: 0.0,
            wave: WaveState::new(),
            combo: ComboState::default(),
            death_reason: None,
            best_time,
            screen_flash: 0.0,
            bounds,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Live NORMAL orbs, the population the spawner keeps topped up
    pub fn normal_orb_count(&self) -> usize {
        self.orbs
            .iter()
            .filter(|o| o.kind == OrbKind::Normal)
            .count()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Result | Phase::Victory)
    }

    /// Init -> Start once the host has seen input
    pub fn ready(&mut self) {
        if self.phase == Phase::Init {
            self.phase = Phase::Start;
        }
    }

    /// Start -> Playing
    pub fn begin(&mut self) {
        if self.phase == Phase::Start {
            log::info!("Round started");
            self.phase = Phase::Playing;
        }
    }

    /// A fresh round waiting in `Start`, keeping only the best time
    pub fn restarted(&self, bounds: Bounds, seed: u64) -> Self {
        let mut next = Self::new(bounds, seed, self.best_time);
        next.phase = Phase::Start;
        next
    }

    /// End the round. The first reason recorded wins.
    pub fn end_round(&mut self, reason: DeathReason) {
        if self.phase != Phase::Playing {
            return;
        }
        log::info!(
            "Round over ({:?}) after {:.1}s on wave {}",
            reason,
            self.elapsed,
            self.wave.current
        );
        self.phase = Phase::Result;
        self.death_reason = Some(reason);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn test_new_round_defaults() {
        let state = RoundState::new(bounds(), 7, 12.5);
        assert_eq!(state.phase, Phase::Init);
        assert_eq!(state.well.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.growth_radius, MIN_GROWTH_RADIUS);
        assert_eq!(state.well.radius, MIN_GROWTH_RADIUS);
        assert_eq!(state.wave.current, 1);
        assert!(state.orbs.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.death_reason, None);
        assert_eq!(state.best_time, 12.5);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut state = RoundState::new(bounds(), 1, 0.0);

        // Begin before ready is ignored
        state.begin();
        assert_eq!(state.phase, Phase::Init);

        state.ready();
        assert_eq!(state.phase, Phase::Start);
        state.begin();
        assert_eq!(state.phase, Phase::Playing);
        assert!(!state.is_over());

        state.end_round(DeathReason::Bomb);
        state.end_round(DeathReason::Wall);
        assert_eq!(state.phase, Phase::Result);
        assert_eq!(state.death_reason, Some(DeathReason::Bomb));
        assert!(state.is_over());
    }

    #[test]
    fn test_restart_preserves_only_best_time() {
        let mut state = RoundState::new(bounds(), 1, 3.0);
        state.ready();
        state.begin();
        state.elapsed = 40.0;
        state.best_time = 40.0;
        state.wave.current = 4;
        let id = state.next_entity_id();
        state
            .orbs
            .push(Orb::new(id, OrbKind::Normal, Vec2::ONE, Vec2::ZERO));
        state.end_round(DeathReason::Wall);

        let next = state.restarted(bounds(), 2);
        assert_eq!(next.phase, Phase::Start);
        assert_eq!(next.best_time, 40.0);
        assert_eq!(next.elapsed, 0.0);
        assert_eq!(next.wave.current, 1);
        assert!(next.orbs.is_empty());
        assert_eq!(next.death_reason, None);
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let mut state = RoundState::new(bounds(), 1, 0.0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_trail_bounded_oldest_evicted() {
        let mut orb = Orb::new(1, OrbKind::Normal, Vec2::ZERO, Vec2::ZERO);
        for i in 0..(TRAIL_LENGTH + 5) {
            orb.pos = Vec2::new(i as f32, 0.0);
            orb.record_trail();
        }
        assert_eq!(orb.trail.len(), TRAIL_LENGTH);
        assert_eq!(orb.trail.front().map(|p| p.x), Some(5.0));
        assert_eq!(orb.trail.back().map(|p| p.x), Some((TRAIL_LENGTH + 4) as f32));
    }

    #[test]
    fn test_taming_attract_reaches_gold() {
        let mut orb = Orb::new(1, OrbKind::Normal, Vec2::ZERO, Vec2::ZERO);
        orb.update_taming(WellMode::Attract, 10.0, 100.0, CAPTURE_TIME_SECS / 2.0);
        assert_eq!(orb.taming, Taming::Capturing);
        assert!((orb.capture_progress - 0.5).abs() < 1e-5);

        orb.update_taming(WellMode::Attract, 10.0, 100.0, CAPTURE_TIME_SECS);
        assert_eq!(orb.taming, Taming::Gold);
        assert_eq!(orb.capture_progress, 1.0);

        // Gold survives repel
        orb.update_taming(WellMode::Repel, 10.0, 100.0, 0.1);
        assert_eq!(orb.taming, Taming::Gold);
    }

    #[test]
    fn test_taming_repel_breaks_capture() {
        let mut orb = Orb::new(1, OrbKind::Normal, Vec2::ZERO, Vec2::ZERO);
        orb.update_taming(WellMode::Attract, 10.0, 100.0, 0.4);
        orb.update_taming(WellMode::Repel, 10.0, 100.0, 0.01);
        assert_eq!(orb.taming, Taming::Wild);
        assert_eq!(orb.capture_progress, 0.0);
    }

    #[test]
    fn test_taming_decays_out_of_reach() {
        let mut orb = Orb::new(1, OrbKind::Normal, Vec2::ZERO, Vec2::ZERO);
        orb.update_taming(WellMode::Attract, 10.0, 100.0, 0.08);
        let progress = orb.capture_progress;

        orb.update_taming(WellMode::Attract, 150.0, 100.0, 0.05);
        assert_eq!(orb.taming, Taming::Capturing);
        assert!(orb.capture_progress < progress);

        orb.update_taming(WellMode::Attract, 150.0, 100.0, 1.0);
        assert_eq!(orb.taming, Taming::Wild);
        assert_eq!(orb.capture_progress, 0.0);
    }

    #[test]
    fn test_wild_orb_out_of_reach_untouched() {
        let mut orb = Orb::new(1, OrbKind::Bomb, Vec2::ZERO, Vec2::ZERO);
        orb.update_taming(WellMode::Attract, 500.0, 100.0, 0.5);
        assert_eq!(orb.taming, Taming::Wild);
        assert_eq!(orb.capture_progress, 0.0);
    }

    #[test]
    fn test_clamp_circle() {
        let b = bounds();
        assert_eq!(b.clamp_circle(Vec2::new(-5.0, 700.0), 10.0), Vec2::new(10.0, 590.0));
        // Narrower than the circle: centered
        let tiny = Bounds::new(10.0, 600.0);
        assert_eq!(tiny.clamp_circle(Vec2::new(0.0, 300.0), 9.0).x, 5.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = RoundState::new(bounds(), 99, 1.5);
        state.ready();
        state.begin();
        let id = state.next_entity_id();
        let mut orb = Orb::new(id, OrbKind::Bomb, Vec2::new(12.25, 40.5), Vec2::new(-3.0, 1.0));
        orb.record_trail();
        state.orbs.push(orb);

        let json = state.to_json().unwrap();
        let restored = RoundState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }
}
