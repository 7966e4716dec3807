//! Host-side round container
//!
//! Owns the live round, persists the best time when a round ends, and turns
//! the external begin signal into lifecycle transitions.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::persistence::{self, Storage};
use crate::sim::{Bounds, Phase, RoundState, TickInput, apply_input, tick};

/// A lifecycle transition observed between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

impl PhaseChange {
    /// The round just ended (either way)
    pub fn ended_round(&self) -> bool {
        matches!(self.to, Phase::Result | Phase::Victory)
    }
}

pub struct Session<S: Storage> {
    state: RoundState,
    last_phase: Phase,
    storage: S,
    /// Seeds for the rounds after the first
    seeds: Pcg32,
}

impl<S: Storage> Session<S> {
    pub fn new(storage: S, bounds: Bounds, seed: u64) -> Self {
        let best_time = persistence::load_best_time(&storage);
        let mut seeds = Pcg32::seed_from_u64(seed);
        let state = RoundState::new(bounds, seeds.random(), best_time);
        Self {
            last_phase: state.phase,
            state,
            storage,
            seeds,
        }
    }

    /// Run one host frame. Returns the transition since the previous frame, if any.
    pub fn frame(&mut self, input: &TickInput, real_dt: f32, bounds: Bounds) -> Option<PhaseChange> {
        apply_input(&mut self.state, input);
        if input.has_hand {
            self.state.ready();
        }

        tick(&mut self.state, real_dt, bounds);

        let current = self.state.phase;
        if current == self.last_phase {
            return None;
        }
        let change = PhaseChange {
            from: self.last_phase,
            to: current,
        };
        self.last_phase = current;

        if self.state.is_over() {
            self.record_best_time();
        }
        Some(change)
    }

    /// External begin signal (tap, key, button)
    pub fn begin(&mut self, bounds: Bounds) {
        match self.state.phase {
            Phase::Init => self.state.ready(),
            Phase::Start => self.state.begin(),
            Phase::Result | Phase::Victory => {
                let seed = self.seeds.random();
                self.state = self.state.restarted(bounds, seed);
                log::info!("New round ready (best {:.1}s)", self.state.best_time);
            }
            Phase::Playing => {}
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        self.state.to_json()
    }

    /// Replace the live round, e.g. with a loaded save
    pub fn restore(&mut self, state: RoundState) {
        self.last_phase = state.phase;
        self.state = state;
    }

    fn record_best_time(&mut self) {
        let elapsed = self.state.elapsed;
        if elapsed <= self.state.best_time {
            return;
        }
        log::info!(
            "New best time {:.1}s (was {:.1}s)",
            elapsed,
            self.state.best_time
        );
        self.state.best_time = elapsed;
        if let Err(e) = persistence::save_best_time(&self.storage, elapsed) {
            log::warn!("Failed to save best time: {e}");
        }
    }
}
