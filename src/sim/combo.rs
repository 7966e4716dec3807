//! Combo streaks
//!
//! Every absorption refills a fixed window; letting the window drain resets
//! the streak. Multiplier and growth bonus are read from monotonic tables
//! indexed by the (clamped) combo count.

use serde::{Deserialize, Serialize};

use super::state::OrbKind;

/// Time allowed between absorptions before the streak breaks (ms)
pub const COMBO_WINDOW_MS: f32 = 2000.0;
/// Combo count gained per absorbed NORMAL orb
pub const NORMAL_COMBO_STEP: u32 = 1;
/// Combo count gained per absorbed BOMB orb
pub const BOMB_COMBO_STEP: u32 = 3;

/// Score multiplier by combo count (last entry applies to any higher count)
pub const MULTIPLIERS: [f32; 8] = [1.0, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0];
/// Extra well growth (px) by combo count
pub const GROWTH_BONUS: [f32; 8] = [0.0, 0.0, 0.5, 1.0, 1.5, 2.0, 3.0, 4.0];

/// Particle colors for the combo tiers (0xRRGGBB)
pub const TIER_COLORS: [u32; 4] = [0x7fd8ff, 0x9dff7f, 0xffd84a, 0xff6ad5];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub multiplier: f32,
    /// Round time of the last scoring event (ms)
    pub last_event_ms: f32,
    /// Window left before the streak resets (ms)
    pub timer_remaining_ms: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            last_event_ms: 0.0,
            timer_remaining_ms: 0.0,
        }
    }
}

impl ComboState {
    /// Register an absorption at round time `now_ms`.
    ///
    /// Extends the streak if the window is still open, otherwise starts a new
    /// one. Bombs are worth more than normal orbs.
    pub fn on_absorbed(&mut self, kind: OrbKind, now_ms: f32) {
        let step = match kind {
            OrbKind::Normal => NORMAL_COMBO_STEP,
            OrbKind::Bomb => BOMB_COMBO_STEP,
        };

        if self.count > 0 && self.timer_remaining_ms > 0.0 {
            self.count += step;
        } else {
            self.count = step;
        }
        self.multiplier = multiplier(self.count);
        self.last_event_ms = now_ms;
        self.timer_remaining_ms = COMBO_WINDOW_MS;
    }

    /// Drain the window by `dt` seconds; an empty window resets the streak
    pub fn tick_timer(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.timer_remaining_ms -= dt * 1000.0;
        if self.timer_remaining_ms <= 0.0 {
            self.timer_remaining_ms = 0.0;
            self.count = 0;
            self.multiplier = 1.0;
        }
    }

    /// Visual tier 0..=3
    pub fn tier(&self) -> usize {
        match self.count {
            0..=2 => 0,
            3..=4 => 1,
            5..=7 => 2,
            _ => 3,
        }
    }

    pub fn tier_color(&self) -> u32 {
        TIER_COLORS[self.tier()]
    }
}

fn table_index(count: u32, len: usize) -> usize {
    (count as usize).min(len - 1)
}

/// Score multiplier for a combo count
pub fn multiplier(count: u32) -> f32 {
    MULTIPLIERS[table_index(count, MULTIPLIERS.len())]
}

/// Extra growth awarded per absorption at a combo count
pub fn growth_bonus(count: u32) -> f32 {
    GROWTH_BONUS[table_index(count, GROWTH_BONUS.len())]
}
