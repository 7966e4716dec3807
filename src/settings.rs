//! Host settings and preferences
//!
//! Persisted as JSON in the same key/value storage as the best time.
//! Gameplay tuning is not configurable here; see `consts` and the `sim`
//! subsystem tables.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;
use crate::persistence::{self, Storage};
use crate::sim::{Bounds, RoundState};

/// Host settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation host ===
    /// Fixed RNG seed (otherwise taken from the clock)
    pub seed: Option<u64>,
    /// Largest frame delta handed to the simulation (never above 50 ms)
    pub max_frame_dt: f32,
    /// Play-area size for headless runs
    pub width: f32,
    pub height: f32,

    // === Demo ===
    /// Drive the well with the autopilot
    pub autopilot: bool,
    /// Frames to simulate in a headless run
    pub demo_frames: u32,
    /// Frames per second of a headless run
    pub frame_rate: f32,

    // === Storage ===
    /// Native data directory (best time, settings, saves)
    pub data_dir: Option<String>,

    // === Accessibility ===
    /// Suppress the full-screen flash
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            max_frame_dt: MAX_FRAME_DT,
            width: 1280.0,
            height: 720.0,

            autopilot: true,
            demo_frames: 60 * 120,
            frame_rate: 60.0,

            data_dir: None,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "gravity_well_settings";

    /// Clamp a wall-clock delta to the configured ceiling
    pub fn clamp_frame_dt(&self, dt: f32) -> f32 {
        let ceiling = if self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0 {
            self.max_frame_dt.min(MAX_FRAME_DT)
        } else {
            MAX_FRAME_DT
        };
        if dt.is_finite() { dt.clamp(0.0, ceiling) } else { 0.0 }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Flash intensity the renderer should draw (respects reduced_motion)
    pub fn effective_screen_flash(&self, state: &RoundState) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            state.screen_flash
        }
    }

    /// Load settings, falling back to defaults on absence or parse failure
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Invalid stored settings, using defaults: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {e}"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &dyn Storage) -> persistence::Result<()> {
        storage.set_item(Self::STORAGE_KEY, &serde_json::to_string(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Apply `GRAVITY_WELL_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; invalid values are logged and ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("GRAVITY_WELL_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => self.seed = Some(parsed),
                Err(_) => log::warn!("Invalid GRAVITY_WELL_SEED '{}', ignoring", seed),
            }
        }

        if let Some(frames) = lookup("GRAVITY_WELL_FRAMES") {
            match frames.parse::<u32>() {
                Ok(parsed) => self.demo_frames = parsed,
                Err(_) => log::warn!("Invalid GRAVITY_WELL_FRAMES '{}', ignoring", frames),
            }
        }

        if let Some(autopilot) = lookup("GRAVITY_WELL_AUTOPILOT") {
            match autopilot.to_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.autopilot = true,
                "0" | "false" | "off" | "no" => self.autopilot = false,
                _ => log::warn!("Invalid GRAVITY_WELL_AUTOPILOT '{}', ignoring", autopilot),
            }
        }

        if let Some(dir) = lookup("GRAVITY_WELL_DATA_DIR") {
            if dir.is_empty() {
                log::warn!("GRAVITY_WELL_DATA_DIR is empty, ignoring");
            } else {
                self.data_dir = Some(dir);
            }
        }

        if let Some(width) = lookup("GRAVITY_WELL_WIDTH") {
            match width.parse::<f32>() {
                Ok(parsed) if parsed.is_finite() && parsed >= 100.0 => self.width = parsed,
                _ => log::warn!("GRAVITY_WELL_WIDTH must be a number >= 100, ignoring"),
            }
        }

        if let Some(height) = lookup("GRAVITY_WELL_HEIGHT") {
            match height.parse::<f32>() {
                Ok(parsed) if parsed.is_finite() && parsed >= 100.0 => self.height = parsed,
                _ => log::warn!("GRAVITY_WELL_HEIGHT must be a number >= 100, ignoring"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_missing_or_corrupt() {
        let storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        storage.set_item(Settings::STORAGE_KEY, "{oops").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let storage = MemoryStorage::new();
        let settings = Settings {
            seed: Some(9),
            reduced_motion: true,
            width: 900.0,
            ..Settings::default()
        };
        settings.save(&storage).unwrap();
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set_item(Settings::STORAGE_KEY, r#"{"autopilot": false}"#)
            .unwrap();
        let settings = Settings::load(&storage);
        assert!(!settings.autopilot);
        assert_eq!(settings.frame_rate, Settings::default().frame_rate);
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[
            ("GRAVITY_WELL_SEED", "1234"),
            ("GRAVITY_WELL_FRAMES", "600"),
            ("GRAVITY_WELL_AUTOPILOT", "off"),
            ("GRAVITY_WELL_DATA_DIR", "/tmp/gw"),
            ("GRAVITY_WELL_WIDTH", "1024"),
        ]));
        assert_eq!(settings.seed, Some(1234));
        assert_eq!(settings.demo_frames, 600);
        assert!(!settings.autopilot);
        assert_eq!(settings.data_dir.as_deref(), Some("/tmp/gw"));
        assert_eq!(settings.width, 1024.0);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[
            ("GRAVITY_WELL_SEED", "abc"),
            ("GRAVITY_WELL_AUTOPILOT", "maybe"),
            ("GRAVITY_WELL_HEIGHT", "5"),
            ("GRAVITY_WELL_DATA_DIR", ""),
        ]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_frame_dt_never_exceeds_ceiling() {
        let mut settings = Settings {
            max_frame_dt: 1.0,
            ..Settings::default()
        };
        assert_eq!(settings.clamp_frame_dt(0.5), MAX_FRAME_DT);
        settings.max_frame_dt = 0.02;
        assert_eq!(settings.clamp_frame_dt(0.5), 0.02);
        assert_eq!(settings.clamp_frame_dt(f32::NAN), 0.0);
        assert_eq!(settings.clamp_frame_dt(0.01), 0.01);
    }

    #[test]
    fn test_reduced_motion_hides_flash() {
        let mut state = RoundState::new(Bounds::new(800.0, 600.0), 1, 0.0);
        state.screen_flash = 0.8;
        let mut settings = Settings::default();
        assert_eq!(settings.effective_screen_flash(&state), 0.8);
        settings.reduced_motion = true;
        assert_eq!(settings.effective_screen_flash(&state), 0.0);
    }
}
