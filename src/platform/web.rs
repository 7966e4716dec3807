//! Browser bindings
//!
//! The page owns the canvas, the camera/hand tracker and the render loop; it
//! feeds one input sample per animation frame into [`WebGame::frame`] and reads
//! the snapshot back for drawing.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::{clock_seed, now_ms};
use crate::autopilot;
use crate::persistence::{self, LocalStorage, MemoryStorage, Storage};
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{Bounds, TickInput};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Gravity Well starting...");
}

fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::warn!("{e}; progress will not be kept");
            Box::new(MemoryStorage::new())
        }
    }
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session<Box<dyn Storage>>,
    settings: Settings,
    bounds: Bounds,
    last_frame_ms: Option<f64>,
    /// Let the autopilot drive (attract screen)
    idle: bool,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let storage = open_storage();
        let settings = Settings::load(storage.as_ref());
        let seed = settings.seed.unwrap_or_else(clock_seed);
        let bounds = Bounds::new(width, height);
        log::info!("Session seed {seed}, area {width}x{height}");

        WebGame {
            session: Session::new(storage, bounds, seed),
            settings,
            bounds,
            last_frame_ms: None,
            idle: false,
        }
    }

    /// Advance one animation frame. Returns the new phase name when it changed.
    pub fn frame(&mut self, has_hand: bool, x: f32, y: f32, pinched: bool) -> Option<String> {
        let now = now_ms();
        let real_dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now - last) / 1000.0) as f32);
        self.last_frame_ms = Some(now);

        let input = if self.idle {
            autopilot::drive(self.session.state(), self.bounds)
        } else {
            TickInput {
                has_hand,
                cursor: has_hand.then(|| Vec2::new(x, y)),
                is_pinched: pinched,
            }
        };

        let dt = self.settings.clamp_frame_dt(real_dt);
        self.session
            .frame(&input, dt, self.bounds)
            .map(|change| {
                log::info!("{:?} -> {:?}", change.from, change.to);
                format!("{:?}", change.to)
            })
    }

    pub fn begin(&mut self) {
        self.session.begin(self.bounds);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Bounds::new(width, height);
    }

    /// Forget the frame clock after the tab was hidden
    pub fn pause_clock(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
        log::info!("Idle mode: {}", idle);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
        if let Err(e) = self.settings.save(self.session.storage().as_ref()) {
            log::warn!("Failed to save settings: {e}");
        }
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session
            .snapshot_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Save the live round to LocalStorage
    pub fn save(&self) -> Result<(), JsValue> {
        persistence::save_snapshot(self.session.storage().as_ref(), self.session.state())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Resume a saved round, if one exists. The save is consumed.
    pub fn resume_saved(&mut self) -> bool {
        let storage = self.session.storage().as_ref();
        let saved = match persistence::load_snapshot(storage) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("Discarding unreadable save: {e}");
                None
            }
        };
        if let Err(e) = persistence::clear_snapshot(storage) {
            log::warn!("Failed to clear save: {e}");
        }

        match saved {
            Some(state) => {
                log::info!("Resuming wave {} at {:.1}s", state.wave.current, state.elapsed);
                self.session.restore(state);
                self.last_frame_ms = None;
                true
            }
            None => false,
        }
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.state().phase)
    }

    pub fn best_time(&self) -> f32 {
        self.session.state().best_time
    }

    pub fn elapsed(&self) -> f32 {
        self.session.state().elapsed
    }

    pub fn wave(&self) -> u32 {
        self.session.state().wave.current
    }

    pub fn combo(&self) -> u32 {
        self.session.state().combo.count
    }

    /// Flash intensity to draw this frame
    pub fn screen_flash(&self) -> f32 {
        self.settings.effective_screen_flash(self.session.state())
    }
}
