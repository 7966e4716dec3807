//! Save/load persistence
//!
//! Features:
//! - Key/value `Storage` abstraction (LocalStorage on web, files natively)
//! - Best survival time
//! - Round snapshots (JSON) for resume

mod storage;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::MemoryStorage;

use crate::sim::RoundState;

/// Storage key for the best survival time
pub const BEST_TIME_KEY: &str = "gravity_well_best_time";
/// Storage key for a saved round
pub const SNAPSHOT_KEY: &str = "gravity_well_save";
/// Best time when nothing has been stored yet
pub const NO_BEST_TIME: f32 = 0.0;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// String key/value store in the shape of the browser's LocalStorage
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Read the best time, falling back to [`NO_BEST_TIME`] when absent or unreadable
pub fn load_best_time(storage: &dyn Storage) -> f32 {
    let raw = match storage.get_item(BEST_TIME_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("No best time stored, starting fresh");
            return NO_BEST_TIME;
        }
        Err(e) => {
            log::warn!("Could not read best time: {e}");
            return NO_BEST_TIME;
        }
    };

    match serde_json::from_str::<f32>(&raw) {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            log::info!("Loaded best time {seconds:.1}s");
            seconds
        }
        Ok(seconds) => {
            log::warn!("Ignoring out-of-range best time {seconds}");
            NO_BEST_TIME
        }
        Err(e) => {
            log::warn!("Ignoring corrupt best time {raw:?}: {e}");
            NO_BEST_TIME
        }
    }
}

pub fn save_best_time(storage: &dyn Storage, seconds: f32) -> Result<()> {
    storage.set_item(BEST_TIME_KEY, &serde_json::to_string(&seconds)?)?;
    log::info!("Best time saved ({seconds:.1}s)");
    Ok(())
}

pub fn save_snapshot(storage: &dyn Storage, state: &RoundState) -> Result<()> {
    storage.set_item(SNAPSHOT_KEY, &state.to_json()?)?;
    log::info!("Round saved (wave {}, {:.1}s)", state.wave.current, state.elapsed);
    Ok(())
}

/// The saved round, if any
pub fn load_snapshot(storage: &dyn Storage) -> Result<Option<RoundState>> {
    match storage.get_item(SNAPSHOT_KEY)? {
        Some(json) => Ok(Some(RoundState::from_json(&json)?)),
        None => Ok(None),
    }
}

pub fn clear_snapshot(storage: &dyn Storage) -> Result<()> {
    storage.remove_item(SNAPSHOT_KEY)
}
