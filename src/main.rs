//! Gravity Well entry point
//!
//! Web builds start from `platform::web`. Natively this runs a headless
//! session, driven by the autopilot, and prints a summary.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use gravity_well::autopilot;
    use gravity_well::persistence::{self, FileStorage};
    use gravity_well::platform::clock_seed;
    use gravity_well::sim::{Phase, TickInput};
    use gravity_well::{Session, Settings};

    const DEFAULT_DATA_DIR: &str = ".gravity-well";

    pub fn run() -> persistence::Result<()> {
        // Settings are stored in the data directory, so locate it from the overrides first
        let mut bootstrap = Settings::default();
        bootstrap.apply_env_overrides();
        let bootstrap_dir = bootstrap
            .data_dir
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut storage = FileStorage::new(&bootstrap_dir)?;

        let mut settings = Settings::load(&storage);
        settings.apply_env_overrides();
        if let Some(dir) = settings
            .data_dir
            .as_deref()
            .filter(|dir| storage.dir() != std::path::Path::new(dir))
        {
            storage = FileStorage::new(dir)?;
        }
        log::info!("Data directory: {}", storage.dir().display());

        let seed = settings.seed.unwrap_or_else(clock_seed);
        let bounds = settings.bounds();
        let frame_rate = if settings.frame_rate.is_finite() && settings.frame_rate > 0.0 {
            settings.frame_rate
        } else {
            log::warn!("Invalid frame rate {}, using 60", settings.frame_rate);
            60.0
        };
        let dt = settings.clamp_frame_dt(1.0 / frame_rate);
        log::info!(
            "Seed {seed}, {} frames at {frame_rate} fps, area {}x{}",
            settings.demo_frames,
            bounds.width,
            bounds.height
        );

        let mut session = Session::new(storage, bounds, seed);
        let mut rounds = 0u32;

        for _ in 0..settings.demo_frames {
            let input = if settings.autopilot {
                autopilot::drive(session.state(), bounds)
            } else {
                TickInput::default()
            };

            if let Some(change) = session.frame(&input, dt, bounds) {
                log::info!("{:?} -> {:?}", change.from, change.to);
                if change.ended_round() {
                    rounds += 1;
                    let state = session.state();
                    println!(
                        "Round {rounds}: {:?} after {:.1}s on wave {} ({:?})",
                        state.phase,
                        state.elapsed,
                        state.wave.current,
                        state.death_reason
                    );
                }
            }

            // The autopilot presses "begin" as soon as it is allowed to
            if settings.autopilot && session.state().phase != Phase::Playing {
                session.begin(bounds);
            }
        }

        let state = session.state();
        println!(
            "Finished: {} rounds, current {:?} at {:.1}s on wave {}, best {:.1}s",
            rounds,
            state.phase,
            state.elapsed,
            state.wave.current,
            state.best_time
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gravity Well (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("Headless run failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
