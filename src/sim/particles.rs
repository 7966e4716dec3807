//! Decorative particles
//!
//! Spawned by absorptions, decayed every tick. Gameplay never reads them.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum live particles; oldest are dropped first
pub const MAX_PARTICLES: usize = 256;

const SPEED_MIN: f32 = 60.0;
const SPEED_MAX: f32 = 220.0;
const SIZE_MIN: f32 = 2.0;
const SIZE_MAX: f32 = 5.0;
const LIFETIME_MIN: f32 = 0.4;
const LIFETIME_MAX: f32 = 0.9;
/// Per-tick velocity decay
const DRAG: f32 = 0.96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at birth, removed at 0
    pub life: f32,
    /// Seconds for `life` to go from 1 to 0
    pub lifetime: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
}

/// Create `count` particles at `origin` flying in random directions
pub fn burst<R: Rng>(rng: &mut R, origin: Vec2, count: usize, color: u32) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(SPEED_MIN..SPEED_MAX);
            Particle {
                pos: origin,
                vel: Vec2::from_angle(angle) * speed,
                life: 1.0,
                lifetime: rng.random_range(LIFETIME_MIN..LIFETIME_MAX),
                color,
                size: rng.random_range(SIZE_MIN..SIZE_MAX),
            }
        })
        .collect()
}

/// Age, move and drag every particle; drop the dead ones
pub fn advance(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        particle.life -= dt / particle.lifetime;
        particle.pos += particle.vel * dt;
        particle.vel *= DRAG;
    }
    particles.retain(|p| p.life > 0.0);
}

/// Append new particles, dropping the oldest beyond `MAX_PARTICLES`
pub fn push_capped(particles: &mut Vec<Particle>, new: Vec<Particle>) {
    particles.extend(new);
    if particles.len() > MAX_PARTICLES {
        let excess = particles.len() - MAX_PARTICLES;
        particles.drain(..excess);
    }
}
