//! Particle pools for fire and beam effects
//!
//! A [`ParticlePool`] owns a fixed number of particles allocated once when an
//! effect starts. Dead particles (life at or below zero) are respawned in place
//! by the next generation pass; the pool never grows.
//!
//! # Example
//!
//! ```rust
//! use kinesis_3d::particles::{ParticleEmitter, ParticlePool};
//! use kinesis_core::Rect;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut fire = ParticlePool::new(200, ParticleEmitter::fire()).unwrap();
//! fire.generate(Rect::new(0.0, 100.0, 300.0, 4.0), &mut rng, 50);
//! fire.update(16.0);
//! assert!(fire.live_count() <= 200);
//! ```

mod particle;
mod pool;

pub use particle::*;
pub use pool::*;

use kinesis_core::{Color, Vec3};
use rand::Rng;
use std::ops::Range;

/// Spawn parameters for a particle pool
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleEmitter {
    /// Life lost per speed unit, sampled per particle
    pub fade: Range<f32>,
    /// Initial velocity per axis
    pub velocity_x: Range<f32>,
    pub velocity_y: Range<f32>,
    pub velocity_z: Range<f32>,
    /// Acceleration applied every update
    pub gravity: Vec3,
    /// Particle quad size in pixels
    pub width: f32,
    pub height: f32,
    pub color: Color,
    /// Random per-channel color variation
    pub color_jitter: f32,
    /// Divides positional movement; larger is slower
    pub slowdown: f32,
    /// Draw with additive blending
    pub additive: bool,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleEmitter {
    pub fn new() -> Self {
        Self {
            fade: 0.01..0.03,
            velocity_x: -1.0..1.0,
            velocity_y: -1.0..1.0,
            velocity_z: 0.0..0.0,
            gravity: Vec3::ZERO,
            width: 4.0,
            height: 4.0,
            color: Color::WHITE,
            color_jitter: 0.0,
            slowdown: 1.0,
            additive: false,
        }
    }

    pub fn with_fade(mut self, fade: Range<f32>) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_velocity(mut self, x: Range<f32>, y: Range<f32>) -> Self {
        self.velocity_x = x;
        self.velocity_y = y;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_color_jitter(mut self, jitter: f32) -> Self {
        self.color_jitter = jitter;
        self
    }

    pub fn with_slowdown(mut self, slowdown: f32) -> Self {
        self.slowdown = slowdown;
        self
    }

    pub fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Flames rising from a burning edge
    pub fn fire() -> Self {
        Self::new()
            .with_fade(0.02..0.06)
            .with_velocity(-1.5..1.5, -3.0..-0.5)
            .with_gravity(Vec3::new(0.0, -0.08, 0.0))
            .with_size(10.0, 10.0)
            .with_color(Color::rgb(1.0, 0.5, 0.1))
            .with_color_jitter(0.15)
            .with_slowdown(0.5)
            .with_additive(true)
    }

    /// Thin vertical sparks drifting upward
    pub fn beam() -> Self {
        Self::new()
            .with_fade(0.015..0.04)
            .with_velocity(-0.1..0.1, -2.0..-0.8)
            .with_gravity(Vec3::new(0.0, -0.02, 0.0))
            .with_size(2.0, 14.0)
            .with_color(Color::rgb(0.7, 0.7, 0.7))
            .with_color_jitter(0.05)
            .with_slowdown(0.6)
            .with_additive(true)
    }

    /// Sample a particle fresh from this emitter somewhere inside `area`
    pub(crate) fn spawn<R: Rng>(&self, area: kinesis_core::Rect, rng: &mut R) -> Particle {
        let jitter = |rng: &mut R, base: f32| {
            (base + sample(rng, &(-self.color_jitter..self.color_jitter))).clamp(0.0, 1.0)
        };
        Particle {
            position: Vec3::new(
                sample(rng, &(area.x()..area.right())),
                sample(rng, &(area.y()..area.bottom())),
                0.0,
            ),
            velocity: Vec3::new(
                sample(rng, &self.velocity_x),
                sample(rng, &self.velocity_y),
                sample(rng, &self.velocity_z),
            ),
            gravity: self.gravity,
            life: 1.0,
            fade: sample(rng, &self.fade),
            width: self.width,
            height: self.height,
            color: Color::rgba(
                jitter(&mut *rng, self.color.r),
                jitter(&mut *rng, self.color.g),
                jitter(&mut *rng, self.color.b),
                self.color.a,
            ),
        }
    }
}

/// Uniform sample that tolerates empty ranges
pub(crate) fn sample<R: Rng>(rng: &mut R, range: &Range<f32>) -> f32 {
    if range.start < range.end {
        rng.gen_range(range.clone())
    } else {
        range.start
    }
}
