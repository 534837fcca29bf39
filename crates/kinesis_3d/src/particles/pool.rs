//! Fixed-capacity particle pool

use super::{Particle, ParticleEmitter};
use crate::bounds::BoundingBox;
use crate::vertex::{GeometryBatch, ParticleVertex};
use kinesis_core::{Rect, Result, Vec3};
use rand::Rng;

/// Milliseconds per simulation speed unit
const MS_PER_SPEED_UNIT: f32 = 50.0;

/// A fixed set of particles recycled in place
#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    pub emitter: ParticleEmitter,
    active: bool,
    vertices: GeometryBatch<ParticleVertex>,
}

impl ParticlePool {
    /// Allocate `capacity` dead particles
    pub fn new(capacity: usize, emitter: ParticleEmitter) -> Result<Self> {
        let mut particles = Vec::new();
        particles.try_reserve_exact(capacity)?;
        particles.resize(capacity, Particle::default());

        let mut vertices = GeometryBatch::new();
        vertices.vertices.try_reserve_exact(capacity * 4)?;
        vertices.indices.try_reserve_exact(capacity * 6)?;

        Ok(Self {
            particles,
            emitter,
            active: false,
            vertices,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_dead()).count()
    }

    /// Whether any particle was alive after the last generation or update
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Respawn up to `max_new` dead particles inside `area`
    ///
    /// Returns how many particles were spawned.
    pub fn generate<R: Rng>(&mut self, area: Rect, rng: &mut R, max_new: usize) -> usize {
        let mut spawned = 0;
        for particle in self.particles.iter_mut().filter(|p| p.is_dead()).take(max_new) {
            *particle = self.emitter.spawn(area, rng);
            spawned += 1;
        }
        if spawned > 0 {
            self.active = true;
        }
        spawned
    }

    /// Advance all live particles by `dt_ms`
    pub fn update(&mut self, dt_ms: f32) {
        let speed = dt_ms / MS_PER_SPEED_UNIT;
        let slowdown = self.emitter.slowdown;
        let mut any_alive = false;
        for particle in &mut self.particles {
            particle.update(speed, slowdown);
            any_alive |= !particle.is_dead();
        }
        self.active = any_alive;
    }

    /// Kill every particle
    pub fn clear(&mut self) {
        for particle in &mut self.particles {
            particle.life = 0.0;
        }
        self.active = false;
    }

    /// Rebuild the cached quads for all live particles
    ///
    /// Alpha follows remaining life. The cache keeps its allocation between frames.
    pub fn build_vertices(&mut self) -> &GeometryBatch<ParticleVertex> {
        self.vertices.clear();
        for particle in self.particles.iter().filter(|p| !p.is_dead()) {
            let hw = particle.width / 2.0;
            let hh = particle.height / 2.0;
            let p = particle.position;
            let mut color = particle.color.to_array();
            color[3] *= particle.life.min(1.0);

            let base = self.vertices.vertices.len() as u32;
            for (dx, dy, u, v) in [(-hw, -hh, 0.0, 0.0), (hw, -hh, 1.0, 0.0), (-hw, hh, 0.0, 1.0), (hw, hh, 1.0, 1.0)] {
                self.vertices.vertices.push(ParticleVertex {
                    position: [p.x + dx, p.y + dy, p.z],
                    tex_coord: [u, v],
                    color,
                });
            }
            self.vertices.push_quad(base, base + 1, base + 2, base + 3);
        }
        &self.vertices
    }

    /// Quads from the last [`build_vertices`](Self::build_vertices)
    pub fn vertices(&self) -> &GeometryBatch<ParticleVertex> {
        &self.vertices
    }

    /// Area covered by live particles, for damage
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for particle in self.particles.iter().filter(|p| !p.is_dead()) {
            let half = Vec3::new(particle.width / 2.0, particle.height / 2.0, 0.0);
            bounds.expand_to_include(particle.position - half);
            bounds.expand_to_include(particle.position + half);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 10.0)
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pool = ParticlePool::new(16, ParticleEmitter::fire()).unwrap();

        assert_eq!(pool.generate(area(), &mut rng, 100), 16);
        assert_eq!(pool.live_count(), 16);
        // full pool: nothing dead, nothing spawned
        assert_eq!(pool.generate(area(), &mut rng, 100), 0);
        assert_eq!(pool.capacity(), 16);
        assert_eq!(pool.particles().len(), 16);
    }

    #[test]
    fn test_dead_particle_respawns() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = ParticlePool::new(4, ParticleEmitter::beam()).unwrap();
        pool.generate(area(), &mut rng, 4);

        pool.particles_mut()[2].life = -0.5;
        assert_eq!(pool.generate(area(), &mut rng, 1), 1);
        assert!((pool.particles()[2].life - 1.0).abs() < 0.001);
        assert!(area().contains(kinesis_core::Point::new(
            pool.particles()[2].position.x,
            pool.particles()[2].position.y
        )));
    }

    #[test]
    fn test_update_deactivates_when_all_dead() {
        let mut rng = StdRng::seed_from_u64(3);
        let emitter = ParticleEmitter::new().with_fade(0.5..0.5);
        let mut pool = ParticlePool::new(8, emitter).unwrap();
        pool.generate(area(), &mut rng, 8);
        assert!(pool.is_active());

        // 100ms = 2 speed units at fade 0.5 per unit
        pool.update(100.0);
        assert_eq!(pool.live_count(), 0);
        assert!(!pool.is_active());
    }

    #[test]
    fn test_vertex_cache_reused() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut pool = ParticlePool::new(32, ParticleEmitter::fire()).unwrap();
        pool.generate(area(), &mut rng, 10);

        let capacity = pool.build_vertices().vertices.capacity();
        assert_eq!(pool.build_vertices().vertices.len(), 40);
        assert_eq!(pool.build_vertices().triangle_count(), 20);

        pool.update(16.0);
        pool.build_vertices();
        assert_eq!(pool.vertices.vertices.capacity(), capacity);
    }

    #[test]
    fn test_bounding_box_covers_particles() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = ParticlePool::new(8, ParticleEmitter::fire()).unwrap();
        assert!(pool.bounding_box().is_empty());
        pool.generate(area(), &mut rng, 8);
        let bb = pool.bounding_box();
        assert!(bb.min.x >= -5.0 && bb.max.x <= 105.0);
    }
}
