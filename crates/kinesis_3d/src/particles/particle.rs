//! Individual particle data

use kinesis_core::{Color, Vec3};

/// A single particle
///
/// `life` runs from 1 down to 0; a particle at or below zero is dead and free
/// to be respawned.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub gravity: Vec3,
    pub life: f32,
    /// Life lost per speed unit
    pub fade: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            gravity: Vec3::ZERO,
            life: 0.0,
            fade: 0.0,
            width: 0.0,
            height: 0.0,
            color: Color::TRANSPARENT,
        }
    }
}

impl Particle {
    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Advance by `speed` units (one unit is 50ms)
    pub fn update(&mut self, speed: f32, slowdown: f32) {
        if self.is_dead() {
            return;
        }
        let slowdown = if slowdown > 0.0 { slowdown } else { 1.0 };

        self.position = self.position + self.velocity * (speed / slowdown);
        self.velocity = self.velocity + self.gravity * speed;
        self.life -= self.fade * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dead() {
        assert!(Particle::default().is_dead());
    }

    #[test]
    fn test_update_integrates() {
        let mut p = Particle {
            velocity: Vec3::new(2.0, 0.0, 0.0),
            gravity: Vec3::new(0.0, 1.0, 0.0),
            life: 1.0,
            fade: 0.25,
            ..Default::default()
        };
        p.update(2.0, 1.0);
        assert!((p.position.x - 4.0).abs() < 0.001);
        assert!((p.velocity.y - 2.0).abs() < 0.001);
        assert!((p.life - 0.5).abs() < 0.001);

        p.update(2.0, 1.0);
        assert!(p.is_dead());
        let frozen = p.clone();
        p.update(2.0, 1.0);
        assert_eq!(p, frozen);
    }
}
