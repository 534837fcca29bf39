//! Particle effects: burn and beam-up

use super::LIFECYCLE_EVENTS;
use crate::config::EffectSettings;
use crate::paint::PaintAttrib;
use crate::registry::{EffectDescriptor, EffectEnv, EffectId, EffectVariant};
use crate::window::AnimatedWindow;
use kinesis_3d::{GridSize, ParticleEmitter, ParticlePool};
use kinesis_core::{Color, Rect, Result};

/// Fraction of a pool respawned per 100ms while the effect is emitting
const RESPAWN_PER_100MS: f32 = 0.2;

/// Height of the band fire is spawned in, in pixels
const BURN_BAND: f32 = 4.0;

fn spawn_budget(pool: &ParticlePool, elapsed_ms: f32) -> usize {
    let share = RESPAWN_PER_100MS * elapsed_ms / 100.0;
    ((pool.capacity() as f32 * share).ceil() as usize).max(1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Burn
// ─────────────────────────────────────────────────────────────────────────────

fn burn_grid_size(_settings: &EffectSettings) -> GridSize {
    GridSize::new(2, 2)
}

fn smoke(size: f32, slowdown: f32) -> ParticleEmitter {
    ParticleEmitter::new()
        .with_fade(0.01..0.025)
        .with_velocity(-0.5..0.5, -1.5..-0.3)
        .with_size(size * 2.0, size * 2.0)
        .with_color(Color::rgba(0.3, 0.3, 0.3, 0.6))
        .with_color_jitter(0.05)
        .with_slowdown(slowdown * 1.5)
}

fn burn_init(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) -> Result<()> {
    let burn = &env.settings.burn;
    let fire = ParticleEmitter::fire()
        .with_size(burn.size, burn.size)
        .with_color(burn.color())
        .with_slowdown(burn.slowdown);

    window.particles.clear();
    window.particles.try_reserve_exact(2)?;
    window.particles.push(ParticlePool::new(burn.particles, fire)?);
    if burn.smoke {
        let count = (burn.particles / 4).max(1);
        window.particles.push(ParticlePool::new(count, smoke(burn.size, burn.slowdown))?);
    }
    window.clip_override = Some(window.rect());
    Ok(())
}

/// The burning edge runs from the top of the window down
fn burn_step(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let p = window.progress();
    let rect = window.rect();
    let elapsed = window.timer.last_advance_ms;
    let edge = rect.y() + p * rect.height();

    window.clip_override = Some(Rect::from_edges(rect.x(), edge, rect.right(), rect.bottom()));

    let burning = p < 1.0;
    let band = Rect::new(rect.x(), edge - BURN_BAND / 2.0, rect.width(), BURN_BAND);
    for pool in &mut window.particles {
        if burning {
            let budget = spawn_budget(pool, elapsed);
            pool.generate(band, &mut *env.rng, budget);
        }
        pool.update(elapsed);
    }
}

pub(crate) fn burn_descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::Burn, EffectVariant::Particle)
        .with_events(&LIFECYCLE_EVENTS)
        .with_grid(burn_grid_size, false)
        .with_init(burn_init)
        .with_step(burn_step)
}

// ─────────────────────────────────────────────────────────────────────────────
// Beam up
// ─────────────────────────────────────────────────────────────────────────────

fn beam_init(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) -> Result<()> {
    let beam = &env.settings.beam_up;
    let emitter = ParticleEmitter::beam()
        .with_size(beam.size / 3.0, beam.size * 2.0)
        .with_color(beam.color())
        .with_slowdown(beam.slowdown);
    window.particles.clear();
    window.particles.try_reserve_exact(1)?;
    window.particles.push(ParticlePool::new(beam.particles, emitter)?);
    Ok(())
}

fn beam_step(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let p = window.progress();
    let rect = window.rect();
    let elapsed = window.timer.last_advance_ms;
    for pool in &mut window.particles {
        if p < 1.0 {
            let budget = spawn_budget(pool, elapsed);
            pool.generate(rect, &mut *env.rng, budget);
        }
        pool.update(elapsed);
    }
}

fn beam_attrib(window: &AnimatedWindow, _settings: &EffectSettings, attrib: &mut PaintAttrib) {
    let p = window.progress();
    attrib.opacity *= 1.0 - p;
    attrib.brightness *= 1.0 + p;
}

pub(crate) fn beam_up_descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::BeamUp, EffectVariant::Particle)
        .with_events(&LIFECYCLE_EVENTS)
        .with_init(beam_init)
        .with_step(beam_step)
        .with_attrib(beam_attrib)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::{window, with_env};
    use crate::event::WindowEvent;

    #[test]
    fn test_burn_allocates_fixed_pools() {
        let mut settings = EffectSettings::default();
        settings.burn.particles = 40;
        let mut w = window(Rect::new(0.0, 0.0, 200.0, 100.0), WindowEvent::Close, 100.0);
        with_env(&settings, |env| burn_init(&mut w, env)).unwrap();
        assert_eq!(w.particles.len(), 2);
        assert_eq!(w.particles[0].capacity(), 40);
        assert_eq!(w.particles[1].capacity(), 10);
        assert_eq!(w.clip_override, Some(w.rect()));
    }

    #[test]
    fn test_burn_shrinks_visible_area() {
        let mut settings = EffectSettings::default();
        settings.burn.particles = 40;
        settings.burn.smoke = false;
        let mut w = window(Rect::new(0.0, 0.0, 200.0, 100.0), WindowEvent::Close, 50.0);
        with_env(&settings, |env| {
            burn_init(&mut w, env).unwrap();
            w.timer.last_advance_ms = 20.0;
            burn_step(&mut w, env);
        });
        assert_eq!(w.clip_override, Some(Rect::new(0.0, 50.0, 200.0, 50.0)));
        let pool = &w.particles[0];
        assert!(pool.live_count() > 0);
        assert!(pool.live_count() <= pool.capacity());
    }

    #[test]
    fn test_burn_reverse_grows_back() {
        let settings = EffectSettings::default();
        let mut w = window(Rect::new(0.0, 0.0, 200.0, 100.0), WindowEvent::Open, 25.0);
        with_env(&settings, |env| {
            burn_init(&mut w, env).unwrap();
            burn_step(&mut w, env);
        });
        // open at progress 0.25 from the top
        assert_eq!(w.clip_override, Some(Rect::new(0.0, 25.0, 200.0, 75.0)));
    }

    #[test]
    fn test_pool_never_exceeds_capacity_over_run() {
        let mut settings = EffectSettings::default();
        settings.beam_up.particles = 16;
        let mut w = window(Rect::new(0.0, 0.0, 200.0, 100.0), WindowEvent::Minimize, 100.0);
        with_env(&settings, |env| {
            beam_init(&mut w, env).unwrap();
            for _ in 0..10 {
                w.timer.advance(10.0);
                beam_step(&mut w, env);
                assert!(w.particles[0].live_count() <= 16);
            }
        });
    }

    #[test]
    fn test_beam_fades_window() {
        let settings = EffectSettings::default();
        let w = window(Rect::new(0.0, 0.0, 200.0, 100.0), WindowEvent::Minimize, 50.0);
        let mut attrib = PaintAttrib::default();
        beam_attrib(&w, &settings, &mut attrib);
        assert!((attrib.opacity - 0.5).abs() < 0.001);
    }
}
