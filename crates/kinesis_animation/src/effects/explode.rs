//! Explode
//!
//! The window shatters into extruded pieces that fly away from its center
//! while tumbling, fading out together over the end of the run.

use super::LIFECYCLE_EVENTS;
use crate::config::EffectSettings;
use crate::paint::PaintAttrib;
use crate::registry::{EffectDescriptor, EffectEnv, EffectId, EffectVariant};
use crate::window::AnimatedWindow;
use kinesis_3d::polygon::{FadeMode, PolygonSet};
use kinesis_3d::PaintClip;
use kinesis_core::{EngineError, Result, Size, Vec3};
use rand::Rng;
use std::f32::consts::PI;

fn init(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) -> Result<()> {
    let all_settings: &EffectSettings = env.settings;
    let settings = &all_settings.explode;
    let rect = window.rect();

    let mut set = PolygonSet::new();
    set.max_polygons = env.max_polygons;
    set.max_clips = env.max_clips;
    set.fade_mode = FadeMode::All {
        duration: settings.fade_duration.clamp(0.0, 1.0),
    };
    set.correct_perspective = settings.correct_perspective.into();
    set.tessellate(
        rect,
        settings.grid_x,
        settings.grid_y,
        settings.thickness,
        settings.shape.into(),
        env.screen.width,
    )?;

    let center = rect.center();
    let reach = env.screen.width.max(env.screen.height) * 0.5 * settings.spoke_multiplier;
    for polygon in set.polygons_mut() {
        let dx = polygon.center_start.x - center.x;
        let dy = polygon.center_start.y - center.y;
        let len = (dx * dx + dy * dy).sqrt();
        let (ux, uy) = if len > 0.001 {
            (dx / len, dy / len)
        } else {
            let angle = env.rng.gen_range(0.0..2.0 * PI);
            (angle.cos(), angle.sin())
        };
        let distance = reach * env.rng.gen_range(0.5..1.0);

        polygon.start_rel_pos = Vec3::ZERO;
        polygon.final_rel_pos = Vec3::new(ux * distance, uy * distance, env.rng.gen_range(0.1..0.6));
        polygon.rotation_axis = random_axis(env);
        polygon.start_rotation_angle = 0.0;
        let turns = env.rng.gen_range(PI..3.0 * PI);
        polygon.final_rotation_angle = if env.rng.gen_bool(0.5) { turns } else { -turns };
        polygon.move_start_time = 0.0;
        polygon.move_duration = 1.0;
    }

    window.polygons = Some(set);
    Ok(())
}

fn random_axis(env: &mut EffectEnv<'_>) -> Vec3 {
    let axis = Vec3::new(
        env.rng.gen_range(-1.0..1.0),
        env.rng.gen_range(-1.0..1.0),
        env.rng.gen_range(-1.0..1.0),
    );
    if axis.length() < 0.01 {
        Vec3::Z
    } else {
        axis.normalize()
    }
}

fn step(window: &mut AnimatedWindow, _env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let p = window.progress();
    if let Some(set) = window.polygons.as_mut() {
        set.animate(p);
    }
}

fn store_clip(window: &mut AnimatedWindow, clip: &PaintClip) -> Result<()> {
    polygons(window)?.store_clip(clip)
}

fn draw(window: &mut AnimatedWindow, attrib: &PaintAttrib, screen: Size) -> Result<()> {
    let p = window.progress();
    let id = window.id;
    let Some(set) = window.polygons.as_mut() else {
        return Err(EngineError::StaleState(format!("window {} has no polygons", id)));
    };
    set.draw(p, attrib.opacity, screen, &mut window.polygon_frame)
}

fn polygons(window: &mut AnimatedWindow) -> Result<&mut PolygonSet> {
    let id = window.id;
    window
        .polygons
        .as_mut()
        .ok_or_else(|| EngineError::StaleState(format!("window {} has no polygons", id)))
}

pub(crate) fn descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::Explode, EffectVariant::Polygon)
        .with_events(&LIFECYCLE_EVENTS)
        .with_init(init)
        .with_step(step)
        .with_custom_geometry(store_clip, draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TessellationKind;
    use crate::effects::test_support::{window, with_env, SCREEN};
    use crate::event::WindowEvent;
    use kinesis_core::Rect;

    fn settings() -> EffectSettings {
        let mut settings = EffectSettings::default();
        settings.explode.grid_x = 4;
        settings.explode.grid_y = 3;
        settings
    }

    #[test]
    fn test_init_tessellates_and_aims_outward() {
        let settings = settings();
        let mut w = window(Rect::new(100.0, 100.0, 400.0, 300.0), WindowEvent::Close, 100.0);
        with_env(&settings, |env| init(&mut w, env)).unwrap();

        let set = w.polygons.as_ref().unwrap();
        assert_eq!(set.polygons().len(), 12);
        let center = w.rect().center();
        for polygon in set.polygons() {
            let outward = (polygon.center_start.x - center.x) * polygon.final_rel_pos.x
                + (polygon.center_start.y - center.y) * polygon.final_rel_pos.y;
            assert!(outward > 0.0);
            assert!((polygon.rotation_axis.length() - 1.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_hexagonal_shape_from_settings() {
        let mut settings = settings();
        settings.explode.shape = TessellationKind::Hexagonal;
        let mut w = window(Rect::new(0.0, 0.0, 400.0, 300.0), WindowEvent::Close, 100.0);
        with_env(&settings, |env| init(&mut w, env)).unwrap();
        // (grid_y + 1) * grid_x + (grid_y + 1) / 2
        assert_eq!(w.polygons.as_ref().unwrap().polygons().len(), 18);
    }

    #[test]
    fn test_polygon_limit_aborts_init() {
        let settings = settings();
        let mut w = window(Rect::new(0.0, 0.0, 400.0, 300.0), WindowEvent::Close, 100.0);
        let result = with_env(&settings, |env| {
            env.max_polygons = 4;
            init(&mut w, env)
        });
        assert!(matches!(result, Err(EngineError::Allocation(_))));
        assert!(w.polygons.is_none());
    }

    #[test]
    fn test_frame_through_clips() {
        let settings = settings();
        let mut w = window(Rect::new(0.0, 0.0, 400.0, 300.0), WindowEvent::Close, 60.0);
        with_env(&settings, |env| {
            init(&mut w, env).unwrap();
            step(&mut w, env);
        });

        w.polygons.as_mut().unwrap().begin_frame();
        let rect = w.rect();
        store_clip(&mut w, &PaintClip::whole_window(rect)).unwrap();
        draw(&mut w, &PaintAttrib::default(), SCREEN).unwrap();
        assert_eq!(w.polygon_frame.draws.len(), 12);
        assert!(!w.polygon_frame.batch.is_empty());
    }

    #[test]
    fn test_init_starts_from_fresh_set() {
        let settings = settings();
        let mut w = window(Rect::new(0.0, 0.0, 400.0, 300.0), WindowEvent::Close, 60.0);
        let rect = w.rect();
        let mut leftover = PolygonSet::new();
        leftover
            .tessellate(rect, 4, 3, 10.0, settings.explode.shape.into(), SCREEN.width)
            .unwrap();
        leftover.begin_frame();
        leftover.store_clip(&PaintClip::whole_window(rect)).unwrap();
        w.polygons = Some(leftover);

        with_env(&settings, |env| init(&mut w, env)).unwrap();
        let set = w.polygons.as_ref().unwrap();
        assert_eq!(set.polygons().len(), 12);
        assert!(set.clips().is_empty());
    }

    #[test]
    fn test_missing_polygons_is_stale() {
        let mut w = window(Rect::new(0.0, 0.0, 400.0, 300.0), WindowEvent::Close, 60.0);
        let rect = w.rect();
        assert!(matches!(
            store_clip(&mut w, &PaintClip::whole_window(rect)),
            Err(EngineError::StaleState(_))
        ));
    }
}
