//! Magic lamp
//!
//! The window is sucked into its icon through a narrowing neck. Rows closest
//! to the icon start first; horizontal narrowing runs ahead of the vertical
//! travel, which is what bends the outline into a lamp shape.

use super::LIFECYCLE_EVENTS;
use crate::config::EffectSettings;
use crate::easing::ease_in_out;
use crate::registry::{EffectDescriptor, EffectEnv, EffectId, EffectVariant};
use crate::window::{AnimatedWindow, EffectState};
use kinesis_3d::GridSize;
use kinesis_core::{Rect, Result, Vec3};
use std::f32::consts::PI;

fn grid_size(settings: &EffectSettings) -> GridSize {
    GridSize::new(2, settings.magic_lamp.grid_height.max(2))
}

fn init(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) -> Result<()> {
    let rect = window.rect();
    // without a taskbar entry, aim at the bottom center of the screen
    let icon = window
        .icon
        .unwrap_or_else(|| Rect::new(env.screen.width / 2.0, env.screen.height, 0.0, 0.0));
    let icon_below = icon.center().y >= rect.center().y;
    window.state = EffectState::MagicLamp { icon, icon_below };
    Ok(())
}

fn step(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let EffectState::MagicLamp { icon, icon_below } = window.state else {
        return;
    };
    let p = window.progress();
    let lamp = &env.settings.magic_lamp;
    let Some(model) = window.model.as_mut() else {
        return;
    };
    let rect = model.rect();

    for object in model.objects_mut() {
        let g = object.grid_position;
        let rest_x = rect.x() + g.x * rect.width();
        let rest_y = rect.y() + g.y * rect.height();

        let lead = if icon_below { g.y } else { 1.0 - g.y };
        let travel = ease_in_out(p * 2.0 - (1.0 - lead));
        let narrow = ease_in_out(p * 2.0 - (1.0 - lead) * 0.5);

        let target_x = icon.x() + g.x * icon.width();
        let target_y = icon.y() + g.y * icon.height();
        let wobble = lamp.wave_amplitude * (g.y * lamp.waves * PI).sin() * (travel * PI).sin();

        object.position.x = rest_x + (target_x - rest_x) * narrow + wobble;
        object.position.y = rest_y + (target_y - rest_y) * travel;
        object.offset = Vec3::ZERO;
    }
}

pub(crate) fn descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::MagicLamp, EffectVariant::Grid)
        .with_events(&LIFECYCLE_EVENTS)
        .with_grid(grid_size, true)
        .with_init(init)
        .with_step(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::{attach_model, window, with_env};
    use crate::event::WindowEvent;

    fn lamp_window(remaining_ms: f32) -> AnimatedWindow {
        let mut w = window(Rect::new(100.0, 100.0, 400.0, 300.0), WindowEvent::Minimize, remaining_ms);
        w.icon = Some(Rect::new(280.0, 760.0, 40.0, 40.0));
        attach_model(&mut w, GridSize::new(2, 20), false);
        w
    }

    #[test]
    fn test_init_records_icon() {
        let settings = EffectSettings::default();
        let mut w = lamp_window(100.0);
        with_env(&settings, |env| init(&mut w, env)).unwrap();
        assert!(matches!(w.state, EffectState::MagicLamp { icon_below: true, .. }));
    }

    #[test]
    fn test_start_is_at_rest() {
        let settings = EffectSettings::default();
        let mut w = lamp_window(100.0);
        with_env(&settings, |env| {
            init(&mut w, env).unwrap();
            step(&mut w, env);
        });
        let model = w.model.as_ref().unwrap();
        for object in model.objects() {
            let rest = model.base_position(object);
            assert!((object.position.x - rest.x).abs() < 0.001);
            assert!((object.position.y - rest.y).abs() < 0.001);
        }
    }

    #[test]
    fn test_bottom_row_reaches_icon_first() {
        let settings = EffectSettings::default();
        let mut w = lamp_window(50.0);
        with_env(&settings, |env| {
            init(&mut w, env).unwrap();
            step(&mut w, env);
        });
        let model = w.model.as_ref().unwrap();
        let bottom = model.object(0, 19).unwrap();
        let top = model.object(0, 0).unwrap();
        // halfway: the bottom edge sits in the icon, the top edge has not moved
        assert!((bottom.position.y - 800.0).abs() < 0.01);
        assert!((bottom.position.x - 280.0).abs() < 0.01);
        assert!((top.position.y - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_step_idempotent_when_finished() {
        let settings = EffectSettings::default();
        let mut w = lamp_window(50.0);
        with_env(&settings, |env| {
            init(&mut w, env).unwrap();
            step(&mut w, env);
        });
        let before: Vec<_> = w.model.as_ref().unwrap().objects().to_vec();
        w.timer.remaining_ms = 0.0;
        with_env(&settings, |env| step(&mut w, env));
        assert_eq!(w.model.as_ref().unwrap().objects(), before.as_slice());
    }
}
