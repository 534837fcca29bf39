//! Wave
//!
//! A bulge travels down the window, pushing both side edges outwards.

use crate::config::EffectSettings;
use crate::event::WindowEvent;
use crate::registry::{EffectDescriptor, EffectEnv, EffectId, EffectVariant};
use crate::window::{AnimatedWindow, EffectState};
use kinesis_3d::GridSize;
use kinesis_core::Result;
use std::f32::consts::PI;

fn grid_size(settings: &EffectSettings) -> GridSize {
    GridSize::new(2, settings.wave.grid_height.max(2))
}

fn init(window: &mut AnimatedWindow, env: &mut EffectEnv<'_>) -> Result<()> {
    let wave = &env.settings.wave;
    window.state = EffectState::Wave {
        half_width: (wave.half_width * window.rect().height()).max(1.0),
        amplitude: wave.amplitude,
    };
    Ok(())
}

fn step(window: &mut AnimatedWindow, _env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let EffectState::Wave { half_width, amplitude } = window.state else {
        return;
    };
    let p = window.progress();
    let Some(model) = window.model.as_mut() else {
        return;
    };
    let rect = model.rect();
    let crest = rect.y() - half_width + p * (rect.height() + 2.0 * half_width);

    for object in model.objects_mut() {
        let g = object.grid_position;
        let rest_x = rect.x() + g.x * rect.width();
        let rest_y = rect.y() + g.y * rect.height();
        let d = (rest_y - crest) / half_width;
        let push = if d.abs() < 1.0 {
            amplitude * 0.5 * (1.0 + (d * PI).cos())
        } else {
            0.0
        };
        let outward = if g.x < 0.5 { -1.0 } else { 1.0 };
        object.position.x = rest_x + outward * push;
        object.position.y = rest_y;
    }
}

pub(crate) fn descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::Wave, EffectVariant::Grid)
        .with_events(&[
            WindowEvent::Minimize,
            WindowEvent::Unminimize,
            WindowEvent::Close,
            WindowEvent::Open,
            WindowEvent::Focus,
        ])
        .with_grid(grid_size, false)
        .with_init(init)
        .with_step(step)
}
