//! Roll-up shading
//!
//! Uses the four-row shade model: the title bar stays fixed, the content
//! collapses under it and the bottom decoration follows the content edge.

use crate::config::EffectSettings;
use crate::event::WindowEvent;
use crate::registry::{EffectDescriptor, EffectEnv, EffectId, EffectVariant};
use crate::window::AnimatedWindow;
use kinesis_3d::grid::SHADE_ROWS;
use kinesis_3d::GridSize;

fn grid_size(settings: &EffectSettings) -> GridSize {
    GridSize::new(settings.roll_up.grid_width.max(2), SHADE_ROWS)
}

fn step(window: &mut AnimatedWindow, _env: &mut EffectEnv<'_>) {
    if window.timer.is_finished() {
        return;
    }
    let p = window.progress();
    let Some(model) = window.model.as_mut() else {
        return;
    };
    if !model.is_shade() {
        return;
    }
    let geometry = *model.geometry();
    let rect = geometry.rect;
    let columns = model.size().width as usize;

    let title_bottom = rect.y() + geometry.top_height;
    let content_rest = rect.bottom() - geometry.bottom_height;
    let content_bottom = content_rest + (title_bottom - content_rest) * p;

    for (i, object) in model.objects_mut().iter_mut().enumerate() {
        object.position.x = rect.x() + object.grid_position.x * rect.width();
        object.position.y = match i / columns {
            0 => rect.y(),
            1 => title_bottom,
            2 => content_bottom,
            _ => content_bottom + geometry.bottom_height,
        };
    }
}

pub(crate) fn descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::RollUp, EffectVariant::Grid)
        .with_events(&[WindowEvent::Shade, WindowEvent::Unshade])
        .with_grid(grid_size, false)
        .with_step(step)
}
