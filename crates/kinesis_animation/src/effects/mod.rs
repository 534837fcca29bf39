//! Built-in effects
//!
//! Every effect is a small module exposing a [`EffectDescriptor`]. Effects are
//! written for the hiding direction (minimize, close, shade); appearing events
//! play them with progress running from 1 back to 0.

mod explode;
mod fade;
mod magic_lamp;
mod particle_fx;
mod restack;
mod roll_up;
mod wave;
mod zoom;

use crate::event::WindowEvent;
use crate::registry::EffectDescriptor;

/// Events that map and unmap a window
pub(crate) const LIFECYCLE_EVENTS: [WindowEvent; 4] = [
    WindowEvent::Minimize,
    WindowEvent::Unminimize,
    WindowEvent::Close,
    WindowEvent::Open,
];

pub(crate) fn builtin() -> Vec<EffectDescriptor> {
    vec![
        fade::descriptor(),
        zoom::descriptor(),
        magic_lamp::descriptor(),
        wave::descriptor(),
        roll_up::descriptor(),
        explode::descriptor(),
        particle_fx::burn_descriptor(),
        particle_fx::beam_up_descriptor(),
        restack::focus_fade_descriptor(),
        restack::dodge_descriptor(),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::EffectSettings;
    use crate::event::WindowEvent;
    use crate::matching::{WindowInfo, WindowKind};
    use crate::registry::EffectEnv;
    use crate::timing::AnimationTimer;
    use crate::window::{AnimatedWindow, WindowId};
    use kinesis_3d::{GridModel, GridSize, ModelGeometry};
    use kinesis_core::{Rect, Size, Vec2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub const SCREEN: Size = Size::new(1000.0, 800.0);

    /// A window running `event` with `remaining_ms` of a 110ms run left
    ///
    /// With the default 10ms step, progress is `1 - remaining_ms / 100`.
    pub fn window(rect: Rect, event: WindowEvent, remaining_ms: f32) -> AnimatedWindow {
        let mut window = AnimatedWindow::new(WindowId(1), WindowInfo::new(WindowKind::Normal), ModelGeometry::new(rect));
        window.event = event;
        window.timer = AnimationTimer::new(110.0, 10.0);
        window.timer.remaining_ms = remaining_ms;
        window
    }

    pub fn attach_model(window: &mut AnimatedWindow, size: GridSize, shade: bool) {
        let mut model = GridModel::new(size, window.geometry, shade).unwrap();
        model.init_objects(window.rect(), Vec2::ONE, window.rect().origin);
        window.model = Some(model);
    }

    pub fn with_env<T>(settings: &EffectSettings, f: impl FnOnce(&mut EffectEnv<'_>) -> T) -> T {
        let mut rng = StdRng::seed_from_u64(42);
        let mut env = EffectEnv {
            settings,
            screen: SCREEN,
            rng: &mut rng,
            max_polygons: 4096,
            max_clips: 1024,
        };
        f(&mut env)
    }
}
