//! Restack effects: focus-fade and dodge
//!
//! Both run on the focus event and are started by the engine when it
//! processes a restack, since they need to know which windows were passed.

use crate::config::EffectSettings;
use crate::event::WindowEvent;
use crate::paint::PaintAttrib;
use crate::registry::{EffectDescriptor, EffectId, EffectVariant};
use crate::window::{AnimatedWindow, DodgeRole, EffectState};
use kinesis_core::Mat4;
use std::f32::consts::PI;

/// The raised window fades in from `start_opacity`
fn focus_fade_attrib(window: &AnimatedWindow, settings: &EffectSettings, attrib: &mut PaintAttrib) {
    let start = settings.focus_fade.start_opacity.clamp(0.0, 1.0);
    attrib.opacity *= 1.0 - (1.0 - start) * window.progress();
}

pub(crate) fn focus_fade_descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::FocusFade, EffectVariant::Restack)
        .with_events(&[WindowEvent::Focus])
        .with_attrib(focus_fade_attrib)
}

/// Dodgers move out along their displacement and return by the end
fn dodge_transform(window: &AnimatedWindow, _settings: &EffectSettings) -> Mat4 {
    match window.state {
        EffectState::Dodge(DodgeRole::Dodger { displacement, .. }) => {
            let amount = (window.progress() * PI).sin();
            Mat4::translation(displacement.x * amount, displacement.y * amount, 0.0)
        }
        _ => Mat4::IDENTITY,
    }
}

pub(crate) fn dodge_descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::Dodge, EffectVariant::Restack)
        .with_events(&[WindowEvent::Focus])
        .with_transform(dodge_transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dodge::DodgeDirection;
    use crate::effects::test_support::window;
    use crate::event::DirectionOverride;
    use crate::window::WindowId;
    use kinesis_core::{Rect, Vec2, Vec3};

    #[test]
    fn test_focus_fade_rises() {
        let settings = EffectSettings::default();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut attrib = PaintAttrib::default();
        focus_fade_attrib(&window(rect, WindowEvent::Focus, 100.0), &settings, &mut attrib);
        assert!(attrib.opacity.abs() < 0.001);

        let mut attrib = PaintAttrib::default();
        focus_fade_attrib(&window(rect, WindowEvent::Focus, 25.0), &settings, &mut attrib);
        assert!((attrib.opacity - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_dodger_peaks_mid_run() {
        let settings = EffectSettings::default();
        let mut w = window(Rect::new(0.0, 0.0, 10.0, 10.0), WindowEvent::Focus, 50.0);
        w.direction = DirectionOverride::Forward;
        w.state = EffectState::Dodge(DodgeRole::Dodger {
            subject: WindowId(9),
            direction: DodgeDirection::Right,
            displacement: Vec2::new(40.0, 0.0),
        });
        let p = dodge_transform(&w, &settings).transform_point(Vec3::ZERO);
        assert!((p.x - 40.0).abs() < 0.001);

        w.timer.remaining_ms = 100.0;
        let p = dodge_transform(&w, &settings).transform_point(Vec3::ZERO);
        assert!(p.x.abs() < 0.001);
    }

    #[test]
    fn test_subject_does_not_move() {
        let settings = EffectSettings::default();
        let mut w = window(Rect::new(0.0, 0.0, 10.0, 10.0), WindowEvent::Focus, 50.0);
        w.state = EffectState::Dodge(DodgeRole::Subject);
        assert_eq!(dodge_transform(&w, &settings), Mat4::IDENTITY);
    }
}
