//! Zoom towards the icon rect

use super::LIFECYCLE_EVENTS;
use crate::config::EffectSettings;
use crate::easing::decelerate;
use crate::paint::PaintAttrib;
use crate::registry::{EffectDescriptor, EffectId, EffectVariant};
use crate::window::AnimatedWindow;
use kinesis_core::{Mat4, Point, Rect, Size};

/// Rect the window shrinks into
fn target(window: &AnimatedWindow, settings: &EffectSettings) -> Rect {
    let rect = window.rect();
    match window.icon {
        Some(icon) if !settings.zoom.from_center => icon,
        _ => {
            let s = settings.zoom.min_scale.clamp(0.0, 1.0);
            Rect::from_center(rect.center(), Size::new(rect.width() * s, rect.height() * s))
        }
    }
}

fn transform(window: &AnimatedWindow, settings: &EffectSettings) -> Mat4 {
    let rect = window.rect();
    if rect.is_empty() {
        return Mat4::IDENTITY;
    }
    let t = decelerate(window.progress(), settings.zoom.deceleration);
    let target = target(window, settings);

    let sx = 1.0 + (target.width() / rect.width() - 1.0) * t;
    let sy = 1.0 + (target.height() / rect.height() - 1.0) * t;
    let from = rect.center();
    let to = Point::lerp(from, target.center(), t);

    Mat4::translation(to.x, to.y, 0.0)
        .mul(&Mat4::scale(sx, sy, 1.0))
        .mul(&Mat4::translation(-from.x, -from.y, 0.0))
}

fn update_attrib(window: &AnimatedWindow, settings: &EffectSettings, attrib: &mut PaintAttrib) {
    if settings.zoom.fade {
        attrib.opacity *= 1.0 - window.progress().powi(3);
    }
}

pub(crate) fn descriptor() -> EffectDescriptor {
    EffectDescriptor::new(EffectId::Zoom, EffectVariant::Plain)
        .with_events(&LIFECYCLE_EVENTS)
        .with_transform(transform)
        .with_attrib(update_attrib)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::window;
    use crate::event::WindowEvent;
    use kinesis_core::Vec3;

    #[test]
    fn test_lands_on_icon() {
        let settings = EffectSettings::default();
        let mut w = window(Rect::new(100.0, 100.0, 200.0, 100.0), WindowEvent::Minimize, 0.0);
        w.icon = Some(Rect::new(500.0, 600.0, 20.0, 10.0));

        let m = transform(&w, &settings);
        let tl = m.transform_point(Vec3::new(100.0, 100.0, 0.0));
        let br = m.transform_point(Vec3::new(300.0, 200.0, 0.0));
        assert!((tl.x - 500.0).abs() < 0.01 && (tl.y - 600.0).abs() < 0.01);
        assert!((br.x - 520.0).abs() < 0.01 && (br.y - 610.0).abs() < 0.01);
    }

    #[test]
    fn test_untransformed_at_start() {
        let settings = EffectSettings::default();
        let mut w = window(Rect::new(100.0, 100.0, 200.0, 100.0), WindowEvent::Unminimize, 0.0);
        w.icon = Some(Rect::new(500.0, 600.0, 20.0, 10.0));
        // unminimize at its end is back at rest
        let p = transform(&w, &settings).transform_point(Vec3::new(100.0, 100.0, 0.0));
        assert!((p.x - 100.0).abs() < 0.01 && (p.y - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_center_zoom_without_icon() {
        let settings = EffectSettings::default();
        let w = window(Rect::new(0.0, 0.0, 100.0, 100.0), WindowEvent::Close, 0.0);
        let p = transform(&w, &settings).transform_point(Vec3::new(0.0, 0.0, 0.0));
        assert!((p.x - 50.0).abs() < 0.01 && (p.y - 50.0).abs() < 0.01);
    }
}
