//! Fade

use super::LIFECYCLE_EVENTS;
use crate::config::EffectSettings;
use crate::event::WindowEvent;
use crate::paint::PaintAttrib;
use crate::registry::{EffectDescriptor, EffectId, EffectVariant};
use crate::window::AnimatedWindow;

fn update_attrib(window: &AnimatedWindow, settings: &EffectSettings, attrib: &mut PaintAttrib) {
    let p = window.progress();
    attrib.opacity *= 1.0 - p;
    attrib.brightness *= 1.0 + (settings.fade.dim_to - 1.0) * p;
}

pub(crate) fn descriptor() -> EffectDescriptor {
    let mut events = LIFECYCLE_EVENTS.to_vec();
    events.extend([WindowEvent::Shade, WindowEvent::Unshade]);
    EffectDescriptor::new(EffectId::Fade, EffectVariant::Plain)
        .with_events(&events)
        .with_attrib(update_attrib)
}
