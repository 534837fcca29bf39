//! Post-animation cleanup

use crate::event::{DirectionOverride, WindowEvent};
use crate::paint_chain::PaintChain;
use crate::registry::EffectId;
use crate::window::{AnimatedWindow, DeferredAction, EffectState};

/// Return a window to idle and hand back its postponed host actions
///
/// Polygons, particles and effect state are released. The grid model is kept
/// so the next run of the same size can reuse it.
pub fn finish_animation(window: &mut AnimatedWindow, chain: &mut PaintChain) -> Vec<DeferredAction> {
    tracing::debug!(
        "window {}: {} finished ({})",
        window.id,
        window.effect,
        window.event.name()
    );

    window.prev_event = window.event;
    window.event = WindowEvent::None;
    window.effect = EffectId::None;
    window.timer.finish();
    window.direction = DirectionOverride::None;

    if let Some(mut polygons) = window.polygons.take() {
        polygons.release();
    }
    window.particles.clear();
    window.state = EffectState::None;
    window.clip_override = None;
    window.polygon_frame.clear();
    window.quads.clear();

    chain.unlink(window.id);
    window.deferred.drain(..).collect()
}
