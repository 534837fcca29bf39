//! Per-window animation state

use crate::dodge::DodgeDirection;
use crate::event::{DirectionOverride, WindowEvent};
use crate::matching::WindowInfo;
use crate::registry::EffectId;
use crate::timing::AnimationTimer;
use kinesis_3d::{
    GeometryBatch, GeometryEmitter, GridModel, ModelGeometry, PaintClip, ParticlePool, PolygonFrame,
    PolygonSet, QuadVertex,
};
use kinesis_core::{Rect, Vec2};
use std::collections::VecDeque;

/// Host-assigned window identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Host action postponed until the running animation finishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    Unmap,
    Destroy,
}

/// Role of a window in a dodge
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DodgeRole {
    /// The raised window
    Subject,
    /// A window moving out of the subject's way and back
    Dodger {
        subject: WindowId,
        direction: DodgeDirection,
        displacement: Vec2,
    },
}

/// Effect-specific transient data, dropped at cleanup
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EffectState {
    #[default]
    None,
    MagicLamp {
        icon: Rect,
        icon_below: bool,
    },
    Wave {
        half_width: f32,
        amplitude: f32,
    },
    Dodge(DodgeRole),
}

/// Animation record of one managed window
#[derive(Debug)]
pub struct AnimatedWindow {
    pub id: WindowId,
    pub info: WindowInfo,
    pub geometry: ModelGeometry,
    /// Minimize target on the taskbar or dock
    pub icon: Option<Rect>,
    pub mapped: bool,

    pub event: WindowEvent,
    pub prev_event: WindowEvent,
    pub effect: EffectId,
    pub timer: AnimationTimer,
    pub direction: DirectionOverride,

    pub model: Option<GridModel>,
    pub polygons: Option<PolygonSet>,
    pub particles: Vec<ParticlePool>,
    pub state: EffectState,
    /// Restricts the visible part of the window, intersected with host clips
    pub clip_override: Option<Rect>,
    pub deferred: VecDeque<DeferredAction>,

    pub(crate) emitter: GeometryEmitter,
    pub(crate) quads: GeometryBatch<QuadVertex>,
    pub(crate) polygon_frame: PolygonFrame,
    pub(crate) clip_scratch: Vec<PaintClip>,
}

impl AnimatedWindow {
    pub fn new(id: WindowId, info: WindowInfo, geometry: ModelGeometry) -> Self {
        Self {
            id,
            info,
            geometry,
            icon: None,
            mapped: true,
            event: WindowEvent::None,
            prev_event: WindowEvent::None,
            effect: EffectId::None,
            timer: AnimationTimer::idle(),
            direction: DirectionOverride::None,
            model: None,
            polygons: None,
            particles: Vec::new(),
            state: EffectState::None,
            clip_override: None,
            deferred: VecDeque::new(),
            emitter: GeometryEmitter::new(),
            quads: GeometryBatch::new(),
            polygon_frame: PolygonFrame::new(),
            clip_scratch: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.geometry.rect
    }

    pub fn is_animating(&self) -> bool {
        !self.event.is_idle() && self.timer.is_running()
    }

    /// Whether progress currently runs from 1 down to 0
    pub fn is_reversed(&self) -> bool {
        self.direction.is_reverse(self.event)
    }

    /// Effect progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.timer.progress(self.is_reversed())
    }

    pub fn has_deferred(&self, action: DeferredAction) -> bool {
        self.deferred.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::WindowKind;

    fn window() -> AnimatedWindow {
        AnimatedWindow::new(
            WindowId(1),
            WindowInfo::new(WindowKind::Normal),
            ModelGeometry::new(Rect::new(0.0, 0.0, 100.0, 100.0)),
        )
    }

    #[test]
    fn test_new_window_is_idle() {
        let window = window();
        assert!(!window.is_animating());
        assert_eq!(window.effect, EffectId::None);
        assert!(window.deferred.is_empty());
    }

    #[test]
    fn test_progress_follows_event_direction() {
        let mut window = window();
        window.event = WindowEvent::Open;
        window.timer = AnimationTimer::new(110.0, 10.0);
        assert!(window.is_animating());
        assert!((window.progress() - 1.0).abs() < 0.001);

        window.direction = DirectionOverride::Forward;
        assert!(window.progress().abs() < 0.001);
    }

    #[test]
    fn test_display_id() {
        assert_eq!(WindowId(0x2a).to_string(), "0x2a");
    }
}
