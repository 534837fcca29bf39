//! Extruded polygon tessellation and clip bookkeeping
//!
//! A [`PolygonSet`] cuts a window into rectangular or hexagonal pieces, each
//! extruded into a thin slab with a front face, a back face and sides. Effects
//! such as explode move and rotate the pieces; drawing maps every piece back
//! onto the window texture through the clips the host paints this frame.
//!
//! # Frame protocol
//!
//! ```text
//! begin_frame()
//!   store_clip(a); store_clip(b); ...   // one call per painted region
//!   draw(...)                           // consumes the clips stored since the last draw
//!   store_clip(c); ...                  // a second group, e.g. another output
//!   draw(...)
//! ```
//!
//! Most frames repeat the previous frame's clip sequence exactly, so clips are
//! compared against what is already stored and only a diverging tail is rebuilt.

mod clip;
mod draw;
mod tessellate;

pub use clip::*;
pub use draw::*;
pub use tessellate::*;

use crate::bounds::BoundingBox;
use kinesis_core::{Point, Rect, Vec3};
use smallvec::SmallVec;

/// Opacity at or above which a polygon is drawn in the opaque pass
pub const OPAQUE_THRESHOLD: f32 = 0.9999;

/// Default cap on polygons per window
pub const DEFAULT_MAX_POLYGONS: usize = 4096;

/// Default cap on stored clips per window
pub const DEFAULT_MAX_CLIPS: usize = 1024;

/// Cell shape used when tessellating a window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TessellationShape {
    #[default]
    Rectangular,
    Hexagonal,
}

/// Skew applied before projection to cancel the off-axis camera angle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorrectPerspective {
    #[default]
    None,
    /// Each polygon is corrected around its own center
    Polygon,
    /// All polygons are corrected around the window center
    Window,
}

/// How polygon opacity fades out over the animation
///
/// Exactly one fade window applies to a polygon: either the shared window at
/// the end of the animation, or the polygon's own `fade_start_time`/`fade_duration`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeMode {
    /// All polygons fade together over the last `duration` of progress
    All { duration: f32 },
    /// Each polygon fades over its own window
    PerPolygon,
}

impl Default for FadeMode {
    fn default() -> Self {
        FadeMode::All { duration: 0.0 }
    }
}

/// One extruded piece of a window
#[derive(Clone, Debug)]
pub struct PolygonObject {
    /// Number of sides of the front face
    pub sides: usize,
    /// Front ring then back ring, relative to `center_start`
    ///
    /// The back ring is stored in mirrored order: back vertex `j` sits behind
    /// front vertex `sides - 1 - j`.
    pub vertices: SmallVec<[Vec3; 12]>,
    /// Four indices per side quad into `vertices`
    pub side_indices: SmallVec<[u16; 24]>,
    /// Front, back, then one flat normal per side
    pub normals: SmallVec<[Vec3; 8]>,
    /// Rest footprint in screen space
    pub bounding_box: BoundingBox,
    pub center_start: Vec3,
    pub center: Vec3,
    /// Center relative to the window, both axes in `[0, 1]`
    pub center_rel_pos: Point,
    pub rotation_axis: Vec3,
    pub rotation_angle: f32,
    pub start_rel_pos: Vec3,
    pub final_rel_pos: Vec3,
    pub start_rotation_angle: f32,
    pub final_rotation_angle: f32,
    pub move_start_time: f32,
    pub move_duration: f32,
    pub fade_start_time: f32,
    pub fade_duration: f32,
}

impl PolygonObject {
    /// Index of the back vertex behind front vertex `front`
    pub fn back_of(&self, front: usize) -> usize {
        self.sides + (self.sides - 1 - front)
    }
}

/// Cache key deciding whether a tessellation can reuse its storage
#[derive(Clone, Copy, Debug, PartialEq)]
struct TessellationKey {
    shape: TessellationShape,
    count: usize,
}

/// All polygons and clip records of one animating window
#[derive(Clone, Debug)]
pub struct PolygonSet {
    polygons: Vec<PolygonObject>,
    clips: Vec<Clip>,
    clip_cursor: usize,
    group_start: usize,
    first_unprocessed: usize,
    key: Option<TessellationKey>,
    window_rect: Rect,
    screen_width: f32,
    /// Extrusion depth in pixels
    pub thickness: f32,
    pub fade_mode: FadeMode,
    pub correct_perspective: CorrectPerspective,
    pub max_polygons: usize,
    pub max_clips: usize,
}

impl Default for PolygonSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonSet {
    pub fn new() -> Self {
        Self {
            polygons: Vec::new(),
            clips: Vec::new(),
            clip_cursor: 0,
            group_start: 0,
            first_unprocessed: 0,
            key: None,
            window_rect: Rect::ZERO,
            screen_width: 0.0,
            thickness: 0.0,
            fade_mode: FadeMode::default(),
            correct_perspective: CorrectPerspective::None,
            max_polygons: DEFAULT_MAX_POLYGONS,
            max_clips: DEFAULT_MAX_CLIPS,
        }
    }

    /// Set resource caps
    pub fn with_limits(mut self, max_polygons: usize, max_clips: usize) -> Self {
        self.max_polygons = max_polygons;
        self.max_clips = max_clips;
        self
    }

    pub fn with_fade_mode(mut self, fade_mode: FadeMode) -> Self {
        self.fade_mode = fade_mode;
        self
    }

    pub fn with_correct_perspective(mut self, mode: CorrectPerspective) -> Self {
        self.correct_perspective = mode;
        self
    }

    pub fn polygons(&self) -> &[PolygonObject] {
        &self.polygons
    }

    pub fn polygons_mut(&mut self) -> &mut [PolygonObject] {
        &mut self.polygons
    }

    /// Window rect of the last tessellation
    pub fn window_rect(&self) -> Rect {
        self.window_rect
    }

    /// Release all polygon and clip storage
    pub fn release(&mut self) {
        self.polygons = Vec::new();
        self.clips = Vec::new();
        self.clip_cursor = 0;
        self.group_start = 0;
        self.first_unprocessed = 0;
        self.key = None;
    }

    /// Screen area touched by the moved polygons, for damage
    pub fn damage_rect(&self) -> Option<Rect> {
        let mut bounds = BoundingBox::empty();
        for polygon in &self.polygons {
            let delta = polygon.center - polygon.center_start;
            let reach = polygon
                .vertices
                .iter()
                .map(|v| (v.x * v.x + v.y * v.y).sqrt())
                .fold(0.0f32, f32::max);
            let c = polygon.center_start + delta;
            bounds.expand_to_include(Vec3::new(c.x - reach, c.y - reach, c.z));
            bounds.expand_to_include(Vec3::new(c.x + reach, c.y + reach, c.z));
        }
        bounds.to_rect()
    }

    /// Advance every polygon's movement to `progress`
    pub fn animate(&mut self, progress: f32) {
        for polygon in &mut self.polygons {
            let t = window_fraction(progress, polygon.move_start_time, polygon.move_duration);
            let rel = polygon.start_rel_pos + (polygon.final_rel_pos - polygon.start_rel_pos) * t;
            polygon.center = polygon.center_start + rel;
            polygon.rotation_angle = polygon.start_rotation_angle
                + (polygon.final_rotation_angle - polygon.start_rotation_angle) * t;
        }
    }
}

/// Fraction of `[start, start + duration]` covered at `progress`
pub(crate) fn window_fraction(progress: f32, start: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        ((progress - start) / duration).clamp(0.0, 1.0)
    } else if progress >= start {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fraction() {
        assert!((window_fraction(0.5, 0.25, 0.5) - 0.5).abs() < 0.001);
        assert!((window_fraction(0.1, 0.25, 0.5)).abs() < 0.001);
        assert!((window_fraction(1.0, 0.25, 0.5) - 1.0).abs() < 0.001);
        assert!((window_fraction(0.3, 0.3, 0.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_animate_moves_and_rotates() {
        let mut set = PolygonSet::new();
        set.tessellate(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            2,
            2,
            10.0,
            TessellationShape::Rectangular,
            1000.0,
        )
        .unwrap();
        for polygon in set.polygons_mut() {
            polygon.final_rel_pos = Vec3::new(100.0, 0.0, 0.0);
            polygon.final_rotation_angle = 2.0;
            polygon.move_start_time = 0.5;
            polygon.move_duration = 0.5;
        }

        set.animate(0.25);
        let p = &set.polygons()[0];
        assert_eq!(p.center, p.center_start);

        set.animate(0.75);
        let p = &set.polygons()[0];
        assert!((p.center.x - p.center_start.x - 50.0).abs() < 0.001);
        assert!((p.rotation_angle - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_release() {
        let mut set = PolygonSet::new();
        set.tessellate(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            2,
            2,
            10.0,
            TessellationShape::Rectangular,
            1000.0,
        )
        .unwrap();
        set.release();
        assert!(set.polygons().is_empty());
        assert!(set.damage_rect().is_none());
    }
}
