//! Two-pass polygon drawing

use super::{window_fraction, CorrectPerspective, FadeMode, PolygonObject, PolygonSet, OPAQUE_THRESHOLD};
use crate::vertex::{GeometryBatch, PolygonVertex};
use kinesis_core::{EngineError, Mat4, Point, Result, Size, Vec3};
use std::ops::Range;

/// Camera distance in screen widths
pub const DEFAULT_Z_CAMERA: f32 = 0.866_025_4;

/// Which pass a polygon is drawn in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPass {
    /// Fully opaque polygons, drawn first
    Opaque,
    /// Everything else, blended over the opaque pass
    Translucent,
}

/// One polygon drawn through one clip
#[derive(Clone, Debug)]
pub struct PolygonDraw {
    pub polygon: usize,
    pub clip: usize,
    pub pass: DrawPass,
    pub opacity: f32,
    /// Polygon-local to screen transform
    pub transform: Mat4,
    /// Triangles of this draw inside [`PolygonFrame::batch`]
    pub indices: Range<u32>,
}

/// Geometry produced by one [`PolygonSet::draw`] call
#[derive(Clone, Debug, Default)]
pub struct PolygonFrame {
    pub batch: GeometryBatch<PolygonVertex>,
    /// Draws in submission order: every opaque draw precedes every translucent one
    pub draws: Vec<PolygonDraw>,
}

impl PolygonFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.batch.clear();
        self.draws.clear();
    }
}

/// Shear that cancels the off-axis viewing angle at `center`
pub fn perspective_skew(center: Point, screen: Size) -> Mat4 {
    if screen.width <= 0.0 || screen.height <= 0.0 {
        return Mat4::IDENTITY;
    }
    Mat4::skew_z(
        -(center.x - screen.width / 2.0) / DEFAULT_Z_CAMERA,
        -(center.y - screen.height / 2.0) / DEFAULT_Z_CAMERA,
    )
}

fn fade_opacity(progress: f32, start: f32, duration: f32) -> f32 {
    1.0 - window_fraction(progress, start, duration)
}

impl PolygonSet {
    /// Opacity of polygon `index` at `progress` from its fade window
    pub fn polygon_opacity(&self, index: usize, progress: f32) -> f32 {
        let Some(polygon) = self.polygons.get(index) else {
            return 0.0;
        };
        match self.fade_mode {
            FadeMode::All { duration } => fade_opacity(progress, 1.0 - duration, duration),
            FadeMode::PerPolygon => {
                fade_opacity(progress, polygon.fade_start_time, polygon.fade_duration)
            }
        }
    }

    /// Polygon-local to screen transform, including perspective correction
    pub fn polygon_transform(&self, polygon: &PolygonObject, screen: Size) -> Mat4 {
        let placed = Mat4::translation(polygon.center.x, polygon.center.y, polygon.center.z)
            .mul(&Mat4::rotation_axis(polygon.rotation_axis, polygon.rotation_angle));
        match self.correct_perspective {
            CorrectPerspective::None => placed,
            CorrectPerspective::Polygon => {
                perspective_skew(Point::new(polygon.center.x, polygon.center.y), screen).mul(&placed)
            }
            CorrectPerspective::Window => {
                perspective_skew(self.window_rect.center(), screen).mul(&placed)
            }
        }
    }

    /// Build geometry for the clips stored since the previous draw
    ///
    /// Opaque polygons (opacity at or above [`OPAQUE_THRESHOLD`]) come first,
    /// translucent ones second, fully transparent ones are skipped. If the clip
    /// bookkeeping no longer addresses live polygons nothing is drawn and a
    /// [`EngineError::StaleState`] is returned.
    pub fn draw(
        &mut self,
        progress: f32,
        window_opacity: f32,
        screen: Size,
        frame: &mut PolygonFrame,
    ) -> Result<()> {
        frame.clear();
        let group = self.current_group();
        if group.start > group.end || group.end > self.clips.len() {
            self.group_start = self.clip_cursor.min(self.clips.len());
            return Err(EngineError::StaleState(format!(
                "clip group {:?} outside {} stored clips",
                group,
                self.clips.len()
            )));
        }

        self.intersect_polygons_with_clips();
        self.validate_group(group.clone())?;

        for pass in [DrawPass::Opaque, DrawPass::Translucent] {
            for clip_index in group.clone() {
                let clip = &self.clips[clip_index];
                let mut offset = 0;
                for &polygon_index in &clip.intersecting {
                    let polygon = &self.polygons[polygon_index];
                    let tex = &clip.tex_coords[offset..offset + 2 * polygon.sides];
                    offset += 2 * polygon.sides;

                    let opacity = self.polygon_opacity(polygon_index, progress) * window_opacity;
                    if opacity <= 0.0 {
                        continue;
                    }
                    let polygon_pass = if opacity >= OPAQUE_THRESHOLD {
                        DrawPass::Opaque
                    } else {
                        DrawPass::Translucent
                    };
                    if polygon_pass != pass {
                        continue;
                    }

                    let start = frame.batch.indices.len() as u32;
                    emit_polygon(&mut frame.batch, polygon, tex);
                    frame.draws.push(PolygonDraw {
                        polygon: polygon_index,
                        clip: clip_index,
                        pass,
                        opacity,
                        transform: self.polygon_transform(polygon, screen),
                        indices: start..frame.batch.indices.len() as u32,
                    });
                }
            }
        }

        self.group_start = self.clip_cursor;
        Ok(())
    }

    fn validate_group(&self, group: Range<usize>) -> Result<()> {
        for clip in &self.clips[group] {
            let mut needed = 0;
            for &index in &clip.intersecting {
                let Some(polygon) = self.polygons.get(index) else {
                    return Err(EngineError::StaleState(format!(
                        "clip references polygon {} of {}",
                        index,
                        self.polygons.len()
                    )));
                };
                needed += 2 * polygon.sides;
            }
            if needed != clip.tex_coords.len() {
                return Err(EngineError::StaleState(format!(
                    "clip has {} texture coordinates, expected {}",
                    clip.tex_coords.len(),
                    needed
                )));
            }
        }
        Ok(())
    }
}

/// Front fan, back fan, then one quad per side
fn emit_polygon(batch: &mut GeometryBatch<PolygonVertex>, polygon: &PolygonObject, tex: &[[f32; 2]]) {
    let n = polygon.sides;
    let vertex = |i: usize, normal: Vec3| PolygonVertex {
        position: polygon.vertices[i].to_array(),
        normal: normal.to_array(),
        tex_coord: tex[i],
    };

    for (face, normal) in [(0..n, polygon.normals[0]), (n..2 * n, polygon.normals[1])] {
        let base = batch.vertices.len() as u32;
        for i in face {
            batch.vertices.push(vertex(i, normal));
        }
        for i in 1..n as u32 - 1 {
            batch.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    for (side, quad) in polygon.side_indices.chunks_exact(4).enumerate() {
        let base = batch.vertices.len() as u32;
        let normal = polygon.normals[2 + side];
        for &i in quad {
            batch.vertices.push(vertex(i as usize, normal));
        }
        batch.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
