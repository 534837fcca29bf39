//! Incremental clip bookkeeping

use super::PolygonSet;
use crate::region::PaintClip;
use kinesis_core::{Affine2D, EngineError, Point, Rect, Result};
use smallvec::SmallVec;
use std::ops::Range;

/// A painted region together with the polygons that fall inside it
#[derive(Clone, Debug)]
pub struct Clip {
    pub rect: Rect,
    pub texture_matrix: Affine2D,
    /// Indices of polygons whose footprint overlaps `rect`
    pub intersecting: SmallVec<[usize; 8]>,
    /// For each intersecting polygon in order, one texture coordinate per
    /// vertex (front ring then back ring)
    pub tex_coords: Vec<[f32; 2]>,
}

impl Clip {
    fn new(clip: &PaintClip) -> Self {
        Self {
            rect: clip.rect,
            texture_matrix: clip.texture_matrix,
            intersecting: SmallVec::new(),
            tex_coords: Vec::new(),
        }
    }

    fn same_region(&self, clip: &PaintClip) -> bool {
        self.rect == clip.rect && self.texture_matrix == clip.texture_matrix
    }
}

impl PolygonSet {
    /// Start a new frame; clips stored next are compared from index 0
    pub fn begin_frame(&mut self) {
        self.clip_cursor = 0;
        self.group_start = 0;
    }

    /// Record a clip for this frame
    ///
    /// If the clip at the current index matches the previous frame's clip at the
    /// same index it is kept as is. Otherwise every stored clip from this index
    /// on is dropped and the new clip appended.
    pub fn store_clip(&mut self, clip: &PaintClip) -> Result<()> {
        if self.clip_cursor > self.clips.len() {
            tracing::warn!(
                "clip cursor {} past {} stored clips, resynchronizing",
                self.clip_cursor,
                self.clips.len()
            );
            self.clip_cursor = self.clips.len();
            self.group_start = self.group_start.min(self.clip_cursor);
        }

        let k = self.clip_cursor;
        if let Some(existing) = self.clips.get(k) {
            if existing.same_region(clip) {
                self.clip_cursor += 1;
                return Ok(());
            }
            tracing::trace!("clip sequence diverged at {}, dropping {} clips", k, self.clips.len() - k);
            self.clips.truncate(k);
            self.first_unprocessed = self.first_unprocessed.min(k);
        }

        if self.clips.len() >= self.max_clips {
            return Err(EngineError::Allocation(format!(
                "clip list full ({} clips)",
                self.max_clips
            )));
        }
        self.clips.try_reserve(1)?;
        self.clips.push(Clip::new(clip));
        self.clip_cursor += 1;
        Ok(())
    }

    /// All stored clips, including ones not stored again this frame
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Clips stored since the last draw
    pub fn current_group(&self) -> Range<usize> {
        self.group_start..self.clip_cursor
    }

    /// Match every clip not processed yet against all polygon footprints
    ///
    /// Front vertices map through the clip's texture matrix directly; back
    /// vertices reuse the coordinate of the front vertex they sit behind so both
    /// faces share the same texture footprint.
    pub fn intersect_polygons_with_clips(&mut self) {
        let end = self.clip_cursor.min(self.clips.len());
        if self.first_unprocessed >= end {
            return;
        }

        let polygons = &self.polygons;
        for clip in &mut self.clips[self.first_unprocessed..end] {
            clip.intersecting.clear();
            clip.tex_coords.clear();

            for (index, polygon) in polygons.iter().enumerate() {
                if !polygon.bounding_box.intersects_rect(&clip.rect) {
                    continue;
                }
                clip.intersecting.push(index);

                let start = clip.tex_coords.len();
                for vertex in &polygon.vertices[..polygon.sides] {
                    let world = polygon.center_start + *vertex;
                    let tex = clip
                        .texture_matrix
                        .transform_point(Point::new(world.x, world.y));
                    clip.tex_coords.push([tex.x, tex.y]);
                }
                for back in 0..polygon.sides {
                    let front = clip.tex_coords[start + polygon.sides - 1 - back];
                    clip.tex_coords.push(front);
                }
            }
        }
        self.first_unprocessed = end;
    }

    /// Forget polygon matches, e.g. after re-tessellation
    pub(crate) fn invalidate_clip_intersections(&mut self) {
        for clip in &mut self.clips {
            clip.intersecting.clear();
            clip.tex_coords.clear();
        }
        self.first_unprocessed = 0;
    }
}
