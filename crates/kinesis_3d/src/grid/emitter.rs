//! Geometry emission for deformed grid models

use super::GridModel;
use crate::region::PaintClip;
use crate::vertex::{GeometryBatch, QuadVertex};
use kinesis_core::Point;
use smallvec::SmallVec;

/// Smallest Q value emitted; keeps the per-fragment divide finite when a row
/// collapses to a point.
pub const MIN_Q: f32 = 1e-4;

/// Turns a [`GridModel`] into textured quads for a set of paint clips
///
/// Each clip is split along the model's column and row lines. The start and
/// end coordinate of the clip are always emitted, so a clip ending part way into
/// a cell still gets that cell covered. Every sub-grid row is emitted as its
/// own strip with its boundary vertices duplicated, which keeps texture
/// coordinates continuous across rows.
#[derive(Clone, Debug, Default)]
pub struct GeometryEmitter {
    columns: Vec<f32>,
    rows: Vec<f32>,
    row_q: Vec<f32>,
}

#[derive(Clone, Copy)]
struct Span {
    cell: usize,
    frac: f32,
    coord: f32,
}

impl GeometryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit geometry for every clip into `batch`, replacing its contents
    ///
    /// With `needs_q` the texture coordinate is emitted as `(s*q, t*q, q)` where
    /// `q` is the interpolated ratio of a row's deformed width to its rest width.
    pub fn emit(
        &mut self,
        model: &GridModel,
        clips: &[PaintClip],
        needs_q: bool,
        batch: &mut GeometryBatch<QuadVertex>,
    ) {
        batch.clear();
        self.columns.clear();
        self.columns.extend(model.column_positions());
        self.rows.clear();
        self.rows.extend(model.row_positions());
        self.compute_row_q(model, needs_q);

        let window = model.rect();
        if window.is_empty() {
            return;
        }

        for clip in clips {
            let Some(area) = clip.rect.intersection(&window) else {
                continue;
            };

            let xs = spans(
                &self.columns,
                (area.x() - window.x()) / window.width(),
                (area.right() - window.x()) / window.width(),
                window.x(),
                window.width(),
            );
            let ys = spans(
                &self.rows,
                (area.y() - window.y()) / window.height(),
                (area.bottom() - window.y()) / window.height(),
                window.y(),
                window.height(),
            );

            let row_len = xs.len() as u32;
            for pair in ys.windows(2) {
                let base = batch.vertices.len() as u32;
                for y in pair {
                    for x in &xs {
                        batch.vertices.push(self.vertex(model, clip, x, y));
                    }
                }
                for c in 0..row_len - 1 {
                    batch.push_quad(base + c, base + c + 1, base + row_len + c, base + row_len + c + 1);
                }
            }
        }
    }

    fn compute_row_q(&mut self, model: &GridModel, needs_q: bool) {
        self.row_q.clear();
        let width = model.size().width;
        let rest = model.rect().width() * model.scale().x;
        for j in 0..model.size().height {
            let q = match (needs_q, model.object(0, j), model.object(width - 1, j)) {
                (true, Some(left), Some(right)) if rest.abs() > f32::EPSILON => {
                    let deformed = (right.position.x + right.offset.x)
                        - (left.position.x + left.offset.x);
                    (deformed / rest).abs().max(MIN_Q)
                }
                _ => 1.0,
            };
            self.row_q.push(q);
        }
    }

    fn vertex(&self, model: &GridModel, clip: &PaintClip, x: &Span, y: &Span) -> QuadVertex {
        let width = model.size().width;
        let objects = model.objects();
        let at = |i: usize, j: usize| &objects[j * width as usize + i];
        let (i, u) = (x.cell, x.frac);
        let (j, v) = (y.cell, y.frac);

        let p00 = at(i, j);
        let p10 = at(i + 1, j);
        let p01 = at(i, j + 1);
        let p11 = at(i + 1, j + 1);

        let w00 = (1.0 - u) * (1.0 - v);
        let w10 = u * (1.0 - v);
        let w01 = (1.0 - u) * v;
        let w11 = u * v;

        let px = w00 * (p00.position.x + p00.offset.x)
            + w10 * (p10.position.x + p10.offset.x)
            + w01 * (p01.position.x + p01.offset.x)
            + w11 * (p11.position.x + p11.offset.x);
        let py = w00 * (p00.position.y + p00.offset.y)
            + w10 * (p10.position.y + p10.offset.y)
            + w01 * (p01.position.y + p01.offset.y)
            + w11 * (p11.position.y + p11.offset.y);
        let pz = w00 * p00.offset.z + w10 * p10.offset.z + w01 * p01.offset.z + w11 * p11.offset.z;

        let tex = clip.texture_matrix.transform_point(Point::new(x.coord, y.coord));
        let s = tex.x
            + w00 * p00.offset_tex_coord.x
            + w10 * p10.offset_tex_coord.x
            + w01 * p01.offset_tex_coord.x
            + w11 * p11.offset_tex_coord.x;
        let t = tex.y
            + w00 * p00.offset_tex_coord.y
            + w10 * p10.offset_tex_coord.y
            + w01 * p01.offset_tex_coord.y
            + w11 * p11.offset_tex_coord.y;

        let q = self.row_q[j] + (self.row_q[j + 1] - self.row_q[j]) * v;
        QuadVertex::new([px, py, pz], [s * q, t * q, q])
    }
}

/// Sub-grid coordinates covering `[lo, hi]` (normalized), with the model cell
/// each one falls in and its fraction across that cell
fn spans(lines: &[f32], lo: f32, hi: f32, origin: f32, extent: f32) -> SmallVec<[Span; 32]> {
    let mut out = SmallVec::new();
    let first = lines.partition_point(|&g| g <= lo);
    let last = lines.partition_point(|&g| g < hi);

    out.push(locate(lines, lo, origin, extent));
    for &g in &lines[first..last.max(first)] {
        out.push(locate(lines, g, origin, extent));
    }
    out.push(locate(lines, hi, origin, extent));
    out
}

fn locate(lines: &[f32], g: f32, origin: f32, extent: f32) -> Span {
    let cells = lines.len() - 1;
    let cell = lines
        .partition_point(|&l| l <= g)
        .saturating_sub(1)
        .min(cells - 1);
    let span = lines[cell + 1] - lines[cell];
    let frac = if span > 0.0 {
        ((g - lines[cell]) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Span {
        cell,
        frac,
        coord: origin + g * extent,
    }
}
