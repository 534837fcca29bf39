//! Rectangular and hexagonal tessellation

use super::{PolygonObject, PolygonSet, TessellationKey, TessellationShape};
use crate::bounds::BoundingBox;
use kinesis_core::{EngineError, Point, Rect, Result, Vec3};
use smallvec::SmallVec;

/// Cells narrower or shorter than this shrink the requested grid
pub const MIN_CELL_SIZE: f32 = 10.0;

/// Grid count after enforcing [`MIN_CELL_SIZE`]
fn clamp_grid(requested: u32, extent: f32) -> u32 {
    let max_cells = (extent / MIN_CELL_SIZE).floor().max(1.0) as u32;
    requested.clamp(1, max_cells)
}

impl PolygonSet {
    /// Tessellate `rect` into extruded cells
    ///
    /// `thickness` is in pixels and is normalized by `screen_width` for depth.
    /// Storage is only reallocated when the cell count or shape changes; the
    /// return value tells whether that happened. Polygon data is recomputed
    /// when the window moved or resized. With the same layout, rect, thickness
    /// and screen width the call leaves polygons and clips untouched.
    ///
    /// On failure all polygon storage is released.
    pub fn tessellate(
        &mut self,
        rect: Rect,
        grid_x: u32,
        grid_y: u32,
        thickness: f32,
        shape: TessellationShape,
        screen_width: f32,
    ) -> Result<bool> {
        match self.tessellate_inner(rect, grid_x, grid_y, thickness, shape, screen_width) {
            Ok(reallocated) => Ok(reallocated),
            Err(err) => {
                tracing::error!("tessellation of {:?} failed: {}", rect, err);
                self.release();
                Err(err)
            }
        }
    }

    fn tessellate_inner(
        &mut self,
        rect: Rect,
        grid_x: u32,
        grid_y: u32,
        thickness: f32,
        shape: TessellationShape,
        screen_width: f32,
    ) -> Result<bool> {
        if rect.is_empty() {
            return Err(EngineError::Geometry(format!("cannot tessellate {:?}", rect)));
        }
        if screen_width <= 0.0 {
            return Err(EngineError::Geometry(format!(
                "screen width {} is not positive",
                screen_width
            )));
        }

        let grid_x = clamp_grid(grid_x, rect.width());
        let grid_y = clamp_grid(grid_y, rect.height());
        let count = match shape {
            TessellationShape::Rectangular => (grid_x * grid_y) as usize,
            TessellationShape::Hexagonal => {
                ((grid_y + 1) * grid_x + (grid_y + 1) / 2) as usize
            }
        };
        if count > self.max_polygons {
            return Err(EngineError::Allocation(format!(
                "{} polygons exceed the limit of {}",
                count, self.max_polygons
            )));
        }

        let key = TessellationKey { shape, count };
        let unchanged = self.key == Some(key)
            && self.window_rect == rect
            && self.thickness == thickness
            && self.screen_width == screen_width
            && !self.polygons.is_empty();
        if unchanged {
            tracing::trace!("tessellation of {:?} unchanged", rect);
            return Ok(false);
        }

        let reallocated = self.key != Some(key);
        if reallocated {
            // release before allocating the new storage
            self.polygons = Vec::new();
            self.polygons.try_reserve_exact(count)?;
        } else {
            self.polygons.clear();
        }

        let half_thick = thickness / 2.0 / screen_width;
        match shape {
            TessellationShape::Rectangular => rect_cells(rect, grid_x, grid_y, half_thick, &mut self.polygons),
            TessellationShape::Hexagonal => hex_cells(rect, grid_x, grid_y, half_thick, &mut self.polygons),
        }

        self.key = Some(key);
        self.window_rect = rect;
        self.thickness = thickness;
        self.screen_width = screen_width;
        self.invalidate_clip_intersections();

        tracing::debug!(
            "tessellated {:?} into {} {:?} cells (reallocated: {})",
            rect,
            count,
            shape,
            reallocated
        );
        Ok(reallocated)
    }
}

fn rect_cells(rect: Rect, grid_x: u32, grid_y: u32, half_thick: f32, out: &mut Vec<PolygonObject>) {
    let cell_w = rect.width() / grid_x as f32;
    let cell_h = rect.height() / grid_y as f32;

    for y in 0..grid_y {
        for x in 0..grid_x {
            let left = rect.x() + x as f32 * cell_w;
            let top = rect.y() + y as f32 * cell_h;
            let ring = [
                Point::new(left, top),
                Point::new(left + cell_w, top),
                Point::new(left + cell_w, top + cell_h),
                Point::new(left, top + cell_h),
            ];
            out.push(build_polygon(&ring, half_thick, rect));
        }
    }
}

fn hex_cells(rect: Rect, grid_x: u32, grid_y: u32, half_thick: f32, out: &mut Vec<PolygonObject>) {
    let cell_w = rect.width() / grid_x as f32;
    let cell_h = rect.height() / grid_y as f32;
    let hw = cell_w / 2.0;
    let clamp = |p: Point| {
        Point::new(
            p.x.clamp(rect.x(), rect.right()),
            p.y.clamp(rect.y(), rect.bottom()),
        )
    };

    for row in 0..=grid_y {
        let cy = rect.y() + row as f32 * cell_h;
        let odd = row % 2 == 1;
        let columns = if odd { grid_x + 1 } else { grid_x };
        for col in 0..columns {
            let cx = if odd {
                rect.x() + col as f32 * cell_w
            } else {
                rect.x() + (col as f32 + 0.5) * cell_w
            };
            let ring = [
                clamp(Point::new(cx, cy - cell_h * 2.0 / 3.0)),
                clamp(Point::new(cx + hw, cy - cell_h / 3.0)),
                clamp(Point::new(cx + hw, cy + cell_h / 3.0)),
                clamp(Point::new(cx, cy + cell_h * 2.0 / 3.0)),
                clamp(Point::new(cx - hw, cy + cell_h / 3.0)),
                clamp(Point::new(cx - hw, cy - cell_h / 3.0)),
            ];
            out.push(build_polygon(&ring, half_thick, rect));
        }
    }
}

/// Extrude a screen-space ring into a polygon object
fn build_polygon(ring: &[Point], half_thick: f32, window: Rect) -> PolygonObject {
    let sides = ring.len();
    let inv = 1.0 / sides as f32;
    let cx = ring.iter().map(|p| p.x).sum::<f32>() * inv;
    let cy = ring.iter().map(|p| p.y).sum::<f32>() * inv;
    let center = Vec3::new(cx, cy, 0.0);

    let mut vertices: SmallVec<[Vec3; 12]> = SmallVec::new();
    let mut bounding_box = BoundingBox::empty();
    for p in ring {
        vertices.push(Vec3::new(p.x - cx, p.y - cy, half_thick));
        bounding_box.expand_to_include(Vec3::new(p.x, p.y, half_thick));
        bounding_box.expand_to_include(Vec3::new(p.x, p.y, -half_thick));
    }
    for p in ring.iter().rev() {
        vertices.push(Vec3::new(p.x - cx, p.y - cy, -half_thick));
    }

    let back_of = |k: usize| (sides + (sides - 1 - k)) as u16;
    let mut side_indices: SmallVec<[u16; 24]> = SmallVec::new();
    let mut normals: SmallVec<[Vec3; 8]> = SmallVec::new();
    normals.push(Vec3::Z);
    normals.push(-Vec3::Z);
    for i in 0..sides {
        let j = (i + 1) % sides;
        side_indices.extend_from_slice(&[i as u16, j as u16, back_of(j), back_of(i)]);

        let a = vertices[i];
        let b = vertices[j];
        let mut normal = Vec3::new(b.y - a.y, -(b.x - a.x), 0.0).normalize();
        let mid = Vec3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, 0.0);
        if normal.dot(mid) < 0.0 {
            normal = -normal;
        }
        normals.push(normal);
    }

    let rel = |v: f32, origin: f32, extent: f32| {
        if extent > 0.0 {
            (v - origin) / extent
        } else {
            0.0
        }
    };

    PolygonObject {
        sides,
        vertices,
        side_indices,
        normals,
        bounding_box,
        center_start: center,
        center,
        center_rel_pos: Point::new(
            rel(cx, window.x(), window.width()),
            rel(cy, window.y(), window.height()),
        ),
        rotation_axis: Vec3::Z,
        rotation_angle: 0.0,
        start_rel_pos: Vec3::ZERO,
        final_rel_pos: Vec3::ZERO,
        start_rotation_angle: 0.0,
        final_rotation_angle: 0.0,
        move_start_time: 0.0,
        move_duration: 1.0,
        fade_start_time: 0.0,
        fade_duration: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaintClip;

    fn rect_set(grid: u32) -> PolygonSet {
        let mut set = PolygonSet::new();
        set.tessellate(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            grid,
            grid,
            10.0,
            TessellationShape::Rectangular,
            300.0,
        )
        .unwrap();
        set
    }

    #[test]
    fn test_three_by_three_rectangles() {
        let set = rect_set(3);
        assert_eq!(set.polygons().len(), 9);
        for polygon in set.polygons() {
            assert_eq!(polygon.sides, 4);
            assert_eq!(polygon.vertices.len(), 8);
            assert_eq!(polygon.side_indices.len(), 16);
            assert_eq!(polygon.normals.len(), 6);
        }

        let first = &set.polygons()[0];
        assert!((first.center_start.x - 50.0 / 3.0).abs() < 0.001);
        // thickness 10 over a 300px wide screen
        assert!((first.vertices[0].z - 10.0 / 600.0).abs() < 0.0001);
        assert!((first.vertices[4].z + 10.0 / 600.0).abs() < 0.0001);
    }

    #[test]
    fn test_back_ring_mirrors_front() {
        let set = rect_set(2);
        let polygon = &set.polygons()[0];
        for front in 0..polygon.sides {
            let back = polygon.back_of(front);
            assert_eq!(polygon.vertices[front].x, polygon.vertices[back].x);
            assert_eq!(polygon.vertices[front].y, polygon.vertices[back].y);
        }
    }

    #[test]
    fn test_side_normals_point_outward() {
        let set = rect_set(1);
        let polygon = &set.polygons()[0];
        // ring is top-left, top-right, bottom-right, bottom-left; first side is the top edge
        let top = polygon.normals[2];
        assert!((top.y + 1.0).abs() < 0.001);
        let right = polygon.normals[3];
        assert!((right.x - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_retessellate_same_count_keeps_storage() {
        let mut set = rect_set(3);
        let ptr = set.polygons().as_ptr();

        let reallocated = set
            .tessellate(
                Rect::new(20.0, 20.0, 100.0, 100.0),
                3,
                3,
                10.0,
                TessellationShape::Rectangular,
                300.0,
            )
            .unwrap();
        assert!(!reallocated);
        assert_eq!(set.polygons().as_ptr(), ptr);
        assert_eq!(set.polygons().len(), 9);
        // data follows the moved window
        assert!((set.polygons()[0].center_start.x - (20.0 + 50.0 / 3.0)).abs() < 0.001);

        let reallocated = set
            .tessellate(
                Rect::new(20.0, 20.0, 100.0, 100.0),
                4,
                4,
                10.0,
                TessellationShape::Rectangular,
                300.0,
            )
            .unwrap();
        assert!(reallocated);
        assert_eq!(set.polygons().len(), 16);
    }

    #[test]
    fn test_retessellate_unchanged_keeps_animation_and_clips() {
        let mut set = rect_set(3);
        set.polygons_mut()[4].final_rel_pos = Vec3::new(40.0, -10.0, 0.2);
        set.polygons_mut()[4].final_rotation_angle = 1.5;
        set.begin_frame();
        set.store_clip(&PaintClip::whole_window(Rect::new(0.0, 0.0, 100.0, 100.0)))
            .unwrap();
        set.intersect_polygons_with_clips();
        assert_eq!(set.clips()[0].intersecting.len(), 9);
        let tex_coords = set.clips()[0].tex_coords.len();

        let reallocated = set
            .tessellate(
                Rect::new(0.0, 0.0, 100.0, 100.0),
                3,
                3,
                10.0,
                TessellationShape::Rectangular,
                300.0,
            )
            .unwrap();
        assert!(!reallocated);
        assert_eq!(set.polygons()[4].final_rel_pos, Vec3::new(40.0, -10.0, 0.2));
        assert!((set.polygons()[4].final_rotation_angle - 1.5).abs() < 0.001);
        assert_eq!(set.clips()[0].intersecting.len(), 9);
        assert_eq!(set.clips()[0].tex_coords.len(), tex_coords);

        // a thicker extrusion is a real change
        set.tessellate(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            3,
            3,
            20.0,
            TessellationShape::Rectangular,
            300.0,
        )
        .unwrap();
        assert_eq!(set.polygons()[4].final_rel_pos, Vec3::ZERO);
        assert!(set.clips()[0].intersecting.is_empty());
    }

    #[test]
    fn test_min_cell_size_shrinks_grid() {
        let mut set = PolygonSet::new();
        set.tessellate(
            Rect::new(0.0, 0.0, 40.0, 25.0),
            20,
            20,
            10.0,
            TessellationShape::Rectangular,
            300.0,
        )
        .unwrap();
        // 40px / 10 = 4 columns, 25px / 10 = 2 rows
        assert_eq!(set.polygons().len(), 8);
    }

    #[test]
    fn test_hexagon_count() {
        let mut set = PolygonSet::new();
        set.tessellate(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            3,
            3,
            10.0,
            TessellationShape::Hexagonal,
            300.0,
        )
        .unwrap();
        // rows 0..=3: 3 + 4 + 3 + 4
        assert_eq!(set.polygons().len(), 14);
        for polygon in set.polygons() {
            assert_eq!(polygon.sides, 6);
            assert_eq!(polygon.vertices.len(), 12);
            assert_eq!(polygon.side_indices.len(), 24);
            let bb = polygon.bounding_box;
            assert!(bb.min.x >= 0.0 && bb.max.x <= 100.0);
            assert!(bb.min.y >= 0.0 && bb.max.y <= 100.0);
        }
    }

    #[test]
    fn test_polygon_limit_releases_storage() {
        let mut set = rect_set(3);
        set.max_polygons = 10;
        let err = set
            .tessellate(
                Rect::new(0.0, 0.0, 100.0, 100.0),
                4,
                4,
                10.0,
                TessellationShape::Rectangular,
                300.0,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Allocation(_)));
        assert!(set.polygons().is_empty());
    }
}
