//! Grid model of control points

use kinesis_core::{EngineError, Point, Rect, Result, Vec2, Vec3};

/// Number of control points along each axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn object_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Window geometry a model is laid over
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModelGeometry {
    /// Outer rect including decorations
    pub rect: Rect,
    /// Height of the top decoration (title bar)
    pub top_height: f32,
    /// Height of the bottom decoration
    pub bottom_height: f32,
}

impl ModelGeometry {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            top_height: 0.0,
            bottom_height: 0.0,
        }
    }

    pub fn with_decorations(mut self, top_height: f32, bottom_height: f32) -> Self {
        self.top_height = top_height;
        self.bottom_height = bottom_height;
        self
    }
}

/// A single control point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridObject {
    /// Normalized position within the window, both axes in `[0, 1]`
    pub grid_position: Point,
    /// Current screen-space position
    pub position: Point,
    /// Extra displacement; `z` is normalized depth
    pub offset: Vec3,
    /// Texture coordinate displacement used by fold/roll style effects
    pub offset_tex_coord: Point,
}

/// Deformable lattice covering a window
///
/// Dimensions stay fixed for the lifetime of one animation run. Use
/// [`GridModel::matches`] to decide whether an existing model can be reused.
#[derive(Clone, Debug)]
pub struct GridModel {
    objects: Vec<GridObject>,
    size: GridSize,
    geometry: ModelGeometry,
    shade: bool,
    scale: Vec2,
    scale_origin: Point,
}

/// Rows of a shade model: top edge, bottom of the title bar, top of the
/// bottom decoration, bottom edge.
pub const SHADE_ROWS: u32 = 4;

impl GridModel {
    /// Create a model and place its objects on the undeformed window
    ///
    /// Shade models always get [`SHADE_ROWS`] rows regardless of the requested height.
    pub fn new(size: GridSize, geometry: ModelGeometry, shade: bool) -> Result<Self> {
        let size = if shade {
            GridSize::new(size.width, SHADE_ROWS)
        } else {
            size
        };
        if size.width < 2 || size.height < 2 {
            return Err(EngineError::Geometry(format!(
                "grid needs at least 2x2 control points, got {}x{}",
                size.width, size.height
            )));
        }

        let mut objects = Vec::new();
        objects.try_reserve_exact(size.object_count())?;

        let rows = row_positions(size.height, &geometry, shade)?;
        for &gy in &rows {
            for i in 0..size.width {
                let gx = i as f32 / (size.width - 1) as f32;
                objects.push(GridObject {
                    grid_position: Point::new(gx, gy),
                    ..GridObject::default()
                });
            }
        }

        let mut model = Self {
            objects,
            size,
            geometry,
            shade,
            scale: Vec2::ONE,
            scale_origin: geometry.rect.origin,
        };
        model.init_objects(geometry.rect, Vec2::ONE, geometry.rect.origin);

        tracing::trace!(
            "grid model {}x{} over {:?} (shade: {})",
            size.width,
            size.height,
            geometry.rect,
            shade
        );
        Ok(model)
    }

    /// Recompute every object's base position from its grid coordinate
    ///
    /// `scale` is applied around `origin`, which lets the model compose with an
    /// external shrink transform.
    pub fn init_objects(&mut self, rect: Rect, scale: Vec2, origin: Point) {
        self.geometry.rect = rect;
        self.scale = scale;
        self.scale_origin = origin;

        for object in &mut self.objects {
            let base = Point::new(
                rect.x() + object.grid_position.x * rect.width(),
                rect.y() + object.grid_position.y * rect.height(),
            );
            object.position = Point::new(
                origin.x + (base.x - origin.x) * scale.x,
                origin.y + (base.y - origin.y) * scale.y,
            );
            object.offset = Vec3::ZERO;
            object.offset_tex_coord = Point::ZERO;
        }
    }

    /// Whether this model can serve a run with the given parameters
    pub fn matches(&self, size: GridSize, geometry: &ModelGeometry, shade: bool) -> bool {
        let size = if shade {
            GridSize::new(size.width, SHADE_ROWS)
        } else {
            size
        };
        self.size == size
            && self.shade == shade
            && self.geometry.rect.size == geometry.rect.size
            && self.geometry.top_height == geometry.top_height
            && self.geometry.bottom_height == geometry.bottom_height
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rect(&self) -> Rect {
        self.geometry.rect
    }

    pub fn geometry(&self) -> &ModelGeometry {
        &self.geometry
    }

    pub fn is_shade(&self) -> bool {
        self.shade
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn objects(&self) -> &[GridObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [GridObject] {
        &mut self.objects
    }

    /// Object at column `x`, row `y`
    pub fn object(&self, x: u32, y: u32) -> Option<&GridObject> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.objects.get((y * self.size.width + x) as usize)
    }

    /// Undeformed (but scaled) position of an object
    pub fn base_position(&self, object: &GridObject) -> Point {
        let rect = self.geometry.rect;
        let base = Point::new(
            rect.x() + object.grid_position.x * rect.width(),
            rect.y() + object.grid_position.y * rect.height(),
        );
        Point::new(
            self.scale_origin.x + (base.x - self.scale_origin.x) * self.scale.x,
            self.scale_origin.y + (base.y - self.scale_origin.y) * self.scale.y,
        )
    }

    /// Normalized x coordinate of each column
    pub fn column_positions(&self) -> impl Iterator<Item = f32> + '_ {
        self.objects[..self.size.width as usize]
            .iter()
            .map(|o| o.grid_position.x)
    }

    /// Normalized y coordinate of each row
    pub fn row_positions(&self) -> impl Iterator<Item = f32> + '_ {
        self.objects
            .iter()
            .step_by(self.size.width as usize)
            .map(|o| o.grid_position.y)
    }

    /// Screen area covered by the deformed model, used for damage
    pub fn bounding_rect(&self) -> Rect {
        let mut left = f32::INFINITY;
        let mut top = f32::INFINITY;
        let mut right = f32::NEG_INFINITY;
        let mut bottom = f32::NEG_INFINITY;
        for object in &self.objects {
            let x = object.position.x + object.offset.x;
            let y = object.position.y + object.offset.y;
            left = left.min(x);
            top = top.min(y);
            right = right.max(x);
            bottom = bottom.max(y);
        }
        Rect::from_edges(left, top, right, bottom)
    }
}

fn row_positions(height: u32, geometry: &ModelGeometry, shade: bool) -> Result<Vec<f32>> {
    let mut rows = Vec::new();
    rows.try_reserve_exact(height as usize)?;

    if shade {
        let h = geometry.rect.height();
        if h <= 0.0 {
            return Err(EngineError::Geometry(
                "shade grid over a window with no height".to_string(),
            ));
        }
        let top = (geometry.top_height / h).clamp(0.0, 1.0);
        let bottom = ((h - geometry.bottom_height) / h).clamp(top, 1.0);
        rows.extend_from_slice(&[0.0, top, bottom, 1.0]);
    } else {
        rows.extend((0..height).map(|j| j as f32 / (height - 1) as f32));
    }
    Ok(rows)
}
