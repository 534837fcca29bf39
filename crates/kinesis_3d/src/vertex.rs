//! Vertex formats handed to the host renderer

/// Vertex emitted by the grid geometry emitter
///
/// `tex_coord` is `(s, t, q)`; renderers divide `s` and `t` by `q` per fragment.
/// Without projective correction `q` is `1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    /// Deformed screen position (z is normalized depth)
    pub position: [f32; 3],
    /// Projective texture coordinate
    pub tex_coord: [f32; 3],
}

impl QuadVertex {
    pub fn new(position: [f32; 3], tex_coord: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

/// Vertex of an extruded polygon, in polygon-local space
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PolygonVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Vertex of a particle quad
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

/// Indexed triangle list reused from frame to frame
#[derive(Clone, Debug)]
pub struct GeometryBatch<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> Default for GeometryBatch<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> GeometryBatch<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Drop contents but keep capacity for the next frame
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles in the batch
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a quad from four vertex indices (top-left, top-right, bottom-left, bottom-right)
    pub fn push_quad(&mut self, tl: u32, tr: u32, bl: u32, br: u32) {
        self.indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }
}
