//! Kinesis 3D
//!
//! Geometry generation for window animations. Everything here runs once per
//! displayed frame on the compositor thread, so the common path reuses
//! buffers from the previous frame instead of allocating.
//!
//! # Features
//!
//! - **Grid Model**: deformable mesh of control points covering a window
//! - **Geometry Emitter**: bilinear sub-grid emission with projective (Q) texture coordinates
//! - **Polygon Set**: rectangular/hexagonal extruded tessellation with incremental clip bookkeeping
//! - **Particles**: fixed-capacity particle pools for fire and beam effects
//!
//! # Example
//!
//! ```rust
//! use kinesis_3d::polygon::{PolygonSet, TessellationShape};
//! use kinesis_core::Rect;
//!
//! let mut set = PolygonSet::new();
//! let window = Rect::new(0.0, 0.0, 100.0, 100.0);
//! set.tessellate(window, 3, 3, 10.0, TessellationShape::Rectangular, 300.0)
//!     .unwrap();
//! assert_eq!(set.polygons().len(), 9);
//! ```

pub mod bounds;
pub mod grid;
pub mod particles;
pub mod polygon;
pub mod region;
pub mod vertex;

pub use bounds::BoundingBox;
pub use grid::{GeometryEmitter, GridModel, GridObject, GridSize, ModelGeometry};
pub use particles::{Particle, ParticleEmitter, ParticlePool};
pub use polygon::{
    Clip, CorrectPerspective, DrawPass, FadeMode, PolygonDraw, PolygonFrame, PolygonObject,
    PolygonSet, TessellationShape,
};
pub use region::PaintClip;
pub use vertex::{GeometryBatch, ParticleVertex, PolygonVertex, QuadVertex};
