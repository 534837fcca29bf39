//! Deformable grid meshes
//!
//! A [`GridModel`] overlays a window with a lattice of control points. Effects
//! move the control points every frame and the [`GeometryEmitter`] turns the
//! lattice into textured quads for whichever screen regions need repainting.

mod emitter;
mod model;

pub use emitter::*;
pub use model::*;
