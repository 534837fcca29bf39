//! Kinesis Core
//!
//! Foundational types shared by the Kinesis window animation engine:
//!
//! - **Geometry**: points, sizes, rectangles, vectors and transforms in screen space
//! - **Color**: linear RGBA colors with hex parsing for configuration files
//! - **Errors**: the engine-wide error type used by tessellation, clip bookkeeping
//!   and effect initialization
//!
//! # Example
//!
//! ```rust
//! use kinesis_core::{Point, Rect};
//!
//! let window = Rect::new(10.0, 20.0, 300.0, 200.0);
//! let icon = Rect::new(0.0, 700.0, 48.0, 48.0);
//!
//! assert!(window.contains(Point::new(50.0, 50.0)));
//! assert!(!window.intersects(&icon));
//! ```

pub mod color;
pub mod error;
pub mod geometry;

pub use color::Color;
pub use error::{EngineError, Result};
pub use geometry::{Affine2D, Mat4, Point, Rect, Size, Vec2, Vec3};
