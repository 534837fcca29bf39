//! Paint regions requested by the host

use kinesis_core::{Affine2D, Rect};

/// One screen-space rectangle the host wants painted this frame
///
/// `texture_matrix` maps an undeformed screen position inside the window to
/// the window texture's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintClip {
    pub rect: Rect,
    pub texture_matrix: Affine2D,
}

impl PaintClip {
    pub fn new(rect: Rect, texture_matrix: Affine2D) -> Self {
        Self {
            rect,
            texture_matrix,
        }
    }

    /// Clip covering a whole window with a normalized texture mapping
    pub fn whole_window(window: Rect) -> Self {
        Self::new(window, Affine2D::normalize_rect(&window))
    }
}
