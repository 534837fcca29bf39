//! Paint results handed back to the host

use kinesis_3d::{GeometryBatch, ParticleVertex, PolygonFrame, QuadVertex};
use kinesis_core::Mat4;

/// Paint attributes an effect adjusts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintAttrib {
    pub opacity: f32,
    pub brightness: f32,
    pub saturation: f32,
}

impl Default for PaintAttrib {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            brightness: 1.0,
            saturation: 1.0,
        }
    }
}

impl PaintAttrib {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// How the host should paint one window this frame
#[derive(Debug)]
pub enum PaintOutput<'a> {
    /// Not animating; paint as usual
    Untouched,
    /// Paint the window's own geometry with modified attributes and transform
    Transformed { attrib: PaintAttrib, transform: Mat4 },
    /// Replace the window geometry with deformed grid quads
    Quads {
        attrib: PaintAttrib,
        transform: Mat4,
        batch: &'a GeometryBatch<QuadVertex>,
    },
    /// Replace the window geometry with extruded polygons
    Polygons {
        attrib: PaintAttrib,
        frame: &'a PolygonFrame,
    },
    /// Draw nothing for this window this frame
    Skipped,
}

impl PaintOutput<'_> {
    pub fn is_untouched(&self) -> bool {
        matches!(self, PaintOutput::Untouched)
    }

    pub fn attrib(&self) -> PaintAttrib {
        match self {
            PaintOutput::Transformed { attrib, .. }
            | PaintOutput::Quads { attrib, .. }
            | PaintOutput::Polygons { attrib, .. } => *attrib,
            PaintOutput::Untouched | PaintOutput::Skipped => PaintAttrib::default(),
        }
    }
}

/// Particles to draw on top of a window
#[derive(Debug, Clone, Copy)]
pub struct ParticleLayer<'a> {
    pub batch: &'a GeometryBatch<ParticleVertex>,
    pub additive: bool,
}
