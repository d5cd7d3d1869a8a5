//! Per-frame outline configuration

use crate::color::Color;
use crate::layer::{GeometryFilter, LayerMask, RenderQueueRange};

/// Largest outline width accepted, in pixels
///
/// Nearest-edge positions are stored as 16-bit signed-normalized values, so
/// widths past this point cannot be resolved anyway.
pub const MAX_OUTLINE_WIDTH: f32 = 32767.0;

/// Flood strategy used by the jump flood stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JfaVariant {
    /// One pass per iteration sampling the full 3x3 kernel
    #[default]
    Traditional,
    /// Two passes per iteration: horizontal offsets, then vertical offsets
    SeparableAxis,
}

impl JfaVariant {
    /// Number of sampling passes recorded for one flood iteration
    pub fn passes_per_iteration(&self) -> usize {
        match self {
            JfaVariant::Traditional => 1,
            JfaVariant::SeparableAxis => 2,
        }
    }
}

/// Handle to an outline material (the shader program set a backend compiled)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Outline configuration, set by the caller before each frame
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineSettings {
    /// Layers whose geometry receives an outline
    pub layer_mask: LayerMask,
    /// Outline tint in gamma space
    pub color: Color,
    /// Flood strategy
    pub variant: JfaVariant,
    /// Outline material; without one the pass does nothing
    pub material: Option<MaterialHandle>,
    width: f32,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            layer_mask: LayerMask::ALL,
            color: Color::BLACK,
            variant: JfaVariant::Traditional,
            material: None,
            width: 2.0,
        }
    }
}

impl OutlineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer_mask(mut self, layer_mask: LayerMask) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_variant(mut self, variant: JfaVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = Some(material);
        self
    }

    /// Set the outline width in pixels
    ///
    /// Negative and NaN widths become zero, which renders no outline.
    pub fn set_width(&mut self, width: f32) {
        self.width = clamp_width(width);
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Filter selecting opaque geometry on the configured layers
    pub fn geometry_filter(&self) -> GeometryFilter {
        GeometryFilter::new(self.layer_mask, RenderQueueRange::OPAQUE_OR_EARLIER)
    }
}

pub(crate) fn clamp_width(width: f32) -> f32 {
    if width > 0.0 {
        width.min(MAX_OUTLINE_WIDTH)
    } else {
        0.0
    }
}
