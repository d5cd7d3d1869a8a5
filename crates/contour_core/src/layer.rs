//! Geometry selection: layer masks and render-queue ranges

/// Render queue positions used to order scene geometry
pub mod render_queue {
    pub const BACKGROUND: i32 = 1000;
    pub const GEOMETRY: i32 = 2000;
    pub const ALPHA_TEST: i32 = 2450;
    /// Last queue that still counts as opaque geometry
    pub const GEOMETRY_LAST: i32 = 2500;
    pub const TRANSPARENT: i32 = 3000;
    pub const OVERLAY: i32 = 4000;
}

/// A set of up to 32 layer identifiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches no layer
    pub const NONE: LayerMask = LayerMask(0);
    /// Matches every layer
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// A mask containing a single layer. Layers above 31 produce an empty mask.
    pub fn layer(layer: u8) -> Self {
        Self::NONE.with_layer(layer)
    }

    pub fn with_layer(self, layer: u8) -> Self {
        match 1u32.checked_shl(layer as u32) {
            Some(bit) => Self(self.0 | bit),
            None => self,
        }
    }

    pub fn contains(&self, layer: u8) -> bool {
        1u32
            .checked_shl(layer as u32)
            .is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Inclusive range of render queues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderQueueRange {
    pub min: i32,
    pub max: i32,
}

impl RenderQueueRange {
    /// Opaque geometry and everything drawn before it
    pub const OPAQUE_OR_EARLIER: RenderQueueRange = RenderQueueRange {
        min: 0,
        max: render_queue::GEOMETRY_LAST,
    };

    pub const ALL: RenderQueueRange = RenderQueueRange {
        min: i32::MIN,
        max: i32::MAX,
    };

    pub fn contains(&self, queue: i32) -> bool {
        (self.min..=self.max).contains(&queue)
    }
}

impl Default for RenderQueueRange {
    fn default() -> Self {
        Self::OPAQUE_OR_EARLIER
    }
}

/// Criteria deciding which scene geometry contributes to the silhouette
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeometryFilter {
    pub layer_mask: LayerMask,
    pub queue_range: RenderQueueRange,
}

impl GeometryFilter {
    pub fn new(layer_mask: LayerMask, queue_range: RenderQueueRange) -> Self {
        Self {
            layer_mask,
            queue_range,
        }
    }

    pub fn matches(&self, layer: u8, queue: i32) -> bool {
        self.layer_mask.contains(layer) && self.queue_range.contains(queue)
    }
}
