//! Frame-scoped buffer identities, descriptors and the release ledger

use smallvec::SmallVec;

/// Identity of a temporary buffer within one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

impl BufferId {
    /// Single-channel silhouette mask
    pub const SILHOUETTE: BufferId = BufferId(0);
    /// Ping-pong slot A; always holds the converged nearest-point field
    pub const NEAREST_POINT: BufferId = BufferId(1);
    /// Ping-pong slot B
    pub const NEAREST_POINT_PING_PONG: BufferId = BufferId(2);

    pub fn name(&self) -> &'static str {
        match *self {
            Self::SILHOUETTE => "silhouette",
            Self::NEAREST_POINT => "nearest_point",
            Self::NEAREST_POINT_PING_PONG => "nearest_point_ping_pong",
            _ => "buffer",
        }
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name(), self.0)
    }
}

/// Texel format of a temporary buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferFormat {
    /// Coverage mask
    R8Unorm,
    /// Nearest-point field, two signed-normalized 16-bit channels
    Rg16Snorm,
    /// Color
    Rgba8Unorm,
}

impl BufferFormat {
    pub fn bytes_per_texel(&self) -> u32 {
        match self {
            BufferFormat::R8Unorm => 1,
            BufferFormat::Rg16Snorm | BufferFormat::Rgba8Unorm => 4,
        }
    }
}

/// Camera target size and multisample count
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}

impl TargetDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sample_count: 1,
        }
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Allocation request for a temporary buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub format: BufferFormat,
}

impl BufferDescriptor {
    /// Silhouette mask at camera resolution, multisampled per the quality setting
    pub fn silhouette(target: &TargetDescriptor, antialiasing: u32) -> Self {
        Self {
            width: target.width,
            height: target.height,
            sample_count: supported_sample_count(antialiasing.max(1)),
            format: BufferFormat::R8Unorm,
        }
    }

    /// Nearest-point buffer sized after the silhouette, always single-sample
    pub fn nearest_point(silhouette: &BufferDescriptor) -> Self {
        Self {
            width: silhouette.width,
            height: silhouette.height,
            sample_count: 1,
            format: BufferFormat::Rg16Snorm,
        }
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Largest standard sample count (1, 2, 4 or 8) not exceeding `requested`
pub fn supported_sample_count(requested: u32) -> u32 {
    match requested {
        0 | 1 => 1,
        2 | 3 => 2,
        4..=7 => 4,
        _ => 8,
    }
}

/// Ledger of the buffers a frame currently holds
///
/// Each buffer is acquired once and released once; a second release of the
/// same id is ignored.
#[derive(Debug, Default)]
pub struct FrameResources {
    live: SmallVec<[BufferId; 3]>,
}

impl FrameResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, id: BufferId) {
        if !self.live.contains(&id) {
            self.live.push(id);
        }
    }

    /// Mark `id` released. Returns `false` if it was not live.
    pub fn release(&mut self, id: BufferId) -> bool {
        match self.live.iter().position(|live| *live == id) {
            Some(index) => {
                self.live.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self, id: BufferId) -> bool {
        self.live.contains(&id)
    }

    pub fn live(&self) -> &[BufferId] {
        &self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Take every live id, in acquisition order
    pub fn drain(&mut self) -> SmallVec<[BufferId; 3]> {
        std::mem::take(&mut self.live)
    }
}
