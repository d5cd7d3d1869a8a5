//! Contour GPU
//!
//! wgpu backend for the Contour outline renderer. Executes a recorded
//! [`contour_core::CommandStream`] as a sequence of render passes in a
//! single command buffer:
//!
//! - silhouette meshes are rasterized into an `R8Unorm` mask, multisampled
//!   when the adapter supports the requested count
//! - jump flood passes ping-pong between two nearest-point textures
//!   (`Rg16Snorm` where renderable, `Rg32Float` otherwise)
//! - the outline is blended onto an `Rgba8Unorm` color target

pub mod backend;
pub mod error;
pub mod primitives;
pub mod shaders;

pub use backend::{GpuBackend, GpuConfig, OUTLINE_MATERIAL};
pub use error::{GpuError, Result};
pub use primitives::{GpuMesh, GpuVertex};
