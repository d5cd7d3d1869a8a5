//! Contour Software
//!
//! CPU reference backend for the Contour outline renderer. It executes a
//! recorded [`contour_core::CommandStream`] against in-memory buffers and an
//! `image::RgbaImage` color target:
//!
//! - Silhouette rasterization of rectangles, circles and triangles with
//!   standard 1/2/4/8 multisample patterns
//! - Jump flood seeding and both flood variants
//! - Outline compositing with source-over blending

pub mod backend;
pub mod buffer;
pub mod error;
pub mod kernels;
pub mod sample_pattern;
pub mod scene;

pub use backend::{SoftwareBackend, OUTLINE_MATERIAL};
pub use buffer::{MaskBuffer, NearestBuffer, SoftwareBuffer};
pub use error::{Result, SoftwareError};
pub use scene::{Renderable, Scene, Shape};
