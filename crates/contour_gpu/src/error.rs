//! GPU backend errors

use contour_core::{BufferFormat, BufferId, MaterialHandle, ShaderPass};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("unknown buffer {0}")]
    UnknownBuffer(BufferId),

    #[error("buffer {0} is already allocated")]
    AlreadyAllocated(BufferId),

    #[error("format {0:?} cannot be allocated as a frame buffer")]
    UnsupportedFormat(BufferFormat),

    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),

    #[error("no pipeline prepared for {0:?}")]
    MissingPipeline(ShaderPass),

    #[error("no color target set")]
    NoColorTarget,

    #[error("failed to read back texture: {0}")]
    Readback(String),
}

pub type Result<T> = std::result::Result<T, GpuError>;
