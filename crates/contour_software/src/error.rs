//! Software backend errors

use contour_core::{BufferFormat, BufferId, MaterialHandle};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoftwareError {
    #[error("unknown buffer {0}")]
    UnknownBuffer(BufferId),

    #[error("buffer {0} is already allocated")]
    AlreadyAllocated(BufferId),

    #[error("buffer {id} is {actual:?}, expected {expected:?}")]
    FormatMismatch {
        id: BufferId,
        expected: BufferFormat,
        actual: BufferFormat,
    },

    #[error("buffer {id} is {actual:?} pixels, expected {expected:?}")]
    SizeMismatch {
        id: BufferId,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("format {0:?} cannot be allocated as a frame buffer")]
    UnsupportedFormat(BufferFormat),

    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),
}

pub type Result<T> = std::result::Result<T, SoftwareError>;
