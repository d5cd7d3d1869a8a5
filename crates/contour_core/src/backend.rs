//! Backend seam

use crate::buffers::BufferId;
use crate::command::CommandStream;

/// Executes recorded outline commands
pub trait OutlineBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute every command of `stream` in order as one submission
    fn submit(&mut self, stream: &CommandStream) -> std::result::Result<(), Self::Error>;

    /// Release a frame buffer outside of a stream. Unknown ids are ignored.
    fn release(&mut self, id: BufferId);
}
