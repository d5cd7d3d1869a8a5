//! Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("backend failed to execute '{stream}': {source}")]
    Backend {
        stream: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, OutlineError>;
