pub mod buffer;
pub mod geometry;
pub mod runtime;

pub use buffer::*;
pub use geometry::*;
pub use runtime::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Unsupported channel count: expected {expected}, got {actual}")]
    UnsupportedChannels { expected: u8, actual: u8 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}
