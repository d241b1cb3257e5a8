use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no usable data: {0}")]
    NoUsableData(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid image list: {0}")]
    ImageList(#[from] serde_json::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
