pub mod cli;
pub mod codec;
pub mod config;
pub mod distance;
pub mod error;
pub mod image_list;
pub mod report;
pub mod retrieval;
pub mod session;
pub mod store;
mod utils;

pub use codec::{DecodeError, FeatureRecord};
pub use config::Opts;
pub use error::RetrievalError;
pub use session::{QueryResult, RetrievalSession};
pub use store::{ImageEntry, LoadStats, VectorStore};
