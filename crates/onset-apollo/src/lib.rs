pub mod batch;
pub mod client;
pub mod error;
pub mod fetcher;
mod request;
pub mod types;

pub use batch::{BatchError, BatchProgress, BatchRun, BatchState, BatchSummary, RecordSet};
pub use client::ApolloClient;
pub use error::ApolloError;
pub use fetcher::{FetchError, PageFetcher};
pub use types::{SearchPage, SearchResponse};
