pub mod client;
pub mod enricher;
pub mod error;
pub mod parse;
pub mod rate_limit;

pub use client::LocationInferenceClient;
pub use enricher::{EnrichEvent, EnrichStats, Enricher, LocationLookup};
pub use error::EnrichError;
pub use parse::parse_location_answer;
pub use rate_limit::MinIntervalLimiter;
