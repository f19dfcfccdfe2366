pub mod app_config;
pub mod config;
pub mod export;
pub mod listing;
pub mod location;
pub mod presets;
pub mod record;
pub mod search;

pub use app_config::{AppConfig, ApolloMode, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use export::{
    batch_csv, batch_filename, enriched_table_csv, quick_csv, quick_filename, BatchSnapshot,
    ExportError,
};
pub use listing::{filter_by_industries, sort_companies, SortKey};
pub use location::{display_location, extract_triple, infer_country_from_domain, LocationTriple};
pub use presets::{load_presets, PresetsFile, SearchPreset};
pub use record::CompanyRecord;
pub use search::{Breadcrumb, EmployeeRange, Pagination, SearchFilters, DEFAULT_PAGE_SIZE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read presets file {path}: {source}")]
    PresetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse presets file: {0}")]
    PresetsFileParse(#[source] serde_yaml::Error),

    #[error("presets validation error: {0}")]
    Validation(String),
}
