pub mod app_config;
pub mod config;
pub mod import;
pub mod settings;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use import::{
    import_csv, parse_csv, split_csv_line, HeaderMap, ImportError, ImportSummary, ParsedImport,
    ParsedRow, RowError, RowFailure, StoreRepository, MAX_REPORTED_ERRORS,
};
pub use settings::{DataVisibility, DATA_VISIBILITY_KEY};
pub use stores::{round_coordinate, StoreKey, StoreRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
