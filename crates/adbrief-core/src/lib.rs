pub mod ads;
pub mod app_config;
pub mod brands;
pub mod config;

use thiserror::Error;

pub use ads::{AdCopy, AdMedia, AdRecord, BrandRecord, Selection};
pub use app_config::{AppConfig, CommitPolicy, MessageGrouping};
pub use brands::{load_brands, BrandConfig, BrandsFile};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("invalid brands configuration: {0}")]
    Validation(String),
}
