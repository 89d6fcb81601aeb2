pub mod app_config;
pub mod config;
pub mod products;
pub mod vendors;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    Brand, Catalog, CompetitorCatalog, Product, ProductConfig, ProductType, NOT_SPECIFIED,
};
pub use vendors::{load_vendors, VendorConfig, VendorsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vendors file {path}: {source}")]
    VendorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vendors file: {0}")]
    VendorsFileParse(#[from] serde_yaml::Error),

    #[error("vendor config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("product \"{title}\" has no recognised brand")]
    UnknownBrand { title: String },

    #[error("product \"{title}\" has unusable price {price}")]
    InvalidPrice { title: String, price: f64 },
}
