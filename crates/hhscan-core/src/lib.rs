pub mod app_config;
pub mod config;
pub mod geo;
pub mod place;
pub mod region;

use std::path::PathBuf;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, SearchSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use crate::geo::{meters_per_degree, Bounds, LatLng};
pub use place::{BusinessStatus, PlaceRow};
pub use region::{PolygonPart, PolygonRegion, Region};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid search setting {name}: {reason}")]
    InvalidSetting { name: String, reason: String },

    #[error("cannot load region file {}: {reason}", path.display())]
    RegionFile { path: PathBuf, reason: String },

    #[error("invalid region: {0}")]
    InvalidRegion(String),
}
