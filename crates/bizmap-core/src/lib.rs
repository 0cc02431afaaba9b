pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod payload;
pub mod types;

pub use app_config::{Environment, ExplorerConfig};
pub use config::{load_explorer_config, load_explorer_config_from_env};
pub use error::ConfigError;
pub use geo::{coordinates_equal, distance_km, EARTH_RADIUS_KM};
pub use payload::{DirectoryPayload, SourceItem};
pub use types::{Address, AddressType, Addresses, CompanyRecord, Coordinates, MapFeature};
