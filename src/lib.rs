pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{ClickHouseConnector, HttpFetcher};
pub use app::{run, RunReport};
pub use config::AppConfig;
pub use crate::core::{etl::EtlEngine, loader::Loader};
pub use utils::error::{EtlError, Result};
