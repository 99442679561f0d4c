// Adapters layer: concrete implementations for external systems.

pub mod clickhouse;
pub mod http;

pub use clickhouse::{ClickHouseConnector, ClickHouseSession};
pub use http::{bounded_try_join, HttpFetcher};
