// Domain layer: records, destination tables and ports (interfaces).
// Adapters (HTTP, ClickHouse) depend on this module, never the other way round.

pub mod model;
pub mod ports;
