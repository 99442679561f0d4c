pub mod etl;
pub mod loader;
pub mod transform;

pub use crate::domain::model::{
    FailureRecord, IndicatorRecord, IntoRow, LoadOutcome, Row, TableSpec,
};
pub use crate::domain::ports::{Pipeline, StoreConnector, StoreSession};
pub use crate::utils::error::Result;
