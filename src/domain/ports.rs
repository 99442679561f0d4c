use crate::domain::model::{LoadOutcome, Row, TableSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 一次寫入用的倉儲連線。實作必須在 `Drop` 時釋放資源。
#[async_trait]
pub trait StoreSession: Send + Sync {
    async fn insert(&self, table: &TableSpec, rows: &[Row]) -> Result<()>;
    async fn command(&self, statement: &str) -> Result<()>;
}

#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Session: StoreSession;

    async fn connect(&self) -> Result<Self::Session>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Record: Send;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Vec<Self::Record>>;
    async fn load(&self, records: Vec<Self::Record>) -> Result<LoadOutcome>;
}
