use crate::domain::model::{IntoRow, LoadOutcome, Row, TableSpec};
use crate::domain::ports::{StoreConnector, StoreSession};
use crate::utils::error::Result;

/// 每次 `load` 開一個新的倉儲連線，離開時 (成功、空批次或錯誤) 由 drop 釋放
#[derive(Debug, Clone)]
pub struct Loader<C: StoreConnector> {
    connector: C,
}

impl<C: StoreConnector> Loader<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub async fn load<R>(&self, table: &TableSpec, records: Vec<R>) -> Result<LoadOutcome>
    where
        R: IntoRow + Send,
    {
        let session = self.connector.connect().await?;

        if records.is_empty() {
            tracing::info!("No new records to insert into {}", table.name);
            return Ok(LoadOutcome::empty(table));
        }

        let rows: Vec<Row> = records.into_iter().map(IntoRow::into_row).collect();
        session.insert(table, &rows).await?;

        if table.compact_after_insert {
            // 阻塞直到合併完成，沒有逾時
            session.command(&table.optimize_statement()).await?;
        }

        tracing::info!("Inserted {} new records into {}", rows.len(), table.name);

        Ok(LoadOutcome {
            table: table.name,
            rows_inserted: rows.len(),
            compacted: table.compact_after_insert,
        })
    }
}
