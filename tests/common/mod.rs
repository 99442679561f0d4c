#![allow(dead_code)]

use async_trait::async_trait;
use grafana_etl::config::{AppConfig, ClickHouseConfig, FetchConfig, SourceConfig};
use grafana_etl::core::{Row, StoreConnector, StoreSession, TableSpec};
use grafana_etl::Result;
use httpmock::MockServer;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct InsertCall {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Default)]
pub struct StoreLog {
    pub opened: usize,
    pub closed: usize,
    pub inserts: Vec<InsertCall>,
    pub commands: Vec<String>,
}

/// 記錄所有寫入的倉儲替身
#[derive(Clone, Default)]
pub struct RecordingConnector {
    pub log: Arc<Mutex<StoreLog>>,
}

pub struct RecordingSession {
    log: Arc<Mutex<StoreLog>>,
}

impl RecordingConnector {
    pub fn inserts(&self) -> Vec<InsertCall> {
        self.log.lock().unwrap().inserts.clone()
    }

    pub fn inserts_into(&self, table: &str) -> Vec<InsertCall> {
        self.inserts()
            .into_iter()
            .filter(|call| call.table == table)
            .collect()
    }

    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().commands.clone()
    }

    pub fn sessions(&self) -> (usize, usize) {
        let log = self.log.lock().unwrap();
        (log.opened, log.closed)
    }
}

#[async_trait]
impl StoreConnector for RecordingConnector {
    type Session = RecordingSession;

    async fn connect(&self) -> Result<RecordingSession> {
        self.log.lock().unwrap().opened += 1;
        Ok(RecordingSession {
            log: self.log.clone(),
        })
    }
}

#[async_trait]
impl StoreSession for RecordingSession {
    async fn insert(&self, table: &TableSpec, rows: &[Row]) -> Result<()> {
        self.log.lock().unwrap().inserts.push(InsertCall {
            table: table.name.to_string(),
            columns: table.columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.to_vec(),
        });
        Ok(())
    }

    async fn command(&self, statement: &str) -> Result<()> {
        self.log.lock().unwrap().commands.push(statement.to_string());
        Ok(())
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.log.lock().unwrap().closed += 1;
    }
}

/// 指向 mock 1C 服務的設定
pub fn config_for(source: &MockServer) -> AppConfig {
    AppConfig {
        clickhouse: ClickHouseConfig {
            host: "localhost".to_string(),
            ..ClickHouseConfig::default()
        },
        source: SourceConfig {
            failure_feed_url: source.url("/anydata?query=failureConfirmationTime"),
            indicator_url: source.url("/site?request=getAdditionData"),
        },
        fetch: FetchConfig::default(),
    }
}
