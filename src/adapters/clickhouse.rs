//! ClickHouse over its HTTP interface.
//!
//! Each [`ClickHouseSession`] owns its own HTTP client; dropping the session
//! closes its pooled connections, so a session lives exactly as long as one load.

use crate::config::ClickHouseConfig;
use crate::domain::model::{Row, TableSpec};
use crate::domain::ports::{StoreConnector, StoreSession};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

const USER_HEADER: &str = "X-ClickHouse-User";
const KEY_HEADER: &str = "X-ClickHouse-Key";

#[derive(Debug, Clone)]
pub struct ClickHouseConnector {
    config: ClickHouseConfig,
}

impl ClickHouseConnector {
    pub fn new(config: ClickHouseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for ClickHouseConnector {
    type Session = ClickHouseSession;

    async fn connect(&self) -> Result<ClickHouseSession> {
        let endpoint = self.config.endpoint()?;
        let client = Client::builder()
            .build()
            .map_err(|e| EtlError::store(format!("failed to build ClickHouse client: {}", e)))?;

        tracing::debug!("Opened ClickHouse session to {}", endpoint);
        Ok(ClickHouseSession {
            client,
            endpoint,
            user: self.config.user.clone(),
            password: self.config.password.clone(),
        })
    }
}

pub struct ClickHouseSession {
    client: Client,
    endpoint: Url,
    user: String,
    password: String,
}

/// `INSERT INTO <table> (<cols>) FORMAT JSONCompactEachRow`
pub fn insert_query(table: &TableSpec) -> String {
    format!(
        "INSERT INTO {} ({}) FORMAT JSONCompactEachRow",
        table.name,
        table.columns.join(", ")
    )
}

/// 每列一個 JSON 陣列，以換行分隔
pub fn encode_rows(rows: &[Row]) -> Result<String> {
    let mut body = String::new();
    for row in rows {
        body.push_str(&serde_json::to_string(row)?);
        body.push('\n');
    }
    Ok(body)
}

impl ClickHouseSession {
    async fn execute(&self, query: Option<&str>, body: String) -> Result<()> {
        let mut url = self.endpoint.clone();
        if let Some(query) = query {
            url.query_pairs_mut().append_pair("query", query);
        }

        let response = self
            .client
            .post(url)
            .header(USER_HEADER, &self.user)
            .header(KEY_HEADER, &self.password)
            .body(body)
            .send()
            .await
            .map_err(|e| EtlError::store(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EtlError::store(format!(
                "ClickHouse returned {}: {}",
                status,
                detail.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl StoreSession for ClickHouseSession {
    async fn insert(&self, table: &TableSpec, rows: &[Row]) -> Result<()> {
        let query = insert_query(table);
        let body = encode_rows(rows)?;

        tracing::debug!("{} ({} rows)", query, rows.len());
        self.execute(Some(&query), body).await
    }

    async fn command(&self, statement: &str) -> Result<()> {
        tracing::debug!("Executing: {}", statement);
        self.execute(None, statement.to_string()).await
    }
}

impl Drop for ClickHouseSession {
    fn drop(&mut self) {
        tracing::debug!("Closed ClickHouse session to {}", self.endpoint);
    }
}
