use crate::adapters::http::HttpFetcher;
use crate::config::SourceConfig;
use crate::core::loader::Loader;
use crate::core::transform::indicator_records;
use crate::core::{IndicatorRecord, LoadOutcome, Pipeline, StoreConnector};
use crate::domain::model::INDICATORS_TABLE;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// 附加指標快照，每個 key 一列並標上執行日期
pub struct IndicatorPipeline<C: StoreConnector> {
    source: SourceConfig,
    today: NaiveDate,
    loader: Loader<C>,
}

impl<C: StoreConnector> IndicatorPipeline<C> {
    pub fn new(source: SourceConfig, today: NaiveDate, connector: C) -> Self {
        Self {
            source,
            today,
            loader: Loader::new(connector),
        }
    }
}

#[async_trait::async_trait]
impl<C: StoreConnector> Pipeline for IndicatorPipeline<C> {
    type Extracted = serde_json::Value;
    type Record = IndicatorRecord;

    fn name(&self) -> &str {
        "indicators"
    }

    async fn extract(&self) -> Result<serde_json::Value> {
        let url = self.source.indicator_url()?;
        tracing::info!("Fetching additional indicators from {}", url);

        let fetcher = HttpFetcher::new(1)?;
        fetcher.fetch_json(&url).await
    }

    async fn transform(&self, payload: serde_json::Value) -> Result<Vec<IndicatorRecord>> {
        indicator_records(payload, self.today)
    }

    async fn load(&self, records: Vec<IndicatorRecord>) -> Result<LoadOutcome> {
        self.loader.load(&INDICATORS_TABLE, records).await
    }
}
