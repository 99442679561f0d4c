use crate::adapters::http::HttpFetcher;
use crate::config::SourceConfig;
use crate::core::loader::Loader;
use crate::core::transform::flatten_failure_batches;
use crate::core::{FailureRecord, LoadOutcome, Pipeline, StoreConnector};
use crate::domain::model::FAILURE_CONFIRMATION_TABLE;
use crate::utils::error::Result;
use chrono::NaiveDate;
use url::Url;

/// 要抓取哪些日期的故障確認資料
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindow {
    /// 只抓昨天
    Yesterday,
    /// 從指定日期抓到昨天 (含)
    Since(NaiveDate),
}

impl From<Option<NaiveDate>> for FeedWindow {
    fn from(start: Option<NaiveDate>) -> Self {
        start.map_or(FeedWindow::Yesterday, FeedWindow::Since)
    }
}

impl FeedWindow {
    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let Some(yesterday) = today.pred_opt() else {
            return Vec::new();
        };

        match *self {
            FeedWindow::Yesterday => vec![yesterday],
            FeedWindow::Since(start) => start
                .iter_days()
                .take_while(|day| *day <= yesterday)
                .collect(),
        }
    }
}

pub struct FailureConfirmationPipeline<C: StoreConnector> {
    source: SourceConfig,
    concurrency: usize,
    window: FeedWindow,
    today: NaiveDate,
    loader: Loader<C>,
}

impl<C: StoreConnector> FailureConfirmationPipeline<C> {
    pub fn new(
        source: SourceConfig,
        concurrency: usize,
        window: FeedWindow,
        today: NaiveDate,
        connector: C,
    ) -> Self {
        Self {
            source,
            concurrency,
            window,
            today,
            loader: Loader::new(connector),
        }
    }

    pub fn urls(&self) -> Result<Vec<Url>> {
        self.window
            .dates(self.today)
            .into_iter()
            .map(|date| self.source.failure_feed_url_for(date))
            .collect()
    }
}

#[async_trait::async_trait]
impl<C: StoreConnector> Pipeline for FailureConfirmationPipeline<C> {
    type Extracted = Vec<String>;
    type Record = FailureRecord;

    fn name(&self) -> &str {
        "failureConfirmationTime"
    }

    async fn extract(&self) -> Result<Vec<String>> {
        let urls = self.urls()?;
        tracing::info!(
            "Fetching {} failure confirmation page(s) ({:?})",
            urls.len(),
            self.window
        );

        let fetcher = HttpFetcher::new(self.concurrency)?;
        fetcher.fetch_texts(&urls).await
    }

    async fn transform(&self, bodies: Vec<String>) -> Result<Vec<FailureRecord>> {
        flatten_failure_batches(&bodies)
    }

    async fn load(&self, records: Vec<FailureRecord>) -> Result<LoadOutcome> {
        self.loader.load(&FAILURE_CONFIRMATION_TABLE, records).await
    }
}
