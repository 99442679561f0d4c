pub mod pipelines;

use crate::config::AppConfig;
use crate::core::etl::EtlEngine;
use crate::core::{LoadOutcome, StoreConnector};
use crate::utils::error::Result;
use chrono::NaiveDate;
use pipelines::{FailureConfirmationPipeline, FeedWindow, IndicatorPipeline};

/// 一次完整執行的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub failures: LoadOutcome,
    pub indicators: LoadOutcome,
}

/// 依序執行故障確認與指標兩條 pipeline。任何錯誤都會記錄後原樣回傳。
pub async fn run<C>(config: &AppConfig, connector: C, today: NaiveDate) -> Result<RunReport>
where
    C: StoreConnector + Clone,
{
    tracing::info!("🚀 Run started for {}", today);

    let result = run_pipelines(config, connector, today).await;

    match &result {
        Ok(report) => tracing::info!(
            "✅ Run finished: {} failure records, {} indicators",
            report.failures.rows_inserted,
            report.indicators.rows_inserted
        ),
        Err(e) => tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        ),
    }

    result
}

async fn run_pipelines<C>(config: &AppConfig, connector: C, today: NaiveDate) -> Result<RunReport>
where
    C: StoreConnector + Clone,
{
    let failures = EtlEngine::new(FailureConfirmationPipeline::new(
        config.source.clone(),
        config.fetch.concurrency,
        FeedWindow::from(config.fetch.start_date),
        today,
        connector.clone(),
    ))
    .run()
    .await?;

    let indicators = EtlEngine::new(IndicatorPipeline::new(
        config.source.clone(),
        today,
        connector,
    ))
    .run()
    .await?;

    Ok(RunReport {
        failures,
        indicators,
    })
}
