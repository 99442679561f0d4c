use crate::core::{LoadOutcome, Pipeline};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadOutcome> {
        let name = self.pipeline.name();
        tracing::info!("Starting pipeline {}", name);

        // Extract
        tracing::info!("Fetching data for {}", name);
        let raw_data = self.pipeline.extract().await?;

        // Transform
        tracing::info!("Parsing data for {}", name);
        let records = self.pipeline.transform(raw_data).await?;
        tracing::debug!("Parsed {} records for {}", records.len(), name);

        // Load
        let outcome = self.pipeline.load(records).await?;
        tracing::info!(
            "Pipeline {} finished: {} rows into {}",
            name,
            outcome.rows_inserted,
            outcome.table
        );

        Ok(outcome)
    }

    pub fn into_inner(self) -> P {
        self.pipeline
    }
}
