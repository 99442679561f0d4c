use crate::config::AppConfig;
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "grafana-etl")]
#[command(about = "Loads 1C failure confirmations and indicators into ClickHouse")]
pub struct CliArgs {
    /// TOML 設定檔；未指定時從環境變數讀取
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 額外的 .env 檔案，預設讀取目前目錄下的 .env
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// 執行日期 (YYYY-MM-DD)，預設為今天
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// 抓取從此日期到昨天的每一天 (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// 載入設定並套用命令列覆蓋
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };

        if let Some(since) = self.since {
            config.fetch.start_date = Some(since);
        }

        Ok(config)
    }
}
