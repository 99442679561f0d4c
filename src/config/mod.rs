#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_FAILURE_FEED_URL: &str =
    "http://server1c.freedom1.ru/UNF_CRM_WS/hs/Grafana/anydata?query=failureConfirmationTime";
pub const DEFAULT_INDICATOR_URL: &str =
    "http://server1c.freedom1.ru/UNF_CRM_WS/hs/Userside/site?request=getAdditionData";
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;
pub const DEFAULT_CLICKHOUSE_PORT: u16 = 8123;

/// 整個程序共用、啟動時載入一次的設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickHouseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub secure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub failure_feed_url: String,
    pub indicator_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub concurrency: usize,
    /// 設定後改為抓取從此日期到昨天的每一天
    pub start_date: Option<NaiveDate>,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_CLICKHOUSE_PORT,
            user: "default".to_string(),
            password: String::new(),
            secure: false,
        }
    }
}

// 密碼不進日誌
impl std::fmt::Debug for ClickHouseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("secure", &self.secure)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            failure_feed_url: DEFAULT_FAILURE_FEED_URL.to_string(),
            indicator_url: DEFAULT_INDICATOR_URL.to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            start_date: None,
        }
    }
}

impl ClickHouseConfig {
    /// ClickHouse HTTP 介面的根路徑
    pub fn endpoint(&self) -> Result<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        let raw = format!("{}://{}:{}/", scheme, self.host, self.port);
        Url::parse(&raw).map_err(|e| EtlError::InvalidConfigValueError {
            field: "clickhouse.host".to_string(),
            value: self.host.clone(),
            reason: format!("Invalid host: {}", e),
        })
    }
}

impl SourceConfig {
    /// 指定日期的故障確認資料網址 (`dt_dt=YYYYMMDD`)
    pub fn failure_feed_url_for(&self, date: NaiveDate) -> Result<Url> {
        let mut url = validation::validate_url("source.failure_feed_url", &self.failure_feed_url)?;
        url.query_pairs_mut()
            .append_pair("dt_dt", &date.format("%Y%m%d").to_string());
        Ok(url)
    }

    pub fn indicator_url(&self) -> Result<Url> {
        validation::validate_url("source.indicator_url", &self.indicator_url)
    }
}

impl AppConfig {
    /// 從程序環境變數載入
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意查詢函式取代環境變數，方便測試
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CLICKHOUSE_HOST") {
            config.clickhouse.host = host;
        }
        if let Some(port) = lookup("CLICKHOUSE_PORT") {
            config.clickhouse.port = parse_value("CLICKHOUSE_PORT", &port)?;
        }
        if let Some(user) = lookup("CLICKHOUSE_USER") {
            config.clickhouse.user = user;
        }
        if let Some(password) = lookup("CLICKHOUSE_PASSWORD") {
            config.clickhouse.password = password;
        }
        if let Some(secure) = lookup("CLICKHOUSE_SECURE") {
            config.clickhouse.secure = parse_value("CLICKHOUSE_SECURE", &secure)?;
        }
        if let Some(url) = lookup("ETL_FAILURE_FEED_URL") {
            config.source.failure_feed_url = url;
        }
        if let Some(url) = lookup("ETL_INDICATOR_URL") {
            config.source.indicator_url = url;
        }
        if let Some(concurrency) = lookup("ETL_FETCH_CONCURRENCY") {
            config.fetch.concurrency = parse_value("ETL_FETCH_CONCURRENCY", &concurrency)?;
        }
        if let Some(start) = lookup("ETL_START_DATE") {
            config.fetch.start_date = Some(parse_value("ETL_START_DATE", &start)?);
        }

        Ok(config)
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, |key| std::env::var(key).ok())
    }

    /// 從 TOML 字串解析配置，`${VAR}` 以 lookup 的結果替換
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let processed_content = substitute_env_vars(content, lookup)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("clickhouse.host", &self.clickhouse.host)?;
        validation::validate_range("clickhouse.port", self.clickhouse.port, 1, u16::MAX)?;
        self.clickhouse.endpoint()?;
        validation::validate_url("source.failure_feed_url", &self.source.failure_feed_url)?;
        validation::validate_url("source.indicator_url", &self.source.indicator_url)?;
        validation::validate_positive_number("fetch.concurrency", self.fetch.concurrency, 1)?;
        Ok(())
    }
}

fn parse_value<T>(field: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// 替換環境變數 (例如 ${CLICKHOUSE_PASSWORD})，找不到的保持原樣
fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}
