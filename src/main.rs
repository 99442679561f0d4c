use chrono::Local;
use clap::Parser;
use grafana_etl::utils::{logger, validation::Validate};
use grafana_etl::{CliArgs, ClickHouseConnector};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // .env 需在日誌初始化前載入，RUST_LOG 可能寫在裡面
    let env_loaded = match &args.env_file {
        Some(path) => match dotenvy::from_path(path) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("❌ Failed to load env file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => dotenvy::dotenv().is_ok(),
    };

    logger::init_cli_logger(args.verbose, args.json_logs);

    tracing::info!("Starting grafana-etl");
    if env_loaded {
        tracing::debug!("Loaded environment from .env");
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };
    tracing::debug!("Config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let connector = ClickHouseConnector::new(config.clickhouse.clone());

    match grafana_etl::run(&config, connector, today).await {
        Ok(report) => {
            println!(
                "✅ {}: {} rows, {}: {} rows",
                report.failures.table,
                report.failures.rows_inserted,
                report.indicators.table,
                report.indicators.rows_inserted
            );
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.exit_code().max(1));
        }
    }
}
