use clap::Parser;
use cool_finder::config::toml_config::SearchConfig;
use cool_finder::core::ConfigProvider;
use cool_finder::utils::error::{ErrorSeverity, FinderError};
use cool_finder::utils::{logger, validation::Validate};
use cool_finder::{CliConfig, LocalStorage, OutputFormat, SearchApp, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting cool-finder");
    tracing::debug!("CLI config: {:?}", cli);

    let result = match cli.config.as_deref() {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(file_config) => {
                tracing::info!("📄 Using configuration file {}", path);
                let file_config = file_config.with_fallback_api_key(cli.api_key.as_deref());
                let defaults = file_config.search.clone();
                let format = file_config.output_format();
                run(&cli, file_config, format, &defaults).await
            }
            Err(e) => Err(e),
        },
        None => run(&cli, cli.clone(), cli.format, &SearchConfig::default()).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Search failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run<C>(
    cli: &CliConfig,
    config: C,
    format: OutputFormat,
    defaults: &SearchConfig,
) -> Result<(), FinderError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let now = chrono::Local::now().naive_local();
    let request = cli.build_request(now, defaults)?;

    let storage = LocalStorage::new(config.output_path().to_string());
    let app = SearchApp::new(storage, config, format)?;
    let report = app.run(request.as_ref(), now).await?;

    if let Some(cause) = &report.degraded {
        eprintln!("⚠️ {}", cause.user_friendly_message());
    } else if let Some(notice) = &report.notice {
        eprintln!("ℹ️ {}", notice);
    }

    if cli.stdout {
        println!("{}", report.rendered);
    } else {
        let location = app.save(&report).await?;
        println!("✅ {} cooling centers listed", report.matches);
        println!("📁 Output saved to: {}", location);
    }

    Ok(())
}
