use clap::Parser;
use discord_gateway::utils::error::ErrorSeverity;
use discord_gateway::utils::{logger, validation::Validate};
use discord_gateway::{app, CliArgs, GatewayApp, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("Starting discord-gateway v{}", env!("CARGO_PKG_VERSION"));

    // 載入並驗證配置
    let config = match GatewayConfig::load(&args).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!(
        listen_addr = %config.listen_addr(),
        engine_url = %config.engine.url,
        token_present = config.discord.token.is_some(),
        "✅ Configuration loaded"
    );

    let gateway = GatewayApp::new(config);

    if let Err(e) = gateway.run(app::shutdown_signal()).await {
        tracing::error!(
            "❌ Gateway stopped with error: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

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

    tracing::info!("👋 Gateway stopped");
    Ok(())
}
