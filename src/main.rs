use clap::Parser;
use sentier_model::utils::{logger, validation::Validate};
use sentier_model::{
    CliConfig, ModelError, ModelRunner, PassthroughModel, StaticIriResolver, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置 (logger 尚未初始化，直接輸出到 stderr)
    let mut config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load run file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting sentier-model");
    tracing::debug!("CLI config: {:?}", cli);

    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail("Run file validation failed", &e);
    }
    tracing::info!("✅ Run file '{}' loaded and validated", cli.config);

    let resolver = match config.resolver() {
        Ok(resolver) => resolver,
        Err(e) => fail("Could not build IRI table", &e),
    };
    display_run_summary(&config, &resolver);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - model was not executed");
        return Ok(());
    }

    let demand = match config.demand() {
        Ok(demand) => demand.clone(),
        Err(e) => fail("Run file has no demand", &e),
    };

    let model = PassthroughModel::new(config.table_source());
    let mut runner = ModelRunner::new_with_monitoring(
        model,
        demand,
        config.run.clone(),
        config.monitoring_enabled(),
    );

    match runner.execute().await {
        Ok(demands) => {
            tracing::info!("✅ Model run completed with {} demand(s)", demands.len());
            println!("{}", serde_json::to_string_pretty(&demands)?);
        }
        Err(e) => fail("Model run failed", &e),
    }

    Ok(())
}

fn display_run_summary(config: &TomlConfig, resolver: &StaticIriResolver) {
    tracing::info!("📋 Model: {}", config.model.name);
    if let Some(description) = &config.model.description {
        tracing::info!("   {}", description);
    }
    if let Ok(demand) = config.demand() {
        tracing::info!(
            "📦 Demand: {} x {} in {}",
            demand.amount,
            resolver.label_or_iri(&demand.product_iri),
            resolver.label_or_iri(&demand.spatial_context)
        );
        tracing::info!(
            "📅 Period: {} to {} ({} days)",
            demand.temporal_range.start(),
            demand.temporal_range.end(),
            demand.temporal_range.days()
        );
    }
    tracing::info!(
        "⚙️ num_samples = {}, outliers_raise_error = {}",
        config.run.num_samples,
        config.run.outliers_raise_error
    );
    tracing::info!(
        "🗂️ {} data table(s) from {}",
        config.data.tables.len(),
        config.data_dir().display()
    );
}

fn fail(context: &str, e: &ModelError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 低嚴重度錯誤在此仍視為失敗
    std::process::exit(e.exit_code().max(1));
}
