use clap::Parser;
use maize_climate_charts::utils::{logger, validation::Validate};
use maize_climate_charts::{
    ChartEngine, ChartError, ChartPipeline, CliConfig, LocalFiles, PlottersWriter,
};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting maize-climate-charts");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Chart generation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }
}

fn run(cli: &CliConfig) -> Result<(), ChartError> {
    let config = cli.resolve()?;
    config.validate()?;
    tracing::info!(
        "📁 Data directory: {}, output directory: {}",
        config.paths.data_dir,
        config.paths.output_dir
    );

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = LocalFiles::new(config.clone());
    let writer = PlottersWriter::new(config.output_dir(), &config.image);
    let pipeline = ChartPipeline::new(source, writer, config);

    let engine = ChartEngine::new_with_monitoring(pipeline, cli.monitor);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no images will be written");
        let inputs = engine.dry_run()?;
        println!("{}", serde_json::to_string_pretty(&inputs)?);
        return Ok(());
    }

    let outputs = engine.run()?;

    tracing::info!("✅ Wrote {} charts", outputs.len());
    for path in &outputs {
        println!("📁 Output saved to: {}", path.display());
    }
    Ok(())
}

