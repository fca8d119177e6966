use clap::Parser;
use file_genai::utils::error::ErrorSeverity;
use file_genai::utils::{logger, validation::Validate};
use file_genai::{AppConfig, CliArgs, GeminiClient, LoaderRegistry, LocalResultSink, Processor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting file-genai CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入並驗證配置
    let mut config = match AppConfig::from_file(&args.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Some(save) = args.save {
        config.output.save_results = save;
    }
    tracing::info!("📁 Config loaded from {}", args.config.display());

    let registry = match LoaderRegistry::with_default_loaders() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(3);
        }
    };

    let client = GeminiClient::from_config(&config);
    let sink = LocalResultSink::new(config.output.output_directory.clone());
    if config.output.save_results {
        tracing::info!("📁 Results will be saved under {}", sink.output_directory().display());
    }
    let processor = Processor::new(registry, config, client, sink);
    let question = args.question.as_deref();

    if args.dry_run {
        tracing::info!(
            "🔍 Dry run: no requests will be sent to {}",
            processor.config().gemini.model
        );
        for file in &args.files {
            match processor.plan(file, question, &args.prompt_type) {
                Ok(plan) => println!("{}", serde_json::to_string_pretty(&plan)?),
                Err(e) => eprintln!("❌ {}: {}", file.display(), e.user_friendly_message()),
            }
        }
        return Ok(());
    }

    // 逐一處理檔案，單一檔案失敗不影響其他檔案
    let mut worst: Option<ErrorSeverity> = None;
    for file in &args.files {
        match processor.process(file, question, &args.prompt_type).await {
            Ok(envelope) => {
                println!("=== {} ({}) ===", envelope.source_path, envelope.kind);
                println!("{}\n", envelope.response_text);
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to process {}: {} (Category: {:?}, Severity: {:?})",
                    file.display(),
                    e,
                    e.category(),
                    e.severity()
                );
                eprintln!("❌ {}: {}", file.display(), e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                worst = worst.max(Some(e.severity()));
            }
        }
    }

    // 根據最嚴重的錯誤決定退出碼
    let exit_code = match worst {
        None | Some(ErrorSeverity::Low) => 0,
        Some(ErrorSeverity::Medium) => 2,
        Some(ErrorSeverity::High) => 1,
        Some(ErrorSeverity::Critical) => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
