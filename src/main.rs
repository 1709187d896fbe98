use anyhow::Context;
use cartelera::config::{AppConfig, Command, LogFormat};
use cartelera::domain::ports::Storage;
use cartelera::utils::error::{CatalogError, ErrorSeverity};
use cartelera::utils::{logger, validation::Validate};
use cartelera::{CatalogService, CliConfig, JsonFileCatalogStore, LocalStorage, MovieId, ReportGenerator};
use clap::Parser;

type Service = CatalogService<JsonFileCatalogStore<LocalStorage>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(store) = &cli.store {
        config.store.path = store.clone();
    }

    // 初始化日誌
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let reports = ReportGenerator::new(config.report_settings()?);
    let store = JsonFileCatalogStore::new(LocalStorage::new("."), config.store.path.clone());
    let service = CatalogService::with_report_generator(store, reports);
    tracing::debug!(store = %config.store.path, "catalog store ready");

    if let Err(e) = run(&service, &config, cli.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        if let CatalogError::Validation { form, .. } = &e {
            eprintln!("{}", serde_json::to_string_pretty(form)?);
        }
        eprintln!("💡 {}", e.recovery_suggestion());

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

async fn run(service: &Service, config: &AppConfig, command: Command) -> cartelera::Result<()> {
    match command {
        Command::List => {
            let movies = service.list().await?;
            print_json(&movies)?;
        }
        Command::Get { id } => {
            let movie = service.read(MovieId(id)).await?;
            print_json(&movie)?;
        }
        Command::Create(args) => {
            let movie = service.create(args.to_form()).await?;
            println!("✅ Created movie {}", movie.id);
            print_json(&movie)?;
        }
        Command::Update(args) => {
            let movie = service.update(args.target(), args.to_form()).await?;
            println!("✅ Updated movie {} (version {})", movie.id, movie.version);
            print_json(&movie)?;
        }
        Command::Delete { id } => {
            service.delete(MovieId(id)).await?;
            println!("✅ Deleted movie {}", id);
        }
        Command::Export { output_dir } => {
            let document = service.export().await?;
            let output_dir = output_dir.unwrap_or_else(|| config.report.output_path.clone());

            let storage = LocalStorage::new(&output_dir);
            storage
                .write_file(&document.file_name, &document.bytes)
                .await?;

            let written = storage.resolve(&document.file_name);
            tracing::info!("📁 Report saved to: {}", written.display());
            println!("✅ Exported {} ({})", written.display(), document.media_type);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> cartelera::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", json);
    Ok(())
}
