mod cli;
mod config;
mod error;
mod logic;
mod models;
mod notify;
mod server;
mod service;
mod store;
#[cfg(test)]
mod test_utils;

use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{PlantCareError, Result};
use models::{format_date, parse_date, CareKind, PlantUpdate};
use notify::{LogNotifier, Notifier, SmtpNotifier};
use server::PlantServer;
use service::PlantCareService;
use std::path::Path;
use std::sync::Arc;
use store::JsonFileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    if matches!(command, Commands::Init) {
        Config::setup_interactive()?;
        return Ok(());
    }

    let config = match Config::load(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `plantcare init` to create a config file");
            std::process::exit(1);
        }
    };

    let data_file = config.data_file(cli.data_file.as_ref())?;
    let notifier = build_notifier(&config)?;
    let store = Arc::new(JsonFileStore::new(&data_file));
    tracing::debug!(data_file = %store.path().display(), "Using plant data file");
    let service = Arc::new(PlantCareService::new(store, notifier));

    match command {
        Commands::Serve { host, port } => {
            let mut server_config = config.server.clone();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }

            let server = PlantServer::start(service, &server_config).await?;
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutting down");
            server.shutdown();
        }
        Commands::List => {
            println!("{}", service.listing(today()).await?);
        }
        Commands::Due { kind, date } => {
            let kind = CareKind::from(kind);
            let day = match date {
                Some(raw) => require_date(&raw)?,
                None => today(),
            };
            let report = service.check(kind, day).await?;
            let on = format_date(report.today);
            if report.plants.is_empty() {
                println!("No plants need {} on {}", kind.verb(), on);
            } else {
                println!("Plants that need {} on {}:", kind.verb(), on);
                for name in &report.plants {
                    println!("  {}", name);
                }
            }
            if !report.notified {
                eprintln!("Warning: notification could not be sent (see log)");
            }
        }
        Commands::Add {
            name,
            water_every,
            fertilize_every,
        } => {
            let record = PlantUpdate::default()
                .water_every(water_every)
                .fertilize_every(fertilize_every)
                .into_record();
            service.create(&name, record).await?;
            println!("Now tracking {}", name.trim());
        }
        Commands::Water { name, on } => {
            let day = resolve_day(on.as_deref())?;
            service
                .update(PlantUpdate::named(&name).watered_on(&format_date(day)))
                .await?;
            println!("Recorded watering of {} on {}", name.trim(), format_date(day));
        }
        Commands::Fertilize { name, on } => {
            let day = resolve_day(on.as_deref())?;
            service
                .update(PlantUpdate::named(&name).fertilized_on(&format_date(day)))
                .await?;
            println!(
                "Recorded fertilizing of {} on {}",
                name.trim(),
                format_date(day)
            );
        }
        Commands::Check => {
            run_check(&config, &data_file, &service).await?;
        }
        // Handled before the config is loaded.
        Commands::Init => {}
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "plantcare=info,tower_http=info",
        1 => "plantcare=debug,tower_http=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match config.active_email() {
        Some(email) => {
            tracing::info!(
                host = %email.smtp_host,
                to = %email.recipient(),
                "Email reminders enabled"
            );
            Ok(Arc::new(SmtpNotifier::new(email)?))
        }
        None => {
            tracing::warn!("Email not configured - reminders will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn require_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| {
        PlantCareError::InvalidData(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

fn resolve_day(raw: Option<&str>) -> Result<NaiveDate> {
    raw.map(require_date).unwrap_or_else(|| Ok(today()))
}

async fn run_check(config: &Config, data_file: &Path, service: &PlantCareService) -> Result<()> {
    println!(
        "Server:     {}:{}",
        config.server.host, config.server.port
    );
    println!("Data file:  {}", data_file.display());

    match service.list().await {
        Ok(registry) => println!("Plants:     {} tracked", registry.len()),
        Err(e) => println!("Plants:     ERROR ({})", e),
    }

    let notifier = service.notifier();
    match notifier.test_connection().await {
        Ok(true) => println!("Notifier:   {} OK", notifier.name()),
        Ok(false) => println!("Notifier:   {} OFFLINE", notifier.name()),
        Err(e) => println!("Notifier:   {} ERROR ({})", notifier.name(), e),
    }

    Ok(())
}
