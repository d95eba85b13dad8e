use std::{
    process,
    sync::{Arc, OnceLock},
};

use clap::Parser;
use scriptbee::{
    cli::Cli,
    config::{metrics::CollectorsConfig, Config},
    core::{collectors::registry::CollectorRegistry, executor::Executor, publisher},
    logger::LoggerManager,
    print_error,
};
use tracing::{error, info};

static CONFIG: OnceLock<Config> = OnceLock::new();

fn config(cli: &Cli) -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::new(cli).unwrap_or_else(|e| {
            print_error!("{}", e);
            process::exit(1);
        })
    })
}

fn log_collectors_table(registry: &CollectorRegistry, config: &CollectorsConfig) {
    use std::collections::BTreeSet;

    // Everything registered plus every name the configuration mentions
    let mut all_names: BTreeSet<&str> = registry.list_names().into_iter().collect();
    all_names.extend(config.enabled.iter().map(String::as_str));
    all_names.extend(config.disabled.iter().map(String::as_str));

    let name_width = all_names
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(10)
        .max("Collector".len());

    info!("{:<width$} | Status", "Collector", width = name_width);
    info!("{}-+-{}", "-".repeat(name_width), "-".repeat(12));

    for name in all_names {
        let status = match (registry.contains(name), registry.is_enabled(name, config)) {
            (true, true) => "ENABLED",
            (true, false) => "DISABLED",
            // Named in the configuration but not compiled in
            (false, _) => "UNKNOWN",
        };

        info!("{:<width$} | {}", name, status, width = name_width);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config(&cli);

    let logger_manager = LoggerManager::new(cfg.logger.clone()).unwrap_or_else(|e| {
        print_error!("Failed to setup Log Manager: {}", e);
        process::exit(1);
    });
    logger_manager.init().unwrap_or_else(|e| {
        print_error!("Failed to init Log Manager: {}", e);
        process::exit(1);
    });
    info!("Starting scriptbee version {}...", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", cfg.logger.level);

    let registry = Arc::new(CollectorRegistry::new(&cfg.metrics));
    log_collectors_table(&registry, &cfg.metrics.collectors);

    let publisher = publisher::from_config(&cfg.publisher);
    info!("Publishing metrics to {:?}", cfg.publisher.kind);

    let executor = Executor::new(registry, publisher, Arc::new(cfg.metrics.clone()));

    if cli.once {
        if let Err(e) = executor.run_once().await {
            error!("Publish failed: {}", e);
            process::exit(1);
        }
        return Ok(());
    }

    info!("Starting metrics collection executor...");

    tokio::select! {
        _ = executor.run() => {
            error!("Executor unexpectedly finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
    Ok(())
}
