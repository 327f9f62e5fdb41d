pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
pub use config::Config;
use models::query::SearchQuery;
use scheduler::Scheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "vendry")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => run_daemon(config, prometheus_handle).await,

        "search" | "s" => {
            if args.len() < 5 {
                println!("Usage: vendry search <category> <city> <state> [subcategory]");
                println!("Example: vendry search photographers Dallas TX wedding");
                return Ok(());
            }
            let query = SearchQuery {
                category: args[2].clone(),
                city: args[3].clone(),
                state: args[4].clone(),
                subcategory: args.get(5).cloned(),
            };
            cmd_search(config, &query).await
        }

        "refresh" | "sweep" => cmd_refresh(config).await,

        "ingest" => {
            if args.len() < 5 {
                println!("Usage: vendry ingest <category> <city> <state>");
                println!("Example: vendry ingest photographers Dallas TX");
                return Ok(());
            }
            cmd_ingest(config, &args[2], &args[3], &args[4]).await
        }

        "locations" | "loc" => {
            if args.len() < 3 {
                println!("Usage: vendry locations <subcommand>");
                println!("Subcommands: sync, states, cities");
                return Ok(());
            }
            match args[2].as_str() {
                "sync" => {
                    let force = args.get(3).map(String::as_str) == Some("--force");
                    cmd_locations_sync(config, force).await
                }
                "states" => cmd_locations_states(config).await,
                "cities" => {
                    if args.len() < 4 {
                        println!("Usage: vendry locations cities <state>");
                        return Ok(());
                    }
                    cmd_locations_cities(config, &args[3]).await
                }
                _ => {
                    println!("Unknown locations subcommand: {}", args[2]);
                    println!("Use: sync, states, cities");
                    Ok(())
                }
            }
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Vendry - Wedding Vendor Directory Service");
    println!("Location-scoped vendor search with cached provider results");
    println!();
    println!("USAGE:");
    println!("  vendry <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  search <category> <city> <state> [subcategory]");
    println!("                    Run a vendor search from the terminal");
    println!("  refresh           Refresh all expired cache entries now");
    println!("  ingest <category> <city> <state>");
    println!("                    Collect Instagram vendor profiles");
    println!("  locations <sub>   Manage provider locations (sync, states, cities)");
    println!("  daemon            Run the API server and refresh scheduler");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  vendry search photographers Dallas TX      # Search Dallas photographers");
    println!("  vendry search venues Austin TX barn        # Subcategory-scoped search");
    println!("  vendry refresh                             # One manual cache sweep");
    println!("  vendry locations sync                      # Sync provider location codes");
    println!("  vendry locations cities Texas              # List known Texas cities");
    println!("  vendry daemon                              # Start background service");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure providers, cache TTL, scheduler, etc.");
    println!("  Credentials come from DATAFORSEO_LOGIN / DATAFORSEO_PASSWORD /");
    println!("  INSTAGRAM_API_KEY environment variables (or .env).");
}

async fn cmd_search(config: Config, query: &SearchQuery) -> anyhow::Result<()> {
    query.validate()?;

    let state = SharedState::new(config).await?;
    let outcome = state.search_service.search(query).await?;

    if outcome.results.is_empty() {
        println!(
            "No vendors found for {} in {}, {}",
            query.category, query.city, query.state
        );
        if outcome.partial {
            println!("(provider was unavailable; only local data was searched)");
        }
        return Ok(());
    }

    println!(
        "Results for {} in {}, {} ({} total{})",
        query.category,
        query.city,
        query.state,
        outcome.results.len(),
        if outcome.cache_hit { ", cached" } else { "" }
    );
    println!("{:-<70}", "");

    for record in &outcome.results {
        let rating = record.rating.as_ref().map_or_else(String::new, |r| {
            format!(" | {:.1}★ ({} reviews)", r.value, r.count)
        });

        println!(
            "{:>3}. [{}] {}{}",
            record.rank,
            record.source.as_str(),
            record.name,
            rating
        );
        if let Some(address) = &record.address {
            println!("     {}", address);
        }
        if let Some(phone) = &record.phone {
            println!("     {}", phone);
        }
    }

    println!();
    print!("By source:");
    for (source, count) in &outcome.source_breakdown {
        print!(" {source}={count}");
    }
    println!();

    if outcome.partial {
        println!();
        println!("⚠ Provider unavailable - results may be incomplete.");
    }

    Ok(())
}

async fn cmd_refresh(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    println!("Sweeping expired cache entries...");
    let summary = state.refresh_service.sweep().await?;

    println!();
    println!(
        "Sweep complete. {} refreshed, {} failed.",
        summary.refreshed, summary.failed
    );

    Ok(())
}

async fn cmd_ingest(config: Config, category: &str, city: &str, state_name: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    println!("Collecting Instagram {category} in {city}, {state_name}...");
    let summary = state.ingest_service.ingest(category, city, state_name).await?;

    println!();
    println!(
        "Ingest complete. {} new, {} updated, {} skipped.",
        summary.inserted, summary.updated, summary.skipped
    );

    Ok(())
}

async fn cmd_locations_sync(config: Config, force: bool) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    println!("Syncing provider locations...");
    let summary = state.locations.sync(force).await?;

    if summary.skipped {
        println!("Locations are up to date. Use --force to re-sync anyway.");
    } else {
        println!("✓ Synced {} locations.", summary.synced);
    }

    Ok(())
}

async fn cmd_locations_states(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let states = state.locations.states().await?;

    if states.is_empty() {
        println!("No locations stored. Run 'vendry locations sync' first.");
        return Ok(());
    }

    println!("Known states ({} total)", states.len());
    println!("{:-<40}", "");
    for row in states {
        println!(
            "  {} [{}] (code {})",
            row.location_name,
            row.state_code.as_deref().unwrap_or("??"),
            row.location_code
        );
    }

    Ok(())
}

async fn cmd_locations_cities(config: Config, state_name: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let cities = state.locations.cities(state_name).await?;

    if cities.is_empty() {
        println!("No cities found for '{state_name}'.");
        println!("Run 'vendry locations sync' if the location table is empty.");
        return Ok(());
    }

    println!("Cities in {} ({} total)", state_name, cities.len());
    println!("{:-<40}", "");
    for row in cities {
        println!("  {} (code {})", row.location_name, row.location_code);
    }

    Ok(())
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Vendry v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let api_state = api::create_app_state(shared.clone(), prometheus_handle).await?;

    let scheduler = Scheduler::new(shared.refresh_service.clone(), config.scheduler.clone());

    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {}", e);
        }
    });

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api_state).await;
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("🌐 Web Server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}
