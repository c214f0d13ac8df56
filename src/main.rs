//! MiniSOC GeoTrace server
//! Security-event query API with GeoIP/ASN enrichment and a map view

use anyhow::{Context, Result};
use clap::{Arg, Command};
use minisoc_geotrace::config::Config;
use minisoc_geotrace::geoip::{self, GeoContext};
use minisoc_geotrace::handlers::{create_router, AppState};
use minisoc_geotrace::search::ElasticGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let matches = Command::new("minisoc-geotrace")
        .version(env!("CARGO_PKG_VERSION"))
        .author("SIEM Team")
        .about("Security-event query API with GeoIP/ASN enrichment")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Server host"),
        )
        .arg(
            Arg::new("validate-config")
                .long("validate-config")
                .help("Validate configuration and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();

    // A missing config file is not an error; environment variables and
    // defaults cover the containerized deployment case.
    let mut config = if std::path::Path::new(config_path).exists() {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?
    } else {
        info!("Config file {} not found, using environment and defaults", config_path);
        Config::from_env().context("Failed to load configuration from environment")?
    };

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }

    config.validate().context("Configuration validation failed")?;

    if matches.get_flag("validate-config") {
        info!("Configuration is valid");
        return Ok(());
    }

    let config = Arc::new(config);

    info!("Initializing services...");

    let gateway = ElasticGateway::new(config.clone())
        .context("Failed to initialize search gateway")?;

    // GeoIP databases load in the background; requests served before the
    // load completes simply carry no enrichment.
    let geo_context = Arc::new(GeoContext::new());
    let _loader = geoip::spawn_loader(geo_context.clone(), config.geoip.clone());

    let app_state = AppState {
        config: config.clone(),
        gateway: Arc::new(gateway),
        geo: geo_context,
    };

    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid server host")?,
        config.server.port,
    );

    info!("Starting MiniSOC GeoTrace on {}", addr);
    print_config_summary(&config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minisoc_geotrace=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Print configuration summary
fn print_config_summary(config: &Config) {
    info!("=== Configuration Summary ===");
    info!("Server: {}:{}", config.server.host, config.server.port);
    info!("Elasticsearch: {}", config.elastic.url);
    info!("Index Patterns: {}", config.index_path());
    info!("City DB: {}", config.geoip.city_db_path);
    info!("ASN DB: {}", config.geoip.asn_db_path);
    info!("=============================");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
