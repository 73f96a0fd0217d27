use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context as _, Result};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use nendb_gateway::api;
use nendb_gateway::config::GatewayConfig;
use nendb_gateway::telemetry;
use nendb_rs::{ClientConfig, NenClient};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration before telemetry so the log location is configurable
    let (mut config, config_loaded) = match GatewayConfig::load("gateway.json") {
        Ok(config) => (config, true),
        Err(_) => (GatewayConfig::default(), false),
    };
    config.nendb = config.nendb.with_env_overrides();

    let logs = telemetry::init_telemetry(&config.logging)?;
    if !config_loaded {
        tracing::warn!("Failed to load gateway.json, using defaults");
    }

    tracing::info!("nendb-gateway starting");
    tracing::info!("  Port: {}", config.port);
    tracing::info!("  NenDB URL: {}", config.nendb.base_url);
    tracing::info!(
        "  Client: timeout={}s, max_retries={}, retry_delay={}ms",
        config.nendb.timeout_secs,
        config.nendb.max_retries,
        config.nendb.retry_delay_ms
    );
    tracing::info!(
        "  Deadlines: request={}s, algorithm={}s",
        config.request_timeout_secs,
        config.algorithm_timeout_secs
    );
    tracing::info!(
        "  CORS: enabled={}, origins={:?}",
        config.cors.enabled,
        config.cors.allowed_origins
    );

    let client = NenClient::new(Some(ClientConfig::from(config.nendb.clone())))
        .await
        .context("NenDB server health check failed")?;
    tracing::info!("✓ Connected to NenDB server at {}", client.base_url());

    let app_state = web::Data::new(api::AppState {
        client,
        config: Arc::new(config.clone()),
    });

    // Start HTTP server
    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🚀 Starting HTTP server on {}", bind_addr);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();

        if cors_config.enabled {
            for origin in &cors_config.allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            cors = cors
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    actix_web::http::header::AUTHORIZATION,
                    actix_web::http::header::ACCEPT,
                    actix_web::http::header::CONTENT_TYPE,
                ])
                .max_age(3600);
        }

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run();

    tracing::info!("Server running, press Ctrl+C to stop");

    server.await?;

    logs.shutdown();

    Ok(())
}
