//! Entry point: loads the configuration, prepares the database and the
//! access-control policy, then serves the API with Axum.

mod authorization;
mod backend;
mod config;
mod consts;
mod database;
mod models;
mod services;
mod utils;

use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use dotenv::dotenv;
use log::{info, warn};

use crate::authorization::Enforcer;
use crate::config::Config;
use crate::services::Service;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let pool = database::connect(&config).await?;
    if !database::ping(&pool).await {
        return Err(anyhow!("Database is not reachable"));
    }

    let enforcer = Enforcer::load()
        .await
        .context("Failed to load the access control policy")?;
    let service = Service::new(pool, enforcer, &config);

    if let Some((email, password)) = &config.admin {
        if let Err(e) = service.bootstrap_admin(email, password).await {
            warn!("Administrator not created: {e}");
        }
    }

    let cors_origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("Invalid CORS_ORIGIN {}", config.cors_origin))?;
    let app = backend::router::get_router(service, cors_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to open web server listener on {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
