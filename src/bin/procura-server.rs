// ABOUTME: Server binary for the Procura procurement platform backend
// ABOUTME: Loads configuration, runs migrations, and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Procura Server Binary
//!
//! Starts the REST API with database migrations and attachment storage.

use anyhow::Result;
use clap::Parser;
use procura::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    logging::LoggingConfig,
    server::{self, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "procura-server")]
#[command(about = "Procura - B2B procurement platform backend")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    LoggingConfig::from_env().init()?;

    info!("Starting Procura server");

    let database = Database::new(&config.database.url).await?;
    info!(url = %config.database.url, "Database initialized");

    let auth_manager = AuthManager::new(&config.auth.jwt_secret, config.auth.jwt_expiry_hours);

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));

    server::run(resources).await?;

    Ok(())
}
