use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_cell::{Dispatcher, Server};
use shared_config::{AppConfig, Departments};
use shared_database::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HABMS appointment server");

    // Load configuration
    let config = AppConfig::from_env();
    let departments = Arc::new(Departments::load(&config.departments_path));
    if departments.is_empty() {
        warn!("No departments configured, department checks are disabled");
    } else {
        info!("Loaded {} departments", departments.len());
    }

    let db = Database::open(&config.database_path, config.busy_timeout).with_context(|| {
        format!("opening database {}", config.database_path.display())
    })?;
    info!("Using database {}", config.database_path.display());

    // Run the server
    let dispatcher = Dispatcher::new(&db, departments);
    let addr = config.bind_address();
    let server = Server::bind(addr.as_str(), dispatcher)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on {}", server.local_addr()?);

    server.run(shutdown_signal()).await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
