//! Restaurant table seating server.
//!
//! Serves the table API over HTTP. Each table's seat and release requests
//! are handled by its own actor, spawned by the `SeatingCoordinator` the
//! first time the table is addressed.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use seating::{
    db::{Database, InMemoryRepository, SeatingRepository},
    table::{NewReservation, NewTable, SeatingCoordinator},
};
use seating_server::{api, config::ServerConfig, logging, metrics};
use tracing::info;

const HELP: &str = "\
Run the restaurant table seating server

USAGE:
  seating_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5001]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/seating_db]
  --metrics    IP:PORT     Serve Prometheus metrics    [default: env METRICS_BIND, disabled if unset]

FLAGS:
  --in-memory              Keep tables and reservations in process memory
  --seed                   With --in-memory, load a few demo tables and reservations
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:5001)
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size [default: 20]
  SEATING_IN_MEMORY        true to run without PostgreSQL
  METRICS_BIND             Prometheus exporter address
  TABLE_ACTOR_INBOX        Queued requests per table [default: 100]
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics")?;
    let in_memory = pargs.contains("--in-memory").then_some(true);
    let seed = pargs.contains("--seed");

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}\n\n{}", remaining, HELP);
    }

    logging::init();

    let mut config = ServerConfig::from_env(bind, database_url, in_memory)?;
    if metrics_bind.is_some() {
        config.metrics_bind = metrics_bind;
    }
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics at http://{}/metrics", addr);
    }

    let (repository, database): (Arc<dyn SeatingRepository>, Option<Database>) =
        if config.in_memory {
            info!("Using in-memory store; data is lost on exit");
            let repository = InMemoryRepository::new();
            if seed {
                seed_demo_data(&repository).await?;
            }
            (Arc::new(repository), None)
        } else {
            if seed {
                tracing::warn!("--seed only applies to the in-memory store, ignoring");
            }
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            info!("Database connected successfully");
            (Arc::new(db.seating_repository()), Some(db))
        };

    let coordinator = Arc::new(SeatingCoordinator::with_inbox_capacity(
        repository,
        config.table_actor_inbox,
    ));

    let tables = coordinator.list_tables().await?;
    info!("Server ready with {} table(s)", tables.len());
    for table in &tables {
        info!(
            "  - {} (ID: {}) - seats {}, {}",
            table.table_name,
            table.table_id,
            table.capacity,
            table.status()
        );
    }

    let app = api::create_router(api::AppState {
        coordinator: coordinator.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    coordinator.shutdown().await;
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Demo dining room for `--in-memory --seed`
async fn seed_demo_data(repository: &InMemoryRepository) -> Result<(), Error> {
    for (table_name, capacity) in [("Bar #1", 1), ("Bar #2", 1), ("#1", 6), ("#2", 6)] {
        repository
            .insert_table(&NewTable {
                table_name: table_name.to_string(),
                capacity,
            })
            .await?;
    }

    let parties = [
        ("Rick", "Sanchez", "202-555-0164", 6),
        ("Frank", "Palmer", "202-555-0153", 1),
        ("Bird", "Person", "808-555-0141", 1),
        ("Tiger", "Lion", "808-555-0140", 3),
    ];
    for (first_name, last_name, mobile_number, people) in parties {
        repository
            .insert_reservation(NewReservation {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                mobile_number: mobile_number.to_string(),
                reservation_date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
                reservation_time: "18:00".to_string(),
                people,
            })
            .await;
    }

    info!("Seeded 4 tables and {} reservations", parties.len());
    Ok(())
}
