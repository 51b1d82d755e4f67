// Ticket Allocation Planner - Web Server
// REST API with Axum, serving the browser version of the planner

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use ticket_allocation::api::{router, AppState};
use ticket_allocation::{derive, Catalog, Parameters};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ticket-server")]
#[command(about = "HTTP API and web page for the ticket allocation planner")]
#[command(version)]
struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "TICKET_SERVER_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,

    /// Catalog JSON replacing the built-in Senior Week budget
    #[arg(long, env = "TICKET_CATALOG")]
    catalog: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticket_allocation=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = ServerArgs::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::senior_week(),
    };

    // Fail fast if the catalog cannot price the default scenario
    let defaults = Parameters::for_catalog(&catalog);
    let allocation = derive(&catalog, &defaults).context("Catalog cannot derive default prices")?;
    info!(
        expenses = catalog.expenses.len(),
        income = catalog.income.len(),
        net_expenditure = allocation.net_expenditure,
        "Catalog loaded"
    );

    let app = router(AppState::new(catalog));

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", args.addr))?;

    info!("Server running on http://{}", args.addr);
    info!("API: http://{}/api/allocation", args.addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
