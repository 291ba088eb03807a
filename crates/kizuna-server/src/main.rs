//! Kizuna server - recommendation scheduler and maintenance commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use kizuna::PreferenceCategory;

use kizuna_server::config::Settings;
use kizuna_server::services::scheduler;
use kizuna_server::Engine;

#[derive(Parser)]
#[command(name = "kizuna-server")]
#[command(about = "Kizuna - compatibility scoring and connection engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the background scheduler until interrupted
    Run,

    /// Regenerate recommendations once
    Generate {
        /// Only regenerate this viewer (defaults to every user)
        #[arg(long)]
        viewer: Option<Uuid>,
        /// Number of recommendations to keep
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a viewer's stored recommendations
    Show {
        /// Viewer ID
        viewer: Uuid,
    },

    /// Connection lifecycle operations
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },

    /// Remove expired pending requests
    Sweep,

    /// List the known preference codes
    Catalog {
        /// Only this category (food, hobby or music)
        category: Option<PreferenceCategory>,
    },
}

#[derive(Subcommand)]
enum ConnectionAction {
    /// Send a connection request
    Request {
        /// Requesting user
        requester: Uuid,
        /// Requested user
        target: Uuid,
    },
    /// Answer a pending request
    Respond {
        /// User who received the request
        target: Uuid,
        /// User who sent the request
        requester: Uuid,
        /// Reject instead of accepting
        #[arg(long)]
        reject: bool,
    },
    /// Show the lifecycle state of a pair
    Status { a: Uuid, b: Uuid },
    /// List a user's connections and pending requests
    List { user: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("Failed to load settings")?;

    tracing::info!("💞 Kizuna initializing...");

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("Failed to connect to database")?;

    let engine = Engine::new(pool, settings.engine.clone());
    engine
        .migrate()
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    match cli.command {
        Commands::Run => {
            let handle = scheduler::maybe_start_scheduler(
                engine.recommendations.clone(),
                engine.connections.clone(),
                settings.scheduler.clone(),
            );
            match handle {
                Some(handle) => {
                    tracing::info!("📅 Scheduler started, press Ctrl-C to stop");
                    tokio::signal::ctrl_c()
                        .await
                        .context("Failed to listen for shutdown signal")?;
                    handle.abort();
                    tracing::info!("👋 Kizuna stopped");
                }
                None => tracing::warn!("⚠️  Scheduler disabled (KIZUNA_SCHEDULER_ENABLED=false)"),
            }
        }
        Commands::Generate { viewer, limit } => match viewer {
            Some(viewer_id) => {
                let outcome = engine.recommendations.generate(viewer_id, limit).await?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            None => {
                let runs = engine.recommendations.generate_all(limit).await?;
                let mut failed = 0;
                for run in &runs {
                    if let Err(e) = &run.result {
                        failed += 1;
                        tracing::warn!("❌ {}: {}", run.viewer_id, e);
                    }
                }
                tracing::info!(
                    "🔄 Regenerated {} viewer(s), {} failed",
                    runs.len() - failed,
                    failed
                );
            }
        },
        Commands::Show { viewer } => {
            let recommendations = engine.recommendations.get(viewer).await?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        Commands::Connection { action } => run_connection(&engine, action).await?,
        Commands::Sweep => {
            let expired = engine.connections.expire_pending().await?;
            tracing::info!("🧹 Removed {} expired pending request(s)", expired);
        }
        Commands::Catalog { category } => print_catalog(category),
    }

    Ok(())
}

async fn run_connection(engine: &Engine, action: ConnectionAction) -> Result<()> {
    let connections = &engine.connections;
    match action {
        ConnectionAction::Request { requester, target } => {
            let outcome = connections.request(requester, target).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ConnectionAction::Respond {
            target,
            requester,
            reject,
        } => {
            let outcome = connections.respond(target, requester, !reject).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ConnectionAction::Status { a, b } => {
            let state = connections.pair_status(a, b).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        ConnectionAction::List { user } => {
            let listing = serde_json::json!({
                "connections": connections.list_connections(user).await?,
                "incoming": connections.list_incoming(user).await?,
                "outgoing": connections.list_outgoing(user).await?,
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }
    Ok(())
}

fn print_catalog(category: Option<PreferenceCategory>) {
    let categories = match category {
        Some(category) => vec![category],
        None => PreferenceCategory::ALL.to_vec(),
    };
    for category in categories {
        println!("{}:", category);
        for (code, description) in category.catalog() {
            println!("  {}  {}", code, description);
        }
    }
}
