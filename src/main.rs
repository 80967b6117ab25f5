//! Oort - maintenance CLI for the asteroid graph

use anyhow::Result;
use clap::{Parser, Subcommand};
use oort_graph::auth::{Principal, RequestContext};
use oort_graph::{AppState, Config};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "oort")]
#[command(about = "Asteroid graph maintenance tool")]
struct Cli {
    /// Path to the YAML config file (defaults to ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, global = true, default_value = "60")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate missing graph nodes for an author's active notes
    Reconcile {
        /// Author whose notes are checked
        #[arg(short, long)]
        author: Uuid,
    },

    /// Print a materialized graph as JSON
    Graph {
        /// Principal the graph is read as
        #[arg(short, long)]
        author: Uuid,

        /// Start from this note instead of reading the full graph
        #[arg(long)]
        anchor: Option<Uuid>,

        /// Traversal depth (with --anchor); out-of-range means the maximum
        #[arg(short, long)]
        depth: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    oort_graph::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Commands::Reconcile { author } => run_reconcile(config, author, timeout).await,
        Commands::Graph {
            author,
            anchor,
            depth,
        } => run_graph(config, author, anchor, depth, timeout).await,
    }
}

fn context_for(author: Uuid, timeout: Duration) -> RequestContext {
    RequestContext::new(Principal::new(author)).with_timeout(timeout)
}

async fn run_reconcile(config: Config, author: Uuid, timeout: Duration) -> Result<()> {
    let state = AppState::new(config).await?;
    tracing::info!("Connected to databases");

    let ctx = context_for(author, timeout);
    let report = state.reconciler().reconcile_author(&ctx, author).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.failed.is_empty() {
        anyhow::bail!("{} graph nodes could not be written", report.failed.len());
    }
    Ok(())
}

async fn run_graph(
    config: Config,
    author: Uuid,
    anchor: Option<Uuid>,
    depth: Option<i64>,
    timeout: Duration,
) -> Result<()> {
    let default_depth = config.default_depth;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to databases");

    let ctx = context_for(author, timeout);
    let graphs = state.graph_service();
    let graph = match anchor {
        Some(anchor) => {
            graphs
                .get_by_asteroid_id(&ctx, anchor, depth.unwrap_or(default_depth))
                .await?
        }
        None => graphs.get_full(&ctx).await?,
    };

    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
