//! Axiom Engine - Entry Point
//!
//! Loads configuration, opens the world store, wires the optional reasoning
//! gateway and runs the simulation clock until Ctrl-C or the tick limit.

use std::path::PathBuf;
use std::sync::Arc;

use axiom_engine::core::error::Result;
use axiom_engine::llm::gateway::{LlmReasoningGateway, ReasoningGateway};
use axiom_engine::notify::{Notifier, SubscriberNotifier};
use axiom_engine::store::{InMemoryWorldStore, JsonFileWorldStore, WorldStore};
use axiom_engine::{EngineConfig, EngineContext, SimulationClock};
use clap::Parser;

/// Persistent agent world simulation
#[derive(Parser, Debug)]
#[command(name = "axiom-engine")]
#[command(about = "Run the Axiom Engine world clock")]
struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON world file; the world is kept in memory when omitted
    #[arg(long)]
    store: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many fast ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Ignore gateway credentials and decide with the local heuristic only
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axiom_engine=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().map_err(axiom_engine::AxiomError::Config)?;

    let store: Arc<dyn WorldStore> = match &args.store {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using JSON world store");
            Arc::new(JsonFileWorldStore::new(path))
        }
        None => Arc::new(InMemoryWorldStore::new()),
    };

    let gateway: Option<Arc<dyn ReasoningGateway>> = if args.offline {
        None
    } else {
        LlmReasoningGateway::from_env().map(|g| Arc::new(g) as Arc<dyn ReasoningGateway>)
    };
    if gateway.is_none() {
        tracing::warn!("No reasoning gateway - agents decide with the local utility heuristic");
    }

    let notifier = Arc::new(SubscriberNotifier::new(8, config.broadcast_event_window));
    let ctx = Arc::new(EngineContext::new(
        config,
        store,
        notifier as Arc<dyn Notifier>,
        gateway,
    ));

    let world = ctx.snapshot().await?;
    tracing::info!(
        agents = world.agents.len(),
        monsters = world.monsters.len(),
        tick = world.tick,
        "Axiom Engine starting..."
    );

    let clock = SimulationClock::new(ctx.clone());
    let handle = clock.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, finishing current tick");
            handle.stop();
        }
    });

    clock.run(args.ticks).await;

    let world = ctx.snapshot().await?;
    tracing::info!(
        tick = world.tick,
        uptime_secs = world.uptime_secs,
        stability = world.metrics.stability_index,
        threat = world.metrics.threat_level,
        "Axiom Engine stopped"
    );
    Ok(())
}
