//! trauma-engine - runs an assessment from a response script.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trauma_engine::adapters::{
    FileSessionStore, InMemoryEventBus, InMemorySessionStore, RedisSessionStore,
    SeededRandomSource, ThreadRandomSource,
};
use trauma_engine::application::{
    AssessmentScript, StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult,
    VectorResponseHandler,
};
use trauma_engine::config::{AppConfig, LoggingConfig, StorageBackend};
use trauma_engine::domain::sequence::{PersistedProfile, VECTOR_RESPONSE};
use trauma_engine::domain::vector::{catalog, VectorKind};
use trauma_engine::ports::{EventSubscriber, RandomSource, SessionStore};

#[derive(Parser)]
#[command(name = "trauma-engine")]
#[command(about = "Trauma classification assessment engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an assessment from a YAML or JSON response script
    Run {
        /// Script file
        script: PathBuf,
    },
    /// Print the stored profile, if any
    Show,
    /// Delete the stored profile
    Reset,
    /// Print the item catalog for one or all vectors
    Catalog {
        /// Vector name (visual, narrative, interactive, temporal)
        vector: Option<VectorKind>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Catalog { vector } => print_catalog(vector),
        Commands::Run { script } => {
            let runtime = Runtime::build(&config).await?;
            run(&runtime, &config, script).await
        }
        Commands::Show => {
            let runtime = Runtime::build(&config).await?;
            show(&runtime.handler).await
        }
        Commands::Reset => {
            let runtime = Runtime::build(&config).await?;
            runtime.handler.discard().await?;
            info!("Stored assessment removed");
            Ok(())
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = logging.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

/// The store, bus and handler shared by one invocation.
struct Runtime {
    handler: StartAssessmentHandler,
    bus: Arc<InMemoryEventBus>,
}

impl Runtime {
    async fn build(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
            StorageBackend::File => Arc::new(FileSessionStore::new(&config.storage.file_path)),
            StorageBackend::Redis => Arc::new(
                RedisSessionStore::connect(&config.redis)
                    .await
                    .context("connecting to redis")?,
            ),
        };
        let random: Arc<dyn RandomSource> = match config.engine.seed {
            Some(seed) => Arc::new(SeededRandomSource::new(seed)),
            None => Arc::new(ThreadRandomSource),
        };
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = StartAssessmentHandler::new(
            store,
            bus.clone(),
            random,
            config.engine.profile_keys(),
        );
        Ok(Self { handler, bus })
    }
}

async fn run(runtime: &Runtime, config: &AppConfig, script: PathBuf) -> Result<()> {
    let text = tokio::fs::read_to_string(&script)
        .await
        .with_context(|| format!("reading {}", script.display()))?;
    let script = AssessmentScript::from_yaml(&text)?;

    let command = StartAssessmentCommand {
        vectors: config.engine.enabled_vectors()?,
    };
    let machine = match runtime.handler.handle(command).await? {
        StartAssessmentResult::Resumed(profile) => {
            info!("A completed assessment is already stored; use `reset` to start over");
            return print_profile(&profile);
        }
        StartAssessmentResult::Started { machine, .. } => machine,
    };

    let machine = Arc::new(Mutex::new(machine));
    runtime
        .bus
        .subscribe(VECTOR_RESPONSE, Arc::new(VectorResponseHandler::new(machine.clone())));
    script.play(runtime.bus.as_ref()).await?;
    info!(events = runtime.bus.event_count(), "Script finished");

    let machine = machine.lock().await;
    match machine.profile() {
        Some(profile) => print_profile(profile),
        None => {
            let missing = machine
                .active_vector()
                .and_then(|v| machine.module(v))
                .map(|m| m.missing_items().join(", "))
                .unwrap_or_default();
            anyhow::bail!(
                "script ended during the {} phase; unanswered: {}",
                machine.phase(),
                missing
            )
        }
    }
}

async fn show(handler: &StartAssessmentHandler) -> Result<()> {
    match handler.load_profile().await? {
        Some(profile) => print_profile(&profile),
        None => {
            println!("No completed assessment stored.");
            Ok(())
        }
    }
}

fn print_profile(profile: &PersistedProfile) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

fn print_catalog(vector: Option<VectorKind>) -> Result<()> {
    let kinds = match vector {
        Some(kind) => vec![kind],
        None => VectorKind::all().to_vec(),
    };
    for kind in kinds {
        let module = catalog::module_for(kind)?;
        println!("# {} (weight {})", kind, kind.weight());
        println!("{}", serde_yaml::to_string(module.items())?);
    }
    Ok(())
}
