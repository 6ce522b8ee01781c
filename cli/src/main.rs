//! CLI entrypoint for concord
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod output;
mod progress;

use anyhow::{Context, Result, anyhow, bail};
use args::{Cli, Command, OutputFormat, RunArgs};
use clap::Parser;
use concord_application::{
    EngineConfig, ExtractInput, MineInput, NoProgress, ProgressNotifier, RunExtractUseCase,
    RunMineUseCase,
};
use concord_domain::{Query, Schema, SchemaRef, SchemaRegistry};
use concord_infrastructure::{
    ConfigIssue, ConfigLoader, FileConfig, HashingEmbedder, ReplayGateway, Severity,
};
use output::ConsoleFormatter;
use progress::TracingProgress;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        print_config_sources();
        return Ok(());
    }

    let file_config = load_config(&cli)?;
    let engine = file_config.to_engine_config();
    let registry = SchemaRegistry::with_builtins();

    match cli.command {
        Command::Schemas => {
            print!("{}", ConsoleFormatter::format_schemas(registry.iter()));
            Ok(())
        }
        Command::Extract(args) => run_extract(args, &engine, registry).await,
        Command::Mine(args) => run_mine(args, &engine, registry).await,
    }
}

fn print_config_sources() {
    println!("Configuration sources (highest priority first):");
    for (label, path) in ConfigLoader::config_sources() {
        match path {
            Some(path) => println!("  {:<8} {}", label, path.display()),
            None => println!("  {:<8} (not found)", label),
        }
    }
    if let Some(global) = ConfigLoader::global_config_path() {
        println!("Global config location: {}", global.display());
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("Config file not found: {}", path.display());
    }

    let config = ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("{e}"))?;
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue),
            Severity::Error => eprintln!("{}", issue),
        }
    }
    if ConfigIssue::has_errors(&issues) {
        bail!("Invalid configuration");
    }
    Ok(config)
}

/// Registered name, or an inline schema read from `--schema-file`
fn schema_ref(args: &RunArgs) -> Result<SchemaRef> {
    if let Some(path) = &args.schema_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema: Schema = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schema file {}", path.display()))?;
        return Ok(SchemaRef::Inline(schema));
    }
    match &args.schema {
        Some(name) => Ok(SchemaRef::from(name.as_str())),
        None => bail!("Either --schema or --schema-file is required"),
    }
}

fn read_context(args: &RunArgs) -> Result<Option<String>> {
    args.context_file
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context file {}", path.display()))
        })
        .transpose()
}

/// Cancel the run on Ctrl-C; in-flight calls are abandoned
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            child.cancel();
        }
    });
    token
}

async fn run_extract(args: RunArgs, engine: &EngineConfig, registry: SchemaRegistry) -> Result<()> {
    let query = Query::try_new(args.query.clone())?;
    let schema = schema_ref(&args)?;

    // === Dependency Injection ===
    let gateway = Arc::new(
        ReplayGateway::from_file(&args.replay)
            .with_context(|| format!("Failed to load replay {}", args.replay.display()))?,
    );
    info!("Replaying {} recorded generations", gateway.len());

    let mut input = ExtractInput::new(query, schema);
    if let Some(context) = read_context(&args)? {
        input = input.with_context(context);
    }
    if let Some(samples) = args.samples {
        input = input.with_samples(samples);
    }

    let use_case = RunExtractUseCase::from_config(gateway, Arc::new(registry), engine)
        .with_cancellation(cancel_on_interrupt());

    let progress: Box<dyn ProgressNotifier> = if args.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(TracingProgress::new())
    };
    let result = use_case
        .execute_with_progress(input, progress.as_ref())
        .await?;

    let output = match args.format {
        OutputFormat::Summary => ConsoleFormatter::format_consensus(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", output);

    Ok(())
}

async fn run_mine(args: RunArgs, engine: &EngineConfig, registry: SchemaRegistry) -> Result<()> {
    let query = Query::try_new(args.query.clone())?;
    let schema = schema_ref(&args)?;

    // === Dependency Injection ===
    let gateway = Arc::new(
        ReplayGateway::from_file(&args.replay)
            .with_context(|| format!("Failed to load replay {}", args.replay.display()))?,
    );
    let embedder = Arc::new(HashingEmbedder::default());
    info!("Replaying {} recorded generations", gateway.len());

    let mut input = MineInput::new(query, schema);
    if let Some(context) = read_context(&args)? {
        input = input.with_context(context);
    }
    if let Some(samples) = args.samples {
        input = input.with_samples(samples);
    }

    let use_case = RunMineUseCase::from_config(gateway, embedder, Arc::new(registry), engine)
        .with_cancellation(cancel_on_interrupt());

    let progress: Box<dyn ProgressNotifier> = if args.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(TracingProgress::new())
    };
    let result = use_case
        .execute_with_progress(input, progress.as_ref())
        .await?;

    let output = match args.format {
        OutputFormat::Summary => ConsoleFormatter::format_mining(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", output);

    Ok(())
}
