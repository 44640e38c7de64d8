//! Binary entry point for sixdeg.
//!
//! Loads a graph (a JSON/TOML file or the bundled demo network), answers
//! degrees-of-separation queries, and prints history and rankings.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use sixdeg::cli::{
    OutputFormat, parse_batch, render_history, render_rankings, render_record, render_stats,
};
use sixdeg::config::SixDegConfig;
use sixdeg::observability::{
    self, DEFAULT_EVENT_BUS_CAPACITY, ObservabilityConfig, RequestContext, enter_request_context,
    scope_request_context,
};
use sixdeg::storage::{GraphBackend, GraphFile, InMemoryGraphBackend, demo_network};
use sixdeg::{EventBus, QueryService, SearchEvent};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

type Service = QueryService<InMemoryGraphBackend>;

/// Sixdeg - degrees of separation over a social graph.
#[derive(Parser)]
#[command(name = "sixdeg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Graph file to load (.json or .toml); defaults to the demo network.
    #[arg(short, long, global = true)]
    graph: Option<PathBuf>,

    /// Print Prometheus metrics on exit.
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Find the degrees of separation between two people.
    Query {
        /// Starting person.
        from: String,

        /// Target person.
        to: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Run `from,to` queries from a file or stdin.
    Batch {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show graph statistics.
    Stats,

    /// Configuration management.
    Config {
        /// Show the effective configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let Cli {
        verbose,
        config,
        graph,
        metrics,
        command,
    } = Cli::parse();

    let mut config = match SixDegConfig::load(config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    if metrics {
        config.metrics.enabled = Some(true);
    }
    if let Some(graph) = graph {
        config.graph_path = Some(graph);
    }

    let observability =
        match observability::init(ObservabilityConfig::from_config(&config, verbose)) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("Failed to initialize observability: {e}");
                return ExitCode::FAILURE;
            },
        };

    let context = RequestContext::new();
    let result = scope_request_context(
        context.clone(),
        run_command(command, &config, context),
    )
    .await;

    if metrics {
        if let Some(handle) = observability.metrics() {
            println!("{}", handle.render());
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(
    command: Commands,
    config: &SixDegConfig,
    context: RequestContext,
) -> anyhow::Result<()> {
    match command {
        Commands::Query { from, to, format } => cmd_query(config, &from, &to, format),
        Commands::Batch { file, format } => cmd_batch(config, file, format, context).await,
        Commands::Stats => cmd_stats(config),
        Commands::Config { show } => cmd_config(config, show),
    }
}

/// Builds the query service and loads the configured graph.
fn build_service(config: &SixDegConfig, bus: EventBus) -> anyhow::Result<Arc<Service>> {
    let service = QueryService::new(Arc::new(InMemoryGraphBackend::new()))
        .with_history_capacity(config.history_capacity)
        .with_event_bus(bus);

    let file = match config.graph_path.as_deref() {
        Some(path) => read_graph(path)?,
        None => demo_network(),
    };
    service.load_graph_file(file).context("loading graph")?;

    Ok(Arc::new(service))
}

fn read_graph(path: &Path) -> anyhow::Result<GraphFile> {
    GraphFile::from_path(path).with_context(|| format!("reading graph {}", path.display()))
}

/// Query command.
fn cmd_query(
    config: &SixDegConfig,
    from: &str,
    to: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let service = build_service(config, EventBus::default())?;
    let record = service.query(from, to)?;
    println!("{}", render_record(&record, format)?);
    Ok(())
}

/// Batch command.
///
/// Queries run on blocking tasks; results are printed as their completion
/// events arrive, so output order follows commit order.
async fn cmd_batch(
    config: &SixDegConfig,
    file: Option<PathBuf>,
    format: OutputFormat,
    context: RequestContext,
) -> anyhow::Result<()> {
    let input = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading batch file {}", path.display()))?,
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("reading batch input from stdin")?;
            input
        },
    };
    let queries = parse_batch(&input)?;
    let total = queries.len();

    // Room for every event, so the printer never lags.
    let bus = EventBus::new(DEFAULT_EVENT_BUS_CAPACITY.max(total + 1));
    let mut events = bus.subscribe_filtered(|event| {
        matches!(
            event,
            SearchEvent::Completed { .. } | SearchEvent::Rejected { .. }
        )
    });
    let service = build_service(config, bus)?;

    let printer = tokio::spawn(async move {
        let mut rejected = 0_usize;
        for _ in 0..total {
            match events.recv().await {
                Ok(SearchEvent::Completed { record, .. }) => match render_record(&record, format) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(e) => eprintln!("Failed to render {}: {e}", record.id),
                },
                Ok(SearchEvent::Rejected {
                    from, to, message, ..
                }) => {
                    rejected += 1;
                    eprintln!("Rejected '{from},{to}': {message}");
                },
                Ok(SearchEvent::GraphLoaded { .. }) => {},
                Err(_) => break,
            }
        }
        rejected
    });

    let mut tasks = Vec::with_capacity(total);
    for query in queries {
        let service = Arc::clone(&service);
        let context = context.child(query.line);
        tasks.push(tokio::task::spawn_blocking(move || {
            let _guard = enter_request_context(context);
            // Rejections are reported through the event bus.
            let _ = service.query(&query.from, &query.to);
        }));
    }
    for task in tasks {
        task.await.context("batch query task panicked")?;
    }
    let rejected = printer.await.context("batch printer task panicked")?;

    println!();
    println!(
        "{}",
        render_history(&service.history(config.history_display), format)?
    );
    println!();
    println!(
        "{}",
        render_rankings(&service.rankings(config.rankings_display), format)?
    );

    if rejected > 0 {
        bail!("{rejected} of {total} queries rejected");
    }
    Ok(())
}

/// Stats command.
fn cmd_stats(config: &SixDegConfig) -> anyhow::Result<()> {
    let service = build_service(config, EventBus::default())?;
    println!("{}", render_stats(&service.graph().stats()));
    Ok(())
}

/// Config command.
fn cmd_config(config: &SixDegConfig, show: bool) -> anyhow::Result<()> {
    if show {
        println!("{}", config.to_toml()?);
    } else {
        println!("Use --show to display the effective configuration");
    }
    Ok(())
}
