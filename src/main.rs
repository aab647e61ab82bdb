//! IntervalGraph CLI - inspect temporal edge lists from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Node, edge and time span summary
//! intervalgraph stats calls.txt
//!
//! # Static graph of everything active in [100, 200)
//! intervalgraph window calls.txt 100 200 --attrs
//!
//! # Split the full span into 10 snapshots and show the compressed runs
//! intervalgraph snapshots calls.txt -k 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intervalgraph::edgelist::read_edgelist;
use intervalgraph::{EdgeListConfig, SnapshotSequence, StaticGraph, TemporalGraph, Timestamp, ViewOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intervalgraph")]
#[command(about = "Interval-indexed temporal graph CLI", long_about = None)]
struct Cli {
    /// Field delimiter (default: any whitespace)
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Accept RFC 3339 datetimes in the time columns
    #[arg(long, global = true)]
    datetimes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about a temporal edge list
    Stats {
        /// Input file (`u v begin end [key=value ...]` per line)
        input: PathBuf,
    },

    /// Print the static graph of a time window
    Window {
        /// Input file
        input: PathBuf,

        /// Window start (inclusive)
        begin: Timestamp,

        /// Window end (exclusive)
        end: Timestamp,

        /// Include edge attributes and interval bounds
        #[arg(long)]
        attrs: bool,
    },

    /// Split the full time span into equal-width snapshots
    Snapshots {
        /// Input file
        input: PathBuf,

        /// Number of snapshots
        #[arg(short, default_value = "10")]
        k: usize,
    },
}

fn load(cli: &Cli, input: &Path) -> Result<TemporalGraph<String>> {
    let config = EdgeListConfig {
        delimiter: cli.delimiter,
        parse_datetimes: cli.datetimes,
        ..EdgeListConfig::default()
    };

    let start = Instant::now();
    let graph = read_edgelist(input, &config)
        .with_context(|| format!("failed to read {}", input.display()))?;
    tracing::info!(elapsed = ?start.elapsed(), "loaded {}", input.display());
    Ok(graph)
}

fn handle_stats(graph: &TemporalGraph<String>) {
    println!("Nodes:          {}", graph.number_of_nodes());
    println!("Edge intervals: {}", graph.number_of_edges());
    match graph.interval_bounds() {
        Some((begin, end)) => println!("Time span:      [{}, {})", begin, end),
        None => println!("Time span:      empty"),
    }
}

fn handle_window(graph: &TemporalGraph<String>, begin: Timestamp, end: Timestamp, attrs: bool) -> Result<()> {
    let options = ViewOptions::default()
        .with_edge_attrs(attrs)
        .with_interval_attrs(attrs);
    let view: StaticGraph<String> = graph.extract_view(begin, end, &options)?;

    for (u, v) in view.edges() {
        match view.edge_attrs(u, v) {
            Some(a) if !a.is_empty() => {
                let rendered: Vec<String> = a.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
                println!("{} {} {}", u, v, rendered.join(" "));
            }
            _ => println!("{} {}", u, v),
        }
    }
    println!(
        "Total: {} nodes, {} edges",
        view.number_of_nodes(),
        view.number_of_edges()
    );
    Ok(())
}

fn handle_snapshots(graph: &TemporalGraph<String>, k: usize) -> Result<()> {
    let options = ViewOptions::default();
    let snapshots = graph.split_into_snapshots::<StaticGraph<String>>(k, &options)?;
    let width = snapshots.width;
    let sequence: SnapshotSequence<StaticGraph<String>> = snapshots.views.into_iter().collect();

    println!("Window width: {}", width);
    let mut first = 0;
    for run in sequence.runs() {
        println!(
            "snapshots {:>4}..{:<4} {:>6} nodes {:>6} edges",
            first,
            first + run.len(),
            run.view().number_of_nodes(),
            run.view().number_of_edges()
        );
        first += run.len();
    }
    println!(
        "Total: {} snapshots in {} runs",
        sequence.len(),
        sequence.number_of_runs()
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Stats { input } => {
            let graph = load(&cli, input)?;
            handle_stats(&graph);
        }
        Commands::Window {
            input,
            begin,
            end,
            attrs,
        } => {
            let graph = load(&cli, input)?;
            handle_window(&graph, *begin, *end, *attrs)?;
        }
        Commands::Snapshots { input, k } => {
            let graph = load(&cli, input)?;
            handle_snapshots(&graph, *k)?;
        }
    }

    Ok(())
}
