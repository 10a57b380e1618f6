//! Process Map Tool
//!
//! Command-line front end for the process-map kernel:
//! - Lists the built-in accreditation templates
//! - Instantiates a template, lays it out and prints it as JSON
//! - Loads a saved graph, sanitizes it, lays it out and prints it
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PROCESS_MAP_CONFIG`: path to a JSON editor config (optional)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! Logs go to stderr; stdout carries only the resulting graph.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin process_map_tool --features cli -- list
//! cargo run --bin process_map_tool --features cli -- template incident-review
//! cargo run --bin process_map_tool --features cli -- layout saved-map.json
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use process_map_kernel::{
    EditorConfig, GraphStore, InMemoryGraphStore, ProcessGraph, ProcessMapEditor,
    TemplateLibrary,
};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "process_map_tool=info,process_map_kernel=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    }
}

/// Build, load and lay out accreditation process maps.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List the built-in templates
    List,
    /// Instantiate a built-in template, lay it out and print it
    Template {
        /// Template name, as printed by `list`
        name: String,
    },
    /// Load a saved graph, sanitize it, lay it out and print it
    Layout {
        /// Path to a graph JSON document
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = EditorConfig::from_env()?;
    let library = TemplateLibrary::builtin();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_hash = %config.config_hash(),
        "Starting process map tool"
    );

    let mut editor = ProcessMapEditor::new(config);
    let map_id = match cli.command {
        Command::List => {
            for name in library.names() {
                let template = library.get(name)?;
                println!("{}\t{}", template.name, template.description);
            }
            return Ok(());
        }
        Command::Template { name } => {
            let skipped = editor.load_template_named(&library, &name)?;
            if !skipped.is_empty() {
                tracing::warn!(template = %name, skipped = ?skipped, "Template had unresolved edges");
            }
            name
        }
        Command::Layout { path } => {
            let json = std::fs::read_to_string(&path)?;
            let graph: ProcessGraph = serde_json::from_str(&json)?;
            let report = editor.replace_graph(graph);
            if !report.is_clean() {
                tracing::warn!(
                    path = %path.display(),
                    duplicate_nodes = report.duplicate_nodes,
                    duplicate_edges = report.duplicate_edges,
                    dangling_edges = report.dangling_edges,
                    self_loops = report.self_loops,
                    invalid_positions = report.invalid_positions,
                    "Input graph was sanitized"
                );
            }
            path.display().to_string()
        }
    };

    let layout_start = Instant::now();
    let moved = editor.auto_layout();
    info!(
        nodes = editor.graph().num_nodes(),
        edges = editor.graph().num_edges(),
        moved = moved,
        latency_us = layout_start.elapsed().as_micros() as u64,
        "Auto-layout complete"
    );

    let store = InMemoryGraphStore::new();
    editor.save(&store, &map_id).await?;
    let saved = store.load(&map_id).await?.ok_or("saved map vanished")?;

    println!("{}", serde_json::to_string_pretty(&saved)?);
    info!(map_id = %map_id, fingerprint = %editor.fingerprint(), "Done");
    Ok(())
}
