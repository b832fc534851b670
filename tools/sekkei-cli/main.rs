use clap::{Parser, Subcommand};
use sekkei::prelude::*;
use sekkei::properties::WarningKind;
use std::fs;
use std::time::Instant;
use tracing::info;

/// Check, format and inspect integration flow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Component/kamelet reference data (JSON)
    #[arg(short, long, global = true)]
    reference: Option<String>,

    /// Log what the engine does (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and report validation warnings
    Check {
        /// Path to the YAML DSL file
        path: String,
    },
    /// Print the document as a tree
    Outline { path: String },
    /// Re-serialize the document
    Fmt {
        path: String,
        /// Overwrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },
    /// List the element types the catalog knows about
    Catalog {
        /// Only list entries whose title or name contains this text
        #[arg(short, long, default_value = "")]
        filter: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let catalog = load_catalog(cli.reference.as_deref());

    match cli.command {
        Command::Check { path } => run_check(&catalog, &path),
        Command::Outline { path } => {
            let doc = load_document(&catalog, &path);
            print!("{}", DisplayDocument::new(&doc, &catalog));
        }
        Command::Fmt { path, write } => run_fmt(&catalog, &path, write),
        Command::Catalog { filter } => run_catalog(&catalog, &filter),
    }
}

fn load_catalog(reference_path: Option<&str>) -> Catalog {
    let mut builder = Catalog::builder();
    if let Some(path) = reference_path {
        let reference = ReferenceData::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load reference data: {}", e)));
        builder = builder.with_reference_data(reference);
    }
    builder
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid catalog: {}", e)))
}

fn load_document(catalog: &Catalog, path: &str) -> Document {
    let start = Instant::now();
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    let doc = serialize::parse(&text, catalog)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)));
    info!(path, nodes = doc.node_count(), elapsed = ?start.elapsed(), "document loaded");
    doc
}

fn run_check(catalog: &Catalog, path: &str) {
    let doc = load_document(catalog, path);
    let sync = PropertySync::new(catalog);

    let mut warnings = Vec::new();
    for id in doc.all_ids() {
        let found = sync
            .validate_node(&doc, id.as_str())
            .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));
        warnings.extend(found);
    }

    println!("{}: {} flows, {} nodes", path, doc.flows().len(), doc.node_count());
    if warnings.is_empty() {
        println!("No problems found.");
        return;
    }
    for w in &warnings {
        let kind = match w.kind {
            WarningKind::MissingRequired => "missing",
            WarningKind::MalformedPlaceholder => "placeholder",
        };
        println!("  [{}] {} ({}): {}", kind, w.node_id, w.field, w.message);
    }
    println!("{} warning(s).", warnings.len());
}

fn run_fmt(catalog: &Catalog, path: &str, write: bool) {
    let doc = load_document(catalog, path);
    let text = serialize::serialize(&doc, catalog)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write YAML: {}", e)));
    if write {
        fs::write(path, text)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
    } else {
        print!("{}", text);
    }
}

fn run_catalog(catalog: &Catalog, filter: &str) {
    let usage = UsageStore::new();
    println!("--- Document level ---");
    for entry in Selector::root_entries(catalog, &usage, filter) {
        println!("  {:<32} {}", entry.key, entry.title);
    }
    println!("\n--- Steps ---");
    for entry in Selector::entries(catalog, "Pipeline", "steps", &usage, filter) {
        println!("  {:<32} {}", entry.key, entry.title);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
