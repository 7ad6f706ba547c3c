//! runtime-fields CLI - validate and render runtime field sections
//!
//! Reads a runtime document (YAML or JSON), parses its `runtime` section with
//! the built-in field types and reports the result.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use runtime_fields::{RuntimeDocument, TracingSink, TypeRegistry, Version};

#[derive(Parser)]
#[command(name = "runtime-fields")]
#[command(version, about = "Validate and render runtime field definitions", long_about = None)]
struct Cli {
    /// Index version to parse with, overriding the document's `index_version`
    #[arg(long, global = true)]
    index_version: Option<Version>,

    /// Treat the section as coming from a dynamic template
    #[arg(long, global = true)]
    dynamic_template: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a runtime document and list the queryable fields it exposes
    Validate {
        /// Path to the runtime document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Parse a runtime document and print the normalized section as JSON
    Render {
        /// Path to the runtime document
        #[arg(short, long)]
        file: PathBuf,

        /// Include parameters left at their defaults
        #[arg(long)]
        include_defaults: bool,
    },

    /// List registered runtime field types
    Types,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        index_version: cli.index_version,
        dynamic_template: cli.dynamic_template,
    };

    let result = match cli.command {
        Commands::Validate { file } => validate(file, &overrides),
        Commands::Render {
            file,
            include_defaults,
        } => render(file, include_defaults, &overrides),
        Commands::Types => list_types(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Command-line settings that take precedence over the document's own.
struct Overrides {
    index_version: Option<Version>,
    dynamic_template: bool,
}

fn load_document(file: &Path, overrides: &Overrides) -> Result<RuntimeDocument, String> {
    let mut doc = RuntimeDocument::load_from_file(file)?;
    if overrides.index_version.is_some() {
        doc.index_version = overrides.index_version;
    }
    doc.from_dynamic_template |= overrides.dynamic_template;

    tracing::info!(
        file = %file.display(),
        index_version = %doc.index_version(),
        dynamic_template = doc.from_dynamic_template,
        "loaded runtime document"
    );
    Ok(doc)
}

/// Validate a runtime document and print its queryable fields
fn validate(file: PathBuf, overrides: &Overrides) -> Result<(), String> {
    let doc = load_document(&file, overrides)?;
    let registry = TypeRegistry::with_builtin_types();
    let sink = TracingSink::new();

    let parsed = doc.parse(&registry, &sink).map_err(|e| e.to_string())?;
    let field_types = parsed.field_types().map_err(|e| e.to_string())?;

    println!(
        "{}: {} runtime field(s), {} removal(s)",
        file.display(),
        parsed.definitions().count(),
        parsed.removals().count()
    );
    for (name, field) in &field_types {
        println!("  {} [{}]", name, field.type_name);
    }
    for name in parsed.removals() {
        println!("  {} (removed)", name);
    }
    Ok(())
}

/// Print the normalized runtime section
fn render(file: PathBuf, include_defaults: bool, overrides: &Overrides) -> Result<(), String> {
    let doc = load_document(&file, overrides)?;
    let registry = TypeRegistry::with_builtin_types();
    let sink = TracingSink::new();

    let parsed = doc.parse(&registry, &sink).map_err(|e| e.to_string())?;
    let rendered = serde_json::to_string_pretty(&parsed.to_xcontent(include_defaults))
        .map_err(|e| format!("Failed to serialize runtime section: {}", e))?;

    println!("{}", rendered);
    Ok(())
}

fn list_types() -> Result<(), String> {
    for type_name in TypeRegistry::with_builtin_types().type_names() {
        println!("{}", type_name);
    }
    Ok(())
}
