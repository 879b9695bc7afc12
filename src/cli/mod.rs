//! Command-line interface for adaptable.
//!
//! Provides commands for importing UniProt queries into a database file,
//! classifying saved entries offline, and inspecting database files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{CachedSource, ResponseCache, SearchQuery, UniProtClient};
use crate::config;
use crate::core::{codec, Classifier, ClassifierTables, Document, Importer};
use crate::domain::{Entry, FanoutSink, LogFileSink, TracingSink};
use crate::library::Library;

/// adaptable - UniProt importer for the ADAPTABLE peptide database
#[derive(Parser, Debug)]
#[command(name = "adaptable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Be verbose (debug logging, diagnostics echoed to the terminal)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a UniProt query and create a database accordingly
    Import {
        /// Query to send to UniProt
        query: String,

        /// Maximum sequence length (number of residues)
        #[arg(long)]
        max_length: Option<usize>,

        /// Search for non-reviewed entries
        #[arg(long)]
        nonreviewed: bool,

        /// Base name of the database file (saved as <basename>_<query>)
        #[arg(long)]
        basename: Option<String>,

        /// Existing database; entries already in it are not counted as new
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Do not read or write the response cache
        #[arg(long)]
        no_cache: bool,

        /// Where to write warning messages
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Populate an entry from a saved UniProt XML file and print its record
    Classify {
        /// UniProt XML file
        file: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show entries of a database file
    Show {
        /// Database file
        file: PathBuf,

        /// Show the full listing of the entry with this sequence
        #[arg(short, long)]
        sequence: Option<String>,

        /// Maximum number of entries to list
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Check a database file for malformed records
    Check {
        /// Database file
        file: PathBuf,

        /// Rewrite the file in canonical form, dropping malformed records
        #[arg(long)]
        rewrite: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Import {
                query,
                max_length,
                nonreviewed,
                basename,
                existing,
                no_cache,
                log_file,
            } => {
                let options = ImportOptions {
                    query,
                    max_length,
                    nonreviewed,
                    basename,
                    existing,
                    no_cache,
                    log_file,
                    verbose: self.verbose,
                };
                run_import(options).await
            }
            Commands::Classify { file, json } => classify_file(&file, json).await,
            Commands::Show {
                file,
                sequence,
                limit,
            } => show_library(&file, sequence.as_deref(), limit).await,
            Commands::Check { file, rewrite } => check_library(&file, rewrite).await,
            Commands::Config => show_config(),
        }
    }
}

struct ImportOptions {
    query: String,
    max_length: Option<usize>,
    nonreviewed: bool,
    basename: Option<String>,
    existing: Option<PathBuf>,
    no_cache: bool,
    log_file: Option<PathBuf>,
    verbose: bool,
}

/// Build the classifier from the built-in tables and configuration
fn build_classifier() -> Result<Classifier> {
    let cfg = config::config()?;
    let tables = ClassifierTables::uniprot()
        .context("Classifier tables do not match the schema")?
        .with_ignored_databases(cfg.ignored_databases.iter().cloned());
    Ok(Classifier::new(tables))
}

/// Import a UniProt query into a new database file
async fn run_import(options: ImportOptions) -> Result<()> {
    let cfg = config::config()?;

    let query = SearchQuery::new(
        options.query,
        options.max_length.unwrap_or(cfg.import.max_length),
        !options.nonreviewed && cfg.import.reviewed,
    );

    let client = UniProtClient::new(cfg.uniprot.base_url.clone())
        .with_timeouts(cfg.uniprot.search_timeout(), cfg.uniprot.fetch_timeout());
    let classifier = build_classifier()?;

    let mut importer = if options.no_cache {
        Importer::new(client, classifier)
    } else {
        Importer::new(
            CachedSource::new(client, ResponseCache::new(&cfg.cache)),
            classifier,
        )
    }
    .with_max_errors(cfg.import.max_errors);

    if let Some(path) = &options.existing {
        let reference = Library::open(path).await?;
        eprintln!("Loaded {} entries from {}", reference.len(), path.display());
        importer = importer.with_reference(reference);
    }

    let basename = options
        .basename
        .unwrap_or_else(|| cfg.import.basename.clone());
    let output = PathBuf::from(format!("{}_{}", basename, query.terms));
    let log_path = options
        .log_file
        .unwrap_or_else(|| cfg.import.log_file.clone());

    let mut log_sink = LogFileSink::create(&log_path)?;
    let mut tracing_sink = TracingSink;
    let mut library = Library::new();

    eprintln!(
        "Interrogating UniProt with the query '{}' and a max sequence length of {} (reviewed={})",
        query.terms, query.max_length, query.reviewed
    );

    let outcome = {
        let mut sink = FanoutSink::new().with(&mut log_sink);
        if options.verbose {
            sink = sink.with(&mut tracing_sink);
        }

        tokio::select! {
            result = importer.run(&query, &mut library, &mut sink) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        }
    };
    log_sink.flush()?;

    let Some(summary) = outcome.transpose()? else {
        eprintln!("Keyboard interrupt triggered! Exiting without saving");
        return Ok(());
    };

    library.save_to(&output).await?;

    if summary.aborted {
        eprintln!("ERROR: Max errors ({}) reached... Aborted", cfg.import.max_errors);
    }
    if summary.known_entries > 0 {
        eprintln!("{} entries were already in the existing database", summary.known_entries);
    }
    eprintln!("Summary: {}", summary);
    eprintln!("Database saved to '{}'", output.display());
    eprintln!("All warning messages are saved in '{}'!", log_path.display());

    Ok(())
}

/// Classify a saved UniProt XML entry
async fn classify_file(path: &Path, json: bool) -> Result<()> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read entry file: {}", path.display()))?;

    let document = Document::parse(&xml)
        .with_context(|| format!("Failed to parse entry file: {}", path.display()))?;
    let sequence = document.sequence()?;

    let mut entry = Entry::try_new(sequence)?;
    let classification = build_classifier()?.populate(&mut entry, &document);

    print!("{}", codec::encode(&entry));

    if json {
        let rendered = serde_json::to_string_pretty(&classification.diagnostics)?;
        println!("{}", rendered);
    } else {
        for diagnostic in &classification.diagnostics {
            eprintln!("[{}] {}", diagnostic.category, diagnostic.message);
        }
    }

    Ok(())
}

/// List entries of a database file
async fn show_library(path: &Path, sequence: Option<&str>, limit: usize) -> Result<()> {
    let outcome = Library::open_lenient(path).await?;
    let library = outcome.library;

    if let Some(sequence) = sequence {
        let entry = library
            .get(sequence)
            .ok_or_else(|| anyhow::anyhow!("Sequence not found: {}", sequence))?;
        print!("{}", entry.human_readable());
        return Ok(());
    }

    if library.is_empty() {
        println!("Database is empty.");
        return Ok(());
    }

    println!("{:<40} {:<50}", "NAME", "SEQUENCE");
    println!("{}", "-".repeat(90));

    for entry in library.iter().take(limit) {
        println!(
            "{:<40} {:<50}",
            truncate(entry.name(), 37),
            truncate(entry.sequence(), 47)
        );
    }

    println!("\nTotal: {} entries", library.len());
    if !outcome.skipped.is_empty() {
        println!("({} malformed records skipped)", outcome.skipped.len());
    }

    Ok(())
}

/// Report malformed records, optionally rewriting the file
async fn check_library(path: &Path, rewrite: bool) -> Result<()> {
    let outcome = Library::open_lenient(path).await?;
    let library = &outcome.library;

    for error in &outcome.skipped {
        println!("{}", error);
    }

    let replaced = library.read_order().len() - library.len();
    println!(
        "{} entries loaded, {} records skipped, {} replaced by a later record with the same sequence",
        library.len(),
        outcome.skipped.len(),
        replaced
    );

    if rewrite {
        library.save_to(path).await?;
    } else if !outcome.skipped.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("ADAPTABLE importer configuration");
    println!("{}", "=".repeat(40));
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Cache:    {}", cfg.cache.display());
    println!("  Log file: {}", cfg.import.log_file.display());
    println!();
    println!("UniProt:");
    println!("  Base URL:       {}", cfg.uniprot.base_url);
    println!("  Search timeout: {}s", cfg.uniprot.search_timeout_seconds);
    println!("  Fetch timeout:  {}s", cfg.uniprot.fetch_timeout_seconds);
    println!();
    println!("Import defaults:");
    println!("  Max length: {}", cfg.import.max_length);
    println!("  Reviewed:   {}", cfg.import.reviewed);
    println!("  Max errors: {}", cfg.import.max_errors);
    println!("  Basename:   {}", cfg.import.basename);
    if !cfg.ignored_databases.is_empty() {
        println!();
        println!("Extra ignored databases: {}", cfg.ignored_databases.join(", "));
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
