//! docsift command-line interface.
//!
//! `docsift extract` runs the extraction pipeline on a local file and prints
//! the same JSON body the HTTP service returns. `docsift serve` starts the
//! HTTP service.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docsift::api::{DEFAULT_HOST, DEFAULT_PORT, ExtractResponse, serve_with_config};
use docsift::{ExtractionConfig, default_ocr_backend, extract_file};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docsift",
    version,
    about = "Extract text, OCR text and tables from PDF and DOCX documents",
    after_help = "EXAMPLES:\n  \
                  docsift extract invoice.pdf\n  \
                  docsift extract report.docx --format text\n  \
                  docsift serve -H 127.0.0.1 -p 5005 -c docsift.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a local PDF or DOCX and print the result
    Extract {
        /// Document to extract
        path: PathBuf,

        /// Configuration file (TOML, YAML or JSON); defaults to a discovered docsift.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Start the HTTP extraction service
    Serve {
        /// Address to bind
        #[arg(short = 'H', long, env = "DOCSIFT_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "DOCSIFT_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Configuration file (TOML, YAML or JSON); defaults to a discovered docsift.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    if let Some(path) = path {
        let config = ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded extraction config");
        return Ok(config);
    }

    match ExtractionConfig::discover().context("Failed to load discovered docsift.toml")? {
        Some(config) => {
            tracing::info!("Loaded extraction config from discovered file");
            Ok(config)
        }
        None => Ok(ExtractionConfig::default()),
    }
}

fn render_text(response: &ExtractResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("File type: {}\n", response.file_type));
    out.push_str(&format!("Images: {}\n", response.extracted_images));
    out.push_str(&format!("Tables: {}\n", response.extracted_tables.len()));
    out.push_str("\n--- Text ---\n");
    out.push_str(&response.extracted_text);
    if !response.ocr_text.is_empty() {
        out.push_str("\n\n--- OCR ---\n");
        out.push_str(&response.ocr_text);
    }
    for table in &response.extracted_tables {
        match table.page {
            Some(page) => out.push_str(&format!("\n--- Table {} (page {}) ---\n", table.table_index, page)),
            None => out.push_str(&format!("\n--- Table {} ---\n", table.table_index)),
        }
        for row in &table.data {
            let cells: Vec<&str> = row.values().map(String::as_str).collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
    }
    out
}

async fn run_extract(path: &Path, config: &ExtractionConfig, format: OutputFormat) -> Result<()> {
    let result = extract_file(path, config, default_ocr_backend())
        .await
        .with_context(|| format!("Extraction failed for {}", path.display()))?;
    let response = ExtractResponse::from(result);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print!("{}", render_text(&response)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { path, config, format } => {
            let config = load_config(config.as_deref())?;
            run_extract(&path, &config, format).await
        }
        Commands::Serve { host, port, config } => {
            let config = load_config(config.as_deref())?;
            serve_with_config(&host, port, config)
                .await
                .context("HTTP server failed")
        }
    }
}
