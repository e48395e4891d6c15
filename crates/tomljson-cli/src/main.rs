//! `tomljson` CLI — convert TOML to JSON and validate TOML documents.
//!
//! ## Usage
//!
//! ```sh
//! # Convert TOML to JSON (stdin → stdout)
//! echo 'port = 8080' | tomljson convert
//!
//! # Convert from file to file
//! tomljson convert -i Cargo.toml -o cargo.json
//!
//! # Pretty-print the JSON
//! tomljson convert --pretty -i Cargo.toml
//!
//! # Validate a document (exit code 1 and the error position on failure)
//! tomljson validate -i config.toml
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tomljson_core::JsonReader;

#[derive(Parser)]
#[command(name = "tomljson", version, about = "Streaming TOML to JSON converter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert TOML to JSON
    Convert {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a document is valid TOML
    Validate {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            pretty,
        } => convert(input.as_deref(), output.as_deref(), pretty),
        Commands::Validate { input } => validate(input.as_deref()),
    }
}

fn open_input(path: Option<&str>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open file: {path}"))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to create file: {path}"))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn convert(input: Option<&str>, output: Option<&str>, pretty: bool) -> Result<()> {
    let reader = open_input(input)?;
    let mut json_reader = JsonReader::new(reader);
    let mut writer = open_output(output)?;

    if pretty {
        // pretty output needs the whole document; re-serialize through a
        // JSON value
        let mut json = String::new();
        json_reader
            .read_to_string(&mut json)
            .context("Failed to convert TOML input")?;
        let value: serde_json::Value =
            serde_json::from_str(&json).context("Converter produced unreadable JSON")?;
        let rendered =
            serde_json::to_string_pretty(&value).context("Failed to render pretty JSON")?;
        writeln!(writer, "{rendered}").context("Failed to write output")?;
    } else {
        // stream straight through; the document never lives in memory
        io::copy(&mut json_reader, &mut writer).context("Failed to convert TOML input")?;
        writeln!(writer).context("Failed to write output")?;
    }
    Ok(())
}

fn validate(input: Option<&str>) -> Result<()> {
    let reader = open_input(input)?;
    let mut json_reader = JsonReader::new(reader);
    let mut sink = io::sink();

    if let Err(err) = io::copy(&mut json_reader, &mut sink) {
        eprintln!("error: {err}");
        process::exit(1);
    }
    println!("toml is valid");
    Ok(())
}
