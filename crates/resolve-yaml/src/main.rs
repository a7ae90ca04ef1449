/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yaml_include::{
    DEFAULT_MAX_DEPTH, DEFAULT_TAG, Encoding, IncludeOptions, LoadContext, yaml_to_json,
};
use yaml_rust2::{Yaml, YamlEmitter};

/// Resolve !include directives in a YAML document
#[derive(Parser, Debug)]
#[command(name = "resolve-yaml")]
#[command(about = "Load a YAML document, splice in included files, and print the result", long_about = None)]
struct Args {
    /// YAML document to load (reads stdin when omitted or `-`)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Tag bound to the include directive
    #[arg(long, default_value = DEFAULT_TAG)]
    tag: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Resolve every relative pathname against DIR instead of the including file's directory
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Encoding of included files when a directive does not name one
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Maximum include nesting
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() {
    // Logs go to stderr so they never mix with the document on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let encoding: Encoding = args
        .encoding
        .parse()
        .with_context(|| format!("Invalid --encoding value '{}'", args.encoding))?;
    let loader = yaml_include::loader_with_options(IncludeOptions {
        tag: args.tag,
        encoding,
        base_dir: args.base_dir,
        max_depth: args.max_depth,
    });

    let document = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(input = %path.display(), "loading document");
            loader
                .load_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            loader
                .load_str(&text, &LoadContext::working_dir())
                .context("Failed to load standard input")?
        }
    };

    println!("{}", render(&document, args.format)?);
    Ok(())
}

fn render(document: &Yaml, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            let mut out = String::new();
            YamlEmitter::new(&mut out)
                .dump(document)
                .map_err(|e| anyhow::anyhow!("Failed to emit YAML: {:?}", e))?;
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&yaml_to_json(document))?),
    }
}
