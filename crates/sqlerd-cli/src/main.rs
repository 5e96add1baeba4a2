//! sqlerd CLI
//!
//! Reads SQL DDL from a file or stdin and writes an entity-relationship
//! diagram to a file or stdout:
//! - `--emit image` (default): SVG compiled by the selected engine
//! - `--emit source`: the DOT / D2 description handed to that engine
//! - `--emit json`: the projected diagram records

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sqlerd_diagram::{compile_source, project, render_image, render_json, Engine, RenderOptions, Theme};
use sqlerd_ingest_sql::parse_sql_ddl;

mod config;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Image,
    Source,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sqlerd")]
#[command(
    author,
    version,
    about = "Render a SQL DDL dump as an entity-relationship diagram"
)]
struct Cli {
    /// Path to input SQL file, or "-" for stdin
    #[arg(short = 'i', long = "in", default_value = "-")]
    input: String,

    /// Path to output file, or "-" for stdout
    #[arg(short, long, default_value = "-")]
    out: String,

    /// Theme: "light" or "dark"
    #[arg(short, long, default_value = "light", value_parser = Theme::parse)]
    theme: Theme,

    /// Layout engine: "dot" (Graphviz) or "d2"
    #[arg(long, default_value = "dot", value_parser = Engine::parse)]
    engine: Engine,

    /// What to write: the rendered image, the engine source, or the diagram as JSON
    #[arg(long, value_enum, default_value_t = Emit::Image)]
    emit: Emit,

    /// Kill the renderer after N seconds (0 disables; default from SQLERD_RENDER_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log pipeline stages to stderr (overridden by SQLERD_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(config::SQLERD_LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let options = RenderOptions {
        engine: cli.engine,
        theme: cli.theme,
        timeout: config::render_timeout(cli.timeout_secs)?,
        renderer_bin: None,
    };

    let sql = read_input(&cli.input).context("read in")?;
    let out = render_db_schema(&sql, cli.emit, &options).context("render db schema")?;
    write_output(&cli.out, &out).context("write out")?;
    Ok(())
}

fn render_db_schema(sql: &str, emit: Emit, options: &RenderOptions) -> Result<Vec<u8>> {
    let schema = parse_sql_ddl(sql)?;
    let diagram = project(&schema);
    tracing::debug!(
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len(),
        "projected diagram"
    );

    let bytes = match emit {
        Emit::Image => render_image(&diagram, options)?,
        Emit::Source => compile_source(&diagram, options.engine, options.theme).into_bytes(),
        Emit::Json => render_json(&diagram)?.into_bytes(),
    };
    Ok(bytes)
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("open {path}"))
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok(());
    }
    fs::write(path, bytes).with_context(|| format!("create {path}"))
}
