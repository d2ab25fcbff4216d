//! redline CLI - tracked change and comment extraction for .docx files

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use redline::ansi::{export_to_ansi_with_options, AnsiOptions};
use redline::config::Config;
use redline::export::{export_to_json, export_to_text, Report};
use redline::{extract_document, ColorDepth, ExtractionResult, OutputFormat};

#[derive(Parser)]
#[command(name = "redline")]
#[command(version)]
#[command(about = "Extract tracked changes and comments from DOCX files", long_about = None)]
struct Cli {
    /// DOCX file(s) to extract
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    files: Vec<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,

    /// Color depth for the ansi format
    #[arg(long, value_enum)]
    color: Option<ColorDepth>,

    /// Worker threads when extracting several files
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.init_config {
        let path = Config::init_default()?;
        println!("Config written to: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli.format.unwrap_or(config.output.format);
    let compact = cli.compact || config.output.compact;
    let color_depth = cli.color.unwrap_or(config.output.color);
    let jobs = cli.jobs.unwrap_or(config.batch.jobs);

    let results = extract_all(&cli.files, jobs)?;
    let failed = results
        .iter()
        .map(Report::from_result)
        .any(|report| report.is_failure());

    let rendered = match format {
        OutputFormat::Json => render_json(&results, compact)?,
        OutputFormat::Text => render_each(&results, export_to_text)?,
        OutputFormat::Ansi => {
            let options = AnsiOptions {
                color_depth,
                ..AnsiOptions::default()
            };
            render_each(&results, |r| export_to_ansi_with_options(r, &options))?
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Extraction saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Extract every input; documents are independent, so several run in parallel
fn extract_all(files: &[PathBuf], jobs: usize) -> Result<Vec<redline::Result<ExtractionResult>>> {
    if files.len() == 1 {
        return Ok(vec![extract_document(&files[0])]);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to start extraction workers")?;

    Ok(pool.install(|| {
        files
            .par_iter()
            .map(|path| extract_document(path))
            .collect()
    }))
}

fn render_json(results: &[redline::Result<ExtractionResult>], compact: bool) -> Result<String> {
    let reports: Vec<Report<'_>> = results.iter().map(Report::from_result).collect();

    match reports.as_slice() {
        [single] => export_to_json(single, compact),
        _ => export_to_json(&reports, compact),
    }
}

fn render_each<F>(results: &[redline::Result<ExtractionResult>], render: F) -> Result<String>
where
    F: Fn(&ExtractionResult) -> Result<String>,
{
    let mut sections = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(extraction) => sections.push(render(extraction)?),
            Err(e) => sections.push(format!("Error: {e}\n")),
        }
    }
    Ok(sections.join("\n"))
}
