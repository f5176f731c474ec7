// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshsplit CLI

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use meshsplit::cli::{MeshSummary, Reporter};
use meshsplit::io::{self, ExportFormat};
use meshsplit::{
    split_all, CenterMode, Mesh, OrphanPolicy, PartitionMode, Partitioner, Progress, SplitConfig,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshsplit")]
#[command(about = "Split meshes into loose parts or material groups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a mesh file into pieces
    Split {
        /// Input mesh (obj, json, stl)
        input: PathBuf,

        /// Output file, or directory for stl
        #[arg(short, long)]
        output: PathBuf,

        /// Output format, guessed from the output extension when omitted
        #[arg(short, long)]
        format: Option<ExportFormat>,

        #[command(flatten)]
        options: SplitArgs,
    },

    /// Print the islands of a mesh file without writing anything
    Inspect {
        /// Input mesh (obj, json, stl)
        input: PathBuf,

        /// Partition mode
        #[arg(short, long)]
        mode: Option<PartitionMode>,

        /// Keep unused vertices as single-vertex islands
        #[arg(long)]
        keep_orphans: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split several files in parallel
    Batch {
        /// Input meshes
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "obj")]
        format: ExportFormat,

        #[command(flatten)]
        options: SplitArgs,
    },

    /// Print or write the effective configuration
    Config {
        /// Write the configuration to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file to start from
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Flags shared by `split` and `batch`, layered over the loaded config
#[derive(Args)]
struct SplitArgs {
    /// Partition mode (geometric, material)
    #[arg(short, long)]
    mode: Option<PartitionMode>,

    /// Keep unused vertices as single-vertex pieces
    #[arg(long)]
    keep_orphans: bool,

    /// Move each piece's origin to its center
    #[arg(long)]
    recenter: bool,

    /// Center used by --recenter (median, bounds, mass)
    #[arg(long)]
    center: Option<CenterMode>,

    /// Drop material slots a piece does not use
    #[arg(long)]
    clear_unused_materials: bool,

    /// Configuration file, defaults to meshsplit.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SplitArgs {
    fn resolve(&self) -> Result<SplitConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.keep_orphans {
            config.orphans = OrphanPolicy::Keep;
        }
        if self.recenter {
            config.recenter = true;
        }
        if let Some(center) = self.center {
            config.center = center;
        }
        if self.clear_unused_materials {
            config.clear_unused_materials = true;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split {
            input,
            output,
            format,
            options,
        } => split_command(&input, &output, format, &options, cli.verbose),
        Commands::Inspect {
            input,
            mode,
            keep_orphans,
            json,
        } => inspect_command(&input, mode, keep_orphans, json, cli.verbose),
        Commands::Batch {
            inputs,
            output,
            format,
            options,
        } => batch_command(&inputs, &output, format, &options, cli.verbose),
        Commands::Config { output, config } => config_command(output.as_deref(), config.as_deref()),
        Commands::Version => {
            println!("meshsplit v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SplitConfig> {
    match path {
        Some(path) => {
            let mut config = SplitConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => SplitConfig::load(),
    }
}

fn split_command(
    input: &Path,
    output: &Path,
    format: Option<ExportFormat>,
    options: &SplitArgs,
    verbose: bool,
) -> Result<()> {
    let config = options.resolve()?;
    let format = match format.or_else(|| ExportFormat::from_path(output)) {
        Some(format) => format,
        None => bail!(
            "Cannot tell the output format of {}, pass --format",
            output.display()
        ),
    };

    if verbose {
        Reporter::report_info(&format!(
            "Splitting {} ({} mode)",
            input.display(),
            config.mode
        ));
    }

    let start = Instant::now();
    let (pieces, files) = split_file_to(input, output, format, &config)?;
    Reporter::report_split(
        &input.display().to_string(),
        pieces,
        &files,
        start.elapsed(),
    );

    if pieces == 0 {
        Reporter::report_warning("input has no faces, nothing was written");
    }
    Ok(())
}

/// Import, split and export one file; returns the piece count and files written
fn split_file_to(
    input: &Path,
    output: &Path,
    format: ExportFormat,
    config: &SplitConfig,
) -> Result<(usize, Vec<PathBuf>)> {
    let meshes = io::import_meshes(input)?;
    let outcomes = split_all(&meshes, config)
        .with_context(|| format!("Failed to split {}", input.display()))?;

    let pieces: Vec<Mesh> = outcomes
        .into_iter()
        .flat_map(|outcome| outcome.pieces)
        .collect();
    if pieces.is_empty() {
        return Ok((0, Vec::new()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let files = io::export_pieces(&pieces, output, format)?;
    Ok((pieces.len(), files))
}

fn inspect_command(
    input: &Path,
    mode: Option<PartitionMode>,
    keep_orphans: bool,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let config = SplitConfig::load()?;
    let mode = mode.unwrap_or(config.mode);
    let orphans = if keep_orphans {
        OrphanPolicy::Keep
    } else {
        config.orphans
    };

    let bar = (verbose && !json).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    });

    let mut summaries = Vec::new();
    for mesh in io::import_meshes(input)? {
        let mut partitioner = Partitioner::new(mode).with_orphans(orphans);
        if let Some(pb) = &bar {
            let pb = pb.clone();
            partitioner = partitioner.with_progress(Progress::new(move |current, total, message| {
                pb.set_length(total as u64);
                pb.set_position(current as u64);
                pb.set_message(message.to_string());
            }));
        }

        let islands = partitioner
            .partition(&mesh)
            .with_context(|| format!("Failed to partition '{}'", mesh.name))?;
        summaries.push(MeshSummary::new(&mesh, &islands));
    }

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            Reporter::report_islands(summary);
        }
    }
    Ok(())
}

fn batch_command<'a>(
    inputs: &'a [PathBuf],
    output_dir: &Path,
    format: ExportFormat,
    options: &SplitArgs,
    verbose: bool,
) -> Result<()> {
    let config = options.resolve()?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let progress = if verbose {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Files run in parallel; meshes within one file stay sequential
    let file_config = SplitConfig {
        parallel: false,
        ..config.clone()
    };
    // inputs sharing a file stem get distinct outputs
    let jobs: Vec<(&PathBuf, PathBuf)> = inputs
        .iter()
        .zip(io::batch_targets(inputs, output_dir, format))
        .collect();
    let split_file = |(input, target): &(&'a PathBuf, PathBuf)| {
        let start = Instant::now();
        let result = split_file_to(input, target, format, &file_config);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        (*input, result, start.elapsed())
    };
    let results: Vec<_> = if config.parallel {
        jobs.par_iter().map(split_file).collect()
    } else {
        jobs.iter().map(split_file).collect()
    };

    if let Some(pb) = progress {
        pb.finish_with_message("Batch complete");
    }

    let mut failed = 0;
    let mut total_pieces = 0;
    for (input, result, elapsed) in results {
        match result {
            Ok((pieces, files)) => {
                total_pieces += pieces;
                Reporter::report_split(&input.display().to_string(), pieces, &files, elapsed);
            }
            Err(e) => {
                failed += 1;
                Reporter::report_error(&format!("{}: {:#}", input.display(), e));
            }
        }
    }

    println!("\n{}", "═".repeat(80).bright_black());
    println!(
        "  {} {}   {} {}   {} {}",
        "Files:".bright_black(),
        inputs.len().to_string().cyan(),
        "Pieces:".bright_black(),
        total_pieces.to_string().green(),
        "Failed:".bright_black(),
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().green()
        }
    );
    println!("{}", "═".repeat(80).bright_black());

    if failed > 0 {
        bail!("{} of {} files failed", failed, inputs.len());
    }
    Ok(())
}

fn config_command(output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    match output {
        Some(path) => {
            config.save(path)?;
            Reporter::report_info(&format!("Configuration written to {}", path.display()));
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
