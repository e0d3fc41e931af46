// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Clash CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use polyframe_clash::clash::{BroadPhase, ClashConfig, ClashDetector, CombineMode};
use polyframe_clash::cli::Reporter;
use polyframe_clash::io::{self, MeshFormat};
use polyframe_clash::scene::Scene;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyframe-clash")]
#[command(about = "Polyframe Clash - mesh clash detection for building scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect clashes between the meshes of a scene
    Detect {
        /// Scene JSON file
        scene: PathBuf,

        /// Config file (defaults to ./clash.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compare bounding boxes only, skipping the triangle test
        #[arg(long)]
        bbox_only: bool,

        /// Narrow-phase tolerance, relative to triangle extent
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Broad phase (all-pairs, bvh)
        #[arg(long)]
        broad_phase: Option<BroadPhase>,

        /// Clash geometry to collect (none, per-clash, union)
        #[arg(long)]
        combine: Option<CombineMode>,

        /// Run on a single thread
        #[arg(long)]
        sequential: bool,

        /// Only compare meshes of nodes with this property (key=value)
        #[arg(long, value_name = "KEY=VALUE")]
        filter: Option<String>,

        /// Directory for clash geometry files
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Clash geometry format (obj, stl)
        #[arg(short, long, default_value = "obj")]
        format: MeshFormat,

        /// Write the JSON report to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Exit with status 1 when any clash is found
        #[arg(long)]
        fail_on_clash: bool,
    },

    /// Show scene structure and node properties
    Inspect {
        /// Scene JSON file
        scene: PathBuf,
    },

    /// Show version information
    Version,
}

struct DetectArgs {
    scene: PathBuf,
    config: Option<PathBuf>,
    bbox_only: bool,
    tolerance: Option<f64>,
    broad_phase: Option<BroadPhase>,
    combine: Option<CombineMode>,
    sequential: bool,
    filter: Option<String>,
    out: Option<PathBuf>,
    format: MeshFormat,
    json: Option<PathBuf>,
    fail_on_clash: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Detect {
            scene,
            config,
            bbox_only,
            tolerance,
            broad_phase,
            combine,
            sequential,
            filter,
            out,
            format,
            json,
            fail_on_clash,
        } => {
            let clashed = detect_command(DetectArgs {
                scene,
                config,
                bbox_only,
                tolerance,
                broad_phase,
                combine,
                sequential,
                filter,
                out,
                format,
                json,
                fail_on_clash,
            })?;
            if clashed {
                std::process::exit(1);
            }
        }
        Commands::Inspect { scene } => {
            inspect_command(&scene)?;
        }
        Commands::Version => {
            println!("Polyframe Clash v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(args: &DetectArgs) -> Result<ClashConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ClashConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => ClashConfig::load()?,
    };

    if args.bbox_only {
        config.bounding_box_only = true;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(broad_phase) = args.broad_phase {
        config.broad_phase = broad_phase;
    }
    if let Some(combine) = args.combine {
        config.combine = combine;
    } else if args.out.is_some() && config.combine == CombineMode::None {
        config.combine = CombineMode::PerClash;
    }
    if args.sequential {
        config.parallel = false;
    }

    config.validate()?;
    Ok(config)
}

fn parse_filter(filter: &str) -> Result<(&str, &str)> {
    match filter.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("invalid filter '{filter}' (expected KEY=VALUE)"),
    }
}

/// Returns whether the run should fail because of clashes
fn detect_command(args: DetectArgs) -> Result<bool> {
    if !args.scene.exists() {
        Reporter::report_error(&format!("Scene file not found: {}", args.scene.display()));
        std::process::exit(1);
    }

    let config = load_config(&args)?;
    debug!(?config, "effective configuration");

    let scene = io::load_scene(&args.scene)?;
    let placed = match &args.filter {
        Some(filter) => {
            let (key, value) = parse_filter(filter)?;
            scene.flatten_by_property(key, value)
        }
        None => scene.flatten(),
    };
    info!(meshes = placed.len(), scene = %args.scene.display(), "scene flattened");

    let detector = ClashDetector::new(config)?;
    let report = detector.detect(&placed)?;

    Reporter::report_clashes(&report);

    if let Some(dir) = &args.out {
        let written = io::export_clashes(&report, dir, args.format)?;
        if !written.is_empty() {
            Reporter::success(&format!(
                "Wrote {} geometry file(s) to {}",
                written.len(),
                dir.display()
            ));
        }
    }

    if let Some(path) = &args.json {
        let json = Reporter::to_json(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Reporter::report_info(&format!("Report written to {}", path.display()));
    }

    Ok(args.fail_on_clash && !report.is_empty())
}

fn inspect_command(path: &Path) -> Result<()> {
    let scene: Scene = io::load_scene(path)?;
    Reporter::report_scene(&scene);
    Ok(())
}
