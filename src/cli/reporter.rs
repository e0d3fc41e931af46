// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::clash::{ClashReport, ClashResult, ClashStats};
use crate::scene::{Scene, PROP_IFC_TYPE};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// One line per clash
    pub fn clash_line<N: Display>(result: &ClashResult<N>) -> String {
        format!(
            "Found clash between mesh {}({}) and mesh {}({})",
            result.mesh_a, result.node_a, result.mesh_b, result.node_b
        )
    }

    /// Report every clash followed by the run summary
    pub fn report_clashes<N: Display>(report: &ClashReport<N>) {
        if report.stats.mesh_count - report.stats.skipped_meshes < 2 {
            Self::report_warning("Not enough meshes to compare.");
            return;
        }

        println!("\n{}", "━".repeat(80).bright_black());
        for result in report.iter() {
            let tag = if result.confirmed {
                "[intersect]".red().bold()
            } else {
                "[bbox]".yellow().bold()
            };
            println!("{} {}", tag, Self::clash_line(result));
        }
        if report.is_empty() {
            println!("{}", "No clashes found".green().bold());
        }
        Self::report_summary(&report.stats, report.len());
    }

    /// Report the counters of one detection pass
    pub fn report_summary(stats: &ClashStats, clashes: usize) {
        println!("{}", "━".repeat(80).bright_black());
        println!("{}", "Summary:".bold());
        Self::print_row("Meshes", &stats.mesh_count.to_string());
        if stats.skipped_meshes > 0 {
            Self::print_row("Skipped", &stats.skipped_meshes.to_string().yellow());
        }
        Self::print_row("Pairs", &stats.pair_count.to_string());
        Self::print_row("Candidates", &stats.candidate_count.to_string());
        Self::print_row("Triangle tests", &stats.triangle_tests.to_string());
        let count = clashes.to_string();
        Self::print_row(
            "Clashes",
            &if clashes > 0 {
                count.red().bold()
            } else {
                count.green()
            },
        );
        if clashes > 0 {
            Self::print_row("Confirmed", &stats.confirmed_count.to_string());
        }
        Self::print_row("Time", &Self::format_duration(stats.elapsed).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report scene structure for `inspect`
    pub fn report_scene(scene: &Scene) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {}",
            "Scene:".bold(),
            scene.name.as_deref().unwrap_or(&scene.root.id).cyan()
        );
        println!("{}", "━".repeat(80).bright_black());
        Self::print_row("Nodes", &scene.nodes().len().to_string());
        Self::print_row("Nodes with meshes", &scene.nodes_with_meshes().len().to_string());
        Self::print_row("Meshes", &scene.mesh_count().to_string());

        let keys = scene.distinct_property_keys();
        if !keys.is_empty() {
            println!("\n{}", "Properties:".bold());
            for key in keys {
                println!("  {}", key.cyan());
            }
        }

        let kinds = scene.distinct_property_values(PROP_IFC_TYPE);
        if !kinds.is_empty() {
            println!("\n{}", "Types:".bold());
            for kind in kinds {
                let count = scene
                    .nodes_with_meshes()
                    .iter()
                    .filter(|n| n.property(PROP_IFC_TYPE) == Some(kind))
                    .count();
                println!("  {} {}", format!("{}:", kind).bright_black(), count);
            }
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Machine-readable report
    pub fn to_json<N: Serialize>(report: &ClashReport<N>) -> Result<String> {
        serde_json::to_string_pretty(report).context("Failed to serialize clash report")
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_row(name: &str, value: &dyn Display) {
        println!("  {} {}", format!("{}:", name).bright_black(), value);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
