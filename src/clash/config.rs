// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clash detection configuration

use crate::error::{ClashError, Result as ClashResult};
use crate::geometry::DEFAULT_TOLERANCE;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file picked up by [`ClashConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "clash.toml";

/// Candidate pair enumeration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BroadPhase {
    /// Test every unordered pair of mesh boxes
    #[default]
    AllPairs,
    /// Query a bounding-volume hierarchy built over the mesh boxes
    Bvh,
}

impl FromStr for BroadPhase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all-pairs" | "all_pairs" | "allpairs" => Ok(Self::AllPairs),
            "bvh" => Ok(Self::Bvh),
            other => bail!("unknown broad phase '{other}' (expected 'all-pairs' or 'bvh')"),
        }
    }
}

/// Which clashing geometry to hand back for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombineMode {
    /// Report only
    #[default]
    None,
    /// Attach the two meshes' combined geometry to every clash
    PerClash,
    /// One mesh holding every mesh involved in any clash
    Union,
}

impl FromStr for CombineMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "per-clash" | "per_clash" | "perclash" => Ok(Self::PerClash),
            "union" => Ok(Self::Union),
            other => {
                bail!("unknown combine mode '{other}' (expected 'none', 'per-clash' or 'union')")
            }
        }
    }
}

/// Clash detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashConfig {
    /// Skip the narrow phase; every box overlap is reported unconfirmed
    pub bounding_box_only: bool,
    /// Narrow-phase touch/coplanarity tolerance, relative to each triangle
    /// pair's bounding extent
    pub tolerance: f64,
    /// Candidate enumeration strategy
    pub broad_phase: BroadPhase,
    /// Fan work out over the rayon pool
    pub parallel: bool,
    /// Geometry returned alongside the report
    pub combine: CombineMode,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            bounding_box_only: false,
            tolerance: DEFAULT_TOLERANCE,
            broad_phase: BroadPhase::AllPairs,
            parallel: true,
            combine: CombineMode::None,
        }
    }
}

impl ClashConfig {
    /// Configuration for a box-only pass
    pub fn bounding_box_only() -> Self {
        Self {
            bounding_box_only: true,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_broad_phase(mut self, broad_phase: BroadPhase) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_combine(mut self, combine: CombineMode) -> Self {
        self.combine = combine;
        self
    }

    /// Reject settings the kernel cannot run with
    pub fn validate(&self) -> ClashResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ClashError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ClashConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `clash.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CLASH_*` overrides read through `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("CLASH_BOUNDING_BOX_ONLY") {
            self.bounding_box_only = value
                .parse()
                .with_context(|| format!("Invalid CLASH_BOUNDING_BOX_ONLY: {value}"))?;
        }

        if let Some(value) = lookup("CLASH_TOLERANCE") {
            self.tolerance = value
                .parse()
                .with_context(|| format!("Invalid CLASH_TOLERANCE: {value}"))?;
        }

        if let Some(value) = lookup("CLASH_BROAD_PHASE") {
            self.broad_phase = value.parse()?;
        }

        if let Some(value) = lookup("CLASH_PARALLEL") {
            self.parallel = value
                .parse()
                .with_context(|| format!("Invalid CLASH_PARALLEL: {value}"))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
