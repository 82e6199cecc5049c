/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Engine configuration loading.
//!
//! Every field is optional in the file; anything missing falls back to the
//! value in [`EngineConfig::default`].  The expected YAML structure is:
//! ```yaml
//! min_cohort_size: 3
//! sessions_per_week: 1
//! optimizer:
//!   enabled: true
//!   population_size: 50
//!   max_iterations: 1000
//!   target_fitness: 0.95
//!   mutation_rate: 0.10
//!   crossover_rate: 0.80
//!   tournament_size: 3
//!   elite_count: 2
//!   seed: 42
//!   time_limit_ms: 30000
//! weights:
//!   time_overlap: 0.30
//!   teacher_overload: 0.20
//!   subject_distribution: 0.20
//!   classroom_utilization: 0.15
//!   cohort_workload: 0.15
//!   teacher_preference: 0.0
//! utilization_band:
//!   low: 0.70
//!   high: 0.90
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scheduler::MIN_COHORT_SIZE;

// ── Optimizer settings ────────────────────────────────────────────────────────

/// Population optimizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// When `false` the engine returns the greedy baseline as-is.
    pub enabled: bool,
    pub population_size: usize,
    /// Generation budget.  Checked before every generation.
    pub max_iterations: usize,
    /// Stop as soon as the best-ever fitness reaches this value.
    pub target_fitness: f64,
    /// Per-gene probability of moving a placed session.
    pub mutation_rate: f64,
    /// Probability that a child is bred from two parents rather than cloned.
    pub crossover_rate: f64,
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Base seed.  Same seed + same snapshot ⇒ same schedule.
    pub seed: u64,
    /// Optional wall-clock budget, in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            population_size: 50,
            max_iterations: 1000,
            target_fitness: 0.95,
            mutation_rate: 0.10,
            crossover_rate: 0.80,
            tournament_size: 3,
            elite_count: 2,
            seed: 0x5EED_7AB1E,
            time_limit_ms: None,
        }
    }
}

impl OptimizerConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

// ── Fitness settings ──────────────────────────────────────────────────────────

/// Penalty weights.  `fitness = 1 − Σ weight · penalty`, clamped to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub time_overlap: f64,
    pub teacher_overload: f64,
    pub subject_distribution: f64,
    pub classroom_utilization: f64,
    pub cohort_workload: f64,
    /// Preferred slots and break slots.  Off unless configured.
    pub teacher_preference: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            time_overlap: 0.30,
            teacher_overload: 0.20,
            subject_distribution: 0.20,
            classroom_utilization: 0.15,
            cohort_workload: 0.15,
            teacher_preference: 0.0,
        }
    }
}

impl FitnessWeights {
    pub fn total(&self) -> f64 {
        self.time_overlap
            + self.teacher_overload
            + self.subject_distribution
            + self.classroom_utilization
            + self.cohort_workload
            + self.teacher_preference
    }
}

/// Target seat-occupancy band for a class (`members / capacity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilizationBand {
    pub low: f64,
    pub high: f64,
}

impl Default for UtilizationBand {
    fn default() -> Self {
        Self {
            low: 0.70,
            high: 0.90,
        }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest cohort that may be scheduled, and smallest usable classroom.
    pub min_cohort_size: usize,
    /// Sessions each (cohort, subject) pair needs per week.
    pub sessions_per_week: usize,
    pub optimizer: OptimizerConfig,
    pub weights: FitnessWeights,
    pub utilization_band: UtilizationBand,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_cohort_size: MIN_COHORT_SIZE,
            sessions_per_week: 1,
            optimizer: OptimizerConfig::default(),
            weights: FitnessWeights::default(),
            utilization_band: UtilizationBand::default(),
        }
    }
}

impl EngineConfig {
    /// Parse `path` and return a normalised configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.  Out-of-range values are not errors; they are
    /// clamped by [`normalized`](Self::normalized) with a warning.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading engine configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config: EngineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let config = config.normalized();
        debug!(?config, "engine configuration");
        Ok(config)
    }

    /// Clamp every parameter into its usable range, warning about each change.
    pub fn normalized(mut self) -> Self {
        if self.min_cohort_size == 0 {
            warn!("min_cohort_size 0 is meaningless, using 1");
            self.min_cohort_size = 1;
        }
        if self.sessions_per_week == 0 {
            warn!("sessions_per_week 0 would schedule nothing, using 1");
            self.sessions_per_week = 1;
        }

        let opt = &mut self.optimizer;
        if opt.population_size < 2 {
            warn!(
                population_size = opt.population_size,
                "population too small for crossover, using 2"
            );
            opt.population_size = 2;
        }
        if opt.tournament_size == 0 {
            warn!("tournament_size 0, using 1");
            opt.tournament_size = 1;
        }
        if opt.elite_count >= opt.population_size {
            warn!(
                elite_count = opt.elite_count,
                population_size = opt.population_size,
                "elite_count must leave room for offspring"
            );
            opt.elite_count = opt.population_size - 1;
        }
        opt.mutation_rate = clamp_unit("mutation_rate", opt.mutation_rate);
        opt.crossover_rate = clamp_unit("crossover_rate", opt.crossover_rate);
        opt.target_fitness = clamp_unit("target_fitness", opt.target_fitness);

        let band = &mut self.utilization_band;
        band.low = clamp_unit("utilization_band.low", band.low);
        band.high = clamp_unit("utilization_band.high", band.high);
        if band.low > band.high {
            warn!(
                low = band.low,
                high = band.high,
                "utilization band is inverted, swapping"
            );
            std::mem::swap(&mut band.low, &mut band.high);
        }

        if self.weights.total() > 1.0 + f64::EPSILON {
            warn!(
                total = self.weights.total(),
                "fitness weights sum above 1.0, fitness will saturate at 0 sooner"
            );
        }

        self
    }
}

fn clamp_unit(name: &str, v: f64) -> f64 {
    if (0.0..=1.0).contains(&v) {
        v
    } else {
        let clamped = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        warn!(parameter = name, value = v, clamped, "value outside [0, 1]");
        clamped
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
