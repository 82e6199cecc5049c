/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use timetable_engine::config::EngineConfig;
use timetable_engine::model::record::ResourceSnapshot;
use timetable_engine::scheduler::{ScheduleKpi, TimetableEngine};
use timetable_engine::store::{InMemoryScheduleStore, ScheduleStore};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Generate a weekly timetable for one semester.
///
/// Example:
///   timetable-engine --snapshot fall.yaml --config engine.yaml --seed 7
#[derive(Debug, Parser)]
#[command(
    name = "timetable-engine",
    about = "Timetable generation and conflict-resolution engine",
    long_about = None,
)]
struct Cli {
    /// YAML resource snapshot (semester, teachers, classrooms, cohorts, learners).
    #[arg(short = 's', long = "snapshot")]
    snapshot: PathBuf,

    /// YAML engine configuration.  Built-in defaults are used when omitted.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the optimizer seed.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Keep the greedy baseline; skip the population optimizer.
    #[arg(long = "no-optimize", default_value_t = false)]
    no_optimize: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by RUST_LOG (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        snapshot    = %cli.snapshot.display(),
        config      = ?cli.config,
        seed        = ?cli.seed,
        no_optimize = cli.no_optimize,
        "Configuration"
    );

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match EngineConfig::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load engine configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No engine configuration file provided, using defaults");
            EngineConfig::default()
        }
    };
    if let Some(seed) = cli.seed {
        config.optimizer.seed = seed;
    }
    if cli.no_optimize {
        config.optimizer.enabled = false;
    }

    let snapshot = match ResourceSnapshot::load_from_file(&cli.snapshot) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load resource snapshot: {:#}", e);
            process::exit(1);
        }
    };

    // ── Generate ──────────────────────────────────────────────────────────────
    let engine = TimetableEngine::new(config);
    let resources = match engine.validate(&snapshot) {
        Ok(r) => r,
        Err(e) => {
            error!("Resource validation failed: {}", e);
            process::exit(1);
        }
    };
    let generation = match engine.schedule(&resources) {
        Ok(g) => g,
        Err(e) => {
            error!("Timetable generation failed: {}", e);
            process::exit(1);
        }
    };

    // ── Report ────────────────────────────────────────────────────────────────
    info!("Schedule ({} entries):", generation.entries.len());
    let mut sorted: Vec<_> = generation.entries.iter().collect();
    sorted.sort_by_key(|e| (e.coord(), e.classroom.clone()));
    for entry in sorted {
        info!("  {}", entry);
    }
    for rejection in &generation.rejected {
        warn!("  rejected: {}", rejection);
    }
    for unmet in &generation.unmet {
        warn!("  unmet: {}", unmet);
    }

    let kpi = ScheduleKpi::calculate(&generation.entries, &resources);
    info!(
        fitness = generation.fitness,
        iterations = generation.iterations,
        improved = generation.improved,
        classroom_utilization = kpi.classroom_utilization,
        average_class_size = kpi.average_class_size,
        seat_fill = kpi.seat_fill,
        preferred_slot_rate = ?kpi.preferred_slot_rate,
        break_slot_violations = kpi.break_slot_violations,
        consecutive_overruns = kpi.consecutive_overruns,
        "KPI"
    );
    info!(slots = ?kpi.slot_distribution, "Slot distribution");
    for (teacher, load) in &kpi.teacher_load {
        info!("  [{teacher}]  classes={load}");
    }

    let mut store = InMemoryScheduleStore::new();
    let semester = generation.semester.clone();
    if let Err(e) = store.replace_semester(&semester, generation.entries) {
        error!("Failed to store schedule: {}", e);
        process::exit(1);
    }
}
