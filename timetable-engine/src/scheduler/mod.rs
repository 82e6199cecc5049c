/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable generation pipeline.
//!
//! [`TimetableEngine`] runs one generation for one semester:
//!
//! ```text
//! ResourceSnapshot ─► validate ─► greedy construction ─► population optimizer ─► Generation
//!                        │                 │                 (optional)
//!                   rejections        unmet demand
//! ```
//!
//! The engine holds nothing but its configuration.  Every per-run structure
//! (validated resources, occupancy grids, population) is built inside
//! [`TimetableEngine::generate`] and dropped when it returns, so the same
//! engine can serve any number of semesters, from any thread.
//!
//! # Hard constraints
//!
//! Every entry the engine emits satisfies all of:
//!
//! | Constraint | Checked by |
//! |---|---|
//! | teacher, classroom and learners free in the cell | [`occupancy::OccupancyGrid::is_free`] |
//! | teacher teaches the subject | demand pairing in [`greedy::DemandTable`] |
//! | cohort fits the classroom, and is at least [`MIN_COHORT_SIZE`] | [`greedy::SlotSearch`] |
//! | teacher below `max_classes_per_day` | [`occupancy::OccupancyGrid::teacher_load`] |
//! | cell inside teacher ∩ classroom ∩ cohort availability | [`greedy::SlotSearch`] |
//!
//! # Example
//! ```rust,ignore
//! let snapshot = ResourceSnapshot::load_from_file(Path::new("fall.yaml"))?;
//! let engine = TimetableEngine::new(EngineConfig::default());
//! let generation = engine.generate(&snapshot)?;
//! ```

pub mod error;
pub mod fitness;
pub mod greedy;
pub mod kpi;
pub mod occupancy;
pub mod validate;

pub use error::{
    EngineError, GenerationFailure, Rejection, RejectionReason, ResourceKind, UnmetDemand,
    UnmetReason, ValidationError,
};
pub use kpi::ScheduleKpi;
pub use validate::{validate, ValidResources};

use tracing::info;

use crate::config::EngineConfig;
use crate::model::record::ResourceSnapshot;
use crate::model::ScheduleEntry;
use crate::optimizer::PopulationOptimizer;

use fitness::FitnessEvaluator;
use greedy::GreedyConstructor;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Smallest group worth a classroom.  Classrooms below it are rejected at
/// validation, cohorts below it are reported as unmet demand.
pub const MIN_COHORT_SIZE: usize = 3;

// ── Generation ────────────────────────────────────────────────────────────────

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub semester: String,
    /// Final schedule, ids `1..`, all `scheduled`.
    pub entries: Vec<ScheduleEntry>,
    /// Demand missing from `entries`, computed against the final schedule.
    pub unmet: Vec<UnmetDemand>,
    /// Input records dropped by the validator.
    pub rejected: Vec<Rejection>,
    pub fitness: f64,
    /// Optimizer generations; 0 when the optimizer did not run.
    pub iterations: usize,
    /// `true` if the optimizer replaced the greedy baseline.
    pub improved: bool,
}

// ── TimetableEngine ───────────────────────────────────────────────────────────

pub struct TimetableEngine {
    config: EngineConfig,
}

impl TimetableEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `snapshot` with this engine's minimum cohort size.
    pub fn validate(&self, snapshot: &ResourceSnapshot) -> Result<ValidResources, EngineError> {
        validate(snapshot, self.config.min_cohort_size)
    }

    /// Validate, then [`schedule`](Self::schedule).
    ///
    /// # Errors
    /// - [`EngineError::Validation`] if a collection is empty.
    /// - [`EngineError::InsufficientResources`] if filtering empties one.
    /// - [`EngineError::GenerationFailure`] if nothing can be placed.
    pub fn generate(&self, snapshot: &ResourceSnapshot) -> Result<Generation, EngineError> {
        let resources = self.validate(snapshot)?;
        self.schedule(&resources)
    }

    /// Build a schedule for already-validated resources.
    pub fn schedule(&self, resources: &ValidResources) -> Result<Generation, EngineError> {
        info!(
            semester = %resources.semester,
            optimizer = self.config.optimizer.enabled,
            "=== timetable generation ==="
        );

        let baseline = GreedyConstructor::new(resources, &self.config).construct();

        if baseline.entries.is_empty() {
            return Err(GenerationFailure::NoEntries {
                unmet: baseline.unmet.len(),
            }
            .into());
        }

        let (entries, unmet, fitness, iterations, improved) = if self.config.optimizer.enabled {
            let out = PopulationOptimizer::new(resources, &self.config).optimize(&baseline)?;
            let unmet = baseline.unmet_for(resources, &out.genes);
            (out.entries, unmet, out.fitness, out.iterations, out.improved)
        } else {
            let report = FitnessEvaluator::new(
                resources,
                self.config.weights.clone(),
                self.config.utilization_band.clone(),
            )
            .evaluate(&baseline.entries);
            (baseline.entries, baseline.unmet, report.fitness, 0, false)
        };

        info!(
            semester = %resources.semester,
            entries = entries.len(),
            unmet = unmet.len(),
            rejected = resources.rejected.len(),
            fitness,
            iterations,
            improved,
            "✓ timetable generated"
        );

        Ok(Generation {
            semester: resources.semester.clone(),
            entries,
            unmet,
            rejected: resources.rejected.clone(),
            fitness,
            iterations,
            improved,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictResolver;
    use crate::fixtures::*;
    use crate::grid::{Day, GRID_CELLS, SLOTS_PER_DAY};
    use crate::model::record::AvailabilityRecord;
    use proptest::prelude::*;

    fn quick(optimize: bool) -> EngineConfig {
        let mut cfg = EngineConfig {
            sessions_per_week: 2,
            ..EngineConfig::default()
        };
        cfg.optimizer.enabled = optimize;
        cfg.optimizer.population_size = 12;
        cfg.optimizer.max_iterations = 15;
        cfg
    }

    fn school() -> ResourceSnapshot {
        snapshot(
            vec![
                teacher("t1", &["math", "physics"], all_week()),
                teacher("t2", &["art"], all_week()),
            ],
            vec![classroom("r1", 30, all_week()), classroom("r2", 12, all_week())],
            vec![
                cohort("c1", &members("a", 10), &["math", "art"]),
                cohort("c2", &members("b", 20), &["physics", "art"]),
            ],
        )
    }

    fn assert_conflict_free(snapshot: &ResourceSnapshot, entries: &[ScheduleEntry]) {
        let res = resources(snapshot);
        let audit = ConflictResolver::new(&res).audit(entries);
        assert!(audit.is_empty(), "{audit:?}");
    }

    #[test]
    fn generate_without_optimizer_returns_baseline() {
        let s = school();
        let g = TimetableEngine::new(quick(false)).generate(&s).unwrap();
        assert_eq!(g.semester, SEMESTER);
        assert_eq!(g.entries.len(), 8);
        assert!(g.unmet.is_empty());
        assert_eq!(g.iterations, 0);
        assert!(!g.improved);
        assert!(g.fitness > 0.0);
        let ids: Vec<u64> = g.entries.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        assert_conflict_free(&s, &g.entries);
    }

    #[test]
    fn generate_with_optimizer_keeps_coverage() {
        let s = school();
        let g = TimetableEngine::new(quick(true)).generate(&s).unwrap();
        assert_eq!(g.entries.len(), 8);
        assert!(g.entries.iter().all(|e| e.is_scheduled()));
        assert_conflict_free(&s, &g.entries);
    }

    #[test]
    fn same_seed_same_generation() {
        let s = school();
        let a = TimetableEngine::new(quick(true)).generate(&s).unwrap();
        let b = TimetableEngine::new(quick(true)).generate(&s).unwrap();
        assert_eq!(a.entries, b.entries);
        assert_eq!(a.fitness, b.fitness);
    }

    #[test]
    fn rejections_are_reported_with_the_generation() {
        let mut s = school();
        s.classrooms.push(classroom("closet", 1, all_week()));
        let g = TimetableEngine::new(quick(false)).generate(&s).unwrap();
        assert_eq!(g.rejected.len(), 1);
        assert_eq!(g.rejected[0].kind, ResourceKind::Classroom);
    }

    #[test]
    fn empty_collection_fails_validation() {
        let mut s = school();
        s.cohorts.clear();
        let err = TimetableEngine::new(quick(false)).generate(&s).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::EmptyCollection(ResourceKind::Cohort))
        ));
    }

    #[test]
    fn all_teachers_rejected_is_insufficient() {
        let s = snapshot(
            vec![teacher("t1", &[], all_week())],
            vec![classroom("r1", 30, all_week())],
            vec![cohort("c1", &members("a", 5), &["math"])],
        );
        let err = TimetableEngine::new(quick(false)).generate(&s).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientResources { teachers: 0, .. }
        ));
    }

    fn assert_unmet_matches_entries(g: &Generation, demands: usize) {
        for u in &g.unmet {
            assert!(
                !g.entries
                    .iter()
                    .any(|e| e.cohort == u.cohort && e.subject == u.subject),
                "{u} is reported unmet but scheduled"
            );
        }
        assert_eq!(g.entries.len() + g.unmet.len(), demands);
    }

    #[test]
    fn unmet_demand_reflects_the_optimized_schedule() {
        // greedy gives c1 the only cell c2 can use
        let mut narrow = cohort("c2", &members("b", 8), &["math"]);
        narrow.availability = Some(only(Day::Monday, 0));
        let s = snapshot(
            vec![teacher(
                "t1",
                &["math"],
                slots(&[(Day::Monday, 0), (Day::Monday, 1)]),
            )],
            vec![classroom("r1", 10, all_week())],
            vec![cohort("c1", &members("a", 5), &["math"]), narrow],
        );

        let baseline = TimetableEngine::new(quick_single(false)).generate(&s).unwrap();
        assert_eq!(baseline.entries.len(), 1);
        assert_eq!(baseline.unmet.len(), 1);
        assert_eq!(baseline.unmet[0].cohort.as_str(), "c2");
        assert_unmet_matches_entries(&baseline, 2);

        let g = TimetableEngine::new(quick_single(true)).generate(&s).unwrap();
        assert!(g.improved);
        assert_eq!(g.entries.len(), 2);
        assert!(g.unmet.is_empty());
        assert_unmet_matches_entries(&g, 2);
    }

    fn quick_single(optimize: bool) -> EngineConfig {
        let mut cfg = EngineConfig::default();
        cfg.optimizer.enabled = optimize;
        cfg.optimizer.target_fitness = 1.0;
        cfg.optimizer.population_size = 16;
        cfg.optimizer.max_iterations = 30;
        cfg
    }

    #[test]
    fn nothing_placeable_is_no_entries() {
        let s = snapshot(
            vec![teacher("t1", &["math"], only(Day::Monday, 0))],
            vec![classroom("r1", 30, only(Day::Friday, 7))],
            vec![cohort("c1", &members("a", 5), &["math"])],
        );
        for optimize in [false, true] {
            let err = TimetableEngine::new(quick(optimize)).generate(&s).unwrap_err();
            assert!(matches!(
                err,
                EngineError::GenerationFailure(GenerationFailure::NoEntries { unmet: 2 })
            ));
        }
    }

    // ── Properties ────────────────────────────────────────────────────────────

    fn cells() -> impl Strategy<Value = AvailabilityRecord> {
        proptest::collection::vec(proptest::bool::weighted(0.6), GRID_CELLS).prop_map(|bits| {
            let picked: Vec<(Day, u8)> = bits
                .iter()
                .enumerate()
                .filter(|(_, on)| **on)
                .map(|(i, _)| (Day::ALL[i / SLOTS_PER_DAY], (i % SLOTS_PER_DAY) as u8))
                .collect();
            slots(&picked)
        })
    }

    fn subjects() -> impl Strategy<Value = Vec<&'static str>> {
        proptest::sample::subsequence(vec!["math", "art", "music"], 1..=3)
    }

    /// Cohorts draw overlapping learner ids so learner clashes are possible.
    fn random_snapshot() -> impl Strategy<Value = ResourceSnapshot> {
        let teachers = proptest::collection::vec((subjects(), cells(), 1usize..=4), 1..=4);
        let rooms = proptest::collection::vec((3usize..=12, cells()), 1..=3);
        let cohorts = proptest::collection::vec((1usize..=10, subjects()), 1..=4);

        (teachers, rooms, cohorts).prop_map(|(ts, rs, cs)| {
            snapshot(
                ts.into_iter()
                    .enumerate()
                    .map(|(i, (subj, avail, max))| {
                        let mut t = teacher(&format!("t{i}"), &subj, avail);
                        t.max_classes_per_day = max;
                        t
                    })
                    .collect(),
                rs.into_iter()
                    .enumerate()
                    .map(|(i, (cap, avail))| classroom(&format!("r{i}"), cap, avail))
                    .collect(),
                cs.into_iter()
                    .enumerate()
                    .map(|(i, (n, subj))| {
                        let ids: Vec<String> = (0..n).map(|k| format!("s{}", k + 3 * i)).collect();
                        cohort(&format!("c{i}"), &ids, &subj)
                    })
                    .collect(),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn generated_schedules_satisfy_hard_constraints(
            s in random_snapshot(),
            optimize in any::<bool>(),
        ) {
            let engine = TimetableEngine::new(quick(optimize));
            let Ok(res) = engine.validate(&s) else {
                return Ok(());
            };
            let Ok(g) = engine.schedule(&res) else {
                return Ok(());
            };

            prop_assert!(ConflictResolver::new(&res).audit(&g.entries).is_empty());
            for e in &g.entries {
                let room = res.classroom(&e.classroom).unwrap();
                prop_assert!(e.members.len() <= room.capacity);
                prop_assert!(e.members.len() >= MIN_COHORT_SIZE);
                let t = res.teacher(&e.teacher).unwrap();
                prop_assert!(t.teaches(&e.subject));
            }
        }
    }
}
