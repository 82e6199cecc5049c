/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Population-based refinement of the greedy baseline.
//!
//! ```text
//! population[0] = baseline          population[1..] = randomised first-fit
//!        │                                   │
//!        └──────────── evaluate (rayon) ─────┘
//!                           │
//!     ┌──── elites ◄── rank ┤
//!     │                     └─► tournament ─► crossover + repair ─► mutation
//!     │                                            (rayon, one RNG per child)
//!     └──────────────► next generation ◄───────────┘
//! ```
//!
//! Every individual is feasible by construction, so the fitness only has to
//! rank soft quality.  The best-ever schedule starts as the baseline and is
//! replaced only by a candidate that places at least as many sessions and
//! scores strictly higher.
//!
//! Identical resources, configuration and seed give an identical result: each
//! individual draws from its own `ChaCha8Rng` keyed by (seed, generation,
//! index), selection runs on a single sequential stream, and parallel results
//! are collected in index order.

pub mod operators;

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{EngineConfig, OptimizerConfig};
use crate::model::{EntryId, ScheduleEntry};
use crate::scheduler::error::{EngineError, GenerationFailure};
use crate::scheduler::fitness::{FitnessEvaluator, FitnessReport};
use crate::scheduler::greedy::{Construction, DemandTable, Placement, SlotSearch};
use crate::scheduler::validate::ValidResources;

use operators::{crossover, member_rng, mutate, random_individual, tournament, Individual};

/// Result of an optimizer run.
#[derive(Debug, Clone)]
pub struct Optimization {
    /// Best-ever schedule, ids `1..`.
    pub entries: Vec<ScheduleEntry>,
    /// Placement per demand of the baseline's table, `None` = unplaced.
    pub genes: Vec<Option<Placement>>,
    pub fitness: f64,
    /// Generations run after the initial population.
    pub iterations: usize,
    /// `false` if the baseline was returned unchanged.
    pub improved: bool,
}

pub struct PopulationOptimizer<'a> {
    config: OptimizerConfig,
    search: SlotSearch<'a>,
    evaluator: FitnessEvaluator<'a>,
}

impl<'a> PopulationOptimizer<'a> {
    pub fn new(resources: &'a ValidResources, config: &EngineConfig) -> Self {
        Self {
            config: config.optimizer.clone(),
            search: SlotSearch::new(resources, config.min_cohort_size),
            evaluator: FitnessEvaluator::new(
                resources,
                config.weights.clone(),
                config.utilization_band.clone(),
            ),
        }
    }

    /// Refine `baseline`.
    ///
    /// # Errors
    /// [`GenerationFailure::NoFeasibleIndividual`] if no member of the
    /// initial population is a candidate (placed nothing, or broke a hard
    /// constraint).
    pub fn optimize(&self, baseline: &Construction) -> Result<Optimization, EngineError> {
        let cfg = &self.config;
        let table = &baseline.table;
        let pop_size = cfg.population_size.max(2);
        let elite_count = cfg.elite_count.min(pop_size - 1);
        let mutation_rate = cfg.mutation_rate.clamp(0.0, 1.0);
        let crossover_rate = cfg.crossover_rate.clamp(0.0, 1.0);
        let started = Instant::now();

        info!(
            population = pop_size,
            max_iterations = cfg.max_iterations,
            target = cfg.target_fitness,
            seed = cfg.seed,
            genes = table.len(),
            "=== population optimizer ==="
        );

        // ── Initial population ────────────────────────────────────────────────
        let seeded = Individual::from_genes(&self.search, table, baseline.genes.clone());
        let mut population: Vec<Individual> = std::iter::once(seeded)
            .chain(
                (1..pop_size)
                    .into_par_iter()
                    .map(|i| {
                        let mut rng = member_rng(cfg.seed, 0, i);
                        random_individual(&self.search, table, &mut rng)
                    })
                    .collect::<Vec<_>>(),
            )
            .collect();
        let mut reports = self.evaluate_all(table, &population);

        if !reports.iter().any(FitnessReport::is_candidate) {
            return Err(GenerationFailure::NoFeasibleIndividual {
                population: pop_size,
            }
            .into());
        }

        let baseline_fitness = reports[0].fitness;
        let baseline_placed = baseline.placed();

        if reports[0].is_candidate() && baseline_fitness >= cfg.target_fitness {
            info!(
                fitness = baseline_fitness,
                "baseline already meets target, returned unchanged"
            );
            return Ok(self.unchanged(baseline, baseline_fitness, 0));
        }

        let mut best: Option<Vec<Option<Placement>>> = None;
        let mut best_fitness = if reports[0].is_candidate() {
            baseline_fitness
        } else {
            0.0
        };
        self.track_best(&population, &reports, baseline_placed, &mut best, &mut best_fitness);

        // ── Generations ───────────────────────────────────────────────────────
        let mut selector = ChaCha8Rng::seed_from_u64(cfg.seed);
        let mut iterations = 0usize;

        for generation in 1..=cfg.max_iterations {
            if best_fitness >= cfg.target_fitness {
                break;
            }
            if cfg.time_limit().is_some_and(|limit| started.elapsed() >= limit) {
                info!(generation, "time limit reached");
                break;
            }

            let fitness: Vec<f64> = reports.iter().map(|r| r.fitness).collect();

            let mut ranked: Vec<usize> = (0..population.len()).collect();
            ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]).then(a.cmp(&b)));

            let parents: Vec<(usize, usize)> = (0..pop_size - elite_count)
                .map(|_| {
                    (
                        tournament(&fitness, cfg.tournament_size, &mut selector),
                        tournament(&fitness, cfg.tournament_size, &mut selector),
                    )
                })
                .collect();

            let children: Vec<Individual> = parents
                .par_iter()
                .enumerate()
                .map(|(c, &(a, b))| {
                    let mut rng = member_rng(cfg.seed, generation, c);
                    let mut child = if rng.gen_bool(crossover_rate) {
                        crossover(&self.search, table, &population[a], &population[b], &mut rng)
                    } else {
                        population[a].clone()
                    };
                    mutate(&self.search, table, &mut child, mutation_rate, &mut rng);
                    child
                })
                .collect();

            population = ranked[..elite_count]
                .iter()
                .map(|&i| population[i].clone())
                .chain(children)
                .collect();
            reports = self.evaluate_all(table, &population);
            iterations = generation;

            self.track_best(&population, &reports, baseline_placed, &mut best, &mut best_fitness);
            debug!(generation, best = best_fitness, "generation done");
        }

        info!(
            iterations,
            baseline = baseline_fitness,
            best = best_fitness,
            improved = best.is_some(),
            "population optimizer done"
        );

        Ok(match best {
            Some(genes) => Optimization {
                entries: self.decode(baseline, &genes),
                genes,
                fitness: best_fitness,
                iterations,
                improved: true,
            },
            None => self.unchanged(baseline, baseline_fitness, iterations),
        })
    }

    fn evaluate_all(&self, table: &DemandTable, population: &[Individual]) -> Vec<FitnessReport> {
        population
            .par_iter()
            .map(|ind| self.evaluator.evaluate_genes(table, &ind.genes))
            .collect()
    }

    /// Replace the best-ever genes with the first (lowest index) member that
    /// is a candidate, covers the baseline, and scores strictly higher.
    fn track_best(
        &self,
        population: &[Individual],
        reports: &[FitnessReport],
        baseline_placed: usize,
        best: &mut Option<Vec<Option<Placement>>>,
        best_fitness: &mut f64,
    ) {
        for (ind, report) in population.iter().zip(reports) {
            if report.is_candidate()
                && ind.placed() >= baseline_placed
                && report.fitness > *best_fitness
            {
                *best = Some(ind.genes.clone());
                *best_fitness = report.fitness;
            }
        }
    }

    fn unchanged(&self, baseline: &Construction, fitness: f64, iterations: usize) -> Optimization {
        Optimization {
            entries: baseline.entries.clone(),
            genes: baseline.genes.clone(),
            fitness,
            iterations,
            improved: false,
        }
    }

    /// Materialise genes in gene order with fresh sequential ids.
    fn decode(
        &self,
        baseline: &Construction,
        genes: &[Option<Placement>],
    ) -> Vec<ScheduleEntry> {
        genes
            .iter()
            .enumerate()
            .filter_map(|(g, p)| p.map(|p| (baseline.table.get(g), p)))
            .enumerate()
            .map(|(i, (demand, p))| self.search.entry(EntryId(i as u64 + 1), demand, p))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
