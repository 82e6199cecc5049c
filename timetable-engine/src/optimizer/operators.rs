/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Genetic operators over placement vectors.
//!
//! An [`Individual`] holds one optional [`Placement`] per demand (the gene
//! order of the [`DemandTable`]) together with the occupancy grid those
//! placements produce.  Every operator keeps the grid consistent with the
//! genes, and only ever commits a placement the grid accepts, so each
//! individual is feasible by construction.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::GRID_CELLS;
use crate::scheduler::greedy::{DemandTable, Placement, SlotSearch};
use crate::scheduler::occupancy::OccupancyGrid;

/// One candidate schedule.
#[derive(Debug, Clone)]
pub struct Individual {
    pub genes: Vec<Option<Placement>>,
    grid: OccupancyGrid,
}

impl Individual {
    /// Rebuild the grid for a known-feasible gene vector.
    pub fn from_genes(
        search: &SlotSearch<'_>,
        table: &DemandTable,
        genes: Vec<Option<Placement>>,
    ) -> Self {
        let mut grid = OccupancyGrid::new();
        for (g, p) in genes.iter().enumerate() {
            if let Some(p) = *p {
                search.commit(&mut grid, table.get(g).cohort, p);
            }
        }
        Self { genes, grid }
    }

    /// Number of placed demands.
    pub fn placed(&self) -> usize {
        self.genes.iter().filter(|g| g.is_some()).count()
    }
}

/// Per-member RNG stream.  Mixing follows the usual golden-ratio / odd
/// constant scheme so neighbouring (generation, index) pairs diverge.
pub fn member_rng(seed: u64, generation: usize, index: usize) -> ChaCha8Rng {
    let s = seed
        ^ (generation as u64).wrapping_mul(0x9E37_79B1_85EB_CA87)
        ^ (index as u64).rotate_left(17)
        ^ (index as u64).wrapping_mul(0xD134_2543_DE82_E285);
    ChaCha8Rng::seed_from_u64(s)
}

/// Try every qualified teacher (starting with `preferred`, if any) from a
/// random start cell.
fn place_anywhere<R: Rng + ?Sized>(
    search: &SlotSearch<'_>,
    table: &DemandTable,
    grid: &OccupancyGrid,
    gene: usize,
    preferred: Option<usize>,
    exclude: Option<Placement>,
    rng: &mut R,
) -> Option<Placement> {
    let demand = table.get(gene);
    let start = rng.gen_range(0..GRID_CELLS);

    let qualified = table.qualified(&demand.subject);
    let order = preferred
        .into_iter()
        .chain(qualified.iter().copied().filter(|&t| Some(t) != preferred));

    for teacher in order {
        if let Some(p) = search.first_fit(grid, teacher, demand.cohort, start, exclude) {
            return Some(p);
        }
    }
    None
}

/// Randomised first-fit: demand order and teacher order shuffled, each search
/// starting at a random cell.
pub fn random_individual<R: Rng + ?Sized>(
    search: &SlotSearch<'_>,
    table: &DemandTable,
    rng: &mut R,
) -> Individual {
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.shuffle(rng);

    let mut grid = OccupancyGrid::new();
    let mut genes: Vec<Option<Placement>> = vec![None; table.len()];

    for gene in order {
        let demand = table.get(gene);
        let mut teachers = table.qualified(&demand.subject).to_vec();
        teachers.shuffle(rng);
        let start = rng.gen_range(0..GRID_CELLS);

        for teacher in teachers {
            if let Some(p) = search.first_fit(&grid, teacher, demand.cohort, start, None) {
                search.commit(&mut grid, demand.cohort, p);
                genes[gene] = Some(p);
                break;
            }
        }
    }

    Individual { genes, grid }
}

/// Tournament selection: sample `k` members uniformly, keep the fittest.
/// Ties go to the lower index.
pub fn tournament<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let mut best = rng.gen_range(0..fitness.len());
    for _ in 1..k.max(1) {
        let challenger = rng.gen_range(0..fitness.len());
        if fitness[challenger] > fitness[best]
            || (fitness[challenger] == fitness[best] && challenger < best)
        {
            best = challenger;
        }
    }
    best
}

/// Uniform crossover with repair.
///
/// Each gene is taken from `a` or `b` with equal probability (falling back to
/// the other parent when the chosen one left it unplaced).  Genes are
/// committed in gene order; one that clashes with earlier genes is re-placed
/// by first-fit from a random offset, keeping its teacher when possible.
pub fn crossover<R: Rng + ?Sized>(
    search: &SlotSearch<'_>,
    table: &DemandTable,
    a: &Individual,
    b: &Individual,
    rng: &mut R,
) -> Individual {
    let mut grid = OccupancyGrid::new();
    let mut genes: Vec<Option<Placement>> = vec![None; table.len()];

    for gene in 0..table.len() {
        let (first, second) = if rng.gen_bool(0.5) {
            (a.genes[gene], b.genes[gene])
        } else {
            (b.genes[gene], a.genes[gene])
        };
        let cohort = table.get(gene).cohort;

        let chosen = match first.or(second) {
            Some(p) if search.fits(&grid, cohort, p) => Some(p),
            Some(p) => place_anywhere(search, table, &grid, gene, Some(p.teacher), None, rng),
            None => None,
        };

        if let Some(p) = chosen {
            search.commit(&mut grid, cohort, p);
            genes[gene] = Some(p);
        }
    }

    Individual { genes, grid }
}

/// Move each placed gene with probability `rate` to a different feasible
/// (coord, classroom).  A gene with nowhere else to go stays put.
pub fn mutate<R: Rng + ?Sized>(
    search: &SlotSearch<'_>,
    table: &DemandTable,
    child: &mut Individual,
    rate: f64,
    rng: &mut R,
) -> usize {
    let mut moved = 0usize;

    for gene in 0..table.len() {
        let Some(current) = child.genes[gene] else {
            continue;
        };
        if !rng.gen_bool(rate) {
            continue;
        }
        let cohort = table.get(gene).cohort;

        search.release(&mut child.grid, cohort, current);
        let next = place_anywhere(
            search,
            table,
            &child.grid,
            gene,
            Some(current.teacher),
            Some(current),
            rng,
        )
        .unwrap_or(current);
        search.commit(&mut child.grid, cohort, next);
        child.genes[gene] = Some(next);
        if next != current {
            moved += 1;
        }
    }

    moved
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::fixtures::*;
    use crate::scheduler::fitness::FitnessEvaluator;
    use crate::scheduler::greedy::{Construction, GreedyConstructor};
    use crate::scheduler::validate::ValidResources;

    fn crowded() -> ValidResources {
        resources(&snapshot(
            vec![
                teacher("t1", &["math", "art"], all_week()),
                teacher("t2", &["art", "music"], all_week()),
            ],
            vec![classroom("r1", 10, all_week()), classroom("r2", 8, all_week())],
            vec![
                cohort("c1", &members("a", 7), &["math", "art"]),
                cohort("c2", &members("b", 6), &["art", "music"]),
                cohort("c3", &members("c", 8), &["math", "music"]),
            ],
        ))
    }

    fn baseline(res: &ValidResources) -> Construction {
        let cfg = EngineConfig {
            sessions_per_week: 2,
            ..EngineConfig::default()
        };
        GreedyConstructor::new(res, &cfg).construct()
    }

    fn assert_feasible(res: &ValidResources, table: &DemandTable, ind: &Individual) {
        let cfg = EngineConfig::default();
        let ev = FitnessEvaluator::new(res, cfg.weights, cfg.utilization_band);
        let report = ev.evaluate_genes(table, &ind.genes);
        assert_eq!(report.hard_violations, 0, "{report:?}");
    }

    #[test]
    fn member_rng_is_reproducible_and_distinct() {
        let a: u64 = member_rng(7, 3, 4).gen();
        let b: u64 = member_rng(7, 3, 4).gen();
        let c: u64 = member_rng(7, 3, 5).gen();
        let d: u64 = member_rng(7, 4, 4).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn random_individuals_are_feasible() {
        let res = crowded();
        let base = baseline(&res);
        let search = SlotSearch::new(&res, 3);
        for i in 0..10 {
            let mut rng = member_rng(11, 0, i);
            let ind = random_individual(&search, &base.table, &mut rng);
            assert!(ind.placed() > 0);
            assert_feasible(&res, &base.table, &ind);
        }
    }

    #[test]
    fn crossover_and_mutation_preserve_feasibility() {
        let res = crowded();
        let base = baseline(&res);
        let search = SlotSearch::new(&res, 3);
        let a = Individual::from_genes(&search, &base.table, base.genes.clone());
        let b = random_individual(&search, &base.table, &mut member_rng(1, 0, 1));

        for i in 0..10 {
            let mut rng = member_rng(5, 1, i);
            let mut child = crossover(&search, &base.table, &a, &b, &mut rng);
            assert_feasible(&res, &base.table, &child);
            mutate(&search, &base.table, &mut child, 0.5, &mut rng);
            assert_feasible(&res, &base.table, &child);
        }
    }

    #[test]
    fn mutation_at_full_rate_moves_genes() {
        let res = crowded();
        let base = baseline(&res);
        let search = SlotSearch::new(&res, 3);
        let mut ind = Individual::from_genes(&search, &base.table, base.genes.clone());
        let before = ind.placed();
        let moved = mutate(&search, &base.table, &mut ind, 1.0, &mut member_rng(2, 0, 0));
        assert!(moved > 0);
        assert_eq!(ind.placed(), before);
    }

    #[test]
    fn tournament_prefers_fitter_members() {
        let fitness = [0.1, 0.9, 0.5, 0.9];
        let mut rng = member_rng(0, 0, 0);
        // with k larger than the population every member is almost surely sampled
        let wins = (0..50)
            .filter(|_| tournament(&fitness, 16, &mut rng) == 1)
            .count();
        assert!(wins > 40);
    }
}
