/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deterministic first-fit construction of a baseline schedule.
//!
//! Teachers are the items; (day, slot) × classroom cells are the bins.  The
//! iteration order is fixed:
//!
//! ```text
//! for pass in 0..sessions_per_week
//!   for teacher  (input order)
//!     for subject  (teacher's order)
//!       for cohort  (input order, requires subject, large enough, still open)
//!         first coord in teacher ∩ cohort availability, TimeGrid order
//!           first classroom (input order) that is available, big enough,
//!           free in the grid, and leaves the teacher under the daily cap
//! ```
//!
//! The search itself lives in [`SlotSearch`] so the optimizer can reuse it
//! with a random start offset.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::grid::Coord;
use crate::model::{Booking, EntryId, ScheduleEntry, Subject};

use super::error::{UnmetDemand, UnmetReason};
use super::occupancy::OccupancyGrid;
use super::validate::ValidResources;

// ── Demand & placement ────────────────────────────────────────────────────────

/// One session a cohort needs: the unit of placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Demand {
    /// Index into [`ValidResources::cohorts`].
    pub cohort: usize,
    pub subject: Subject,
    /// Zero-based session index within the week.
    pub session: usize,
}

/// Where a demand was placed.  Indices refer to [`ValidResources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub teacher: usize,
    pub classroom: usize,
    pub coord: Coord,
}

/// Every placeable demand, in a fixed order shared by all candidate
/// schedules, plus the teachers qualified for each subject.
#[derive(Debug, Clone)]
pub struct DemandTable {
    demands: Vec<Demand>,
    index: HashMap<Demand, usize>,
    qualified: BTreeMap<Subject, Vec<usize>>,
}

impl DemandTable {
    /// Demands that cannot be placed at all (undersized cohort, nobody
    /// teaches the subject) go to the returned unmet list instead.
    fn build(
        resources: &ValidResources,
        sessions: usize,
        min_cohort_size: usize,
    ) -> (Self, Vec<UnmetDemand>) {
        let mut qualified: BTreeMap<Subject, Vec<usize>> = BTreeMap::new();
        for (ti, t) in resources.teachers.iter().enumerate() {
            for s in &t.subjects {
                qualified.entry(s.clone()).or_default().push(ti);
            }
        }

        let mut demands = Vec::new();
        let mut unmet = Vec::new();
        for (ci, cohort) in resources.cohorts.iter().enumerate() {
            for subject in &cohort.subjects {
                if cohort.size() < min_cohort_size {
                    unmet.push(UnmetDemand {
                        teacher: None,
                        subject: subject.clone(),
                        cohort: cohort.id.clone(),
                        session: 0,
                        reason: UnmetReason::CohortTooSmall {
                            size: cohort.size(),
                            minimum: min_cohort_size,
                        },
                    });
                    continue;
                }
                for session in 0..sessions {
                    if !qualified.contains_key(subject) {
                        unmet.push(UnmetDemand {
                            teacher: None,
                            subject: subject.clone(),
                            cohort: cohort.id.clone(),
                            session,
                            reason: UnmetReason::NoQualifiedTeacher,
                        });
                        continue;
                    }
                    demands.push(Demand {
                        cohort: ci,
                        subject: subject.clone(),
                        session,
                    });
                }
            }
        }

        let index = demands
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();

        (
            Self {
                demands,
                index,
                qualified,
            },
            unmet,
        )
    }

    pub fn len(&self) -> usize {
        self.demands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demands.is_empty()
    }

    pub fn get(&self, gene: usize) -> &Demand {
        &self.demands[gene]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Demand> {
        self.demands.iter()
    }

    pub fn position(&self, demand: &Demand) -> Option<usize> {
        self.index.get(demand).copied()
    }

    /// Teachers (input order) who teach `subject`.
    pub fn qualified(&self, subject: &Subject) -> &[usize] {
        self.qualified.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ── SlotSearch ────────────────────────────────────────────────────────────────

/// First-fit search over one grid.
#[derive(Debug, Clone, Copy)]
pub struct SlotSearch<'a> {
    resources: &'a ValidResources,
    min_cohort_size: usize,
}

impl<'a> SlotSearch<'a> {
    pub fn new(resources: &'a ValidResources, min_cohort_size: usize) -> Self {
        Self {
            resources,
            min_cohort_size,
        }
    }

    pub fn resources(&self) -> &'a ValidResources {
        self.resources
    }

    /// First feasible (coord, classroom) for `teacher` and `cohort`.
    ///
    /// Coordinates are scanned in TimeGrid order starting at cell `start`
    /// (wrapping); classrooms in input order.  `exclude` skips one exact
    /// placement, used when a session must move somewhere else.
    pub fn first_fit(
        &self,
        grid: &OccupancyGrid,
        teacher: usize,
        cohort: usize,
        start: usize,
        exclude: Option<Placement>,
    ) -> Option<Placement> {
        let t = &self.resources.teachers[teacher];
        let c = &self.resources.cohorts[cohort];
        let seats_needed = c.size().max(self.min_cohort_size);

        for coord in t.availability.intersect(c.availability).iter_from(start) {
            if grid.teacher_load(&t.id, coord.day) >= t.max_classes_per_day {
                continue;
            }
            for (ri, room) in self.resources.classrooms.iter().enumerate() {
                let candidate = Placement {
                    teacher,
                    classroom: ri,
                    coord,
                };
                if exclude == Some(candidate) {
                    continue;
                }
                if room.is_available(coord)
                    && room.seats(seats_needed)
                    && grid.is_free(coord, &t.id, &room.id, &c.members)
                {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// `true` if `placement` can be committed to `grid` as it stands.
    pub fn fits(&self, grid: &OccupancyGrid, cohort: usize, placement: Placement) -> bool {
        let t = &self.resources.teachers[placement.teacher];
        let room = &self.resources.classrooms[placement.classroom];
        let c = &self.resources.cohorts[cohort];
        let coord = placement.coord;

        t.is_available(coord)
            && c.availability.contains(coord)
            && room.is_available(coord)
            && room.seats(c.size().max(self.min_cohort_size))
            && grid.teacher_load(&t.id, coord.day) < t.max_classes_per_day
            && grid.is_free(coord, &t.id, &room.id, &c.members)
    }

    pub fn booking(&self, cohort: usize, placement: Placement) -> Booking<'a> {
        Booking {
            teacher: &self.resources.teachers[placement.teacher].id,
            classroom: &self.resources.classrooms[placement.classroom].id,
            members: &self.resources.cohorts[cohort].members,
        }
    }

    pub fn commit(&self, grid: &mut OccupancyGrid, cohort: usize, placement: Placement) {
        grid.commit(placement.coord, self.booking(cohort, placement));
    }

    pub fn release(&self, grid: &mut OccupancyGrid, cohort: usize, placement: Placement) {
        grid.release(placement.coord, self.booking(cohort, placement));
    }

    /// Build the entry for `demand` at `placement`.
    pub fn entry(&self, id: EntryId, demand: &Demand, placement: Placement) -> ScheduleEntry {
        let res = self.resources;
        ScheduleEntry::new(
            id,
            res.semester.as_str(),
            &res.cohorts[demand.cohort],
            demand.subject.clone(),
            res.teachers[placement.teacher].id.clone(),
            res.classrooms[placement.classroom].id.clone(),
            placement.coord,
        )
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

/// Output of the greedy pass.
#[derive(Debug, Clone)]
pub struct Construction {
    /// Entries in placement order, ids `1..`.
    pub entries: Vec<ScheduleEntry>,
    pub unmet: Vec<UnmetDemand>,
    pub(crate) table: DemandTable,
    /// One slot per demand in `table`; `None` = not placed.
    pub(crate) genes: Vec<Option<Placement>>,
}

impl Construction {
    /// Number of demand sessions that were placed.
    pub fn placed(&self) -> usize {
        self.entries.len()
    }

    /// Unmet demand for another placement of the same demand table.
    ///
    /// Records decided at build time (undersized cohort, no qualified
    /// teacher) are kept as-is.  Every gene left `None` in `genes` becomes a
    /// `NoFeasibleSlot` record, in gene order, naming the teacher this pass
    /// blamed or, failing that, the teacher that placed it here.
    pub(crate) fn unmet_for(
        &self,
        resources: &ValidResources,
        genes: &[Option<Placement>],
    ) -> Vec<UnmetDemand> {
        let mut unmet: Vec<UnmetDemand> = self
            .unmet
            .iter()
            .filter(|u| u.reason != UnmetReason::NoFeasibleSlot)
            .cloned()
            .collect();

        for (gene, placement) in genes.iter().enumerate() {
            if placement.is_some() {
                continue;
            }
            let demand = self.table.get(gene);
            let cohort = &resources.cohorts[demand.cohort].id;
            let teacher = self
                .unmet
                .iter()
                .find(|u| {
                    u.reason == UnmetReason::NoFeasibleSlot
                        && &u.cohort == cohort
                        && u.subject == demand.subject
                        && u.session == demand.session
                })
                .and_then(|u| u.teacher.clone())
                .or_else(|| {
                    self.genes[gene].map(|p| resources.teachers[p.teacher].id.clone())
                });

            unmet.push(UnmetDemand {
                teacher,
                subject: demand.subject.clone(),
                cohort: cohort.clone(),
                session: demand.session,
                reason: UnmetReason::NoFeasibleSlot,
            });
        }

        unmet
    }
}

/// The deterministic first-fit constructor.
pub struct GreedyConstructor<'a> {
    resources: &'a ValidResources,
    sessions_per_week: usize,
    min_cohort_size: usize,
}

impl<'a> GreedyConstructor<'a> {
    pub fn new(resources: &'a ValidResources, config: &EngineConfig) -> Self {
        Self {
            resources,
            sessions_per_week: config.sessions_per_week.max(1),
            min_cohort_size: config.min_cohort_size,
        }
    }

    /// Run the pass.  Never fails; whatever cannot be placed is reported in
    /// [`Construction::unmet`].
    pub fn construct(&self) -> Construction {
        let res = self.resources;
        let (table, mut unmet) = DemandTable::build(res, self.sessions_per_week, self.min_cohort_size);
        let search = SlotSearch::new(res, self.min_cohort_size);

        let mut grid = OccupancyGrid::new();
        let mut genes: Vec<Option<Placement>> = vec![None; table.len()];
        let mut entries = Vec::new();
        // gene → last teacher that found no slot for it
        let mut failed: BTreeMap<usize, usize> = BTreeMap::new();

        info!(
            demands = table.len(),
            sessions_per_week = self.sessions_per_week,
            "=== greedy construction ==="
        );

        for session in 0..self.sessions_per_week {
            for (ti, teacher) in res.teachers.iter().enumerate() {
                for subject in &teacher.subjects {
                    for ci in 0..res.cohorts.len() {
                        let demand = Demand {
                            cohort: ci,
                            subject: subject.clone(),
                            session,
                        };
                        let Some(gene) = table.position(&demand) else {
                            continue;
                        };
                        if genes[gene].is_some() {
                            continue;
                        }

                        match search.first_fit(&grid, ti, ci, 0, None) {
                            Some(p) => {
                                search.commit(&mut grid, ci, p);
                                genes[gene] = Some(p);
                                let entry =
                                    search.entry(EntryId(entries.len() as u64 + 1), &demand, p);
                                debug!(
                                    teacher = %teacher.id,
                                    subject = %subject,
                                    cohort = %res.cohorts[ci].id,
                                    coord = %p.coord,
                                    classroom = %res.classrooms[p.classroom].id,
                                    "✓ placed"
                                );
                                entries.push(entry);
                            }
                            None => {
                                debug!(
                                    teacher = %teacher.id,
                                    subject = %subject,
                                    cohort = %res.cohorts[ci].id,
                                    "✗ no feasible slot"
                                );
                                failed.insert(gene, ti);
                            }
                        }
                    }
                }
            }
        }

        // Attempts later satisfied by another teacher are not unmet.
        for (gene, ti) in failed {
            if genes[gene].is_some() {
                continue;
            }
            let demand = table.get(gene);
            unmet.push(UnmetDemand {
                teacher: Some(res.teachers[ti].id.clone()),
                subject: demand.subject.clone(),
                cohort: res.cohorts[demand.cohort].id.clone(),
                session: demand.session,
                reason: UnmetReason::NoFeasibleSlot,
            });
        }

        for u in &unmet {
            warn!(unmet = %u, "demand not placed");
        }
        info!(
            entries = entries.len(),
            unmet = unmet.len(),
            "greedy construction done"
        );

        Construction {
            entries,
            unmet,
            table,
            genes,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
