/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule scoring.
//!
//! `fitness = clamp(1 − Σ weightᵢ · penaltyᵢ, 0, 1)` over six penalties, each
//! a rate in [0, 1]:
//!
//! | Penalty | Measures |
//! |---|---|
//! | `time_overlap` | sessions breaking any hard constraint / sessions |
//! | `teacher_overload` | teacher-days above `max_classes_per_day` / teacher-days |
//! | `subject_distribution` | repeat sessions of a (cohort, subject) on an already-used day / repeat sessions |
//! | `classroom_utilization` | mean distance of `members / capacity` outside the band |
//! | `cohort_workload` | sessions above a cohort's even per-day share / sessions |
//! | `teacher_preference` | (preferred-slot misses + break-slot hits) / sessions, capped at 1 |
//!
//! The hard-constraint count doubles as the feasibility oracle: a schedule
//! with any violation, or with no sessions, is not a candidate and scores 0.

use std::collections::{BTreeSet, HashMap};

use crate::config::{FitnessWeights, UtilizationBand};
use crate::grid::{Coord, Day, DAYS_PER_WEEK};
use crate::model::{Classroom, CohortId, LearnerId, ScheduleEntry, Subject, Teacher};

use super::greedy::{DemandTable, Placement};
use super::validate::ValidResources;

// ── Report ────────────────────────────────────────────────────────────────────

/// Individual penalty rates, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Penalties {
    pub time_overlap: f64,
    pub teacher_overload: f64,
    pub subject_distribution: f64,
    pub classroom_utilization: f64,
    pub cohort_workload: f64,
    pub teacher_preference: f64,
}

impl Penalties {
    fn weighted(&self, w: &FitnessWeights) -> f64 {
        w.time_overlap * self.time_overlap
            + w.teacher_overload * self.teacher_overload
            + w.subject_distribution * self.subject_distribution
            + w.classroom_utilization * self.classroom_utilization
            + w.cohort_workload * self.cohort_workload
            + w.teacher_preference * self.teacher_preference
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessReport {
    /// 0 for non-candidates.
    pub fitness: f64,
    /// Sessions that break at least one hard constraint.
    pub hard_violations: usize,
    pub penalties: Penalties,
    /// Sessions scored.
    pub sessions: usize,
}

impl FitnessReport {
    /// A candidate has at least one session and no hard violation.
    pub fn is_candidate(&self) -> bool {
        self.sessions > 0 && self.hard_violations == 0
    }
}

// ── Session view ──────────────────────────────────────────────────────────────

/// What the scorer needs to know about one placed class.  Unknown teacher or
/// classroom references stay `None` and count as violations.
struct Session<'a> {
    teacher: Option<&'a Teacher>,
    classroom: Option<&'a Classroom>,
    cohort_id: &'a CohortId,
    members: &'a BTreeSet<LearnerId>,
    subject: &'a Subject,
    coord: Coord,
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

pub struct FitnessEvaluator<'a> {
    resources: &'a ValidResources,
    weights: FitnessWeights,
    band: UtilizationBand,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(
        resources: &'a ValidResources,
        weights: FitnessWeights,
        band: UtilizationBand,
    ) -> Self {
        Self {
            resources,
            weights,
            band,
        }
    }

    /// Score the `scheduled` entries of a schedule.
    pub fn evaluate(&self, entries: &[ScheduleEntry]) -> FitnessReport {
        let res = self.resources;
        let sessions: Vec<Session<'_>> = entries
            .iter()
            .filter(|e| e.is_scheduled())
            .map(|e| Session {
                teacher: res.teacher(&e.teacher),
                classroom: res.classroom(&e.classroom),
                cohort_id: &e.cohort,
                members: &e.members,
                subject: &e.subject,
                coord: e.coord(),
            })
            .collect();
        self.score(&sessions)
    }

    /// Score an optimizer individual without materialising entries.
    pub fn evaluate_genes(
        &self,
        table: &DemandTable,
        genes: &[Option<Placement>],
    ) -> FitnessReport {
        let res = self.resources;
        let sessions: Vec<Session<'_>> = genes
            .iter()
            .enumerate()
            .filter_map(|(g, p)| p.map(|p| (table.get(g), p)))
            .map(|(d, p)| {
                let cohort = &res.cohorts[d.cohort];
                Session {
                    teacher: Some(&res.teachers[p.teacher]),
                    classroom: Some(&res.classrooms[p.classroom]),
                    cohort_id: &cohort.id,
                    members: &cohort.members,
                    subject: &d.subject,
                    coord: p.coord,
                }
            })
            .collect();
        self.score(&sessions)
    }

    fn score(&self, sessions: &[Session<'_>]) -> FitnessReport {
        let n = sessions.len();
        if n == 0 {
            return FitnessReport {
                fitness: 0.0,
                hard_violations: 0,
                penalties: Penalties::default(),
                sessions: 0,
            };
        }

        let (hard_violations, teacher_overload) = self.hard_constraints(sessions);
        let penalties = Penalties {
            time_overlap: hard_violations as f64 / n as f64,
            teacher_overload,
            subject_distribution: subject_distribution(sessions),
            classroom_utilization: self.utilization_deviation(sessions),
            cohort_workload: cohort_workload(sessions),
            teacher_preference: teacher_preference(sessions),
        };

        let fitness = if hard_violations == 0 {
            (1.0 - penalties.weighted(&self.weights)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        FitnessReport {
            fitness,
            hard_violations,
            penalties,
            sessions: n,
        }
    }

    /// Count sessions breaking any hard constraint; also return the
    /// overloaded share of teacher-days.
    fn hard_constraints(&self, sessions: &[Session<'_>]) -> (usize, f64) {
        let mut teacher_at: HashMap<(&str, Coord), usize> = HashMap::new();
        let mut room_at: HashMap<(&str, Coord), usize> = HashMap::new();
        let mut learner_at: HashMap<(&LearnerId, Coord), usize> = HashMap::new();
        // (teacher, day) → (load, cap)
        let mut teacher_day: HashMap<(&str, Day), (usize, usize)> = HashMap::new();

        for s in sessions {
            if let Some(t) = s.teacher {
                *teacher_at.entry((t.id.as_str(), s.coord)).or_insert(0) += 1;
                let day = teacher_day
                    .entry((t.id.as_str(), s.coord.day))
                    .or_insert((0, t.max_classes_per_day));
                day.0 += 1;
            }
            if let Some(r) = s.classroom {
                *room_at.entry((r.id.as_str(), s.coord)).or_insert(0) += 1;
            }
            for m in s.members {
                *learner_at.entry((m, s.coord)).or_insert(0) += 1;
            }
        }

        let res = self.resources;
        let violating = sessions
            .iter()
            .filter(|s| {
                let (Some(t), Some(r)) = (s.teacher, s.classroom) else {
                    return true;
                };
                let coord = s.coord;
                !coord.is_valid()
                    || teacher_at[&(t.id.as_str(), coord)] > 1
                    || room_at[&(r.id.as_str(), coord)] > 1
                    || s.members.iter().any(|m| learner_at[&(m, coord)] > 1)
                    || teacher_day[&(t.id.as_str(), coord.day)].0 > t.max_classes_per_day
                    || !r.seats(s.members.len())
                    || !t.is_available(coord)
                    || !r.is_available(coord)
                    || s.members
                        .iter()
                        .any(|m| !res.learner_available(s.cohort_id, m, coord))
            })
            .count();

        let overloaded = teacher_day
            .values()
            .filter(|&&(load, cap)| load > cap)
            .count();
        let overload = if teacher_day.is_empty() {
            0.0
        } else {
            overloaded as f64 / teacher_day.len() as f64
        };

        (violating, overload)
    }

    /// Mean relative distance of seat occupancy outside the band.
    fn utilization_deviation(&self, sessions: &[Session<'_>]) -> f64 {
        let UtilizationBand { low, high } = self.band;
        let mut total = 0.0;
        let mut counted = 0usize;

        for s in sessions {
            let Some(room) = s.classroom else { continue };
            if room.capacity == 0 {
                continue;
            }
            let u = s.members.len() as f64 / room.capacity as f64;
            let deviation = if u < low {
                (low - u) / low.max(f64::EPSILON)
            } else if u > high {
                ((u - high) / (1.0 - high).max(f64::EPSILON)).min(1.0)
            } else {
                0.0
            };
            total += deviation;
            counted += 1;
        }

        if counted == 0 {
            0.0
        } else {
            (total / counted as f64).clamp(0.0, 1.0)
        }
    }
}

/// Repeat sessions of a (cohort, subject) that share a day with an earlier
/// session of the same pair, over all repeat sessions.
fn subject_distribution(sessions: &[Session<'_>]) -> f64 {
    let mut days: HashMap<(&CohortId, &Subject), Vec<Day>> = HashMap::new();
    for s in sessions {
        days.entry((s.cohort_id, s.subject))
            .or_default()
            .push(s.coord.day);
    }

    let mut repeats = 0usize;
    let mut clumped = 0usize;
    for list in days.values() {
        let distinct: BTreeSet<Day> = list.iter().copied().collect();
        repeats += list.len() - 1;
        clumped += list.len() - distinct.len();
    }

    if repeats == 0 {
        0.0
    } else {
        clumped as f64 / repeats as f64
    }
}

/// Sessions above each cohort's even per-day share (`⌈total / 5⌉`), over all
/// sessions.
fn cohort_workload(sessions: &[Session<'_>]) -> f64 {
    let mut per_day: HashMap<&CohortId, [usize; DAYS_PER_WEEK]> = HashMap::new();
    for s in sessions {
        per_day.entry(s.cohort_id).or_default()[s.coord.day.index()] += 1;
    }

    let mut excess = 0usize;
    for loads in per_day.values() {
        let total: usize = loads.iter().sum();
        let share = total.div_ceil(DAYS_PER_WEEK);
        excess += loads.iter().map(|&l| l.saturating_sub(share)).sum::<usize>();
    }

    excess as f64 / sessions.len() as f64
}

/// Sessions outside the teacher's preferred slots (when any are declared)
/// plus sessions on the teacher's break slot, over all sessions.
fn teacher_preference(sessions: &[Session<'_>]) -> f64 {
    let misses: usize = sessions
        .iter()
        .filter_map(|s| s.teacher.map(|t| (t, s.coord)))
        .map(|(t, coord)| {
            let missed = !t.preferred_slots.is_empty() && !t.preferred_slots.contains(coord);
            let on_break = t.break_slot == Some(coord.slot);
            usize::from(missed) + usize::from(on_break)
        })
        .sum();

    (misses as f64 / sessions.len() as f64).min(1.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
