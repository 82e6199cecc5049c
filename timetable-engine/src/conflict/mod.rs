/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Conflict detection and alternative suggestions for a single entry.
//!
//! [`ConflictResolver::check_conflicts`] runs every check, always, and
//! reports each problem it finds; learner-level checks produce one record per
//! affected learner.  Existing entries with the candidate's own id, or that
//! are no longer `scheduled`, are ignored.
//!
//! Conflicts are results, not errors.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::grid::Coord;
use crate::model::{ClassroomId, EntryId, LearnerId, ScheduleEntry, TeacherId};
use crate::scheduler::validate::ValidResources;

// ── Conflict types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictKind {
    TeacherOverlap,
    TeacherUnavailable,
    MaxClassesExceeded,
    ClassroomOverlap,
    ClassroomUnavailable,
    StudentOverlap,
    StudentUnavailable,
    CapacityExceeded,
    InvalidTime,
}

impl ConflictKind {
    /// Stable upper-case code, e.g. `"TEACHER_OVERLAP"`.
    pub fn code(self) -> &'static str {
        match self {
            ConflictKind::TeacherOverlap => "TEACHER_OVERLAP",
            ConflictKind::TeacherUnavailable => "TEACHER_UNAVAILABLE",
            ConflictKind::MaxClassesExceeded => "MAX_CLASSES_EXCEEDED",
            ConflictKind::ClassroomOverlap => "CLASSROOM_OVERLAP",
            ConflictKind::ClassroomUnavailable => "CLASSROOM_UNAVAILABLE",
            ConflictKind::StudentOverlap => "STUDENT_OVERLAP",
            ConflictKind::StudentUnavailable => "STUDENT_UNAVAILABLE",
            ConflictKind::CapacityExceeded => "CAPACITY_EXCEEDED",
            ConflictKind::InvalidTime => "INVALID_TIME",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One detected problem with a candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// Set for learner-level conflicts.
    pub learner: Option<LearnerId>,
    pub message: String,
}

impl Conflict {
    fn new(kind: ConflictKind, message: String) -> Self {
        Self {
            kind,
            learner: None,
            message,
        }
    }

    fn for_learner(kind: ConflictKind, learner: &LearnerId, message: String) -> Self {
        Self {
            kind,
            learner: Some(learner.clone()),
            message,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// A way out of a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Coordinates where the teacher is available and not yet booked.
    AlternativeTime {
        teacher: TeacherId,
        options: Vec<Coord>,
    },
    /// Classrooms free at the entry's coordinate that seat every member.
    AlternativeRoom {
        coord: Coord,
        options: Vec<ClassroomId>,
    },
}

/// The conflicts of one entry within a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryConflicts {
    pub entry: EntryId,
    pub conflicts: Vec<Conflict>,
}

// ── ConflictResolver ──────────────────────────────────────────────────────────

/// Stateless conflict checker over a validated resource set.
pub struct ConflictResolver<'a> {
    resources: &'a ValidResources,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(resources: &'a ValidResources) -> Self {
        Self { resources }
    }

    /// Every conflict `entry` has with `existing` and with the resources.
    pub fn check_conflicts(
        &self,
        entry: &ScheduleEntry,
        existing: &[ScheduleEntry],
    ) -> Vec<Conflict> {
        let res = self.resources;
        let coord = entry.coord();
        let others: Vec<&ScheduleEntry> = others(entry, existing).collect();
        let same_cell = |e: &&&ScheduleEntry| e.day == entry.day && e.slot == entry.slot;
        let mut conflicts = Vec::new();

        // ── Time ──────────────────────────────────────────────────────────────
        if !coord.is_valid() {
            conflicts.push(Conflict::new(
                ConflictKind::InvalidTime,
                format!("{coord} is outside the 8-slot teaching day"),
            ));
        }

        // ── Teacher ───────────────────────────────────────────────────────────
        if others
            .iter()
            .filter(same_cell)
            .any(|e| e.teacher == entry.teacher)
        {
            conflicts.push(Conflict::new(
                ConflictKind::TeacherOverlap,
                format!("{} already teaches at {coord}", entry.teacher),
            ));
        }

        let teacher = res.teacher(&entry.teacher);
        match teacher {
            None => conflicts.push(Conflict::new(
                ConflictKind::TeacherUnavailable,
                format!("unknown teacher {}", entry.teacher),
            )),
            Some(t) if !t.is_available(coord) => conflicts.push(Conflict::new(
                ConflictKind::TeacherUnavailable,
                format!("{} is not available at {coord}", t.id),
            )),
            Some(_) => {}
        }

        if let Some(t) = teacher {
            let same_day = others
                .iter()
                .filter(|e| e.teacher == entry.teacher && e.day == entry.day)
                .count();
            if same_day + 1 > t.max_classes_per_day {
                conflicts.push(Conflict::new(
                    ConflictKind::MaxClassesExceeded,
                    format!(
                        "{} would teach {} class(es) on {}, limit is {}",
                        t.id,
                        same_day + 1,
                        entry.day,
                        t.max_classes_per_day
                    ),
                ));
            }
        }

        // ── Classroom ─────────────────────────────────────────────────────────
        if others
            .iter()
            .filter(same_cell)
            .any(|e| e.classroom == entry.classroom)
        {
            conflicts.push(Conflict::new(
                ConflictKind::ClassroomOverlap,
                format!("{} is already booked at {coord}", entry.classroom),
            ));
        }

        let classroom = res.classroom(&entry.classroom);
        match classroom {
            None => conflicts.push(Conflict::new(
                ConflictKind::ClassroomUnavailable,
                format!("unknown classroom {}", entry.classroom),
            )),
            Some(r) if !r.is_available(coord) => conflicts.push(Conflict::new(
                ConflictKind::ClassroomUnavailable,
                format!("{} is not available at {coord}", r.id),
            )),
            Some(_) => {}
        }

        // ── Learners ──────────────────────────────────────────────────────────
        let busy: HashSet<&LearnerId> = others
            .iter()
            .filter(same_cell)
            .flat_map(|e| e.members.iter())
            .collect();
        for m in &entry.members {
            if busy.contains(m) {
                conflicts.push(Conflict::for_learner(
                    ConflictKind::StudentOverlap,
                    m,
                    format!("learner {m} already has a class at {coord}"),
                ));
            }
        }
        for m in &entry.members {
            if !res.learner_available(&entry.cohort, m, coord) {
                conflicts.push(Conflict::for_learner(
                    ConflictKind::StudentUnavailable,
                    m,
                    format!("learner {m} is not available at {coord}"),
                ));
            }
        }

        // ── Capacity ──────────────────────────────────────────────────────────
        if let Some(r) = classroom {
            if !r.seats(entry.members.len()) {
                conflicts.push(Conflict::new(
                    ConflictKind::CapacityExceeded,
                    format!(
                        "{} learners do not fit in {} (capacity {})",
                        entry.members.len(),
                        r.id,
                        r.capacity
                    ),
                ));
            }
        }

        debug!(entry = %entry.id, conflicts = conflicts.len(), "conflict check");
        conflicts
    }

    /// Alternatives for the overlap conflicts in `conflicts`.  Kinds without
    /// a remedy, and remedies with no options, are left out.
    pub fn suggest_alternatives(
        &self,
        entry: &ScheduleEntry,
        conflicts: &[Conflict],
        existing: &[ScheduleEntry],
    ) -> Vec<Suggestion> {
        let res = self.resources;
        let coord = entry.coord();
        let has = |kind| conflicts.iter().any(|c| c.kind == kind);
        let mut suggestions = Vec::new();

        if has(ConflictKind::TeacherOverlap) {
            if let Some(t) = res.teacher(&entry.teacher) {
                let booked: HashSet<Coord> = others(entry, existing)
                    .filter(|e| e.teacher == t.id)
                    .map(|e| e.coord())
                    .collect();
                let options: Vec<Coord> = t
                    .availability
                    .iter()
                    .filter(|c| !booked.contains(c))
                    .collect();
                if !options.is_empty() {
                    suggestions.push(Suggestion::AlternativeTime {
                        teacher: t.id.clone(),
                        options,
                    });
                }
            }
        }

        if has(ConflictKind::ClassroomOverlap) {
            let booked: HashSet<&ClassroomId> = others(entry, existing)
                .filter(|e| e.coord() == coord)
                .map(|e| &e.classroom)
                .collect();
            let options: Vec<ClassroomId> = res
                .classrooms
                .iter()
                .filter(|r| {
                    r.is_available(coord)
                        && !booked.contains(&r.id)
                        && r.seats(entry.members.len())
                })
                .map(|r| r.id.clone())
                .collect();
            if !options.is_empty() {
                suggestions.push(Suggestion::AlternativeRoom { coord, options });
            }
        }

        suggestions
    }

    /// Check every `scheduled` entry against the rest of `entries`.  Only
    /// entries with at least one conflict are returned, in input order.
    pub fn audit(&self, entries: &[ScheduleEntry]) -> Vec<EntryConflicts> {
        entries
            .iter()
            .filter(|e| e.is_scheduled())
            .filter_map(|e| {
                let conflicts = self.check_conflicts(e, entries);
                (!conflicts.is_empty()).then(|| EntryConflicts {
                    entry: e.id,
                    conflicts,
                })
            })
            .collect()
    }
}

/// Entries that can clash with `entry`.
fn others<'e>(
    entry: &'e ScheduleEntry,
    existing: &'e [ScheduleEntry],
) -> impl Iterator<Item = &'e ScheduleEntry> {
    existing
        .iter()
        .filter(move |e| e.id != entry.id && e.is_scheduled())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::fixtures::*;
    use crate::grid::{Day, TimeSlot};
    use crate::model::Subject;
    use crate::scheduler::greedy::GreedyConstructor;

    fn kinds(conflicts: &[Conflict]) -> Vec<ConflictKind> {
        conflicts.iter().map(|c| c.kind).collect()
    }

    fn entry(
        res: &ValidResources,
        id: u64,
        cohort: usize,
        teacher: &str,
        room: &str,
        coord: Coord,
    ) -> ScheduleEntry {
        ScheduleEntry::new(
            EntryId(id),
            SEMESTER,
            &res.cohorts[cohort],
            Subject::new("math"),
            TeacherId::new(teacher),
            ClassroomId::new(room),
            coord,
        )
    }

    fn at(day: Day, slot: u8) -> Coord {
        Coord::new(day, slot).unwrap()
    }

    fn two_cohorts() -> ValidResources {
        resources(&snapshot(
            vec![
                teacher("t1", &["math"], all_week()),
                teacher("t2", &["math"], all_week()),
            ],
            vec![
                classroom("r1", 10, all_week()),
                classroom("r2", 10, all_week()),
                classroom("r3", 5, all_week()),
            ],
            vec![
                cohort("c1", &members("a", 6), &["math"]),
                cohort("c2", &members("b", 6), &["math"]),
            ],
        ))
    }

    #[test]
    fn capacity_exceeded_is_reported() {
        let res = resources(&snapshot(
            vec![teacher("t1", &["math"], all_week())],
            vec![classroom("r1", 4, all_week())],
            vec![cohort("c1", &members("s", 10), &["math"])],
        ));
        let e = entry(&res, 1, 0, "t1", "r1", at(Day::Monday, 0));
        let conflicts = ConflictResolver::new(&res).check_conflicts(&e, &[]);
        assert_eq!(kinds(&conflicts), vec![ConflictKind::CapacityExceeded]);
    }

    #[test]
    fn greedy_output_has_no_conflicts() {
        let res = two_cohorts();
        let out = GreedyConstructor::new(&res, &EngineConfig::default()).construct();
        let resolver = ConflictResolver::new(&res);
        for e in &out.entries {
            assert!(resolver.check_conflicts(e, &out.entries).is_empty());
        }
        assert!(resolver.audit(&out.entries).is_empty());
    }

    #[test]
    fn overlaps_are_all_reported_together() {
        let res = two_cohorts();
        let c = at(Day::Monday, 0);
        let existing = vec![entry(&res, 1, 0, "t1", "r1", c)];
        // same teacher, same room, same learners
        let clash = entry(&res, 2, 0, "t1", "r1", c);
        let conflicts = ConflictResolver::new(&res).check_conflicts(&clash, &existing);
        let k = kinds(&conflicts);
        assert!(k.contains(&ConflictKind::TeacherOverlap));
        assert!(k.contains(&ConflictKind::ClassroomOverlap));
        let student = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::StudentOverlap)
            .count();
        assert_eq!(student, 6);
        assert!(conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::StudentOverlap)
            .all(|c| c.learner.is_some()));
    }

    #[test]
    fn same_id_and_retired_entries_are_ignored() {
        let res = two_cohorts();
        let c = at(Day::Monday, 0);
        let e = entry(&res, 1, 0, "t1", "r1", c);
        let mut cancelled = entry(&res, 2, 0, "t1", "r1", c);
        cancelled.cancel().unwrap();
        let existing = vec![e.clone(), cancelled];
        assert!(ConflictResolver::new(&res)
            .check_conflicts(&e, &existing)
            .is_empty());
    }

    #[test]
    fn unknown_references_are_unavailable() {
        let res = two_cohorts();
        let e = entry(&res, 1, 0, "ghost", "nowhere", at(Day::Monday, 0));
        let k = kinds(&ConflictResolver::new(&res).check_conflicts(&e, &[]));
        assert_eq!(
            k,
            vec![
                ConflictKind::TeacherUnavailable,
                ConflictKind::ClassroomUnavailable
            ]
        );
    }

    #[test]
    fn out_of_grid_slot_is_invalid_time() {
        let res = two_cohorts();
        let bogus = Coord {
            day: Day::Friday,
            slot: TimeSlot(9),
        };
        let e = entry(&res, 1, 0, "t1", "r1", bogus);
        let k = kinds(&ConflictResolver::new(&res).check_conflicts(&e, &[]));
        assert!(k.contains(&ConflictKind::InvalidTime));
        assert!(k.contains(&ConflictKind::TeacherUnavailable));
    }

    #[test]
    fn daily_limit_is_enforced() {
        let mut s = snapshot(
            vec![teacher("t1", &["math"], all_week())],
            vec![classroom("r1", 10, all_week())],
            vec![cohort("c1", &members("a", 4), &["math"])],
        );
        s.teachers[0].max_classes_per_day = 2;
        let res = resources(&s);
        let existing = vec![
            entry(&res, 1, 0, "t1", "r1", at(Day::Tuesday, 0)),
            entry(&res, 2, 0, "t1", "r1", at(Day::Tuesday, 1)),
        ];
        let e = entry(&res, 3, 0, "t1", "r1", at(Day::Tuesday, 2));
        let k = kinds(&ConflictResolver::new(&res).check_conflicts(&e, &existing));
        assert_eq!(k, vec![ConflictKind::MaxClassesExceeded]);
    }

    #[test]
    fn unavailable_learner_is_reported_individually() {
        let mut s = snapshot(
            vec![teacher("t1", &["math"], all_week())],
            vec![classroom("r1", 10, all_week())],
            vec![cohort("c1", &members("a", 3), &["math"])],
        );
        s.cohorts[0].availability = None;
        s.learners = vec![
            learner("a0", all_week()),
            learner("a1", all_week()),
            learner("a2", slots(&[(Day::Monday, 0), (Day::Friday, 7)])),
        ];
        let res = resources(&s);
        let e = entry(&res, 1, 0, "t1", "r1", at(Day::Wednesday, 3));
        let conflicts = ConflictResolver::new(&res).check_conflicts(&e, &[]);
        assert_eq!(kinds(&conflicts), vec![ConflictKind::StudentUnavailable]);
        assert_eq!(conflicts[0].learner, Some(LearnerId::new("a2")));
    }

    #[test]
    fn suggestions_cover_teacher_and_room_overlaps() {
        let res = two_cohorts();
        let c = at(Day::Monday, 0);
        let existing = vec![entry(&res, 1, 0, "t1", "r1", c)];
        let clash = entry(&res, 2, 1, "t1", "r1", c);
        let resolver = ConflictResolver::new(&res);
        let conflicts = resolver.check_conflicts(&clash, &existing);
        let suggestions = resolver.suggest_alternatives(&clash, &conflicts, &existing);

        assert_eq!(suggestions.len(), 2);
        match &suggestions[0] {
            Suggestion::AlternativeTime { teacher, options } => {
                assert_eq!(teacher.as_str(), "t1");
                assert_eq!(options.len(), 39);
                assert!(!options.contains(&c));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &suggestions[1] {
            Suggestion::AlternativeRoom { coord, options } => {
                assert_eq!(*coord, c);
                // r3 seats only 5
                assert_eq!(options, &vec![ClassroomId::new("r2")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_options_means_no_suggestion() {
        let res = resources(&snapshot(
            vec![teacher("t1", &["math"], only(Day::Monday, 0))],
            vec![classroom("r1", 10, only(Day::Monday, 0))],
            vec![
                cohort("c1", &members("a", 4), &["math"]),
                cohort("c2", &members("b", 4), &["math"]),
            ],
        ));
        let c = at(Day::Monday, 0);
        let existing = vec![entry(&res, 1, 0, "t1", "r1", c)];
        let clash = entry(&res, 2, 1, "t1", "r1", c);
        let resolver = ConflictResolver::new(&res);
        let conflicts = resolver.check_conflicts(&clash, &existing);
        assert!(!conflicts.is_empty());
        assert!(resolver
            .suggest_alternatives(&clash, &conflicts, &existing)
            .is_empty());
    }

    #[test]
    fn audit_lists_both_sides_of_a_clash() {
        let res = two_cohorts();
        let c = at(Day::Thursday, 4);
        let entries = vec![
            entry(&res, 1, 0, "t1", "r1", c),
            entry(&res, 2, 1, "t1", "r2", c),
        ];
        let report = ConflictResolver::new(&res).audit(&entries);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].entry, EntryId(1));
        assert_eq!(kinds(&report[1].conflicts), vec![ConflictKind::TeacherOverlap]);
    }
}
