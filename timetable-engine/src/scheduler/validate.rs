/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Resource validation.
//!
//! [`validate`] is the only way to obtain [`Teacher`], [`Classroom`],
//! [`Cohort`] and [`Learner`] values.  Unusable records are dropped and
//! reported as [`Rejection`]s; the run fails only when a whole collection is
//! missing or nothing usable survives.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{info, warn};

use crate::grid::{Availability, Coord, Day, TimeSlot};
use crate::model::record::{
    AvailabilityRecord, ClassroomRecord, CohortRecord, LearnerRecord, ResourceSnapshot,
    TeacherRecord,
};
use crate::model::{
    Classroom, ClassroomId, Cohort, CohortId, Learner, LearnerId, Subject, Teacher, TeacherId,
};

use super::error::{EngineError, Rejection, RejectionReason, ResourceKind, ValidationError};

// ── ValidResources ────────────────────────────────────────────────────────────

/// The validated, read-only view of a snapshot.
///
/// Collections keep the snapshot's input order, which is the iteration order
/// of the greedy constructor.
#[derive(Debug, Clone)]
pub struct ValidResources {
    pub semester: String,
    pub teachers: Vec<Teacher>,
    pub classrooms: Vec<Classroom>,
    pub cohorts: Vec<Cohort>,
    pub learners: BTreeMap<LearnerId, Learner>,
    /// Every record that was filtered out, in the order it was seen.
    pub rejected: Vec<Rejection>,
    teacher_index: HashMap<TeacherId, usize>,
    classroom_index: HashMap<ClassroomId, usize>,
    cohort_index: HashMap<CohortId, usize>,
}

impl ValidResources {
    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teacher_index.get(id).map(|&i| &self.teachers[i])
    }

    pub fn classroom(&self, id: &ClassroomId) -> Option<&Classroom> {
        self.classroom_index.get(id).map(|&i| &self.classrooms[i])
    }

    pub fn cohort(&self, id: &CohortId) -> Option<&Cohort> {
        self.cohort_index.get(id).map(|&i| &self.cohorts[i])
    }

    pub fn learner(&self, id: &LearnerId) -> Option<&Learner> {
        self.learners.get(id)
    }

    /// Whether `learner`, attending with `cohort`, can be in class at
    /// `coord`.  A learner without a record inherits the cohort's
    /// availability; with neither known, nothing is imposed.
    pub fn learner_available(&self, cohort: &CohortId, learner: &LearnerId, coord: Coord) -> bool {
        match (self.learner(learner), self.cohort(cohort)) {
            (Some(l), _) => l.availability.contains(coord),
            (None, Some(c)) => c.availability.contains(coord),
            (None, None) => true,
        }
    }

    /// Number of rejected records of `kind`.
    pub fn rejected_count(&self, kind: ResourceKind) -> usize {
        self.rejected.iter().filter(|r| r.kind == kind).count()
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Validate `snapshot`.  Classrooms smaller than `min_cohort_size` are dropped.
///
/// # Errors
/// * [`ValidationError::EmptyCollection`] if teachers, classrooms or cohorts
///   is empty before filtering.
/// * [`EngineError::InsufficientResources`] if any of the three is empty
///   after filtering.
pub fn validate(
    snapshot: &ResourceSnapshot,
    min_cohort_size: usize,
) -> Result<ValidResources, EngineError> {
    if snapshot.teachers.is_empty() {
        return Err(ValidationError::EmptyCollection(ResourceKind::Teacher).into());
    }
    if snapshot.classrooms.is_empty() {
        return Err(ValidationError::EmptyCollection(ResourceKind::Classroom).into());
    }
    if snapshot.cohorts.is_empty() {
        return Err(ValidationError::EmptyCollection(ResourceKind::Cohort).into());
    }

    let mut rejected = Vec::new();

    let teachers = accept_all(
        ResourceKind::Teacher,
        &snapshot.teachers,
        |r| r.id.as_str(),
        validate_teacher,
        &mut rejected,
    );
    let classrooms = accept_all(
        ResourceKind::Classroom,
        &snapshot.classrooms,
        |r| r.id.as_str(),
        |r| validate_classroom(r, min_cohort_size),
        &mut rejected,
    );
    let learners: BTreeMap<LearnerId, Learner> = accept_all(
        ResourceKind::Learner,
        &snapshot.learners,
        |r| r.id.as_str(),
        validate_learner,
        &mut rejected,
    )
    .into_iter()
    .map(|l| (l.id.clone(), l))
    .collect();
    let cohorts = accept_all(
        ResourceKind::Cohort,
        &snapshot.cohorts,
        |r| r.id.as_str(),
        |r| validate_cohort(r, &learners),
        &mut rejected,
    );

    info!(
        semester = %snapshot.semester,
        teachers = teachers.len(),
        classrooms = classrooms.len(),
        cohorts = cohorts.len(),
        learners = learners.len(),
        rejected = rejected.len(),
        "validation complete"
    );

    if teachers.is_empty() || classrooms.is_empty() || cohorts.is_empty() {
        return Err(EngineError::InsufficientResources {
            teachers: teachers.len(),
            classrooms: classrooms.len(),
            cohorts: cohorts.len(),
        });
    }

    let teacher_index = teachers
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();
    let classroom_index = classrooms
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();
    let cohort_index = cohorts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();

    Ok(ValidResources {
        semester: snapshot.semester.clone(),
        teachers,
        classrooms,
        cohorts,
        learners,
        rejected,
        teacher_index,
        classroom_index,
        cohort_index,
    })
}

/// Run `check` over every record, dropping failures and later duplicates of
/// an accepted id.
fn accept_all<R, T>(
    kind: ResourceKind,
    records: &[R],
    id_of: impl Fn(&R) -> &str,
    check: impl Fn(&R) -> Result<T, RejectionReason>,
    rejected: &mut Vec<Rejection>,
) -> Vec<T> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut accepted = Vec::with_capacity(records.len());

    for record in records {
        let id = id_of(record);
        let outcome = check(record).and_then(|value| {
            if seen.contains(id) {
                Err(RejectionReason::DuplicateId)
            } else {
                Ok(value)
            }
        });

        match outcome {
            Ok(value) => {
                seen.insert(id);
                accepted.push(value);
            }
            Err(reason) => {
                warn!(kind = %kind, id = %id, reason = %reason, "record rejected");
                rejected.push(Rejection {
                    kind,
                    id: id.to_string(),
                    reason,
                });
            }
        }
    }

    accepted
}

// ── Per-kind checks ───────────────────────────────────────────────────────────

fn validate_teacher(r: &TeacherRecord) -> Result<Teacher, RejectionReason> {
    let subjects = distinct_subjects(&r.subjects);
    if subjects.is_empty() {
        return Err(RejectionReason::NoSubjects);
    }
    let availability = parse_availability(&r.availability, true)?;
    if r.max_classes_per_day == 0 {
        return Err(RejectionReason::NoDailyCapacity);
    }

    Ok(Teacher {
        id: TeacherId::new(r.id.as_str()),
        name: r.name.clone(),
        subjects,
        availability,
        max_classes_per_day: r.max_classes_per_day,
        preferred_slots: Availability::every_day_at(r.preferred_slots.iter().map(|&s| TimeSlot(s))),
        break_slot: r.break_slot.map(TimeSlot).filter(|s| s.is_valid()),
    })
}

fn validate_classroom(r: &ClassroomRecord, minimum: usize) -> Result<Classroom, RejectionReason> {
    if r.capacity < minimum {
        return Err(RejectionReason::CapacityBelowMinimum {
            capacity: r.capacity,
            minimum,
        });
    }
    let availability = parse_availability(&r.availability, true)?;

    Ok(Classroom {
        id: ClassroomId::new(r.id.as_str()),
        name: r.name.clone(),
        capacity: r.capacity,
        availability,
    })
}

fn validate_learner(r: &LearnerRecord) -> Result<Learner, RejectionReason> {
    Ok(Learner {
        id: LearnerId::new(r.id.as_str()),
        availability: parse_availability(&r.availability, false)?,
    })
}

/// Cohort availability is the declared availability (the whole grid when
/// none is declared) intersected with every known member's availability.
/// Members without a learner record add no constraint.
fn validate_cohort(
    r: &CohortRecord,
    learners: &BTreeMap<LearnerId, Learner>,
) -> Result<Cohort, RejectionReason> {
    let members: BTreeSet<LearnerId> = r
        .members
        .iter()
        .map(|m| LearnerId::new(m.as_str()))
        .collect();
    if members.is_empty() {
        return Err(RejectionReason::NoMembers);
    }

    let declared = match &r.availability {
        Some(record) => parse_availability(record, false)?,
        None => Availability::full(),
    };
    let availability = members
        .iter()
        .filter_map(|m| learners.get(m))
        .fold(declared, |acc, l| acc.intersect(l.availability));
    if availability.is_empty() {
        return Err(RejectionReason::NoAvailability);
    }

    Ok(Cohort {
        id: CohortId::new(r.id.as_str()),
        members,
        subjects: distinct_subjects(&r.subjects),
        availability,
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Non-empty subject names in first-seen order.
fn distinct_subjects(names: &[String]) -> Vec<Subject> {
    let mut out: Vec<Subject> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let subject = Subject::new(name);
        if !out.contains(&subject) {
            out.push(subject);
        }
    }
    out
}

/// Convert a per-day slot list into an [`Availability`].
///
/// With `require_all_days`, every teaching day must appear as a key (an empty
/// list is fine).  Any slot index outside the day is an error.
fn parse_availability(
    record: &AvailabilityRecord,
    require_all_days: bool,
) -> Result<Availability, RejectionReason> {
    if require_all_days {
        let missing: Vec<Day> = Day::ALL
            .iter()
            .copied()
            .filter(|d| !record.contains_key(d))
            .collect();
        if !missing.is_empty() {
            return Err(RejectionReason::MissingDays { missing });
        }
    }

    let mut availability = Availability::empty();
    for (&day, slots) in record {
        for &slot in slots {
            let coord = Coord::new(day, slot).ok_or(RejectionReason::SlotOutOfRange { day, slot })?;
            availability.insert(coord);
        }
    }
    Ok(availability)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
