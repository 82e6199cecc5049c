/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the timetable engine.
//!
//! Three layers model the three kinds of trouble a run can hit:
//!
//! * [`RejectionReason`]: why one input record was filtered out by the
//!   validator (logged, not fatal).
//! * [`UnmetDemand`]: a (teacher, subject, cohort) triple that could not be
//!   placed.  Reported next to a partial schedule, not fatal.
//! * [`EngineError`]: top-level failure returned from
//!   [`TimetableEngine::generate()`](super::TimetableEngine::generate).
//!
//! Conflicts found by the [resolver](crate::conflict) are results, not errors,
//! and live in that module.
//!
//! **Do not** replace these with `anyhow::Error` in library paths.  Callers
//! match on the variants.

use std::fmt;

use thiserror::Error;

use crate::grid::Day;
use crate::model::{CohortId, EntryId, EntryStatus, Subject, TeacherId};

// ── Record rejection ──────────────────────────────────────────────────────────

/// The kind of resource a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Teacher,
    Classroom,
    Cohort,
    Learner,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Teacher => "teacher",
            ResourceKind::Classroom => "classroom",
            ResourceKind::Cohort => "cohort",
            ResourceKind::Learner => "learner",
        })
    }
}

/// Why a single record was dropped by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Teacher lists no subjects.
    NoSubjects,

    /// Availability map does not mention every teaching day.
    MissingDays { missing: Vec<Day> },

    /// Availability lists a slot index outside the 8-slot day.
    SlotOutOfRange { day: Day, slot: u8 },

    /// Teacher's `max_classes_per_day` is zero.
    NoDailyCapacity,

    /// Classroom is smaller than the minimum cohort size.
    CapacityBelowMinimum { capacity: usize, minimum: usize },

    /// Cohort has no members.
    NoMembers,

    /// Cohort's derived availability is empty.
    NoAvailability,

    /// Another record of the same kind already used this id.
    DuplicateId,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NoSubjects => write!(f, "no subjects listed"),
            RejectionReason::MissingDays { missing } => {
                let names: Vec<&str> = missing.iter().map(|d| d.name()).collect();
                write!(f, "availability is missing day(s): {}", names.join(", "))
            }
            RejectionReason::SlotOutOfRange { day, slot } => {
                write!(f, "slot {slot} on {day} is outside the 8-slot day")
            }
            RejectionReason::NoDailyCapacity => write!(f, "max_classes_per_day is 0"),
            RejectionReason::CapacityBelowMinimum { capacity, minimum } => write!(
                f,
                "capacity {capacity} is below the minimum cohort size {minimum}"
            ),
            RejectionReason::NoMembers => write!(f, "cohort has no members"),
            RejectionReason::NoAvailability => {
                write!(f, "no slot is available to every member")
            }
            RejectionReason::DuplicateId => write!(f, "duplicate id"),
        }
    }
}

/// One filtered-out record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: ResourceKind,
    pub id: String,
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' rejected: {}", self.kind, self.id, self.reason)
    }
}

// ── Unmet demand ──────────────────────────────────────────────────────────────

/// Why a demand could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetReason {
    /// Cohort is smaller than the minimum class size.
    CohortTooSmall { size: usize, minimum: usize },

    /// No validated teacher teaches the subject.
    NoQualifiedTeacher,

    /// Every candidate (slot, classroom) was unavailable, full, or occupied.
    NoFeasibleSlot,
}

impl fmt::Display for UnmetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmetReason::CohortTooSmall { size, minimum } => {
                write!(f, "cohort has {size} member(s), minimum is {minimum}")
            }
            UnmetReason::NoQualifiedTeacher => write!(f, "no teacher teaches this subject"),
            UnmetReason::NoFeasibleSlot => write!(f, "no feasible slot and classroom"),
        }
    }
}

/// A demand the constructor could not satisfy.  Recoverable: reported as
/// metadata next to the partial schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetDemand {
    /// Teacher that was tried, if any qualified teacher exists.
    pub teacher: Option<TeacherId>,
    pub subject: Subject,
    pub cohort: CohortId,
    /// Zero-based session index within the week.
    pub session: usize,
    pub reason: UnmetReason,
}

impl fmt::Display for UnmetDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.teacher {
            Some(t) => write!(
                f,
                "{} for {} (session {}) with {}: {}",
                self.subject, self.cohort, self.session, t, self.reason
            ),
            None => write!(
                f,
                "{} for {} (session {}): {}",
                self.subject, self.cohort, self.session, self.reason
            ),
        }
    }
}

// ── Top-level errors ──────────────────────────────────────────────────────────

/// A resource collection was absent before any filtering happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} collection is empty, nothing to schedule")]
    EmptyCollection(ResourceKind),
}

/// The search produced nothing usable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The constructor could not place a single entry.
    #[error("no schedule entries could be produced ({unmet} unmet demand(s))")]
    NoEntries { unmet: usize },

    /// No member of the optimizer's initial population satisfies every hard
    /// constraint.
    #[error("no individual out of {population} satisfies every hard constraint")]
    NoFeasibleIndividual { population: usize },
}

/// Top-level error type returned by the engine.
///
/// | Variant | Fatal | Raised by |
/// |---|---|---|
/// | `Validation` | yes | validator, before any search |
/// | `InsufficientResources` | yes | validator, after filtering |
/// | `GenerationFailure` | yes | constructor / optimizer |
/// | `InvalidStatusTransition` | no | [`ScheduleEntry`](crate::model::ScheduleEntry) lifecycle |
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// One of the three resource sets became empty after filtering.
    #[error(
        "insufficient resources after validation: {teachers} teacher(s), \
         {classrooms} classroom(s), {cohorts} cohort(s)"
    )]
    InsufficientResources {
        teachers: usize,
        classrooms: usize,
        cohorts: usize,
    },

    #[error("generation failed: {0}")]
    GenerationFailure(#[from] GenerationFailure),

    #[error("entry {entry} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        entry: EntryId,
        from: EntryStatus,
        to: EntryStatus,
    },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
