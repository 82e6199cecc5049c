/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Domain value types for the timetable engine.
//!
//! Two layers model the two sides of a generation run:
//!
//! ```text
//! CRUD layer ──(record::*Record)──► validator ──► Teacher / Classroom / Cohort ──► engine ──► ScheduleEntry
//!                ↑ loosely typed                      ↑ validated, read-only                 ↑ output
//! ```
//!
//! # Ownership model
//! Validated resources are constructed only by
//! [`validate`](crate::scheduler::validate::validate) and are `#[non_exhaustive]`,
//! so code outside this crate can read them but never build an unchecked one.
//! A [`ScheduleEntry`] changes only through a status transition; moving a class
//! produces a replacement entry and retires the old one.

pub mod record;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Availability, Coord, Day, TimeSlot};
use crate::scheduler::error::EngineError;

// ── Identifiers ───────────────────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Teacher identifier.
    TeacherId
);
string_id!(
    /// Classroom identifier.
    ClassroomId
);
string_id!(
    /// Cohort (division) identifier.
    CohortId
);
string_id!(
    /// Individual learner identifier.
    LearnerId
);
string_id!(
    /// Subject name, e.g. `"mathematics"`.
    Subject
);

/// Identifier of a generated entry.  Sequential within one generation run,
/// starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Validated resources ───────────────────────────────────────────────────────

/// A teacher that passed validation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    /// Subjects this teacher can teach, in input order.  Never empty.
    pub subjects: Vec<Subject>,
    pub availability: Availability,
    /// Hard cap on sessions per day.  Always ≥ 1.
    pub max_classes_per_day: usize,
    /// Soft preference only; never affects feasibility.
    pub preferred_slots: Availability,
    /// Soft preference only; never affects feasibility.
    pub break_slot: Option<TimeSlot>,
}

impl Teacher {
    pub fn teaches(&self, subject: &Subject) -> bool {
        self.subjects.contains(subject)
    }

    pub fn is_available(&self, coord: Coord) -> bool {
        self.availability.contains(coord)
    }
}

/// A classroom that passed validation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    /// Seat count.  Always ≥ the configured minimum cohort size.
    pub capacity: usize,
    pub availability: Availability,
}

impl Classroom {
    pub fn is_available(&self, coord: Coord) -> bool {
        self.availability.contains(coord)
    }

    /// `true` if `headcount` learners fit in this room.
    pub fn seats(&self, headcount: usize) -> bool {
        headcount <= self.capacity
    }
}

/// An individual learner.  Only availability matters to the engine.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Learner {
    pub id: LearnerId,
    pub availability: Availability,
}

/// A group of learners that attend the same classes.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Cohort {
    pub id: CohortId,
    /// Never empty.
    pub members: BTreeSet<LearnerId>,
    /// Subjects the cohort must be taught, in input order.
    pub subjects: Vec<Subject>,
    /// Intersection of every member's availability (and the cohort's own
    /// declared availability, if any).  Never empty.
    pub availability: Availability,
}

impl Cohort {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

// ── ScheduleEntry ─────────────────────────────────────────────────────────────

/// Lifecycle state of a [`ScheduleEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl EntryStatus {
    /// Allowed moves: `scheduled → cancelled` and `scheduled → completed`.
    pub fn can_become(self, next: EntryStatus) -> bool {
        matches!(
            (self, next),
            (EntryStatus::Scheduled, EntryStatus::Cancelled)
                | (EntryStatus::Scheduled, EntryStatus::Completed)
        )
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryStatus::Scheduled => "scheduled",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::Completed => "completed",
        })
    }
}

/// One class: a teacher teaching a subject to a set of learners in a room at
/// a (day, slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub teacher: TeacherId,
    pub classroom: ClassroomId,
    pub cohort: CohortId,
    /// Explicit learner set.  Copied from the cohort at creation time.
    pub members: BTreeSet<LearnerId>,
    pub subject: Subject,
    pub day: Day,
    pub slot: TimeSlot,
    pub semester: String,
    status: EntryStatus,
}

/// Borrowed view of what an entry occupies in a grid cell.
#[derive(Debug, Clone, Copy)]
pub struct Booking<'a> {
    pub teacher: &'a TeacherId,
    pub classroom: &'a ClassroomId,
    pub members: &'a BTreeSet<LearnerId>,
}

impl ScheduleEntry {
    /// Create a `scheduled` entry for `cohort` at `coord`.
    ///
    /// The engine creates entries while constructing a schedule; the conflict
    /// audit boundary also uses this to describe a candidate it received.
    pub fn new(
        id: EntryId,
        semester: impl Into<String>,
        cohort: &Cohort,
        subject: Subject,
        teacher: TeacherId,
        classroom: ClassroomId,
        coord: Coord,
    ) -> Self {
        Self {
            id,
            teacher,
            classroom,
            cohort: cohort.id.clone(),
            members: cohort.members.clone(),
            subject,
            day: coord.day,
            slot: coord.slot,
            semester: semester.into(),
            status: EntryStatus::Scheduled,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord {
            day: self.day,
            slot: self.slot,
        }
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Only scheduled entries occupy the grid.
    pub fn is_scheduled(&self) -> bool {
        self.status == EntryStatus::Scheduled
    }

    pub fn booking(&self) -> Booking<'_> {
        Booking {
            teacher: &self.teacher,
            classroom: &self.classroom,
            members: &self.members,
        }
    }

    /// Move to `next`, enforcing [`EntryStatus::can_become`].
    ///
    /// # Errors
    /// [`EngineError::InvalidStatusTransition`] for any other move.
    pub fn transition(&mut self, next: EntryStatus) -> Result<(), EngineError> {
        if !self.status.can_become(next) {
            return Err(EngineError::InvalidStatusTransition {
                entry: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), EngineError> {
        self.transition(EntryStatus::Cancelled)
    }

    pub fn complete(&mut self) -> Result<(), EngineError> {
        self.transition(EntryStatus::Completed)
    }

    /// Retire this entry and return a `scheduled` replacement at a new
    /// coordinate and/or room.  Everything else is carried over.
    ///
    /// # Errors
    /// Fails without side effects if this entry is not `scheduled`.
    pub fn replace_with(
        &mut self,
        id: EntryId,
        coord: Coord,
        classroom: ClassroomId,
    ) -> Result<ScheduleEntry, EngineError> {
        self.cancel()?;
        Ok(ScheduleEntry {
            id,
            classroom,
            day: coord.day,
            slot: coord.slot,
            status: EntryStatus::Scheduled,
            ..self.clone()
        })
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {} teaches {} to {} ({} learners) in {} [{}]",
            self.id,
            self.day,
            self.slot,
            self.teacher,
            self.subject,
            self.cohort,
            self.members.len(),
            self.classroom,
            self.status
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort() -> Cohort {
        Cohort {
            id: CohortId::new("div-a"),
            members: ["s1", "s2", "s3"].into_iter().map(LearnerId::from).collect(),
            subjects: vec![Subject::new("math")],
            availability: Availability::full(),
        }
    }

    fn entry() -> ScheduleEntry {
        ScheduleEntry::new(
            EntryId(1),
            "2026-fall",
            &cohort(),
            Subject::new("math"),
            TeacherId::new("t1"),
            ClassroomId::new("r1"),
            Coord::new(Day::Monday, 0).unwrap(),
        )
    }

    #[test]
    fn new_entry_is_scheduled_and_copies_members() {
        let e = entry();
        assert!(e.is_scheduled());
        assert_eq!(e.members.len(), 3);
        assert_eq!(e.cohort.as_str(), "div-a");
        assert_eq!(e.coord(), Coord::new(Day::Monday, 0).unwrap());
    }

    #[test]
    fn scheduled_entry_can_be_cancelled_or_completed() {
        let mut a = entry();
        a.cancel().unwrap();
        assert_eq!(a.status(), EntryStatus::Cancelled);

        let mut b = entry();
        b.complete().unwrap();
        assert_eq!(b.status(), EntryStatus::Completed);
    }

    #[test]
    fn retired_entry_cannot_transition_again() {
        let mut e = entry();
        e.cancel().unwrap();
        let err = e.complete().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidStatusTransition {
                from: EntryStatus::Cancelled,
                to: EntryStatus::Completed,
                ..
            }
        ));
        assert!(e.transition(EntryStatus::Scheduled).is_err());
    }

    #[test]
    fn replace_with_retires_original_and_keeps_assignment() {
        let mut old = entry();
        let moved = old
            .replace_with(
                EntryId(2),
                Coord::new(Day::Thursday, 5).unwrap(),
                ClassroomId::new("r9"),
            )
            .unwrap();

        assert_eq!(old.status(), EntryStatus::Cancelled);
        assert!(moved.is_scheduled());
        assert_eq!(moved.id, EntryId(2));
        assert_eq!(moved.day, Day::Thursday);
        assert_eq!(moved.slot, TimeSlot(5));
        assert_eq!(moved.classroom.as_str(), "r9");
        assert_eq!(moved.teacher, old.teacher);
        assert_eq!(moved.members, old.members);
    }

    #[test]
    fn replace_with_on_completed_entry_fails() {
        let mut e = entry();
        e.complete().unwrap();
        assert!(e
            .replace_with(
                EntryId(3),
                Coord::new(Day::Friday, 0).unwrap(),
                ClassroomId::new("r1")
            )
            .is_err());
        assert_eq!(e.status(), EntryStatus::Completed);
    }

    #[test]
    fn display_mentions_slot_label() {
        let s = entry().to_string();
        assert!(s.contains("monday 9:00 AM"), "{s}");
        assert!(s.contains("[scheduled]"), "{s}");
    }
}
