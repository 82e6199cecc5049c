/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared builders for unit tests.

use crate::grid::{Day, SLOTS_PER_DAY};
use crate::model::record::{
    AvailabilityRecord, ClassroomRecord, CohortRecord, LearnerRecord, ResourceSnapshot,
    TeacherRecord,
};
use crate::scheduler::validate::{validate, ValidResources};
use crate::scheduler::MIN_COHORT_SIZE;

pub const SEMESTER: &str = "2026-fall";

/// Every slot of every day.
pub fn all_week() -> AvailabilityRecord {
    Day::ALL
        .iter()
        .map(|&d| (d, (0..SLOTS_PER_DAY as u8).collect()))
        .collect()
}

/// All five days present, with only the listed cells set.
pub fn slots(cells: &[(Day, u8)]) -> AvailabilityRecord {
    let mut record: AvailabilityRecord = Day::ALL.iter().map(|&d| (d, Vec::new())).collect();
    for &(day, slot) in cells {
        record.entry(day).or_default().push(slot);
    }
    record
}

/// A single cell.
pub fn only(day: Day, slot: u8) -> AvailabilityRecord {
    slots(&[(day, slot)])
}

pub fn teacher(id: &str, subjects: &[&str], availability: AvailabilityRecord) -> TeacherRecord {
    TeacherRecord {
        id: id.to_string(),
        name: format!("Teacher {id}"),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        availability,
        max_classes_per_day: 4,
        preferred_slots: Vec::new(),
        break_slot: None,
    }
}

pub fn classroom(id: &str, capacity: usize, availability: AvailabilityRecord) -> ClassroomRecord {
    ClassroomRecord {
        id: id.to_string(),
        name: format!("Room {id}"),
        capacity,
        availability,
    }
}

pub fn cohort(id: &str, members: &[String], subjects: &[&str]) -> CohortRecord {
    CohortRecord {
        id: id.to_string(),
        members: members.to_vec(),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        availability: Some(all_week()),
    }
}

pub fn learner(id: &str, availability: AvailabilityRecord) -> LearnerRecord {
    LearnerRecord {
        id: id.to_string(),
        availability,
    }
}

/// `n` learner ids: `prefix0`, `prefix1`, …
pub fn members(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

pub fn snapshot(
    teachers: Vec<TeacherRecord>,
    classrooms: Vec<ClassroomRecord>,
    cohorts: Vec<CohortRecord>,
) -> ResourceSnapshot {
    ResourceSnapshot {
        semester: SEMESTER.to_string(),
        teachers,
        classrooms,
        cohorts,
        learners: Vec::new(),
    }
}

pub fn resources(snapshot: &ResourceSnapshot) -> ValidResources {
    validate(snapshot, MIN_COHORT_SIZE).unwrap()
}
