/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Raw resource records as delivered by the CRUD layer.
//!
//! These are deliberately loose: every field may be missing or malformed.  The
//! [validator](crate::scheduler::validate) turns them into the typed resources
//! in [`crate::model`].
//!
//! A snapshot can also be read from YAML:
//! ```yaml
//! semester: "2026-fall"
//! teachers:
//!   - id: t-ada
//!     subjects: [mathematics]
//!     availability:
//!       monday: [0, 1, 2]
//!       tuesday: []
//!       wednesday: [0]
//!       thursday: []
//!       friday: [4, 5]
//!     max_classes_per_day: 3
//! classrooms:
//!   - id: r-101
//!     capacity: 30
//!     availability: { monday: [0, 1], tuesday: [], wednesday: [0], thursday: [], friday: [5] }
//! cohorts:
//!   - id: div-a
//!     members: [s1, s2, s3]
//!     subjects: [mathematics]
//! learners:
//!   - id: s1
//!     availability: { monday: [0, 1, 2], friday: [5] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::grid::Day;

/// Per-day list of slot indices (`0` = 9:00 AM … `7` = 4:00 PM).
///
/// A day that is absent from the map is distinct from a day that is present
/// with an empty list: teachers and classrooms must list all five days.
pub type AvailabilityRecord = BTreeMap<Day, Vec<u8>>;

/// Serde default for `max_classes_per_day`.
fn default_max_classes_per_day() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub availability: AvailabilityRecord,
    #[serde(default = "default_max_classes_per_day")]
    pub max_classes_per_day: usize,
    /// Preferred slot indices, applied to every day.
    #[serde(default)]
    pub preferred_slots: Vec<u8>,
    #[serde(default)]
    pub break_slot: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: usize,
    #[serde(default)]
    pub availability: AvailabilityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    pub id: String,
    #[serde(default)]
    pub availability: AvailabilityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRecord {
    pub id: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Optional declared availability.  Intersected with the members'
    /// availabilities; when absent, the members' intersection alone is used.
    #[serde(default)]
    pub availability: Option<AvailabilityRecord>,
}

/// Read-only snapshot of every resource needed for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub semester: String,
    #[serde(default)]
    pub teachers: Vec<TeacherRecord>,
    #[serde(default)]
    pub classrooms: Vec<ClassroomRecord>,
    #[serde(default)]
    pub cohorts: Vec<CohortRecord>,
    #[serde(default)]
    pub learners: Vec<LearnerRecord>,
}

impl ResourceSnapshot {
    /// Parse a snapshot from a YAML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid YAML for
    /// this layout.  Semantic problems (empty subjects, missing days …) are
    /// left to the validator.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading resource snapshot from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open snapshot file: {}", path.display()))?;

        let snapshot: ResourceSnapshot = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        info!(
            semester = %snapshot.semester,
            teachers = snapshot.teachers.len(),
            classrooms = snapshot.classrooms.len(),
            cohorts = snapshot.cohorts.len(),
            learners = snapshot.learners.len(),
            "snapshot loaded"
        );

        Ok(snapshot)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
