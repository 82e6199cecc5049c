/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence boundary for generated schedules.
//!
//! A new run supersedes every entry of its semester.  The replacement is
//! staged in full and validated before the old entries are touched, so a
//! failed replace leaves the previous schedule in place.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{info, warn};

use crate::model::{EntryId, ScheduleEntry};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("entry {entry} belongs to semester '{found}', expected '{expected}'")]
    SemesterMismatch {
        entry: EntryId,
        expected: String,
        found: String,
    },

    #[error("entry id {0} appears more than once in the batch")]
    DuplicateEntry(EntryId),
}

/// Where finished schedules are kept.
pub trait ScheduleStore {
    /// Atomically replace every entry of `semester` with `entries`.
    /// Returns the number of entries now stored for the semester.
    ///
    /// # Errors
    /// On any error the previous entries are left untouched.
    fn replace_semester(
        &mut self,
        semester: &str,
        entries: Vec<ScheduleEntry>,
    ) -> Result<usize, StoreError>;

    /// Entries of `semester`, in insertion order.
    fn entries(&self, semester: &str) -> &[ScheduleEntry];
}

/// Process-local store, one entry list per semester.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    semesters: BTreeMap<String, Vec<ScheduleEntry>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the whole batch before anything is swapped in.
    fn stage(semester: &str, entries: &[ScheduleEntry]) -> Result<(), StoreError> {
        let mut ids = HashSet::with_capacity(entries.len());
        for e in entries {
            if e.semester != semester {
                return Err(StoreError::SemesterMismatch {
                    entry: e.id,
                    expected: semester.to_string(),
                    found: e.semester.clone(),
                });
            }
            if !ids.insert(e.id) {
                return Err(StoreError::DuplicateEntry(e.id));
            }
        }
        Ok(())
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn replace_semester(
        &mut self,
        semester: &str,
        entries: Vec<ScheduleEntry>,
    ) -> Result<usize, StoreError> {
        if let Err(e) = Self::stage(semester, &entries) {
            warn!(semester, error = %e, "replace rejected, previous schedule kept");
            return Err(e);
        }

        let count = entries.len();
        let previous = self.semesters.insert(semester.to_string(), entries);
        info!(
            semester,
            entries = count,
            replaced = previous.map_or(0, |p| p.len()),
            "semester schedule replaced"
        );
        Ok(count)
    }

    fn entries(&self, semester: &str) -> &[ScheduleEntry] {
        self.semesters
            .get(semester)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
