/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-cell record of committed resources.
//!
//! Each cell of the 40-cell week tracks the teachers, classrooms and learners
//! already booked there.  Learners are tracked individually, so two cohorts
//! that share a member can never be placed in the same cell.
//!
//! A grid belongs to exactly one candidate schedule; the optimizer clones it
//! rather than sharing it.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::grid::{Coord, Day, GRID_CELLS};
use crate::model::{Booking, ClassroomId, LearnerId, TeacherId};

#[derive(Debug, Clone, Default)]
struct Cell {
    teachers: HashSet<TeacherId>,
    classrooms: HashSet<ClassroomId>,
    learners: HashSet<LearnerId>,
}

/// Mutable occupancy of the weekly grid.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Vec<Cell>,
    /// (teacher, day) → sessions committed that day.
    teacher_day_load: HashMap<(TeacherId, Day), usize>,
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::default(); GRID_CELLS],
            teacher_day_load: HashMap::new(),
        }
    }

    /// `true` if neither the teacher, the classroom, nor any of `members` is
    /// booked at `coord`.  Always `false` for an out-of-grid coordinate.
    pub fn is_free(
        &self,
        coord: Coord,
        teacher: &TeacherId,
        classroom: &ClassroomId,
        members: &BTreeSet<LearnerId>,
    ) -> bool {
        let Some(cell) = coord.index().map(|i| &self.cells[i]) else {
            return false;
        };
        !cell.teachers.contains(teacher)
            && !cell.classrooms.contains(classroom)
            && members.iter().all(|m| !cell.learners.contains(m))
    }

    /// Record `booking` at `coord`.  No-op for an out-of-grid coordinate.
    pub fn commit(&mut self, coord: Coord, booking: Booking<'_>) {
        let Some(i) = coord.index() else {
            return;
        };
        let cell = &mut self.cells[i];
        cell.teachers.insert(booking.teacher.clone());
        cell.classrooms.insert(booking.classroom.clone());
        cell.learners.extend(booking.members.iter().cloned());
        *self
            .teacher_day_load
            .entry((booking.teacher.clone(), coord.day))
            .or_insert(0) += 1;
    }

    /// Inverse of [`commit`](Self::commit).
    pub fn release(&mut self, coord: Coord, booking: Booking<'_>) {
        let Some(i) = coord.index() else {
            return;
        };
        let cell = &mut self.cells[i];
        cell.teachers.remove(booking.teacher);
        cell.classrooms.remove(booking.classroom);
        for m in booking.members {
            cell.learners.remove(m);
        }
        let key = (booking.teacher.clone(), coord.day);
        if let Some(load) = self.teacher_day_load.get_mut(&key) {
            *load = load.saturating_sub(1);
            if *load == 0 {
                self.teacher_day_load.remove(&key);
            }
        }
    }

    /// Sessions `teacher` already has on `day`.
    pub fn teacher_load(&self, teacher: &TeacherId, day: Day) -> usize {
        self.teacher_day_load
            .get(&(teacher.clone(), day))
            .copied()
            .unwrap_or(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
