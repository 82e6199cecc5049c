/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule quality indicators.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Classroom utilisation | booked room-cells / available room-cells |
//! | Average class size | mean learners per entry |
//! | Seat fill | mean `members / capacity` |
//! | Slot distribution | entries per slot index, all days combined |
//! | Teacher load | entries per teacher |
//! | Preferred-slot rate | entries inside the teacher's preferred slots, among teachers that declare any |
//! | Break violations | entries on the teacher's break slot |
//! | Consecutive overruns | (teacher, day) pairs with a run longer than [`MAX_CONSECUTIVE`] |
//!
//! Only `scheduled` entries are counted.  None of these affect feasibility.

use std::collections::{BTreeMap, BTreeSet};

use crate::grid::{Day, SLOTS_PER_DAY};
use crate::model::{ScheduleEntry, TeacherId};

use super::validate::ValidResources;

/// Longest run of back-to-back classes a teacher should have in one day.
pub const MAX_CONSECUTIVE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    pub entries: usize,
    pub classroom_utilization: f64,
    pub average_class_size: f64,
    pub seat_fill: f64,
    pub slot_distribution: [usize; SLOTS_PER_DAY],
    pub teacher_load: BTreeMap<TeacherId, usize>,
    /// `None` when no teacher in the schedule declares preferred slots.
    pub preferred_slot_rate: Option<f64>,
    pub break_slot_violations: usize,
    pub consecutive_overruns: usize,
}

impl ScheduleKpi {
    pub fn calculate(entries: &[ScheduleEntry], resources: &ValidResources) -> Self {
        let scheduled: Vec<&ScheduleEntry> = entries.iter().filter(|e| e.is_scheduled()).collect();
        let n = scheduled.len();

        let mut slot_distribution = [0usize; SLOTS_PER_DAY];
        let mut teacher_load: BTreeMap<TeacherId, usize> = BTreeMap::new();
        let mut teacher_slots: BTreeMap<(&TeacherId, Day), BTreeSet<u8>> = BTreeMap::new();
        let mut learners = 0usize;
        let mut fill_sum = 0.0;
        let mut fill_count = 0usize;
        let mut with_preferences = 0usize;
        let mut preferred_hits = 0usize;
        let mut break_slot_violations = 0usize;

        for e in &scheduled {
            if let Some(count) = slot_distribution.get_mut(e.slot.0 as usize) {
                *count += 1;
            }
            *teacher_load.entry(e.teacher.clone()).or_insert(0) += 1;
            teacher_slots
                .entry((&e.teacher, e.day))
                .or_default()
                .insert(e.slot.0);
            learners += e.members.len();

            if let Some(room) = resources.classroom(&e.classroom) {
                if room.capacity > 0 {
                    fill_sum += e.members.len() as f64 / room.capacity as f64;
                    fill_count += 1;
                }
            }
            if let Some(t) = resources.teacher(&e.teacher) {
                if !t.preferred_slots.is_empty() {
                    with_preferences += 1;
                    if t.preferred_slots.contains(e.coord()) {
                        preferred_hits += 1;
                    }
                }
                if t.break_slot == Some(e.slot) {
                    break_slot_violations += 1;
                }
            }
        }

        let available_cells: usize = resources
            .classrooms
            .iter()
            .map(|r| r.availability.len())
            .sum();

        Self {
            entries: n,
            classroom_utilization: ratio(n, available_cells),
            average_class_size: ratio(learners, n),
            seat_fill: if fill_count == 0 {
                0.0
            } else {
                fill_sum / fill_count as f64
            },
            slot_distribution,
            teacher_load,
            preferred_slot_rate: (with_preferences > 0)
                .then(|| ratio(preferred_hits, with_preferences)),
            break_slot_violations,
            consecutive_overruns: teacher_slots
                .values()
                .filter(|slots| longest_run(slots) > MAX_CONSECUTIVE)
                .count(),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Longest run of consecutive slot indices.
fn longest_run(slots: &BTreeSet<u8>) -> usize {
    let mut best = 0usize;
    let mut run = 0usize;
    let mut prev: Option<u8> = None;
    for &s in slots {
        run = match prev {
            Some(p) if p + 1 == s => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(s);
    }
    best
}

// ── Tests ─────────────────────────────────────────────────────────────────────
