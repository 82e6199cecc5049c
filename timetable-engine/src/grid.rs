/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The fixed weekly time grid.
//!
//! A week is 5 teaching days × 8 one-hour slots = 40 coordinates.  The grid is
//! identical for every week of a semester, so it is modelled as a process-wide
//! constant rather than a calendar.
//!
//! ```text
//!            slot 0    slot 1    …   slot 7
//!            9:00 AM   10:00 AM      4:00 PM
//! monday     [ 0 ]     [ 1 ]     …   [ 7 ]
//! tuesday    [ 8 ]     [ 9 ]     …   [15 ]
//! …
//! friday     [32 ]     [33 ]     …   [39 ]
//! ```
//!
//! Cell indices are day-major, slot-minor.  That order ("TimeGrid order") is
//! the iteration order used everywhere a deterministic scan is required.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Number of teaching days per week.
pub const DAYS_PER_WEEK: usize = 5;

/// Number of slots per teaching day.
pub const SLOTS_PER_DAY: usize = 8;

/// Total number of cells in the weekly grid.
pub const GRID_CELLS: usize = DAYS_PER_WEEK * SLOTS_PER_DAY;

/// Human-readable labels for the canonical slots.
pub const SLOT_LABELS: [&str; SLOTS_PER_DAY] = [
    "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM",
];

// ── Day ───────────────────────────────────────────────────────────────────────

/// A teaching day.  Serialised as the lowercase English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// All days in grid order.
    pub const ALL: [Day; DAYS_PER_WEEK] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Zero-based position in the week.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Day> {
        Day::ALL.get(i).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── TimeSlot ──────────────────────────────────────────────────────────────────

/// A slot index within a day.
///
/// The raw index is public because audit candidates arrive from outside the
/// engine and may carry a slot outside the canonical grid; such a slot is
/// representable (so it can be reported as `INVALID_TIME`) but never
/// [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot(pub u8);

impl TimeSlot {
    /// `true` if the slot lies inside the canonical 8-slot day.
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < SLOTS_PER_DAY
    }

    /// Canonical label (`"9:00 AM"` …), or `None` for an out-of-grid slot.
    pub fn label(self) -> Option<&'static str> {
        SLOT_LABELS.get(self.0 as usize).copied()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "slot#{}", self.0),
        }
    }
}

// ── Coord ─────────────────────────────────────────────────────────────────────

/// A (day, slot) coordinate.  Derived ordering is TimeGrid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub day: Day,
    pub slot: TimeSlot,
}

impl Coord {
    /// Build a coordinate, rejecting slots outside the canonical day.
    pub fn new(day: Day, slot: u8) -> Option<Coord> {
        let slot = TimeSlot(slot);
        slot.is_valid().then_some(Coord { day, slot })
    }

    /// Cell index in TimeGrid order, or `None` if the slot is out of range.
    pub fn index(self) -> Option<usize> {
        self.slot
            .is_valid()
            .then(|| self.day.index() * SLOTS_PER_DAY + self.slot.0 as usize)
    }

    /// Inverse of [`index`](Self::index).  `i` is reduced modulo
    /// [`GRID_CELLS`].
    pub fn from_index(i: usize) -> Coord {
        let i = i % GRID_CELLS;
        Coord {
            day: Day::ALL[i / SLOTS_PER_DAY],
            slot: TimeSlot((i % SLOTS_PER_DAY) as u8),
        }
    }

    /// Every coordinate of the week in TimeGrid order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_CELLS).map(Coord::from_index)
    }

    pub fn is_valid(self) -> bool {
        self.slot.is_valid()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.slot)
    }
}

// ── Availability ──────────────────────────────────────────────────────────────

/// A subset of the weekly grid, stored as a 40-bit set.
///
/// Bit `i` corresponds to [`Coord::from_index(i)`](Coord::from_index), so
/// iterating set bits from low to high yields TimeGrid order for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Availability(u64);

impl Availability {
    const MASK: u64 = (1u64 << GRID_CELLS) - 1;

    pub const fn empty() -> Self {
        Availability(0)
    }

    pub const fn full() -> Self {
        Availability(Self::MASK)
    }

    pub fn from_coords(coords: impl IntoIterator<Item = Coord>) -> Self {
        let mut a = Availability::empty();
        for c in coords {
            a.insert(c);
        }
        a
    }

    /// Every slot of every day listed in `slots` (out-of-range slots ignored).
    pub fn every_day_at(slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        let slots: Vec<TimeSlot> = slots.into_iter().filter(|s| s.is_valid()).collect();
        Availability::from_coords(
            Day::ALL
                .iter()
                .flat_map(|&day| slots.iter().map(move |&slot| Coord { day, slot })),
        )
    }

    /// Returns `false` for coordinates outside the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        match coord.index() {
            Some(i) => (self.0 >> i) & 1 == 1,
            None => false,
        }
    }

    /// Adds `coord`; returns `false` if it was out of range or already set.
    pub fn insert(&mut self, coord: Coord) -> bool {
        match coord.index() {
            Some(i) => {
                let before = self.0;
                self.0 |= 1 << i;
                before != self.0
            }
            None => false,
        }
    }

    pub fn intersect(self, other: Availability) -> Availability {
        Availability(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Slots available on `day`, in order.
    pub fn slots_on(&self, day: Day) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..SLOTS_PER_DAY as u8)
            .map(TimeSlot)
            .filter(move |&slot| self.contains(Coord { day, slot }))
    }

    /// Set coordinates in TimeGrid order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter_from(0)
    }

    /// Set coordinates in TimeGrid order, starting at cell `start` and
    /// wrapping around the end of the week.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = Coord> + '_ {
        let start = start % GRID_CELLS;
        (0..GRID_CELLS)
            .map(move |k| (start + k) % GRID_CELLS)
            .filter(move |&i| (self.0 >> i) & 1 == 1)
            .map(Coord::from_index)
    }
}

impl FromIterator<Coord> for Availability {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Availability::from_coords(iter)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_forty_cells() {
        assert_eq!(GRID_CELLS, 40);
        assert_eq!(Coord::all().count(), 40);
        assert_eq!(Availability::full().len(), 40);
    }

    #[test]
    fn coord_index_is_day_major() {
        let c = Coord::new(Day::Tuesday, 3).unwrap();
        assert_eq!(c.index(), Some(11));
        assert_eq!(Coord::from_index(11), c);
    }

    #[test]
    fn coord_ordering_matches_grid_order() {
        let coords: Vec<Coord> = Coord::all().collect();
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
    }

    #[test]
    fn out_of_range_slot_is_not_a_coordinate() {
        assert!(Coord::new(Day::Monday, 8).is_none());
        let bogus = Coord {
            day: Day::Monday,
            slot: TimeSlot(9),
        };
        assert_eq!(bogus.index(), None);
        assert!(!Availability::full().contains(bogus));
        assert_eq!(bogus.slot.to_string(), "slot#9");
    }

    #[test]
    fn slot_labels_match_teaching_hours() {
        assert_eq!(TimeSlot(0).label(), Some("9:00 AM"));
        assert_eq!(TimeSlot(7).label(), Some("4:00 PM"));
        assert_eq!(TimeSlot(8).label(), None);
    }

    #[test]
    fn intersection_keeps_common_cells() {
        let a = Availability::from_coords([
            Coord::new(Day::Monday, 0).unwrap(),
            Coord::new(Day::Friday, 7).unwrap(),
        ]);
        let b = Availability::from_coords([Coord::new(Day::Friday, 7).unwrap()]);
        let both = a.intersect(b);
        assert_eq!(both.len(), 1);
        assert!(both.contains(Coord::new(Day::Friday, 7).unwrap()));
    }

    #[test]
    fn iter_from_wraps_around_the_week() {
        let a = Availability::from_coords([
            Coord::new(Day::Monday, 1).unwrap(),
            Coord::new(Day::Friday, 6).unwrap(),
        ]);
        let order: Vec<Coord> = a.iter_from(39).collect();
        assert_eq!(
            order,
            vec![
                Coord::new(Day::Monday, 1).unwrap(),
                Coord::new(Day::Friday, 6).unwrap()
            ]
        );
        let order: Vec<Coord> = a.iter_from(20).collect();
        assert_eq!(order[0], Coord::new(Day::Friday, 6).unwrap());
    }

    #[test]
    fn every_day_at_expands_across_the_week() {
        let a = Availability::every_day_at([TimeSlot(2), TimeSlot(12)]);
        assert_eq!(a.len(), 5);
        for day in Day::ALL {
            assert_eq!(a.slots_on(day).collect::<Vec<_>>(), vec![TimeSlot(2)]);
        }
    }

    #[test]
    fn insert_reports_new_cells_only() {
        let mut a = Availability::empty();
        let c = Coord::new(Day::Wednesday, 4).unwrap();
        assert!(a.insert(c));
        assert!(!a.insert(c));
        assert!(!a.insert(Coord {
            day: Day::Wednesday,
            slot: TimeSlot(8)
        }));
    }

    #[test]
    fn day_serialises_lowercase() {
        let yaml = serde_yaml::to_string(&Day::Thursday).unwrap();
        assert_eq!(yaml.trim(), "thursday");
        let d: Day = serde_yaml::from_str("friday").unwrap();
        assert_eq!(d, Day::Friday);
    }
}
