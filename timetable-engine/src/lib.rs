/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable generation and conflict-resolution engine.
//!
//! ```text
//! lib.rs
//! ├── grid          – days, slots, coords, availability sets
//! ├── model/        – validated resources, schedule entries, raw YAML records
//! ├── config/       – YAML engine configuration
//! ├── scheduler/    – validator, occupancy grid, greedy constructor,
//! │                   fitness, KPIs, and the TimetableEngine facade
//! ├── optimizer/    – population search seeded by the greedy baseline
//! ├── conflict/     – single-entry conflict checks and alternatives
//! └── store         – semester-level schedule replacement
//! ```

pub mod config;
pub mod conflict;
pub mod grid;
pub mod model;
pub mod optimizer;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod fixtures;
