/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Rondo – cooperative round-robin task harness
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/     – YAML harness configuration (system id, tables, tasks)
//! ├── resource/   – port/sensor name tables + validated I/O stubs
//! ├── sensor.rs   – per-sensor devices and the eager sensor bank
//! ├── task.rs     – the Task trait and config-driven script tasks
//! ├── cycles.rs   – cycle-unit clock and blocking delay
//! ├── context.rs  – the harness context handed to every task
//! ├── scheduler/  – the round-robin loop and the task runner
//! └── syslog.rs   – system-tagged structured logging
//! ```

pub mod config;
pub mod context;
pub mod cycles;
pub mod resource;
pub mod scheduler;
pub mod sensor;
pub mod syslog;
pub mod task;
