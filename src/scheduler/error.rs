/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the scheduler loop.
//!
//! Task-level failures ([`TaskError`](crate::task::TaskError)) are reported
//! per slot and do not stop the loop; the variants here are the faults that
//! do.

use thiserror::Error;

/// Top-level error type returned by [`Scheduler::run`] and
/// [`Scheduler::run_for`].
///
/// [`Scheduler::run`]: super::Scheduler::run
/// [`Scheduler::run_for`]: super::Scheduler::run_for
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The schedule is empty; there is nothing to drive.
    #[error("no tasks configured - the schedule is empty")]
    NoTasks,

    /// A task panicked and the panic policy is
    /// [`PanicPolicy::Halt`](super::PanicPolicy::Halt).
    ///
    /// Carries the task name and the iteration the panic happened in, so
    /// the operator can locate it in the log stream.
    #[error("task '{task}' panicked during iteration {iteration}")]
    TaskPanicked { task: String, iteration: u64 },
}
