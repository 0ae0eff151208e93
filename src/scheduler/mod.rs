//! The cooperative round-robin scheduler loop.
//!
//! [`Scheduler`] drives a fixed, ordered list of tasks: an optional init
//! block runs once, then every iteration invokes each task in configured
//! order and accounts its cycle budget.  Strictly cooperative and
//! single-threaded: a task runs to completion before the next one starts,
//! and a task that never returns stalls the whole harness.
//!
//! Two runner behaviours and two fault policies are selectable:
//!
//! | Knob | Values | Effect |
//! |---|---|---|
//! | [`CycleAccounting`] | `log` / `sleep` | record the budget in the ledger only, or additionally block for it after the task returns |
//! | [`PanicPolicy`] | `halt` / `isolate` | stop the loop with [`SchedulerError::TaskPanicked`], or log the panic and continue with the next task |
//!
//! A task returning `Err` is logged and counted in its slot's statistics;
//! the loop continues either way.
//!
//! # Example
//! ```rust,ignore
//! let mut scheduler = Scheduler::from_config(&cfg)?;
//! scheduler.run()?; // returns only on a fault
//! ```

pub mod error;

pub use error::SchedulerError;

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::HarnessConfig;
use crate::context::ObcContext;
use crate::syslog;
use crate::task::{ScriptTask, Task};

// ── Policies ──────────────────────────────────────────────────────────────────

/// How the runner accounts a task's cycle budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleAccounting {
    /// Record the budget in the slot's ledger only.
    #[default]
    Log,
    /// Record the budget and block for it after the task returns.
    Sleep,
}

/// What the scheduler does when a task panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Stop the loop and surface [`SchedulerError::TaskPanicked`].
    #[default]
    Halt,
    /// Log the panic, count it in the slot's statistics, and continue with
    /// the next task.
    Isolate,
}

// ── Slots and statistics ──────────────────────────────────────────────────────

/// One schedule entry: constructed at setup, reused every iteration.
struct TaskSlot {
    name: String,
    cycles: u32,
    task: Box<dyn Task>,
}

/// Per-slot execution ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Completed invocations (including ones that returned `Err`).
    pub runs: u64,
    /// Total cycles accounted across completed invocations.
    pub cycles: u64,
    /// Invocations that returned `Err`.
    pub errors: u64,
    /// Invocations that panicked.
    pub panics: u64,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// The round-robin scheduler.
///
/// Owns the harness context and the slot list; all mutable loop state lives
/// here, nothing is global.
pub struct Scheduler {
    ctx: ObcContext,
    slots: Vec<TaskSlot>,
    stats: Vec<TaskStats>,
    init: Option<Box<dyn FnOnce(&ObcContext)>>,
    accounting: CycleAccounting,
    policy: PanicPolicy,
    iterations: u64,
}

impl Scheduler {
    /// Create an empty scheduler around `ctx` with default policies.
    pub fn new(ctx: ObcContext) -> Self {
        Self {
            ctx,
            slots: Vec::new(),
            stats: Vec::new(),
            init: None,
            accounting: CycleAccounting::default(),
            policy: PanicPolicy::default(),
            iterations: 0,
        }
    }

    /// Assemble a scheduler from a validated configuration: context,
    /// policies, and one compiled [`ScriptTask`] per configured task, in
    /// configuration order.
    pub fn from_config(cfg: &HarnessConfig) -> anyhow::Result<Self> {
        let mut scheduler = Self::new(ObcContext::from_config(cfg))
            .with_accounting(cfg.accounting)
            .with_panic_policy(cfg.on_panic);

        for spec in &cfg.tasks {
            let task = ScriptTask::compile(spec, scheduler.context())?;
            scheduler.add_task(&spec.name, spec.cycles, task);
        }

        Ok(scheduler)
    }

    pub fn with_accounting(mut self, accounting: CycleAccounting) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Install a block that runs exactly once, before the first iteration.
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: FnOnce(&ObcContext) + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Append a task to the schedule.  Registration order is execution
    /// order.
    pub fn add_task(&mut self, name: impl Into<String>, cycles: u32, task: impl Task + 'static) {
        self.slots.push(TaskSlot {
            name: name.into(),
            cycles,
            task: Box::new(task),
        });
        self.stats.push(TaskStats::default());
    }

    pub fn context(&self) -> &ObcContext {
        &self.ctx
    }

    /// Iterations completed so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Per-slot statistics, in schedule order.
    pub fn task_stats(&self) -> impl Iterator<Item = (&str, &TaskStats)> {
        self.slots
            .iter()
            .zip(self.stats.iter())
            .map(|(slot, stats)| (slot.name.as_str(), stats))
    }

    /// Statistics for the named slot, if scheduled.
    pub fn stats_for(&self, name: &str) -> Option<&TaskStats> {
        self.task_stats().find(|(n, _)| *n == name).map(|(_, s)| s)
    }

    // ── Loop entry points ─────────────────────────────────────────────────────

    /// Run the schedule forever.
    ///
    /// Runs the init block once, then iterates until a fault: under normal
    /// operation this never returns.
    pub fn run(&mut self) -> Result<(), SchedulerError> {
        self.check_nonempty()?;
        let span = syslog::system_span(self.ctx.system_id());
        let _guard = span.enter();

        info!(tasks = self.slots.len(), "scheduler loop starting");
        self.fire_init();
        loop {
            self.run_iteration()?;
        }
    }

    /// Run exactly `iterations` full schedule passes.
    ///
    /// Same per-iteration semantics as [`run`](Self::run); used by tests
    /// and the `--iterations` CLI flag.
    pub fn run_for(&mut self, iterations: u64) -> Result<(), SchedulerError> {
        self.check_nonempty()?;
        let span = syslog::system_span(self.ctx.system_id());
        let _guard = span.enter();

        info!(
            tasks = self.slots.len(),
            iterations, "scheduler loop starting (bounded)"
        );
        self.fire_init();
        for _ in 0..iterations {
            self.run_iteration()?;
        }
        info!(iterations = self.iterations, "scheduler loop finished");
        Ok(())
    }

    fn check_nonempty(&self) -> Result<(), SchedulerError> {
        if self.slots.is_empty() {
            return Err(SchedulerError::NoTasks);
        }
        Ok(())
    }

    fn fire_init(&mut self) {
        if let Some(init) = self.init.take() {
            debug!("running init block");
            init(&self.ctx);
        }
    }

    // ── One iteration ─────────────────────────────────────────────────────────

    fn run_iteration(&mut self) -> Result<(), SchedulerError> {
        self.iterations += 1;
        let iteration = self.iterations;
        let accounting = self.accounting;
        let policy = self.policy;

        let Self {
            ctx, slots, stats, ..
        } = self;

        debug!(iteration, "iteration start");

        for (slot, stats) in slots.iter_mut().zip(stats.iter_mut()) {
            // Announce the budget before the invocation, then run the task
            // to completion.
            info!(task = %slot.name, cycles = slot.cycles, "running task");

            let outcome = catch_unwind(AssertUnwindSafe(|| slot.task.run(ctx)));

            match outcome {
                Ok(Ok(())) => {
                    stats.runs += 1;
                    stats.cycles += u64::from(slot.cycles);
                }
                Ok(Err(err)) => {
                    stats.runs += 1;
                    stats.cycles += u64::from(slot.cycles);
                    stats.errors += 1;
                    warn!(task = %slot.name, error = %err, "task reported an error");
                }
                Err(payload) => {
                    stats.panics += 1;
                    let message = panic_message(payload.as_ref());
                    match policy {
                        PanicPolicy::Halt => {
                            error!(task = %slot.name, iteration, message, "task panicked, halting");
                            return Err(SchedulerError::TaskPanicked {
                                task: slot.name.clone(),
                                iteration,
                            });
                        }
                        PanicPolicy::Isolate => {
                            error!(
                                task = %slot.name,
                                iteration,
                                message,
                                "task panicked, continuing with next task"
                            );
                            continue;
                        }
                    }
                }
            }

            if accounting == CycleAccounting::Sleep {
                ctx.clock().delay(slot.cycles);
            }
        }

        Ok(())
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
