//! Harness configuration loading and validation.
//!
//! One YAML file describes an entire on-board computer harness: the system
//! identifier, the wall time of one cycle, the runner and panic policies,
//! the two resource name tables, and the task schedule itself.
//!
//! The expected structure is:
//! ```yaml
//! system: OBC1
//! cycle_time_ms: 1000
//! accounting: log          # or: sleep
//! on_panic: halt           # or: isolate
//! ports: [UART0, UART1]
//! sensors:
//!   - name: gyro
//!     start_address: 16384
//!     end_address: 16639
//! tasks:
//!   - name: poll_gyro
//!     cycles: 2
//!     ops:
//!       - read_sensor: { sensor: gyro, size: 16 }
//!       - write_port: { port: 0, size: 16 }
//!   - name: idle
//!     cycles: 1
//!     ops:
//!       - delay: { cycles: 1 }
//! ```
//!
//! Everything is validated at load time: duplicate names, inverted sensor
//! address windows, an empty schedule, and task ops that reference unknown
//! sensors or out-of-range port ids are all rejected with the file path in
//! the error chain.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scheduler::{CycleAccounting, PanicPolicy};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Serde default for `cycle_time_ms`: one second per cycle.
fn default_cycle_time_ms() -> u64 {
    1000
}

// ── Configuration types ───────────────────────────────────────────────────────

/// Everything needed to assemble and drive one harness.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// System identifier; every log event emitted inside the scheduler loop
    /// is tagged with it.
    pub system: String,

    /// Wall time of one cycle unit, in milliseconds.
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,

    /// How the runner accounts a task's cycle budget.
    #[serde(default)]
    pub accounting: CycleAccounting,

    /// What the scheduler does when a task panics.
    #[serde(default)]
    pub on_panic: PanicPolicy,

    /// Ordered port name table.  A port's id is its position in this list.
    #[serde(default)]
    pub ports: Vec<String>,

    /// Ordered sensor table.  A sensor's id is its position in this list.
    #[serde(default)]
    pub sensors: Vec<SensorSpec>,

    /// The schedule: tasks run in this order, once each per iteration.
    pub tasks: Vec<TaskSpec>,
}

/// One configured sensor: its name and the address window of its register
/// block.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorSpec {
    pub name: String,
    pub start_address: u32,
    pub end_address: u32,
}

/// One scheduled task: a name, a cycle budget, and the ops its body runs.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub cycles: u32,
    #[serde(default)]
    pub ops: Vec<TaskOp>,
}

/// A single task operation.
///
/// Sensors are referenced by name, ports by table id; delays are budgeted
/// in cycle units.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOp {
    ReadSensor { sensor: String, size: usize },
    WriteSensor { sensor: String, size: usize },
    ReadPort { port: usize, size: usize },
    WritePort { port: usize, size: usize },
    Delay { cycles: u32 },
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            system: String::new(),
            cycle_time_ms: default_cycle_time_ms(),
            accounting: CycleAccounting::default(),
            on_panic: PanicPolicy::default(),
            ports: Vec::new(),
            sensors: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl HarnessConfig {
    /// Parse and validate the configuration at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is
    /// structurally invalid, or validation fails; the chain carries the
    /// file path and the offending field.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading harness configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let cfg: HarnessConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid harness configuration: {}", path.display()))?;

        info!(
            system = %cfg.system,
            ports = cfg.ports.len(),
            sensors = cfg.sensors.len(),
            tasks = cfg.tasks.len(),
            "Configuration loaded"
        );
        for task in &cfg.tasks {
            debug!(task = %task.name, cycles = task.cycles, ops = task.ops.len(), "  scheduled");
        }

        Ok(cfg)
    }

    /// Check cross-field consistency.  Called by [`load`](Self::load);
    /// public so programmatically built configs can be checked too.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.system.is_empty(), "system identifier must not be empty");

        ensure_unique(self.ports.iter().map(String::as_str), "port")?;
        ensure_unique(self.sensors.iter().map(|s| s.name.as_str()), "sensor")?;

        for sensor in &self.sensors {
            ensure!(
                sensor.start_address <= sensor.end_address,
                "sensor '{}': start_address {} is past end_address {}",
                sensor.name,
                sensor.start_address,
                sensor.end_address
            );
        }

        ensure!(!self.tasks.is_empty(), "at least one task must be configured");

        for task in &self.tasks {
            for op in &task.ops {
                match op {
                    TaskOp::ReadSensor { sensor, .. } | TaskOp::WriteSensor { sensor, .. } => {
                        ensure!(
                            self.sensors.iter().any(|s| &s.name == sensor),
                            "task '{}': unknown sensor '{}'",
                            task.name,
                            sensor
                        );
                    }
                    TaskOp::ReadPort { port, .. } | TaskOp::WritePort { port, .. } => {
                        ensure!(
                            *port < self.ports.len(),
                            "task '{}': port id {} is outside the port table ({} entries)",
                            task.name,
                            port,
                            self.ports.len()
                        );
                    }
                    TaskOp::Delay { .. } => {}
                }
            }
        }

        Ok(())
    }

    /// Wall time of one cycle unit.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_millis(self.cycle_time_ms)
    }
}

/// Reject duplicate names within one table.
fn ensure_unique<'a>(names: impl Iterator<Item = &'a str>, what: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        ensure!(seen.insert(name), "duplicate {} name '{}'", what, name);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
