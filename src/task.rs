/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The task contract and config-driven script tasks.
//!
//! A task is any object implementing [`Task`]: a unit of work invoked once
//! per scheduler iteration against the shared [`ObcContext`].  The trait
//! replaces the classic function-pointer-plus-argument-block signature with
//! an object that carries its own typed state; a blanket implementation
//! lets plain closures act as tasks, which is what tests and embedders
//! mostly use.
//!
//! [`ScriptTask`] is the configured flavour: a straight-line list of ops
//! (sensor/port reads and writes, delays) compiled from a [`TaskSpec`].
//! Compilation resolves sensor names to device handles and allocates the
//! scratch buffers up front, so running an iteration does not allocate.

use anyhow::{Context as _, Result};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{TaskOp, TaskSpec};
use crate::context::ObcContext;
use crate::resource::ResourceError;
use crate::sensor::SensorDevice;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure reported by a task body.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A resource lookup inside the task failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Free-form failure from an embedder-supplied task.
    #[error("task failed: {0}")]
    Failed(String),
}

// ── Task trait ────────────────────────────────────────────────────────────────

/// A unit of work driven by the scheduler.
///
/// Invoked synchronously, once per iteration, in configured order.  The
/// task must return for the schedule to make progress; there is no
/// preemption and no timeout.
pub trait Task {
    fn run(&mut self, ctx: &ObcContext) -> Result<(), TaskError>;
}

/// Any `FnMut(&ObcContext) -> Result<(), TaskError>` is a task.
impl<F> Task for F
where
    F: FnMut(&ObcContext) -> Result<(), TaskError>,
{
    fn run(&mut self, ctx: &ObcContext) -> Result<(), TaskError> {
        self(ctx)
    }
}

// ── ScriptTask ────────────────────────────────────────────────────────────────

/// A compiled op: references are resolved and buffers allocated, nothing
/// left to fail but the I/O itself.
#[derive(Debug)]
enum CompiledOp {
    ReadSensor { device: Arc<SensorDevice>, buf: Vec<u8> },
    WriteSensor { device: Arc<SensorDevice>, buf: Vec<u8> },
    ReadPort { port: usize, buf: Vec<u8> },
    WritePort { port: usize, buf: Vec<u8> },
    Delay { cycles: u32 },
}

/// A task compiled from a configured op list.
#[derive(Debug)]
pub struct ScriptTask {
    ops: Vec<CompiledOp>,
}

impl ScriptTask {
    /// Compile `spec` against the harness context.
    ///
    /// # Errors
    /// Unknown sensor names and out-of-range port ids are configuration
    /// errors and fail here, before the scheduler ever runs.
    pub fn compile(spec: &TaskSpec, ctx: &ObcContext) -> Result<Self> {
        let mut ops = Vec::with_capacity(spec.ops.len());

        for op in &spec.ops {
            ops.push(match op {
                TaskOp::ReadSensor { sensor, size } => CompiledOp::ReadSensor {
                    device: resolve_sensor(spec, ctx, sensor)?,
                    buf: vec![0; *size],
                },
                TaskOp::WriteSensor { sensor, size } => CompiledOp::WriteSensor {
                    device: resolve_sensor(spec, ctx, sensor)?,
                    buf: vec![0; *size],
                },
                TaskOp::ReadPort { port, size } => {
                    check_port(spec, ctx, *port)?;
                    CompiledOp::ReadPort {
                        port: *port,
                        buf: vec![0; *size],
                    }
                }
                TaskOp::WritePort { port, size } => {
                    check_port(spec, ctx, *port)?;
                    CompiledOp::WritePort {
                        port: *port,
                        buf: vec![0; *size],
                    }
                }
                TaskOp::Delay { cycles } => CompiledOp::Delay { cycles: *cycles },
            });
        }

        Ok(Self { ops })
    }
}

fn resolve_sensor(
    spec: &TaskSpec,
    ctx: &ObcContext,
    sensor: &str,
) -> Result<Arc<SensorDevice>> {
    ctx.sensors()
        .get(sensor)
        .with_context(|| format!("task '{}': unknown sensor '{}'", spec.name, sensor))
}

fn check_port(spec: &TaskSpec, ctx: &ObcContext, port: usize) -> Result<()> {
    ctx.registry()
        .port_table()
        .resolve(port)
        .map(|_| ())
        .with_context(|| format!("task '{}': invalid port id {}", spec.name, port))
}

impl Task for ScriptTask {
    fn run(&mut self, ctx: &ObcContext) -> Result<(), TaskError> {
        for op in &mut self.ops {
            match op {
                CompiledOp::ReadSensor { device, buf } => device.read(buf)?,
                CompiledOp::WriteSensor { device, buf } => device.write(buf)?,
                CompiledOp::ReadPort { port, buf } => ctx.registry().port_read(*port, buf)?,
                CompiledOp::WritePort { port, buf } => ctx.registry().port_write(*port, buf)?,
                CompiledOp::Delay { cycles } => ctx.clock().delay(*cycles),
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HarnessConfig, SensorSpec};

    fn context() -> ObcContext {
        let cfg = HarnessConfig {
            system: "OBC1".to_string(),
            cycle_time_ms: 1,
            ports: vec!["UART0".to_string()],
            sensors: vec![SensorSpec {
                name: "gyro".to_string(),
                start_address: 100,
                end_address: 200,
            }],
            ..Default::default()
        };
        ObcContext::from_config(&cfg)
    }

    fn spec(name: &str, ops: Vec<TaskOp>) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            cycles: 1,
            ops,
        }
    }

    #[test]
    fn closure_acts_as_task() {
        let ctx = context();
        let mut calls = 0;
        let mut task = |_: &ObcContext| -> Result<(), TaskError> {
            calls += 1;
            Ok(())
        };
        task.run(&ctx).unwrap();
        task.run(&ctx).unwrap();
        drop(task);
        assert_eq!(calls, 2);
    }

    #[test]
    fn script_task_runs_every_op() {
        let ctx = context();
        let mut task = ScriptTask::compile(
            &spec(
                "poll",
                vec![
                    TaskOp::ReadSensor {
                        sensor: "gyro".to_string(),
                        size: 16,
                    },
                    TaskOp::WriteSensor {
                        sensor: "gyro".to_string(),
                        size: 16,
                    },
                    TaskOp::ReadPort { port: 0, size: 8 },
                    TaskOp::WritePort { port: 0, size: 8 },
                    TaskOp::Delay { cycles: 0 },
                ],
            ),
            &ctx,
        )
        .unwrap();

        task.run(&ctx).unwrap();
    }

    #[test]
    fn compile_rejects_unknown_sensor() {
        let ctx = context();
        let err = ScriptTask::compile(
            &spec(
                "bad",
                vec![TaskOp::ReadSensor {
                    sensor: "magnetometer".to_string(),
                    size: 8,
                }],
            ),
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown sensor 'magnetometer'"));
    }

    #[test]
    fn compile_rejects_out_of_range_port() {
        let ctx = context();
        let err = ScriptTask::compile(
            &spec("bad", vec![TaskOp::ReadPort { port: 9, size: 8 }]),
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid port id 9"));
    }

    #[test]
    fn task_error_wraps_resource_error() {
        let ctx = context();
        // A task going straight to the registry with a bad id gets the
        // resource error back, and can propagate it as a TaskError.
        let mut task = |ctx: &ObcContext| -> Result<(), TaskError> {
            let mut buf = [0u8; 4];
            ctx.registry().port_read(42, &mut buf)?;
            Ok(())
        };
        let err = task.run(&ctx).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Resource(ResourceError::InvalidResourceId { id: 42, .. })
        ));
    }
}
