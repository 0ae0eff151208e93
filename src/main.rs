/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use rondo::config::HarnessConfig;
use rondo::scheduler::Scheduler;
use rondo::syslog;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Rondo cooperative task harness.
///
/// Example:
///   rondo -c demos/obc1.yaml
///   rondo -c demos/obc1.yaml -n 10 --cycle-ms 50
#[derive(Debug, Parser)]
#[command(
    name = "rondo",
    about = "Rondo cooperative task harness – round-robin scheduler for simulated OBCs",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML harness configuration file.
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Number of schedule iterations to run.  Omit to run forever.
    #[arg(short = 'n', long = "iterations")]
    iterations: Option<u64>,

    /// Override the configured wall time of one cycle, in milliseconds.
    #[arg(long = "cycle-ms")]
    cycle_ms: Option<u64>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    syslog::init("info");

    info!("Rondo starting up...");

    let cli = Cli::parse();

    info!(
        config     = ?cli.config,
        iterations = ?cli.iterations,
        cycle_ms   = ?cli.cycle_ms,
        "Configuration"
    );

    // ── Load harness configuration ────────────────────────────────────────────
    let mut cfg = match HarnessConfig::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load harness configuration: {:#}", e);
            process::exit(1);
        }
    };
    if let Some(ms) = cli.cycle_ms {
        cfg.cycle_time_ms = ms;
    }

    // ── Build and run the scheduler ───────────────────────────────────────────
    let mut scheduler = match Scheduler::from_config(&cfg) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Failed to assemble the schedule: {:#}", e);
            process::exit(1);
        }
    };

    let result = match cli.iterations {
        Some(n) => scheduler.run_for(n),
        None => scheduler.run(),
    };

    if let Err(e) = result {
        error!("Scheduler halted: {e}");
        process::exit(1);
    }

    // Only reachable in bounded mode.
    for (task, stats) in scheduler.task_stats() {
        info!(
            task,
            runs = stats.runs,
            cycles = stats.cycles,
            errors = stats.errors,
            panics = stats.panics,
            "final ledger"
        );
    }
}
