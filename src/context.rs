//! The harness context: everything a task may touch while it runs.
//!
//! The context owns the resource registry, the sensor bank and the cycle
//! clock, and is itself owned by the scheduler.  Tasks receive it by
//! reference on every invocation; there is no global state to reach for.

use std::sync::Arc;

use tracing::info;

use crate::config::HarnessConfig;
use crate::cycles::CycleClock;
use crate::resource::ResourceRegistry;
use crate::sensor::SensorBank;

/// Shared state for one on-board computer harness.
#[derive(Debug)]
pub struct ObcContext {
    system_id: String,
    clock: CycleClock,
    registry: Arc<ResourceRegistry>,
    sensors: SensorBank,
}

impl ObcContext {
    pub fn new(
        system_id: impl Into<String>,
        clock: CycleClock,
        registry: Arc<ResourceRegistry>,
        sensors: SensorBank,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            clock,
            registry,
            sensors,
        }
    }

    /// Assemble the whole context from a validated configuration: the two
    /// name tables, one eagerly constructed device per sensor, and the
    /// cycle clock.
    pub fn from_config(cfg: &HarnessConfig) -> Self {
        let registry = Arc::new(ResourceRegistry::new(
            cfg.ports.iter().cloned(),
            cfg.sensors.iter().map(|s| s.name.clone()),
        ));
        let sensors = SensorBank::build(&cfg.sensors, Arc::clone(&registry));

        info!(
            system = %cfg.system,
            ports = registry.port_table().len(),
            sensors = sensors.len(),
            cycle_time_ms = cfg.cycle_time_ms,
            "harness context assembled"
        );

        Self::new(
            cfg.system.clone(),
            CycleClock::new(cfg.cycle_time()),
            registry,
            sensors,
        )
    }

    /// The system identifier every log event is tagged with.
    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn clock(&self) -> &CycleClock {
        &self.clock
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn sensors(&self) -> &SensorBank {
        &self.sensors
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
