//! Sensor devices and the eager sensor bank.
//!
//! Each configured sensor is backed by exactly one [`SensorDevice`] for the
//! lifetime of the process.  The devices are constructed up front, when the
//! harness context is assembled, and handed out as shared handles; two
//! lookups for the same sensor always observe the identical instance.  This
//! keeps first access race-free without any lazy-initialisation guard.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::SensorSpec;
use crate::resource::{ResourceError, ResourceRegistry};

// ── SensorDevice ──────────────────────────────────────────────────────────────

/// One sensor: its name, its id in the sensor table, and the address window
/// of its register block.
///
/// `read` and `write` delegate to the registry stubs using the stored id.
/// The id is the sensor's index in the configured table, so it is a valid
/// table index by construction.
#[derive(Debug)]
pub struct SensorDevice {
    name: String,
    id: usize,
    start_address: u32,
    end_address: u32,
    registry: Arc<ResourceRegistry>,
}

impl SensorDevice {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn start_address(&self) -> u32 {
        self.start_address
    }

    pub fn end_address(&self) -> u32 {
        self.end_address
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<(), ResourceError> {
        self.registry.sensor_read(self.id, buf)
    }

    pub fn write(&self, buf: &[u8]) -> Result<(), ResourceError> {
        self.registry.sensor_write(self.id, buf)
    }
}

// ── SensorBank ────────────────────────────────────────────────────────────────

/// All sensor devices, built eagerly at harness setup.
///
/// Lookups return clones of the same `Arc`, so handle identity is stable:
/// `Arc::ptr_eq(&bank.get("gyro")?, &bank.get("gyro")?)` holds.
#[derive(Debug, Default)]
pub struct SensorBank {
    devices: Vec<Arc<SensorDevice>>,
    by_name: HashMap<String, usize>,
}

impl SensorBank {
    /// Construct one device per spec, in table order.
    ///
    /// The device id is the spec's position in the list, matching the
    /// registry's sensor table.
    pub fn build(specs: &[SensorSpec], registry: Arc<ResourceRegistry>) -> Self {
        debug_assert_eq!(
            registry.sensor_table().len(),
            specs.len(),
            "sensor table and spec list must describe the same sensors"
        );

        let mut devices = Vec::with_capacity(specs.len());
        let mut by_name = HashMap::with_capacity(specs.len());

        for (id, spec) in specs.iter().enumerate() {
            debug!(
                sensor = %spec.name,
                id,
                start_address = spec.start_address,
                end_address = spec.end_address,
                "sensor device constructed"
            );
            by_name.insert(spec.name.clone(), id);
            devices.push(Arc::new(SensorDevice {
                name: spec.name.clone(),
                id,
                start_address: spec.start_address,
                end_address: spec.end_address,
                registry: Arc::clone(&registry),
            }));
        }

        Self { devices, by_name }
    }

    /// The device for `name`, if configured.
    pub fn get(&self, name: &str) -> Option<Arc<SensorDevice>> {
        self.by_name.get(name).map(|&id| Arc::clone(&self.devices[id]))
    }

    /// The device with table id `id`, if configured.
    pub fn get_by_id(&self, id: usize) -> Option<Arc<SensorDevice>> {
        self.devices.get(id).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over the devices in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SensorDevice>> {
        self.devices.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> SensorBank {
        let specs = vec![
            SensorSpec {
                name: "gyro".to_string(),
                start_address: 0x4000,
                end_address: 0x40FF,
            },
            SensorSpec {
                name: "baro".to_string(),
                start_address: 0x4100,
                end_address: 0x41FF,
            },
        ];
        let registry = Arc::new(ResourceRegistry::new(
            ["UART0"],
            specs.iter().map(|s| s.name.clone()),
        ));
        SensorBank::build(&specs, registry)
    }

    #[test]
    fn two_lookups_return_the_identical_instance() {
        let bank = bank();
        let a = bank.get("gyro").unwrap();
        let b = bank.get("gyro").unwrap();
        assert!(Arc::ptr_eq(&a, &b), "lookups must share one instance");
        assert_eq!(a.id(), b.id());
        assert_eq!(a.start_address(), b.start_address());
        assert_eq!(a.end_address(), b.end_address());
    }

    #[test]
    fn name_and_id_lookups_agree() {
        let bank = bank();
        let by_name = bank.get("baro").unwrap();
        let by_id = bank.get_by_id(by_name.id()).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_id));
    }

    #[test]
    fn ids_follow_table_order() {
        let bank = bank();
        assert_eq!(bank.get("gyro").unwrap().id(), 0);
        assert_eq!(bank.get("baro").unwrap().id(), 1);
    }

    #[test]
    fn unknown_sensor_is_none() {
        let bank = bank();
        assert!(bank.get("magnetometer").is_none());
        assert!(bank.get_by_id(2).is_none());
    }

    #[test]
    fn device_io_goes_through_the_registry_stubs() {
        let bank = bank();
        let gyro = bank.get("gyro").unwrap();
        let mut buf = [0u8; 16];
        gyro.read(&mut buf).unwrap();
        gyro.write(&buf).unwrap();
    }

    #[test]
    fn device_keeps_its_address_window() {
        let bank = bank();
        let gyro = bank.get("gyro").unwrap();
        assert_eq!(gyro.start_address(), 0x4000);
        assert_eq!(gyro.end_address(), 0x40FF);
        assert_eq!(gyro.name(), "gyro");
    }
}
