//! Resource name tables and the port/sensor I/O stubs.
//!
//! An on-board computer addresses its peripherals through two fixed tables:
//! one for ports, one for sensors.  Each table is an ordered sequence of
//! names, frozen at construction, indexed by an integer id.  The read/write
//! operations here are observability stubs: they resolve the id against the
//! relevant table and report the operation with structured fields, but no
//! data is actually transferred.
//!
//! Every lookup is bounds-checked.  An out-of-range id fails with
//! [`ResourceError::InvalidResourceId`] and the error is returned to the
//! calling task rather than swallowed.

use thiserror::Error;
use tracing::info;

// ── Resource kinds ────────────────────────────────────────────────────────────

/// Which of the two resource tables an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Port,
    Sensor,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Port => write!(f, "port"),
            ResourceKind::Sensor => write!(f, "sensor"),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors produced by resource table lookups.
///
/// Carries the kind, the offending id and the table length so callers can
/// log a useful message without further context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The id is not a valid index into the resource table.
    #[error("invalid {kind} id {id} (table holds {len} entries)")]
    InvalidResourceId {
        kind: ResourceKind,
        id: usize,
        len: usize,
    },
}

// ── ResourceTable ─────────────────────────────────────────────────────────────

/// An ordered, immutable sequence of resource names indexed by integer id.
///
/// Fixed at construction; for every valid id, [`resolve`](Self::resolve)
/// returns the same name on every call.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    kind: ResourceKind,
    names: Vec<String>,
}

impl ResourceTable {
    /// Build a table from an ordered list of names.  The position of each
    /// name is its id.
    pub fn new<I, S>(kind: ResourceKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve an id to its name.
    ///
    /// # Errors
    /// [`ResourceError::InvalidResourceId`] when `id` is outside the table.
    pub fn resolve(&self, id: usize) -> Result<&str, ResourceError> {
        self.names
            .get(id)
            .map(String::as_str)
            .ok_or(ResourceError::InvalidResourceId {
                kind: self.kind,
                id,
                len: self.names.len(),
            })
    }

    /// Reverse lookup: the id of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

// ── ResourceRegistry ──────────────────────────────────────────────────────────

/// Owns the port and sensor tables and exposes the four I/O stubs.
///
/// Built once at harness setup and shared read-only afterwards, so lookups
/// need no locking.
#[derive(Debug)]
pub struct ResourceRegistry {
    ports: ResourceTable,
    sensors: ResourceTable,
}

impl ResourceRegistry {
    /// Build a registry from the two ordered name lists.
    pub fn new<P, S, PS, SS>(ports: P, sensors: S) -> Self
    where
        P: IntoIterator<Item = PS>,
        S: IntoIterator<Item = SS>,
        PS: Into<String>,
        SS: Into<String>,
    {
        Self {
            ports: ResourceTable::new(ResourceKind::Port, ports),
            sensors: ResourceTable::new(ResourceKind::Sensor, sensors),
        }
    }

    pub fn port_table(&self) -> &ResourceTable {
        &self.ports
    }

    pub fn sensor_table(&self) -> &ResourceTable {
        &self.sensors
    }

    // ── I/O stubs ─────────────────────────────────────────────────────────────
    //
    // No transfer takes place: the stubs resolve the id, report the operation
    // and hand the buffer straight back.

    pub fn port_read(&self, id: usize, buf: &mut [u8]) -> Result<(), ResourceError> {
        let name = self.ports.resolve(id)?;
        info!(port = %name, size = buf.len(), "port read");
        Ok(())
    }

    pub fn port_write(&self, id: usize, buf: &[u8]) -> Result<(), ResourceError> {
        let name = self.ports.resolve(id)?;
        info!(port = %name, size = buf.len(), "port write");
        Ok(())
    }

    pub fn sensor_read(&self, id: usize, buf: &mut [u8]) -> Result<(), ResourceError> {
        let name = self.sensors.resolve(id)?;
        info!(sensor = %name, size = buf.len(), "sensor read");
        Ok(())
    }

    pub fn sensor_write(&self, id: usize, buf: &[u8]) -> Result<(), ResourceError> {
        let name = self.sensors.resolve(id)?;
        info!(sensor = %name, size = buf.len(), "sensor write");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(["UART0", "UART1", "SPI0"], ["gyro", "baro"])
    }

    // ── ResourceTable ─────────────────────────────────────────────────────────

    #[test]
    fn resolve_returns_same_name_on_every_call() {
        let table = ResourceTable::new(ResourceKind::Port, ["UART0", "UART1"]);
        for id in 0..table.len() {
            let first = table.resolve(id).unwrap().to_string();
            for _ in 0..10 {
                assert_eq!(table.resolve(id).unwrap(), first);
            }
        }
    }

    #[test]
    fn resolve_out_of_range_fails_with_invalid_resource_id() {
        let table = ResourceTable::new(ResourceKind::Sensor, ["gyro"]);
        let err = table.resolve(1).unwrap_err();
        assert_eq!(
            err,
            ResourceError::InvalidResourceId {
                kind: ResourceKind::Sensor,
                id: 1,
                len: 1,
            }
        );
    }

    #[test]
    fn resolve_on_empty_table_fails() {
        let table = ResourceTable::new(ResourceKind::Port, Vec::<String>::new());
        assert!(table.is_empty());
        assert!(matches!(
            table.resolve(0),
            Err(ResourceError::InvalidResourceId { id: 0, len: 0, .. })
        ));
    }

    #[test]
    fn index_of_inverts_resolve() {
        let table = ResourceTable::new(ResourceKind::Port, ["UART0", "UART1", "SPI0"]);
        for id in 0..table.len() {
            let name = table.resolve(id).unwrap();
            assert_eq!(table.index_of(name), Some(id));
        }
        assert_eq!(table.index_of("I2C0"), None);
    }

    // ── I/O stubs ─────────────────────────────────────────────────────────────

    #[test]
    fn stubs_accept_all_valid_ids() {
        let reg = registry();
        let mut buf = [0u8; 8];

        for id in 0..reg.port_table().len() {
            reg.port_read(id, &mut buf).unwrap();
            reg.port_write(id, &buf).unwrap();
        }
        for id in 0..reg.sensor_table().len() {
            reg.sensor_read(id, &mut buf).unwrap();
            reg.sensor_write(id, &buf).unwrap();
        }
    }

    #[test]
    fn stubs_reject_out_of_range_ids() {
        let reg = registry();
        let mut buf = [0u8; 8];

        assert!(matches!(
            reg.port_read(3, &mut buf),
            Err(ResourceError::InvalidResourceId {
                kind: ResourceKind::Port,
                id: 3,
                len: 3,
            })
        ));
        assert!(matches!(
            reg.port_write(99, &buf),
            Err(ResourceError::InvalidResourceId { id: 99, .. })
        ));
        assert!(matches!(
            reg.sensor_read(2, &mut buf),
            Err(ResourceError::InvalidResourceId {
                kind: ResourceKind::Sensor,
                id: 2,
                len: 2,
            })
        ));
        assert!(matches!(
            reg.sensor_write(2, &buf),
            Err(ResourceError::InvalidResourceId { .. })
        ));
    }

    #[test]
    fn error_message_carries_kind_id_and_len() {
        let err = ResourceError::InvalidResourceId {
            kind: ResourceKind::Sensor,
            id: 7,
            len: 2,
        };
        assert_eq!(err.to_string(), "invalid sensor id 7 (table holds 2 entries)");
    }
}
