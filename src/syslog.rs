//! System-tagged structured logging.
//!
//! Every event emitted inside the scheduler loop is tagged with the system
//! identifier by entering [`system_span`] around the loop.  The identifier
//! travels as a span field rather than a formatted prefix, so downstream
//! filtering and machine parsing keep working.

use tracing::{info_span, Span};

/// Initialise the global subscriber.
///
/// Level is controlled by the `RUST_LOG` env-var; `default_filter` applies
/// when it is unset.  Call once, from the binary entry point.
pub fn init(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

/// The span tagging all in-loop events with the system identifier.
pub fn system_span(system_id: &str) -> Span {
    info_span!("obc", system = %system_id)
}
