//! Lazy entity mapper for the Clarity LIMS REST+XML API.
//! Entities load their XML document on first field access and save it back
//! through a caller-supplied transport.

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod transport;
pub mod xml;

pub use cache::{canonical_uri, EntityCache};
pub use config::SessionConfig;
pub use descriptor::{field_def, fields_of, Descriptor, FieldDef};
pub use error::{ClarityError, ClarityResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::kind_for_tag;
pub use model::entity::{Entity, LoadState};
pub use model::kind::{ns, EntityKind, KindSpec};
pub use model::values::{
    Escalation, EscalationStatus, FieldValue, InputOutput, Location, NamedLink, NextAction,
    Placement, UdfMap, UdfValue, WorkflowStageStatus,
};
pub use session::{ReagentKitCreation, ReagentLotCreation, SampleCreation, Session, StepCreation};
pub use transport::{MemoryTransport, Method, RecordedCall, Response, Transport, TransportError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
