//! Per-record audit trail
//!
//! One line per record: outcome, procedure version, SOP class, action
//! counts and a hash of the SOP Instance UID. Element values are never
//! written.

pub mod logger;

pub use logger::{AuditLogger, AuditOutcome};
