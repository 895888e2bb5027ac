//! De-identification procedures
//!
//! A procedure is the declarative policy the engine applies:
//! - a global default (`Keep` or `Reject`) for records of unknown classes
//! - per SOP class, a default action for every element
//! - per SOP class and tag, an action overriding the class default
//!
//! Every rule may carry a justification, reported when it rejects a record.

pub mod action;
pub mod builder;
pub mod loader;
pub mod model;

pub use action::ActionKind;
pub use builder::ProcedureBuilder;
pub use loader::load_procedure;
pub use model::{ClassProcedure, ElementRule, Procedure, ProcedureSummary};
