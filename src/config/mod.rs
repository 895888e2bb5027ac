//! Configuration management
//!
//! TOML configuration for the command-line tool, with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DEID_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [deidentification]
//! procedure_path = "procedures/ct-release.json"
//! uid_root = "${DEID_UID_ROOT}"
//! output_suffix = ".deid"
//! fail_fast = false
//!
//! [audit]
//! enabled = true
//! log_path = "./logs/audit.log"
//! json_format = true
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```
//!
//! The procedure itself lives in its own document; see
//! [`crate::procedure::load_procedure`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dicom_deid::config::load_config;
//!
//! # fn example() -> dicom_deid::domain::Result<()> {
//! let config = load_config("dicom-deid.toml")?;
//! println!("Procedure: {}", config.deidentification.procedure_path);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, AuditConfig, DeidConfig, DeidentificationConfig, LoggingConfig,
};
