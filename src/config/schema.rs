//! Configuration schema types
//!
//! This module defines the structure of `dicom-deid.toml`.

use crate::deid::UidRoot;
use serde::{Deserialize, Serialize};

/// Root configuration structure mapping to the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeidConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Procedure and pseudonym settings
    #[serde(default)]
    pub deidentification: DeidentificationConfig,

    /// Per-record audit trail
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeidConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.deidentification.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Procedure and pseudonym settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeidentificationConfig {
    /// Procedure document (`.json` or `.toml`)
    #[serde(default = "default_procedure_path")]
    pub procedure_path: String,

    /// Root under which remapped UIDs are minted
    #[serde(default = "default_uid_root")]
    pub uid_root: String,

    /// Suffix inserted before the extension of output files when the output
    /// is a directory (`study.json` becomes `study.deid.json`)
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Stop the batch at the first rejected record
    #[serde(default)]
    pub fail_fast: bool,
}

impl DeidentificationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.procedure_path.trim().is_empty() {
            return Err("deidentification.procedure_path cannot be empty".to_string());
        }

        self.uid_root()
            .map_err(|e| format!("deidentification.uid_root: {e}"))?;

        if self.output_suffix.contains(['/', '\\']) {
            return Err(format!(
                "deidentification.output_suffix '{}' cannot contain a path separator",
                self.output_suffix
            ));
        }

        Ok(())
    }

    /// Parsed UID root
    pub fn uid_root(&self) -> crate::domain::Result<UidRoot> {
        UidRoot::new(&self.uid_root)
    }
}

impl Default for DeidentificationConfig {
    fn default() -> Self {
        Self {
            procedure_path: default_procedure_path(),
            uid_root: default_uid_root(),
            output_suffix: default_output_suffix(),
            fail_fast: false,
        }
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Write one audit line per processed record
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file (appended to)
    #[serde(default = "default_audit_log_path")]
    pub log_path: String,

    /// JSON lines instead of plain text
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.trim().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_procedure_path() -> String {
    "procedure.json".to_string()
}

fn default_uid_root() -> String {
    "2.25".to_string()
}

fn default_output_suffix() -> String {
    ".deid".to_string()
}

fn default_audit_log_path() -> String {
    "./logs/audit.log".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
