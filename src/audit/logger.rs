//! Audit logger for de-identification runs

use crate::config::AuditConfig;
use crate::deid::DeidentificationReport;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Outcome of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Processed,
    Rejected,
}

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    procedure_version: &'a str,
    outcome: AuditOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    sop_class_uid: Option<&'a str>,
    /// SHA-256 hash of the original SOP Instance UID (never log the UID)
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_uid_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    justification: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<AuditCounts>,
}

#[derive(Debug, Serialize)]
struct AuditCounts {
    visited: usize,
    removed: usize,
    kept: usize,
    replaced: usize,
    remapped: usize,
}

impl From<&DeidentificationReport> for AuditCounts {
    fn from(report: &DeidentificationReport) -> Self {
        Self {
            visited: report.elements_visited,
            removed: report.removed,
            kept: report.kept,
            replaced: report.replaced,
            remapped: report.remapped,
        }
    }
}

/// Appends one line per record to the audit log
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(
            PathBuf::from(&config.log_path),
            config.json_format,
            config.enabled,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log a record that was de-identified and released
    pub fn log_processed(
        &self,
        procedure_version: &str,
        sop_instance_uid: Option<&str>,
        report: &DeidentificationReport,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.write_entry(&AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            procedure_version,
            outcome: AuditOutcome::Processed,
            sop_class_uid: report.sop_class_uid.as_deref(),
            instance_uid_hash: sop_instance_uid.map(hash_uid),
            justification: None,
            counts: Some(report.into()),
        })
    }

    /// Log a record the procedure refused to release
    pub fn log_rejected(
        &self,
        procedure_version: &str,
        sop_class_uid: Option<&str>,
        sop_instance_uid: Option<&str>,
        justification: &str,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.write_entry(&AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            procedure_version,
            outcome: AuditOutcome::Rejected,
            sop_class_uid,
            instance_uid_hash: sop_instance_uid.map(hash_uid),
            justification: Some(justification),
            counts: None,
        })
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            let outcome = match entry.outcome {
                AuditOutcome::Processed => "processed",
                AuditOutcome::Rejected => "rejected",
            };
            let detail = match (&entry.counts, entry.justification) {
                (Some(c), _) => format!(
                    "removed={} kept={} replaced={} remapped={}",
                    c.removed, c.kept, c.replaced, c.remapped
                ),
                (None, Some(justification)) => format!("justification={justification}"),
                (None, None) => String::new(),
            };
            writeln!(
                file,
                "[{}] {} | Procedure: {} | Class: {} | Instance: {} | {}",
                entry.timestamp,
                outcome,
                entry.procedure_version,
                entry.sop_class_uid.unwrap_or("-"),
                entry.instance_uid_hash.as_deref().unwrap_or("-"),
                detail
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a UID using SHA-256
fn hash_uid(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const INSTANCE: &str = "1.2.840.113619.2.55.3.604688119";

    fn report() -> DeidentificationReport {
        DeidentificationReport {
            sop_class_uid: Some("1.2.840.10008.5.1.4.1.1.2".to_string()),
            class_matched: true,
            elements_visited: 5,
            removed: 3,
            kept: 1,
            replaced: 0,
            remapped: 1,
            provenance: "v1 20250101000000".to_string(),
        }
    }

    #[test]
    fn test_audit_logger_creates_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("audit.log");

        let logger = AuditLogger::new(log_path, true, true).unwrap();
        assert!(logger.is_enabled());
        assert!(dir.path().join("nested").exists());
    }

    #[test]
    fn test_hash_uid() {
        assert_eq!(hash_uid(INSTANCE), hash_uid(INSTANCE));
        assert_ne!(hash_uid(INSTANCE), hash_uid("1.2.3"));
        assert_eq!(hash_uid(INSTANCE).len(), 64);
    }

    #[test]
    fn test_log_processed_json() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        logger.log_processed("v1", Some(INSTANCE), &report()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["outcome"], "processed");
        assert_eq!(line["procedure_version"], "v1");
        assert_eq!(line["counts"]["removed"], 3);
        assert_eq!(line["instance_uid_hash"], hash_uid(INSTANCE));
        assert!(!content.contains(INSTANCE));

        // Timestamps are written as RFC 3339 text
        let timestamp = line["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_log_rejected_plain_text() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger
            .log_rejected("v1", Some("1.2.3"), Some(INSTANCE), "SOP class 1.2.3 is not supported")
            .unwrap();
        logger.log_processed("v1", None, &report()).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("rejected"));
        assert!(lines[0].contains("justification=SOP class 1.2.3 is not supported"));
        assert!(lines[1].contains("removed=3"));
        assert!(!content.contains(INSTANCE));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger.log_processed("v1", Some(INSTANCE), &report()).unwrap();
        assert!(!log_path.exists());
    }
}
