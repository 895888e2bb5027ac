//! Validate procedure command implementation
//!
//! Loads the configuration and the procedure it names, then prints a
//! summary of the procedure without touching any data.

use super::process::resolve_config;
use crate::procedure::load_procedure;
use clap::Args;

/// Arguments for the validate-procedure command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Procedure document to check instead of the configured one
    #[arg(short, long)]
    pub procedure: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate-procedure command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let procedure_path = self
            .procedure
            .clone()
            .unwrap_or_else(|| config.deidentification.procedure_path.clone());

        tracing::info!(procedure = %procedure_path, "Validating procedure");
        println!("🔍 Validating procedure: {procedure_path}");
        println!();

        let procedure = match load_procedure(&procedure_path) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Procedure is not valid");
                println!("   Error: {e}");
                println!();
                return Ok(if e.is_policy_error() { 3 } else { 2 });
            }
        };

        let summary = procedure.summary();
        println!("✅ Procedure is valid");
        println!();
        println!("Procedure Summary:");
        println!("  Version: {}", summary.version);
        println!(
            "  Default: {} ({})",
            summary.global_default,
            summary.global_default.code()
        );
        println!("  SOP Classes: {}", summary.classes);
        for uid in procedure.class_uids() {
            println!("    - {uid}");
        }
        println!("  Tag Rules: {}", summary.tag_rules);
        println!("  Rules by Action:");
        for (action, count) in &summary.actions {
            println!("    {action} ({}): {count}", action.code());
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[tokio::test]
    async fn test_valid_procedure_exits_zero() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"version": "v1", "default": "R", "sopClass": {{"1.2.3": {{"default": "X"}}}}}}"#
        )
        .unwrap();

        let args = ValidateArgs {
            procedure: Some(file.path().to_string_lossy().into_owned()),
        };
        assert_eq!(args.execute("missing-config.toml").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_exits_three() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"version": "v1", "sopClass": {{"1.2.3": {{"default": "Q"}}}}}}"#
        )
        .unwrap();

        let args = ValidateArgs {
            procedure: Some(file.path().to_string_lossy().into_owned()),
        };
        assert_eq!(args.execute("missing-config.toml").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_missing_procedure_exits_two() {
        let args = ValidateArgs {
            procedure: Some("does-not-exist.json".to_string()),
        };
        assert_eq!(args.execute("missing-config.toml").await.unwrap(), 2);
    }
}
