//! Init command implementation
//!
//! Writes a sample configuration file and, next to it, a sample procedure.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "dicom-deid.toml")]
    pub output: String,

    /// Also write a sample procedure document
    #[arg(long)]
    pub with_procedure: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing dicom-deid configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        if let Err(e) = fs::write(&self.output, Self::generate_config()) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(5);
        }
        println!("✅ Configuration file created: {}", self.output);

        if self.with_procedure {
            let procedure_path = Path::new(&self.output)
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("procedure.json");

            if procedure_path.exists() && !self.force {
                println!("⚠️  Procedure already exists, left unchanged: {}", procedure_path.display());
            } else if let Err(e) = fs::write(&procedure_path, Self::generate_procedure()) {
                println!("❌ Failed to write sample procedure");
                println!("   Error: {e}");
                return Ok(5);
            } else {
                println!("✅ Sample procedure created: {}", procedure_path.display());
            }
        }

        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your settings", self.output);
        println!("  2. Write or review the procedure for your SOP classes");
        println!("  3. Check it: dicom-deid validate-procedure");
        println!("  4. Run: dicom-deid process --input <dir> --output <dir>");
        println!();
        Ok(0)
    }

    fn generate_config() -> String {
        r#"# dicom-deid configuration

[application]
log_level = "info"

[deidentification]
# Procedure document (.json or .toml)
procedure_path = "procedure.json"

# Root for remapped UIDs. 2.25 needs no registration.
uid_root = "2.25"
# uid_root = "${DEID_UID_ROOT}"

# study.json -> study.deid.json when writing into a directory
output_suffix = ".deid"

# Stop the batch at the first rejected record
fail_fast = false

[audit]
enabled = true
log_path = "./logs/audit.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }

    fn generate_procedure() -> String {
        r#"{
  "version": "sample-1",
  "default": "R",
  "justification": "SOP class is not on the release list",
  "sopClass": {
    "1.2.840.10008.5.1.4.1.1.2": {
      "default": "X",
      "tags": {
        "(0008,0016)": { "default": "K" },
        "(0008,0018)": { "default": "U" },
        "(0008,0060)": { "default": "K" },
        "(0010,0010)": { "default": "D" },
        "(0010,0020)": { "default": "D" },
        "(0020,000D)": { "default": "U" },
        "(0020,000E)": { "default": "U" },
        "(7FE0,0010)": { "default": "K" }
      }
    }
  }
}
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeidConfig;
    use crate::procedure::Procedure;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_is_loadable() {
        let config: DeidConfig = toml::from_str(&InitArgs::generate_config()).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.audit.enabled);
        assert_eq!(config.deidentification.uid_root, "2.25");
    }

    #[test]
    fn test_generated_procedure_is_loadable() {
        let procedure = Procedure::from_json_str(&InitArgs::generate_procedure()).unwrap();
        assert_eq!(procedure.version(), "sample-1");
        assert_eq!(procedure.class_uids().len(), 1);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dicom-deid.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_procedure: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_writes_config_and_procedure() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dicom-deid.toml");

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_procedure: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(output.exists());
        assert!(dir.path().join("procedure.json").exists());
    }
}
