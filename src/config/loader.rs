//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DeidConfig;
use crate::domain::errors::DeidError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DeidConfig
/// 4. Applies environment variable overrides (DEID_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DeidError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use dicom_deid::config::loader::load_config;
///
/// let config = load_config("dicom-deid.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DeidError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DeidError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] for configuration already in memory
pub fn load_config_from_str(contents: &str) -> Result<DeidConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DeidConfig = toml::from_str(&contents)
        .map_err(|e| DeidError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DeidError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported,
/// not just the first.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DeidError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value.trim().parse().map_err(|_| {
        DeidError::Configuration(format!("{name} must be true or false, got '{value}'"))
    })
}

/// Applies environment variable overrides using DEID_* prefix
///
/// Environment variables follow the pattern: DEID_<SECTION>_<KEY>
/// For example: DEID_DEIDENTIFICATION_UID_ROOT, DEID_AUDIT_ENABLED
fn apply_env_overrides(config: &mut DeidConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("DEID_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // De-identification overrides
    if let Ok(val) = std::env::var("DEID_DEIDENTIFICATION_PROCEDURE_PATH") {
        config.deidentification.procedure_path = val;
    }
    if let Ok(val) = std::env::var("DEID_DEIDENTIFICATION_UID_ROOT") {
        config.deidentification.uid_root = val;
    }
    if let Ok(val) = std::env::var("DEID_DEIDENTIFICATION_OUTPUT_SUFFIX") {
        config.deidentification.output_suffix = val;
    }
    if let Ok(val) = std::env::var("DEID_DEIDENTIFICATION_FAIL_FAST") {
        config.deidentification.fail_fast = parse_bool("DEID_DEIDENTIFICATION_FAIL_FAST", &val)?;
    }

    // Audit overrides
    if let Ok(val) = std::env::var("DEID_AUDIT_ENABLED") {
        config.audit.enabled = parse_bool("DEID_AUDIT_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("DEID_AUDIT_LOG_PATH") {
        config.audit.log_path = val;
    }
    if let Ok(val) = std::env::var("DEID_AUDIT_JSON_FORMAT") {
        config.audit.json_format = parse_bool("DEID_AUDIT_JSON_FORMAT", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("DEID_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("DEID_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("DEID_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("DEID_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
