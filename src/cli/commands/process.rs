//! Process command implementation
//!
//! This module implements the `process` command, which de-identifies one
//! file or every `*.json` and `*.dcm` file in a directory. `.json` files
//! are read as DICOM JSON; everything else is read as a Part 10 file.

use crate::audit::AuditLogger;
use crate::config::{load_config, DeidConfig};
use crate::dataset::{DatasetCodec, DatasetExt, JsonCodec, Part10Codec};
use crate::deid::DeIdentifier;
use crate::domain::context::ResultExt;
use crate::domain::{DeidError, Result};
use crate::procedure::load_procedure;
use clap::Args;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input file (DICOM JSON or Part 10) or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file or directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Override the procedure document from the configuration
    #[arg(short, long)]
    pub procedure: Option<String>,

    /// Override the UID root from the configuration
    #[arg(long)]
    pub uid_root: Option<String>,

    /// Stop at the first rejected or failed record
    #[arg(long)]
    pub fail_fast: bool,

    /// Pretty-print DICOM JSON output files
    #[arg(long)]
    pub pretty: bool,
}

/// One input file and where its de-identified copy goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub rejected: usize,
    pub failed: usize,
    pub interrupted: bool,
    pub duration: Duration,
}

impl BatchSummary {
    /// Exit code for a batch that was not halted by a policy error
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.failed > 0 {
            5
        } else if self.rejected > 0 {
            1
        } else {
            0
        }
    }
}

enum RecordOutcome {
    Processed,
    Rejected(String),
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting process command");

        let mut config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        if let Some(procedure) = &self.procedure {
            tracing::info!(procedure = %procedure, "Overriding procedure from CLI");
            config.deidentification.procedure_path = procedure.clone();
        }
        if let Some(uid_root) = &self.uid_root {
            tracing::info!(uid_root = %uid_root, "Overriding UID root from CLI");
            config.deidentification.uid_root = uid_root.clone();
        }
        if self.fail_fast {
            config.deidentification.fail_fast = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        let procedure = match load_procedure(&config.deidentification.procedure_path) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load procedure");
                eprintln!("❌ {e}");
                return Ok(if e.is_policy_error() { 3 } else { 2 });
            }
        };
        let version = procedure.version().to_string();

        let uid_root = match config.deidentification.uid_root() {
            Ok(root) => root,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let jobs = match plan_jobs(&self.input, &self.output, &config.deidentification.output_suffix)
        {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to plan batch");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let audit = AuditLogger::from_config(&config.audit)?;
        let codecs = Codecs {
            json: JsonCodec::new().pretty(self.pretty),
            part10: Part10Codec::new(),
        };
        let mut deidentifier = DeIdentifier::new(procedure).with_uid_root(uid_root);

        println!("🔒 De-identifying {} file(s) with procedure {}", jobs.len(), version);
        println!();

        let started = Instant::now();
        let mut summary = BatchSummary {
            total: jobs.len(),
            ..Default::default()
        };

        for job in &jobs {
            if *shutdown_signal.borrow() {
                tracing::info!("Shutdown requested, stopping before next file");
                summary.interrupted = true;
                break;
            }

            let codec = codecs.for_path(&job.input);
            match process_file(&mut deidentifier, codec, &audit, &version, job) {
                Ok(RecordOutcome::Processed) => {
                    summary.processed += 1;
                    println!("  ✅ {}", job.input.display());
                }
                Ok(RecordOutcome::Rejected(justification)) => {
                    summary.rejected += 1;
                    println!("  ⛔ {} rejected: {}", job.input.display(), justification);
                    if config.deidentification.fail_fast {
                        tracing::info!("fail_fast set, stopping after rejection");
                        break;
                    }
                }
                Err(e) if e.is_policy_error() => {
                    crate::log_error_with_context!(&e, "Procedure cannot be applied");
                    eprintln!("❌ {e}");
                    eprintln!("   The batch was halted; fix the procedure and rerun.");
                    return Ok(3);
                }
                Err(e) => {
                    summary.failed += 1;
                    crate::log_error_with_context!(&e, "Failed to process file");
                    println!("  ❌ {}: {}", job.input.display(), e);
                    if config.deidentification.fail_fast {
                        tracing::info!("fail_fast set, stopping after failure");
                        break;
                    }
                }
            }
        }

        summary.duration = started.elapsed();

        println!();
        println!("📊 Summary:");
        println!("  Files: {}", summary.total);
        println!("  De-identified: {}", summary.processed);
        println!("  Rejected: {}", summary.rejected);
        println!("  Failed: {}", summary.failed);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if summary.interrupted {
            println!("⚠️  Interrupted. Files already written are complete.");
        }

        tracing::info!(
            processed = summary.processed,
            rejected = summary.rejected,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "Process command finished"
        );

        Ok(summary.exit_code())
    }
}

/// Loads the configuration file, or the defaults if it does not exist
pub(crate) fn resolve_config(config_path: &str) -> Result<DeidConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::warn!(config_path = %config_path, "Configuration file not found, using defaults");
        Ok(DeidConfig::default())
    }
}

/// Pairs every input file with its output path
///
/// A file input writes to `output` directly, or into it when `output` is an
/// existing directory. A directory input processes its `*.json` and
/// `*.dcm` files in name order, skipping files that already carry `suffix`.
pub fn plan_jobs(input: &Path, output: &Path, suffix: &str) -> Result<Vec<Job>> {
    if input.is_file() {
        let output = if output.is_dir() {
            output.join(output_name(input, suffix))
        } else {
            output.to_path_buf()
        };
        return Ok(vec![Job {
            input: input.to_path_buf(),
            output,
        }]);
    }

    if !input.is_dir() {
        return Err(DeidError::Configuration(format!(
            "Input not found: {}",
            input.display()
        )));
    }

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input)
        .with_context(|| format!("Failed to list {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && (has_extension(path, "json") || has_extension(path, "dcm")))
        .filter(|path| {
            suffix.is_empty()
                || !path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| stem.ends_with(suffix))
        })
        .collect();
    inputs.sort();

    Ok(inputs
        .into_iter()
        .map(|path| Job {
            output: output.join(output_name(&path, suffix)),
            input: path,
        })
        .collect())
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Codecs of one batch, picked per file
struct Codecs {
    json: JsonCodec,
    part10: Part10Codec,
}

impl Codecs {
    fn for_path(&self, path: &Path) -> &dyn DatasetCodec {
        if has_extension(path, "json") {
            &self.json
        } else {
            &self.part10
        }
    }
}

/// `study.json` with suffix `.deid` becomes `study.deid.json`
fn output_name(input: &Path, suffix: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    }
}

fn process_file(
    deidentifier: &mut DeIdentifier,
    codec: &dyn DatasetCodec,
    audit: &AuditLogger,
    version: &str,
    job: &Job,
) -> Result<RecordOutcome> {
    let file = fs::File::open(&job.input)
        .with_context(|| format!("Failed to open {}", job.input.display()))?;
    let mut reader = BufReader::new(file);
    let mut record = codec
        .read_record(&mut reader)
        .with_context(|| job.input.display().to_string())?;
    tracing::debug!(input = %job.input.display(), codec = codec.name(), "Read record");

    let sop_class_uid = record.dataset.sop_class_uid();
    let sop_instance_uid = record.dataset.sop_instance_uid();

    match deidentifier.deidentify_with_report(&mut record.dataset) {
        Ok(report) => {
            let mut buffer = Vec::new();
            codec
                .write_record(&record, &mut buffer)
                .with_context(|| job.output.display().to_string())?;
            fs::write(&job.output, buffer)
                .with_context(|| format!("Failed to write {}", job.output.display()))?;

            audit
                .log_processed(version, sop_instance_uid.as_deref(), &report)
                .map_err(|e| DeidError::Io(e.to_string()))?;
            Ok(RecordOutcome::Processed)
        }
        Err(DeidError::Rejected { justification }) => {
            audit
                .log_rejected(
                    version,
                    sop_class_uid.as_deref(),
                    sop_instance_uid.as_deref(),
                    &justification,
                )
                .map_err(|e| DeidError::Io(e.to_string()))?;
            Ok(RecordOutcome::Rejected(justification))
        }
        Err(e) => Err::<RecordOutcome, _>(e).context(job.input.display().to_string()),
    }
}
