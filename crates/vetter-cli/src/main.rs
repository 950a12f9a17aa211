//! Command-line interface for vetter.
//!
//! Evaluates a batch of candidates against a requirement set and prints
//! the ranked reports. Evidence comes from a pre-fetched evidence file,
//! so runs are reproducible and need no network access.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vetter_core::{Candidate, EvidenceBundle, RequirementSet, WeightConfig};
use vetter_runtime::{
    CandidateReport, EvaluationOutcome, EvidenceProvider, Orchestrator, ProviderError,
    ProviderRegistry, RuntimeConfig,
};

#[derive(Parser)]
#[command(name = "vetter", version, about = "Candidate evaluation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate candidates against a requirement set.
    Evaluate {
        /// Requirement set (JSON).
        #[arg(long, short = 'r')]
        requirements: PathBuf,

        /// Candidate list (JSON array).
        #[arg(long, short = 'c')]
        candidates: PathBuf,

        /// Pre-fetched evidence records (JSON array of
        /// {candidate_id, bundle}).
        #[arg(long, short = 'e')]
        evidence: Option<PathBuf>,

        /// Weight overrides (YAML).
        #[arg(long, short = 'w')]
        weights: Option<PathBuf>,

        /// Candidates evaluated concurrently.
        #[arg(long, default_value_t = 10)]
        concurrency: usize,

        /// Per-candidate timeout, e.g. "90s" or "2m".
        #[arg(long, value_parser = humantime_arg)]
        timeout: Option<Duration>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Print the default weight configuration as YAML.
    Weights,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn humantime_arg(s: &str) -> Result<Duration, String> {
    // Accept bare seconds for convenience.
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// One line of a pre-fetched evidence file.
#[derive(serde::Deserialize)]
struct EvidenceRecord {
    candidate_id: String,
    bundle: EvidenceBundle,
}

/// Serves pre-fetched bundles for one source name.
struct FileEvidenceProvider {
    source: String,
    by_candidate: HashMap<String, EvidenceBundle>,
}

#[async_trait]
impl EvidenceProvider for FileEvidenceProvider {
    fn name(&self) -> &str {
        &self.source
    }

    async fn fetch(
        &self,
        candidate: &Candidate,
        _requirements: &RequirementSet,
    ) -> Result<EvidenceBundle, ProviderError> {
        Ok(self
            .by_candidate
            .get(&candidate.id)
            .cloned()
            .unwrap_or_else(|| EvidenceBundle::empty(self.source.clone())))
    }
}

/// Group evidence records into one provider per source name.
fn providers_from_records(records: Vec<EvidenceRecord>) -> ProviderRegistry {
    let mut by_source: HashMap<String, HashMap<String, EvidenceBundle>> = HashMap::new();
    for record in records {
        by_source
            .entry(record.bundle.source.clone())
            .or_default()
            .insert(record.candidate_id, record.bundle);
    }

    let mut sources: Vec<String> = by_source.keys().cloned().collect();
    sources.sort();

    let mut registry = ProviderRegistry::new();
    for source in sources {
        let by_candidate = by_source.remove(&source).unwrap_or_default();
        registry.register(Arc::new(FileEvidenceProvider {
            source,
            by_candidate,
        }));
    }
    registry
}

fn print_summary(reports: &[CandidateReport]) {
    for (rank, report) in reports.iter().enumerate() {
        match &report.outcome {
            EvaluationOutcome::Completed => {
                let verdict = &report.validation;
                println!(
                    "{:>3}. {}  {:.1}%  [{}]  {}",
                    rank + 1,
                    report.candidate_name,
                    verdict.composite * 100.0,
                    verdict.level,
                    verdict.recommendation
                );
            }
            EvaluationOutcome::TimedOut => {
                println!("{:>3}. {}  (timed out)", rank + 1, report.candidate_name);
            }
            EvaluationOutcome::Failed { reason } => {
                println!(
                    "{:>3}. {}  (failed: {})",
                    rank + 1,
                    report.candidate_name,
                    reason
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Weights => {
            let yaml = serde_yaml::to_string(&WeightConfig::default())?;
            print!("{}", yaml);
            Ok(())
        }
        Command::Evaluate {
            requirements,
            candidates,
            evidence,
            weights,
            concurrency,
            timeout,
            output,
        } => {
            let requirements: RequirementSet = serde_json::from_str(
                &std::fs::read_to_string(&requirements)
                    .with_context(|| format!("reading {}", requirements.display()))?,
            )
            .context("parsing requirement set")?;

            let candidates: Vec<Candidate> = serde_json::from_str(
                &std::fs::read_to_string(&candidates)
                    .with_context(|| format!("reading {}", candidates.display()))?,
            )
            .context("parsing candidate list")?;

            let weight_config = match weights {
                Some(path) => WeightConfig::from_yaml_file(&path)
                    .with_context(|| format!("loading weights from {}", path.display()))?,
                None => WeightConfig::default(),
            };

            let registry = match evidence {
                Some(path) => {
                    let records: Vec<EvidenceRecord> = serde_json::from_str(
                        &std::fs::read_to_string(&path)
                            .with_context(|| format!("reading {}", path.display()))?,
                    )
                    .context("parsing evidence file")?;
                    providers_from_records(records)
                }
                None => ProviderRegistry::new(),
            };

            info!(
                requirement = %requirements.id,
                candidates = candidates.len(),
                sources = registry.len(),
                "inputs loaded"
            );

            let mut config = RuntimeConfig::default().with_max_concurrency(concurrency);
            if let Some(timeout) = timeout {
                config = config.with_per_candidate_timeout(timeout);
            }

            let orchestrator = Orchestrator::builder(registry)
                .config(config)
                .weights(weight_config)
                .build();
            let reports = orchestrator.evaluate_batch(&requirements, &candidates).await;

            match output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
                OutputFormat::Summary => print_summary(&reports),
            }
            Ok(())
        }
    }
}
