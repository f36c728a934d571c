//! CLI entrypoint for citeguard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use citeguard_application::{
    AgentInvoker, AuditLogger, JobOrchestrator, NoProgress, PipelineParams, PipelineProgress,
    analyze_runs,
};
use citeguard_domain::{CheckId, ConsistencyAnalyzer, JobStatus, OutputFormat};
use citeguard_infrastructure::{
    CitationInput, ConfigLoader, FileConfig, HttpAgentGateway, InMemoryValidationStore,
    JsonlAuditLogger, RunSnapshot,
};
use citeguard_presentation::{
    Cli, Command, ConsoleFormatter, JsonFormatter, OutputFormatter, ProgressReporter,
    SimpleProgress, ValidationOutcome,
};
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    if !config.output.use_color() {
        colored::control::set_override(false);
    }
    let format = config.output.resolve_format(cli.format.map(Into::into));

    match cli.command {
        Some(Command::Validate {
            input,
            check_id,
            out,
        }) => {
            let options = ValidateOptions {
                input,
                check_id: check_id.map(CheckId::new),
                out,
                format,
                quiet: cli.quiet,
            };
            validate(&config, options).await
        }
        Some(Command::Consistency { runs }) => consistency(&runs, format),
        None => {
            Cli::command().print_help()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `-v` raises the level; `RUST_LOG` wins when set. With `--log-file`
/// logs go to the file instead of stderr.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::summary()),
        OutputFormat::Full => Box::new(ConsoleFormatter::full()),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

struct ValidateOptions {
    input: PathBuf,
    check_id: Option<CheckId>,
    out: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
}

async fn validate(config: &FileConfig, options: ValidateOptions) -> Result<ExitCode> {
    let (params, warnings) = config.to_pipeline_params()?;
    for issue in &warnings {
        warn!("{}", issue);
    }

    let fallback_id = options
        .input
        .file_stem()
        .map(|stem| CheckId::new(stem.to_string_lossy()))
        .unwrap_or_else(|| CheckId::new("document"));
    let check = CitationInput::read(&options.input)?.into_check(options.check_id, fallback_id);
    let check_id = check.id.clone();

    let Some(api_key) = config.gateway.api_key() else {
        bail!(
            "no API key: set {} in the environment",
            config.gateway.api_key_env
        );
    };

    // === Dependency Injection ===
    let gateway = Arc::new(HttpAgentGateway::new(config.gateway.to_settings(api_key))?);
    info!(endpoint = gateway.endpoint(), "Gateway ready");

    let audit: Option<Arc<dyn AuditLogger>> = match &config.logging.audit_log {
        Some(path) => {
            let logger = JsonlAuditLogger::open(path, check_id.as_str())
                .with_context(|| format!("failed to open audit log {}", path.display()))?;
            info!(path = %logger.path().display(), "Audit log enabled");
            let logger: Arc<dyn AuditLogger> = Arc::new(logger);
            Some(logger)
        }
        None => None,
    };

    let progress: Arc<dyn PipelineProgress> = if options.quiet {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let (orchestrator, store) = build_orchestrator(gateway, params, audit, progress);

    let creation = orchestrator.submit_check(check).await?;
    let summary = orchestrator.run_until_drained().await?;
    info!(
        batches = summary.batches,
        items = summary.items,
        escalated = summary.escalated,
        requeued = summary.requeued,
        "Queue drained"
    );

    let job_id = creation.job.id;
    let progress = orchestrator.job_progress(&job_id).await?;
    let failure = orchestrator.failure_report(&job_id).await?;
    let check = orchestrator.check(&check_id).await?;

    let output = formatter(options.format).format_outcome(&ValidationOutcome {
        check: &check,
        progress,
        failure: failure.as_ref(),
    });
    println!("{}", output);

    if let Some(path) = &options.out {
        store.snapshot(&check_id).await?.write(path)?;
        info!(path = %path.display(), "Run snapshot written");
    }

    if !job_succeeded(progress.status) {
        warn!(status = %progress.status, "Job did not complete");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Only a completed job is a success; a job still processing is not.
fn job_succeeded(status: JobStatus) -> bool {
    status == JobStatus::Completed
}

type Orchestrator = JobOrchestrator<HttpAgentGateway, InMemoryValidationStore>;

fn build_orchestrator(
    gateway: Arc<HttpAgentGateway>,
    params: PipelineParams,
    audit: Option<Arc<dyn AuditLogger>>,
    progress: Arc<dyn PipelineProgress>,
) -> (Orchestrator, Arc<InMemoryValidationStore>) {
    let mut invoker = AgentInvoker::new(gateway, params.retry, params.call_timeout);
    if let Some(audit) = &audit {
        invoker = invoker.with_audit(audit.clone());
    }

    let store = Arc::new(InMemoryValidationStore::new());
    let mut orchestrator =
        JobOrchestrator::new(Arc::new(invoker), store.clone(), params).with_progress(progress);
    if let Some(audit) = audit {
        orchestrator = orchestrator.with_audit(audit);
    }
    (orchestrator, store)
}

fn consistency(runs: &[PathBuf], format: OutputFormat) -> Result<ExitCode> {
    let mut checks = Vec::with_capacity(runs.len());
    for path in runs {
        let snapshot = RunSnapshot::read(path)?;
        info!(path = %path.display(), check = %snapshot.check.id, "Loaded run");
        checks.push(snapshot.check);
    }

    let report = analyze_runs(&ConsistencyAnalyzer::new(), checks)?;
    println!("{}", formatter(format).format_consistency(&report));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_jobs_succeed() {
        assert!(job_succeeded(JobStatus::Completed));
        assert!(!job_succeeded(JobStatus::Failed));
        assert!(!job_succeeded(JobStatus::Processing));
        assert!(!job_succeeded(JobStatus::Pending));
    }
}
