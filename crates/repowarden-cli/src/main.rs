//! repowarden — repository-governance scanner CLI.
//!
//! Wires the registry, fetcher, planner, scheduler and evaluator into one
//! `scan` run against a forge API, plus a `rules` command for introspecting
//! what is registered.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use repowarden_core::options::parse_assignments;
use repowarden_core::telemetry::init_tracing;
use repowarden_core::{EngineConfig, RepositoryRef, RuleRegistry, RuleStatus, ScanPlanner, Scope};
use repowarden_eval::Evaluator;
use repowarden_fetch::{providers, Fetcher, FetcherBuilder, ReqwestForgeClient};
use repowarden_output::{ConsoleSink, FileSink, OutputFormat, OutputManager, ReportSink, Sink};
use repowarden_scheduler::Scheduler;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "repowarden")]
#[command(author = "repowarden contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repository-governance scanner", long_about = None)]
struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scan against a set of repositories
    Scan(ScanArgs),

    /// List the rules registered in this binary
    Rules,
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Repository to scan, as `owner/name`. Repeatable.
    #[arg(short, long = "target", required = true)]
    targets: Vec<String>,

    /// Comma-separated rule ids to run; omit to run every registered rule
    #[arg(long, default_value = "")]
    rules: String,

    /// Number of repos scanned concurrently
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Forge API base URL
    #[arg(long)]
    base_url: String,

    /// Name of an environment variable holding a bearer token for the forge API
    #[arg(long)]
    token_env: Option<String>,

    /// Rule option assignment, `ruleID.option=value`. Repeatable, comma-separable.
    #[arg(short = 'o', long = "option")]
    options: Vec<String>,

    /// Console output format
    #[arg(long, value_enum, default_value = "text")]
    format: CliOutputFormat,

    /// Only print results with this status on the console. Repeatable.
    #[arg(long = "status")]
    statuses: Vec<CliRuleStatus>,

    /// Also write every result to this file (format inferred from extension
    /// unless overridden by --file-format)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Override the inferred format for --file
    #[arg(long, value_enum)]
    file_format: Option<CliOutputFormat>,

    /// Write a summary report document to this path on completion
    #[arg(long)]
    report: Option<PathBuf>,

    /// Abort the scan after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Keep client-library detail (method/URL) in fetch error messages
    #[arg(long)]
    verbose_errors: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Ndjson,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(value: CliOutputFormat) -> Self {
        match value {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Ndjson => OutputFormat::Ndjson,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliRuleStatus {
    Pass,
    Fail,
    Error,
    Skipped,
}

impl From<CliRuleStatus> for RuleStatus {
    fn from(value: CliRuleStatus) -> Self {
        match value {
            CliRuleStatus::Pass => RuleStatus::Pass,
            CliRuleStatus::Fail => RuleStatus::Fail,
            CliRuleStatus::Error => RuleStatus::Error,
            CliRuleStatus::Skipped => RuleStatus::Skipped,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Scan(args) => run_scan(args).await,
        Commands::Rules => run_rules(),
    }
}

fn run_rules() -> Result<()> {
    let registry = RuleRegistry::new();
    repowarden_rules::register_all(&registry).context("registering built-in rules")?;

    for rule in registry.list() {
        println!("{}\t{}", rule.id(), rule.title());
        if let Some(configurable) = rule.as_configurable() {
            for option in configurable.options() {
                println!("  - {} (default {:?}): {}", option.name, option.default, option.description);
            }
        }
    }
    Ok(())
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let repos = parse_targets(&args.targets)?;

    let registry = RuleRegistry::new();
    repowarden_rules::register_all(&registry).context("registering built-in rules")?;
    apply_rule_options(&registry, &args.options)?;
    let rules = registry.resolve(&args.rules).context("resolving rule selector")?;
    if rules.is_empty() {
        bail!("rule selector {:?} matched no registered rule", args.rules);
    }

    let plan = ScanPlanner::plan(&repos, &rules).context("building scan plan")?;

    let http = build_http_client(args.token_env.as_deref())?;
    let client = Arc::new(ReqwestForgeClient::with_client(args.base_url.clone(), http));

    let mut builder = FetcherBuilder::new(client);
    providers::register_all(&mut builder).context("registering built-in providers")?;
    let fetcher = Arc::new(builder.build());

    seed_repos_in_scan(&fetcher, &repos).await;

    let mut config = EngineConfig::new(args.concurrency).with_verbose_errors(args.verbose_errors);
    if let Some(secs) = args.deadline_secs {
        config = config.with_deadline(std::time::Duration::from_secs(secs));
    }

    let cancel = CancellationToken::new();
    if let Some(deadline) = config.deadline {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            cancel.cancel();
        });
    }

    let sinks = build_sinks(&args).await?;
    let manager = OutputManager::new(sinks);

    let (results_rx, errors_rx) = Scheduler::run(plan.clone(), config.concurrency, cancel, fetcher.clone());

    let outcome = Evaluator::run(results_rx, errors_rx, &plan, &manager, fetcher.as_ref(), config.verbose_errors).await;

    repowarden_core::metrics::METRICS.flush();
    info!(exit_code = outcome.exit_code(), "scan complete");

    std::process::exit(outcome.exit_code());
}

fn parse_targets(raw: &[String]) -> Result<Vec<RepositoryRef>> {
    let mut repos = Vec::with_capacity(raw.len());
    let mut seen = HashSet::new();
    for (index, target) in raw.iter().enumerate() {
        let (owner, name) = target
            .split_once('/')
            .with_context(|| format!("target {target:?} must be \"owner/name\""))?;
        if owner.is_empty() || name.is_empty() {
            bail!("target {target:?} must be \"owner/name\"");
        }
        let full_name = format!("{owner}/{name}");
        if !seen.insert(full_name) {
            continue;
        }
        // Discovery is out of scope; targets are caller-supplied so a
        // sequential, 1-based id is as stable as anything else the CLI
        // could assign (the ScanPlanner only requires non-zero, unique ids).
        repos.push(RepositoryRef::new(owner, name, (index + 1) as u64));
    }
    Ok(repos)
}

fn apply_rule_options(registry: &RuleRegistry, raw: &[String]) -> Result<()> {
    let assignments = parse_assignments(raw).context("parsing --option assignments")?;

    let mut grouped: HashMap<String, HashMap<String, String>> = HashMap::new();
    for assignment in assignments {
        grouped.entry(assignment.rule_id).or_default().insert(assignment.option, assignment.value);
    }

    for (rule_id, values) in grouped {
        let rule = registry
            .list()
            .into_iter()
            .find(|r| r.id() == rule_id)
            .with_context(|| format!("--option references unknown rule {rule_id:?}"))?;
        let configurable = rule
            .as_configurable()
            .with_context(|| format!("rule {rule_id:?} does not accept options"))?;

        let known: HashSet<&str> = configurable.options().iter().map(|o| o.name.as_str()).collect();
        for name in values.keys() {
            if !known.contains(name.as_str()) {
                bail!("rule {rule_id:?} has no option {name:?}");
            }
        }

        configurable.configure(&values)?;
    }
    Ok(())
}

fn build_http_client(token_env: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(env_var) = token_env {
        let token = std::env::var(env_var).with_context(|| format!("reading token from ${env_var}"))?;
        let mut headers = reqwest::header::HeaderMap::new();
        let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
            .context("token is not a valid header value")?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);
        builder = builder.default_headers(headers);
    }
    builder.build().context("building HTTP client")
}

/// Seeds each org's `org.repos_in_scan` so org-scoped providers that need
/// the full repo set for an owner don't issue a redundant API call per repo
/// (`Fetcher::seed`, SPEC_FULL.md §4.4 cross-dependency injection).
async fn seed_repos_in_scan(fetcher: &Fetcher, repos: &[RepositoryRef]) {
    let mut by_owner: HashMap<&str, Vec<&str>> = HashMap::new();
    for repo in repos {
        by_owner.entry(repo.owner.as_str()).or_default().push(repo.name.as_str());
    }
    for (owner, names) in by_owner {
        fetcher
            .seed(
                providers::keys::ORG_REPOS_IN_SCAN,
                Scope::Org,
                owner,
                serde_json::to_value(names).unwrap_or_default(),
            )
            .await;
    }
}

async fn build_sinks(args: &ScanArgs) -> Result<Vec<Box<dyn Sink>>> {
    let status_filter = if args.statuses.is_empty() {
        None
    } else {
        Some(args.statuses.iter().map(|s| RuleStatus::from(*s)).collect::<HashSet<_>>())
    };

    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(ConsoleSink::new(args.format.into(), status_filter.clone()))];

    if let Some(path) = &args.file {
        let file_format = args.file_format.map(OutputFormat::from);
        sinks.push(Box::new(FileSink::open(path, file_format, status_filter.clone()).await?));
    }

    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.context("creating report directory")?;
            }
        }
        let file = tokio::fs::File::create(path).await.context("creating report file")?;
        sinks.push(Box::new(ReportSink::new(file, chrono::Utc::now)));
    }

    Ok(sinks)
}
