//! Bilan CLI
//!
//! Reads normalized ledger entries as JSON and writes the balance sheet as JSON.
//!
//! ```text
//! bilan entries.json --rules config/rules.toml --pretty --strict
//! cat entries.json | bilan
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bilan_core::{BalanceSheetService, LedgerEntry, RuleSet};
use bilan_shared::config::LogFormat;
use bilan_shared::{AppConfig, AppError, AppResult};

/// Exit code of `--strict` runs on an unbalanced sheet.
const UNBALANCED_EXIT_CODE: u8 = 2;

/// Bilan CLI
#[derive(Parser)]
#[command(name = "bilan")]
#[command(about = "Generate a French balance sheet from ledger entries", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON entry file; reads stdin when omitted
    input: Option<PathBuf>,

    /// TOML or JSON classification rules, replacing the built-in PCG tables
    #[arg(short, long, env = "BILAN_RULES")]
    rules: Option<PathBuf>,

    /// Near-zero balance threshold
    #[arg(long)]
    epsilon: Option<Decimal>,

    /// Equilibrium tolerance
    #[arg(long)]
    tolerance: Option<Decimal>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Exit with status 2 when the sheet is not balanced
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let err = AppError::from(err);
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };
    init_tracing(&config);

    match run(&cli, &config) {
        Ok(code) => code,
        Err(err) => {
            let code = err.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            error!(error = %format!("{err:#}"), "Balance sheet generation failed");
            eprintln!("{err:#}");
            ExitCode::from(code)
        }
    }
}

/// Initializes tracing on stderr; stdout carries the JSON result.
fn init_tracing(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log.filter.clone().into());

    match config.log.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<ExitCode> {
    let rules_path = cli.rules.as_deref().or(config.rules.path.as_deref());
    let rules = match rules_path {
        Some(path) => load_rules(path)?,
        None => RuleSet::default(),
    }
    .with_thresholds(
        cli.epsilon.or(config.rules.epsilon),
        cli.tolerance.or(config.rules.tolerance),
    );

    let service = BalanceSheetService::new(rules)
        .map_err(|err| AppError::InvalidRules(err.to_string()))?
        .with_parallel_threshold(config.pipeline.parallel_threshold);

    let text = read_input(cli.input.as_deref())?;
    let entries = parse_entries(&text)?;
    info!(
        entries = entries.as_ref().map_or(0, Vec::len),
        "Ledger entries loaded"
    );

    let sheet = service.generate(entries.as_deref());
    let output = if cli.pretty {
        serde_json::to_string_pretty(&sheet)
    } else {
        serde_json::to_string(&sheet)
    }
    .map_err(|err| AppError::Internal(err.to_string()))?;
    println!("{output}");

    let unbalanced = sheet
        .as_ref()
        .is_some_and(|sheet| !sheet.validation.is_balanced);
    if cli.strict && unbalanced {
        return Ok(ExitCode::from(UNBALANCED_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(AppError::from)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Parses an entry list. `null` and blank input mean "no entries".
fn parse_entries(text: &str) -> AppResult<Option<Vec<LedgerEntry>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map_err(|err| AppError::InvalidInput(err.to_string()))
}

fn load_rules(path: &Path) -> anyhow::Result<RuleSet> {
    let text = std::fs::read_to_string(path)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to read rules {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let rules = parse_rules(&text, is_toml)
        .with_context(|| format!("Failed to load rules {}", path.display()))?;
    info!(path = %path.display(), "Classification rules loaded");
    Ok(rules)
}

fn parse_rules(text: &str, is_toml: bool) -> AppResult<RuleSet> {
    let rules = if is_toml {
        RuleSet::from_toml_str(text)
    } else {
        RuleSet::from_json_str(text)
    };
    rules.map_err(|err| AppError::InvalidRules(err.to_string()))
}
