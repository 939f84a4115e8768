#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rankcentral::report::{build_report, render_report_markdown, to_csv, to_report_object};
use rankcentral::{
    load_config_from_path, CriterionRegistry, EvaluationConfig, JudgementInput,
    PairwiseResultStore, ReportArtifact, ReportOptions,
};

#[derive(Parser)]
#[command(name = "rankcentral", version, about = "Pairwise comparison report CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report from judgements and write one format
    Report {
        /// Evaluation config JSON
        #[arg(long)]
        config: PathBuf,
        /// Judgement array JSON
        #[arg(long)]
        judgements: PathBuf,
        /// Stored artifacts JSON (object of name -> text)
        #[arg(long)]
        artifacts: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Reject the report if any judgement has an issue
        #[arg(long)]
        strict: bool,
    },
    /// Write the JSON report and the CSV export from the same pass
    Export {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        judgements: PathBuf,
        #[arg(long)]
        artifacts: Option<PathBuf>,
        #[arg(long)]
        json_out: PathBuf,
        #[arg(long)]
        csv_out: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    /// Print the canonical criterion labels for a config
    Criteria {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Md,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            config,
            judgements,
            artifacts,
            out,
            format,
            name,
            owner,
            strict,
        } => {
            let mut opts = ReportOptions::from_env();
            opts.name = name;
            opts.owner = owner;
            if strict {
                opts = opts.strict();
            }
            let report = run_pass(&config, &judgements, artifacts.as_deref(), &opts)?;
            match format {
                OutputFormat::Json => write_json(&out, &to_report_object(&report))?,
                OutputFormat::Csv => std::fs::write(&out, to_csv(&report))?,
                OutputFormat::Md => std::fs::write(&out, render_report_markdown(&report))?,
            }
            info!(out = %out.display(), format = ?format, "report written");
        }
        Commands::Export {
            config,
            judgements,
            artifacts,
            json_out,
            csv_out,
            strict,
        } => {
            let mut opts = ReportOptions::from_env();
            if strict {
                opts = opts.strict();
            }
            let report = run_pass(&config, &judgements, artifacts.as_deref(), &opts)?;
            write_json(&json_out, &to_report_object(&report))?;
            std::fs::write(&csv_out, to_csv(&report))?;
            info!(
                json = %json_out.display(),
                csv = %csv_out.display(),
                rows = report.judgements.len(),
                "export written"
            );
        }
        Commands::Criteria { config } => {
            let config = load_config_from_path(config)?;
            for label in CriterionRegistry::new(&config).labels() {
                println!("{label}");
            }
        }
    }

    Ok(())
}

fn run_pass(
    config: &Path,
    judgements: &Path,
    artifacts: Option<&Path>,
    opts: &ReportOptions,
) -> Result<ReportArtifact, Box<dyn std::error::Error>> {
    let config: EvaluationConfig = load_config_from_path(config)?;
    let inputs: Vec<JudgementInput> = read_json(judgements)?;
    let artifacts: BTreeMap<String, String> = match artifacts {
        Some(path) => read_json(path)?,
        None => BTreeMap::new(),
    };
    let store: PairwiseResultStore = inputs.into_iter().collect();
    let report = build_report(&config, &store, &artifacts, opts)?;
    if !report.issues.is_empty() {
        tracing::warn!(issues = report.issues.len(), "report built with judgement issues");
    }
    Ok(report)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    std::fs::write(path, json)
}
