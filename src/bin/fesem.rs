use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use fesem::implied::evaluate;
use fesem::logging::{init_tracing, pass_span};
use fesem::model_file::read_model_file;
use fesem::models::build_variant;
use fesem::report::{ReportConfig, render_report};
use fesem::spec::ModelSpec;
use fesem::types::{CellIndex, OutputFormat, Variant};

#[derive(Parser)]
#[command(name = "fesem")]
#[command(about = "Symbolic check of FE-SEM model-implied moments", long_about = None)]
struct Cli {
    /// Render LaTeX (`$...$`) instead of plain text.
    #[arg(long, global = true)]
    latex: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone, Default)]
struct PassArgs {
    /// Expand the implied mean (and full covariance, if printed).
    #[arg(long)]
    expand: bool,
    /// Print the whole implied covariance matrix.
    #[arg(long)]
    full_covariance: bool,
    /// Covariance cell to print expanded, as `row,col` (zero-based).
    #[arg(long = "cell", value_parser = parse_cell)]
    cells: Vec<CellIndex>,
}

#[derive(Subcommand)]
enum Command {
    /// Both variants, in the order of the article.
    All,
    /// FE-SEM with observed covariates.
    Basic(PassArgs),
    /// FE-SEM with latent covariates.
    Extended(PassArgs),
    /// A model described in a model file.
    File {
        path: PathBuf,
        #[command(flatten)]
        pass: PassArgs,
    },
}

fn parse_cell(s: &str) -> Result<CellIndex, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col`, got `{s}`"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid row `{row}`: {e}"))?;
    let col = col
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid column `{col}`: {e}"))?;
    Ok((row, col))
}

fn config_for(variant: Option<Variant>, pass: PassArgs, format: OutputFormat) -> ReportConfig {
    let mut config = match variant {
        Some(v) if !pass.full_covariance && pass.cells.is_empty() => {
            ReportConfig::for_variant(v, format)
        }
        _ => ReportConfig {
            format,
            full_covariance: pass.full_covariance,
            cells: pass.cells,
            ..Default::default()
        },
    };
    config.expand = pass.expand;
    config
}

fn run_pass(spec: &ModelSpec, config: &ReportConfig) -> anyhow::Result<()> {
    let _span = pass_span(&spec.name).entered();
    let moments = evaluate(spec).with_context(|| format!("evaluate {}", spec.name))?;
    let report = render_report(spec, &moments, config).context("render report")?;
    print!("{report}");
    info!(cells = config.cells.len(), "pass finished");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = if cli.latex {
        OutputFormat::Latex
    } else {
        OutputFormat::Plain
    };

    match cli.command {
        Command::All => {
            for (i, variant) in [Variant::Basic, Variant::Extended].into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                let spec = build_variant(variant)
                    .with_context(|| format!("build {}", variant.name()))?;
                run_pass(&spec, &ReportConfig::for_variant(variant, format))?;
            }
        }
        Command::Basic(pass) => {
            let spec = build_variant(Variant::Basic).context("build basic model")?;
            run_pass(&spec, &config_for(Some(Variant::Basic), pass, format))?;
        }
        Command::Extended(pass) => {
            let spec = build_variant(Variant::Extended).context("build extended model")?;
            run_pass(&spec, &config_for(Some(Variant::Extended), pass, format))?;
        }
        Command::File { path, pass } => {
            let spec = read_model_file(&path)
                .with_context(|| format!("read model file {}", path.display()))?;
            run_pass(&spec, &config_for(None, pass, format))?;
        }
    }

    Ok(())
}
