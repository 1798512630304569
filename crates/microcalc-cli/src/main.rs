//! microcalc CLI - compute report fields from a data file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use microcalc::prelude::*;
use microcalc::open_table;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "microcalc")]
#[command(author, version, about = "Compute report fields from tabular accounting data")]
struct Cli {
    /// Log parse and evaluation details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every field of a fields document and write the results as JSON
    Compute {
        /// Fields document (JSON)
        fields: PathBuf,

        /// Data file (csv)
        data: PathBuf,

        /// Output file (default: <fields>_output.<ext> next to the fields file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        formula: FormulaArgs,
    },

    /// Evaluate one micro-formula against a data file
    Eval {
        /// Data file (csv)
        data: PathBuf,

        /// Formula to evaluate, e.g. "sold_debit@401 - sold_credit@401"
        formula: String,

        /// Column holding the row keys
        #[arg(short, long)]
        key_column: String,

        /// Count empty cells as zero
        #[arg(long)]
        flexi: bool,

        #[command(flatten)]
        formula_args: FormulaArgs,
    },
}

#[derive(clap::Args)]
struct FormulaArgs {
    /// Separator between column name and row key in references
    #[arg(long, default_value = "@")]
    separator: char,

    /// Extra characters allowed inside references
    #[arg(long, default_value = "._")]
    extra_chars: String,

    /// Maximum nesting depth of a formula
    #[arg(long, default_value = "256")]
    max_depth: usize,
}

impl FormulaArgs {
    fn config(&self) -> MicroConfig {
        MicroConfig::default()
            .with_separator(self.separator)
            .with_extra_chars(self.extra_chars.as_str())
            .with_max_depth(self.max_depth)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Compute {
            fields,
            data,
            output,
            formula,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&fields));
            compute(&fields, &data, &output, &formula)
        }
        Commands::Eval {
            data,
            formula,
            key_column,
            flexi,
            formula_args,
        } => eval(&data, &formula, &key_column, flexi, &formula_args),
    }
}

/// `<dir>/<stem>_output.<ext>` for a fields file `<dir>/<stem>.<ext>`
fn default_output_path(fields: &Path) -> PathBuf {
    let stem = fields
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match fields.extension() {
        Some(ext) => format!("{}_output.{}", stem, ext.to_string_lossy()),
        None => format!("{}_output", stem),
    };
    fields.with_file_name(name)
}

fn compute(fields: &Path, data: &Path, output: &Path, args: &FormulaArgs) -> Result<()> {
    let options = BatchOptions {
        micro: args.config(),
        ..Default::default()
    };

    let outcomes = compute_fields(fields, data, &options);

    let file = File::create(output)
        .with_context(|| format!("Failed to create '{}'", output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &outcomes).context("Failed to serialize results")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    match outcomes.as_slice() {
        [FieldOutcome::Global { global_error }] => {
            eprintln!("Error: {}", global_error);
        }
        _ => {
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o, FieldOutcome::Field { error: Some(_), .. }))
                .count();
            eprintln!(
                "Computed {} fields ({} with errors)",
                outcomes.len() - failed,
                failed
            );
        }
    }
    eprintln!("Wrote results to '{}'", output.display());

    Ok(())
}

fn eval(data: &Path, formula: &str, key_column: &str, flexi: bool, args: &FormulaArgs) -> Result<()> {
    let config = args.config().with_strict(!flexi);

    let table = open_table(data, &CsvReadOptions::default())
        .with_context(|| format!("Failed to open '{}'", data.display()))?;

    if log::log_enabled!(log::Level::Debug) {
        if let Ok(ast) = parse_formula(formula, &config) {
            log::debug!("Parsed as {}", ast);
            log::debug!("References: {:?}", ast.references());
        }
    }

    let outcome = compute_micro(&table, key_column, formula, &config);
    let result = serde_json::json!({
        "value": outcome.value,
        "error": outcome.error,
    });

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", result)?;

    Ok(())
}
