use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use modex::{cli, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modex")]
#[command(about = "Exchange Excel named ranges with SedaroML documents.")]
#[command(long_about = "ModEx - Excel ⇄ SedaroML exchange

Every defined name in a workbook becomes a block in a SedaroML JSON
document. Edit the document (or let another tool do it) and reconcile the
values back into the workbook.

COMMANDS:
  extract     - Excel defined names → SedaroML JSON
  apply       - Write every named value back into the workbook
  apply-diff  - Write only the blocks listed in a diff
  diff        - Compare two SedaroML documents
  watch       - Re-extract whenever the workbook is saved

EXAMPLES:
  modex extract model.xlsx                      # writes model.xlsx.json
  modex apply model.xlsx.json model.xlsx
  modex apply-diff model.xlsx.json model.xlsx --diff '{\"updated_blocks\":[\"Total\"]}'
  modex diff before.json after.json")]
#[command(version)]
struct Cli {
    /// Log level or filter directive (e.g. debug, modex=trace)
    #[arg(long, global = true, env = "MODEX_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Convert a workbook's defined names into a SedaroML document.

Single cells become ScalarName blocks, single rows or columns become
VectorName blocks, and larger areas become MatrixName blocks. Each sheet
that owns a name gets a Sheet block.

Whole-row or whole-column names ($A:$A, $1:$1) are skipped with a warning.

EXAMPLE:
  modex extract model.xlsx model.json")]
    /// Excel defined names → SedaroML JSON
    Extract {
        /// Path to Excel file (.xlsx)
        workbook: PathBuf,

        /// Output JSON path (default: <WORKBOOK>.json)
        output: Option<PathBuf>,

        /// List extracted blocks
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Write every named value of a SedaroML document into a workbook.

Each ScalarName, VectorName and MatrixName block is written to the range it
was extracted from. Blocks are never added or removed.

Only cells whose value changes are written, in place. The file is left
alone if nothing changed or if any block fails to write. Formatting,
formulas elsewhere and defined names are kept.")]
    /// Write every named value back into the workbook
    Apply {
        /// SedaroML document
        model: PathBuf,

        /// Excel file to update
        workbook: PathBuf,

        /// Show the blocks being written
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Write only the blocks listed in a diff payload.

The payload is JSON with an `updated_blocks` field: either a list of block
ids or the map produced by `modex diff`. Values come from MODEL, not from
the payload. Sheet blocks and `root` are skipped.")]
    /// Write only the blocks listed in a diff
    #[command(group(ArgGroup::new("payload").required(true).args(["diff", "diff_file"])))]
    ApplyDiff {
        /// Baseline SedaroML document
        model: PathBuf,

        /// Excel file to update
        workbook: PathBuf,

        /// Diff payload as a JSON string
        #[arg(long)]
        diff: Option<String>,

        /// Read the diff payload from a file
        #[arg(long)]
        diff_file: Option<PathBuf>,

        /// Print the payload
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare two SedaroML documents
    Diff {
        /// Original document
        old: PathBuf,

        /// Updated document
        new: PathBuf,

        /// Write the diff to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    #[command(long_about = "Watch a workbook and re-extract on every save.

Press Ctrl+C to stop watching.")]
    /// Re-extract whenever the workbook is saved
    Watch {
        /// Path to Excel file (.xlsx)
        workbook: PathBuf,

        /// Output JSON path (default: <WORKBOOK>.json)
        output: Option<PathBuf>,

        /// Show extracted blocks after each run
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Extract {
            workbook,
            output,
            verbose,
        } => cli::extract(workbook.clone(), output, verbose)
            .with_context(|| format!("Failed to extract {}", workbook.display())),

        Commands::Apply {
            model,
            workbook,
            verbose,
        } => cli::apply(model, workbook.clone(), verbose)
            .with_context(|| format!("Failed to reconcile into {}", workbook.display())),

        Commands::ApplyDiff {
            model,
            workbook,
            diff,
            diff_file,
            verbose,
        } => cli::apply_diff(model, workbook.clone(), diff, diff_file, verbose)
            .with_context(|| format!("Failed to reconcile diff into {}", workbook.display())),

        Commands::Diff { old, new, output } => {
            cli::diff(old, new, output).context("Failed to diff documents")
        }

        Commands::Watch {
            workbook,
            output,
            verbose,
        } => cli::watch(workbook.clone(), output, verbose)
            .with_context(|| format!("Failed to watch {}", workbook.display())),
    }
}
