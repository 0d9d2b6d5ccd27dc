use crate::convert::{excel_to_sedaroml, reconcile_diff_to_excel, sedaroml_to_excel};
use crate::error::{ModexError, ModexResult};
use crate::model::{read_document, Category, Document};
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Debounce window for workbook saves in watch mode
const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Default SedaroML path for a workbook: `model.xlsx` → `model.xlsx.json`
pub fn default_output(workbook: &Path) -> PathBuf {
    let mut name = workbook.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

fn print_summary(document: &Document) {
    println!("   Sheets: {}", document.index.get("Sheet").map_or(0, Vec::len));
    for category in Category::NAMES {
        let ids = document.index.get(category.as_str()).cloned().unwrap_or_default();
        println!("   {}: {}", category.as_str(), ids.len());
        for id in ids {
            println!("      {}", id.bright_blue());
        }
    }
}

/// Execute the extract command
pub fn extract(input: PathBuf, output: Option<PathBuf>, verbose: bool) -> ModexResult<()> {
    let output = output.unwrap_or_else(|| default_output(&input));
    println!("{}", "📖 ModEx - Excel → SedaroML".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let document = excel_to_sedaroml(&input, &output)?;

    if verbose {
        print_summary(&document);
        println!();
    }

    println!("{}", "✅ Extraction complete".bold().green());
    println!("   {} blocks written\n", document.blocks.len());
    Ok(())
}

/// Execute the apply command
pub fn apply(model: PathBuf, workbook: PathBuf, verbose: bool) -> ModexResult<()> {
    println!("{}", "💾 ModEx - SedaroML → Excel".bold().green());
    println!("   Model:    {}", model.display());
    println!("   Workbook: {}\n", workbook.display());

    if verbose {
        print_summary(&read_document(&model)?);
        println!();
    }

    let written = sedaroml_to_excel(&model, &workbook)?;

    println!("{}", "✅ Reconciliation complete".bold().green());
    println!("   {} names written\n", written);
    Ok(())
}

/// Execute the apply-diff command
pub fn apply_diff(
    model: PathBuf,
    workbook: PathBuf,
    diff: Option<String>,
    diff_file: Option<PathBuf>,
    verbose: bool,
) -> ModexResult<()> {
    let diff_str = match (diff, diff_file) {
        (Some(diff), None) => diff,
        (None, Some(path)) => fs::read_to_string(&path)?,
        _ => {
            return Err(ModexError::InvalidDiff(
                "provide exactly one of --diff or --diff-file".to_string(),
            ))
        }
    };

    println!("{}", "💾 ModEx - SedaroML diff → Excel".bold().green());
    println!("   Model:    {}", model.display());
    println!("   Workbook: {}\n", workbook.display());

    if verbose {
        println!("   Diff: {}\n", diff_str.trim().cyan());
    }

    let written = reconcile_diff_to_excel(&model, &diff_str, &workbook)?;

    println!("{}", "✅ Reconciliation complete".bold().green());
    println!("   {} names written\n", written);
    Ok(())
}

/// Execute the diff command
pub fn diff(old: PathBuf, new: PathBuf, output: Option<PathBuf>) -> ModexResult<()> {
    let old_document = read_document(&old)?;
    let new_document = read_document(&new)?;
    let model_diff = old_document.diff(&new_document)?;
    let json = serde_json::to_string_pretty(&model_diff)?;

    match output {
        Some(path) => {
            fs::write(&path, &json)?;
            if model_diff.is_empty() {
                println!("{}", "✅ No differences".bold().green());
            } else {
                println!(
                    "{} {} updated, {} added, {} removed",
                    "📋 Diff written:".bold().yellow(),
                    model_diff.updated_blocks.len(),
                    model_diff.added_blocks.len(),
                    model_diff.removed_blocks.len()
                );
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Execute the watch command
pub fn watch(workbook: PathBuf, output: Option<PathBuf>, verbose: bool) -> ModexResult<()> {
    let output = output.unwrap_or_else(|| default_output(&workbook));
    println!("{}", "👁️  ModEx - Watch Mode".bold().green());
    println!("   Watching: {}", workbook.display());
    println!("   Output:   {}", output.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !workbook.exists() {
        return Err(ModexError::Watch(format!(
            "File not found: {}",
            workbook.display()
        )));
    }

    let canonical_path = workbook.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| ModexError::Watch("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(WATCH_DEBOUNCE, tx)
        .map_err(|e| ModexError::Watch(format!("Failed to create file watcher: {}", e)))?;

    // Excel replaces the file on save, so watch the directory
    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| ModexError::Watch(format!("Failed to watch directory: {}", e)))?;

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_action(&canonical_path, &output, verbose);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && event.path.file_name() == canonical_path.file_name()
                });
                if relevant {
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        chrono::Local::now().format("%H:%M:%S").to_string().cyan()
                    );
                    run_watch_action(&canonical_path, &output, verbose);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// Re-extract after a change; failures are reported and watching continues
fn run_watch_action(workbook: &Path, output: &Path, verbose: bool) {
    match excel_to_sedaroml(workbook, output) {
        Ok(document) => {
            if verbose {
                print_summary(&document);
            }
            println!(
                "{} ({} blocks)",
                "✅ Extraction complete".bold().green(),
                document.blocks.len()
            );
        }
        Err(e) => println!("{} {}", "❌ Extraction failed:".bold().red(), e),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
