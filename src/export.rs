//! The export pipeline: locate the store, fetch and reshape records, write
//! the output artifacts.

use crate::extract::{self, ContextRecord, ConversationRecord};
use crate::render;
use crate::store;
use chrono::Local;
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FULL_EXPORT_FILE: &str = "all_conversations.json";
pub const SUMMARY_FILE: &str = "conversations_summary.md";
pub const CONTEXT_EXPORT_FILE: &str = "message_contexts.json";

/// Everything the pipeline needs to run.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone)]
pub struct ExportConfig {
    pub db_path: PathBuf,
    pub backup_db_path: PathBuf,
    pub output_dir: PathBuf,
    pub quiet: bool,
}

/// Run the whole export. The store is opened read-only and released when this
/// returns; output files are overwritten if they already exist.
///
/// A record that fails to decode is skipped with a diagnostic on stderr and
/// never aborts the run. Filesystem write failures are fatal.
pub fn run(config: &ExportConfig) -> Result<()> {
    let store_path = store::locate_store(&config.db_path, &config.backup_db_path)?;
    if !config.quiet {
        println!("Extracting from: {}", store_path.display());
    }

    let conn = store::open_store(&store_path)?;

    let rows = store::fetch_conversations(&conn)?;
    if !config.quiet {
        println!("Found {} conversations", rows.len());
    }

    let mut conversations: Vec<ConversationRecord> = Vec::with_capacity(rows.len());
    for (key, raw_value) in &rows {
        match extract::reshape_conversation(key, raw_value) {
            Ok(record) => conversations.push(record),
            Err(e) if e.is_parse_error() => {
                eprintln!("Error parsing JSON for {key}: {e}");
            }
            Err(e) => {
                eprintln!("Error processing {key}: {e}");
            }
        }
    }

    fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let full_export = config.output_dir.join(FULL_EXPORT_FILE);
    write_json(&full_export, &conversations)?;
    if !config.quiet {
        println!("Saved full data to: {}", full_export.display());
    }

    let summary_path = config.output_dir.join(SUMMARY_FILE);
    write_summary(&summary_path, &conversations)?;
    if !config.quiet {
        println!("Saved summary to: {}", summary_path.display());
    }

    let context_rows = store::fetch_contexts(&conn)?;
    if !context_rows.is_empty() {
        if !config.quiet {
            println!("Found {} message request contexts", context_rows.len());
        }
        let contexts: Vec<ContextRecord> = context_rows
            .iter()
            .filter_map(|(key, raw_value)| extract::decode_context(key, raw_value))
            .collect();

        let context_export = config.output_dir.join(CONTEXT_EXPORT_FILE);
        write_json(&context_export, &contexts)?;
        if !config.quiet {
            println!("Saved message contexts to: {}", context_export.display());
        }
    }

    if !config.quiet {
        println!(
            "\nExtraction complete! Files saved to: {}",
            config.output_dir.display()
        );
    }

    Ok(())
}

/// Pretty-printed JSON, 2-space indentation, non-ASCII preserved literally.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("Failed to serialize export")?;
    fs::write(path, json).wrap_err_with(|| format!("Failed to write: {}", path.display()))
}

fn write_summary(path: &Path, conversations: &[ConversationRecord]) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    render::write_summary(&mut writer, conversations, Local::now())
        .wrap_err("Failed to write summary markdown")?;
    writer.flush().wrap_err("Failed to flush summary markdown")
}
