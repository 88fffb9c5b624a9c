use clap::Parser;
use cursor_chat_export::export::{self, ExportConfig};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Export Cursor AI chat history to JSON and Markdown files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to write the export files.
    /// Defaults to ./chat-history-export if not set in config.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path to Cursor's SQLite DB (state.vscdb).
    /// Auto-detected if omitted.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Path to the backup DB tried when the main one is missing.
    /// Defaults to the main path with ".backup" appended.
    #[arg(long, value_name = "PATH")]
    backup_db: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/cursor-chat-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Suppress progress output (decode diagnostics still go to stderr).
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    output_dir: Option<PathBuf>,
    db_path: Option<PathBuf>,
    backup_db_path: Option<PathBuf>,
}

fn default_db_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Cursor/User/globalStorage/state.vscdb"))
}

fn backup_path_for(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_owned();
    os.push(".backup");
    PathBuf::from(os)
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("cursor-chat-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve output_dir (CLI > Config > Default)
    let output_dir = cli
        .output_dir
        .or(file_cfg.output_dir)
        .unwrap_or_else(|| PathBuf::from("chat-history-export"));

    // 3. Resolve db_path (CLI > Config > Auto-detect)
    let db_path = cli
        .db
        .or(file_cfg.db_path)
        .or_else(default_db_path)
        .ok_or_else(|| {
            eyre!("Could not determine database path.\nUse --db to specify manually, or set db_path in config.toml.")
        })?;

    // 4. Resolve the backup path (CLI > Config > derived from db_path)
    let backup_db_path = cli
        .backup_db
        .or(file_cfg.backup_db_path)
        .unwrap_or_else(|| backup_path_for(&db_path));

    let config = ExportConfig {
        db_path,
        backup_db_path,
        output_dir,
        quiet: cli.quiet,
    };

    export::run(&config)
}
