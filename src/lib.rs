pub mod case_code;
pub mod column_mapper;
pub mod data_processor;
pub mod date_coercion;
pub mod excel_parser;
pub mod grid;
pub mod history_parser;
pub mod models;
pub mod normalizer;
pub mod table_export;
pub mod workbook_export;

use anyhow::{Context, Result};
use data_processor::{collect_workbooks, merge_workbooks};
use models::{AppConfig, CaseFileRow, HistoryEventRow, ProcessResult};
use std::fs;
use std::path::{Path, PathBuf};
use table_export::{write_case_files, write_history_events, CASE_FILES_CSV, HISTORY_CSV};
use tracing::info;
use workbook_export::{write_workbook, WORKBOOK_FILE};

const CONFIG_FILE: &str = "config.json";

/// Default configuration file path
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expedientes")
        .join(CONFIG_FILE)
}

/// Loads the default configuration, falling back to defaults on any problem.
pub fn load_config() -> AppConfig {
    let config_path = get_config_path();
    if config_path.exists() {
        if let Ok(config) = load_config_from(&config_path) {
            return config;
        }
    }
    AppConfig::default()
}

/// Loads a configuration file.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Saves a configuration file, creating its directory.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to save config: {}", path.display()))?;

    Ok(())
}

/// Installs the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Extracts every workbook named by the config and writes the output tables.
pub fn process_workbooks(config: &AppConfig) -> Result<ProcessResult> {
    let input_path = PathBuf::from(&config.input_path);
    let output_path = PathBuf::from(&config.output_path);

    info!(input = %input_path.display(), "scanning workbooks");
    let files = collect_workbooks(&input_path)?;
    if files.is_empty() {
        anyhow::bail!("No workbooks found in {}", input_path.display());
    }
    info!(count = files.len(), "found workbooks");

    let (extraction, workbooks) = merge_workbooks(&files, &config.skip_sheets);
    info!(
        case_files = extraction.case_files.len(),
        history_events = extraction.history.len(),
        skipped_sheets = extraction.skipped_sheets.len(),
        "extraction finished"
    );

    fs::create_dir_all(&output_path)
        .with_context(|| format!("Failed to create output directory: {}", output_path.display()))?;

    // dates are coerced here, invalid ones export empty
    let case_rows: Vec<CaseFileRow> = extraction.case_files.iter().map(CaseFileRow::from).collect();
    let history_rows: Vec<HistoryEventRow> =
        extraction.history.iter().map(HistoryEventRow::from).collect();

    write_case_files(&output_path.join(CASE_FILES_CSV), &case_rows)?;
    write_history_events(&output_path.join(HISTORY_CSV), &history_rows)?;
    info!(output = %output_path.display(), "wrote {} and {}", CASE_FILES_CSV, HISTORY_CSV);

    if config.export_xlsx {
        let workbook_path = output_path.join(WORKBOOK_FILE);
        write_workbook(&workbook_path, &case_rows, &history_rows)?;
        info!(output = %workbook_path.display(), "wrote workbook");
    }

    Ok(ProcessResult {
        workbooks,
        case_files: case_rows.len(),
        history_events: history_rows.len(),
        skipped_sheets: extraction.skipped_sheets,
        output_path: output_path.to_string_lossy().to_string(),
    })
}
