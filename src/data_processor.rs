use crate::excel_parser::extract_case_file;
use crate::grid::CellGrid;
use crate::history_parser::parse_history;
use crate::models::Extraction;
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Runs the per-sheet extraction over sheets in order, skipping denylisted names.
///
/// Every sheet that is not skipped yields exactly one case file, followed by
/// the history events parsed from the same sheet.
pub fn extract_sheets<G, F>(sheet_names: &[String], skip_sheets: &[String], mut load_sheet: F) -> Extraction
where
    G: CellGrid,
    F: FnMut(&str) -> G,
{
    let mut extraction = Extraction::default();

    for name in sheet_names {
        if skip_sheets.iter().any(|s| s == name) {
            debug!(sheet = %name, "skipping denylisted sheet");
            extraction.skipped_sheets.push(name.clone());
            continue;
        }

        let grid = load_sheet(name);
        let case_file = extract_case_file(&grid, name);
        let history = parse_history(&grid, &case_file.case_code);

        extraction.history.extend(history);
        extraction.case_files.push(case_file);
    }

    extraction
}

/// Opens a workbook and extracts every sheet in stored order.
pub fn extract_workbook(path: &Path, skip_sheets: &[String]) -> Result<Extraction> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    info!(workbook = %path.display(), sheets = sheet_names.len(), "extracting workbook");

    let extraction = extract_sheets(&sheet_names, skip_sheets, |name| {
        match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => {
                // an unreadable sheet still gets its fallback record
                warn!(sheet = name, error = %e, "failed to read sheet, treating it as empty");
                Range::empty()
            }
        }
    });

    Ok(extraction)
}

/// Recursively finds workbook files in a directory, sorted by path.
pub fn scan_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(ext) = path.extension() else {
            continue;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        // Office lock files
        if path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .starts_with("~$")
        {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Resolves the input path to the workbooks it names.
pub fn collect_workbooks(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        scan_workbooks(input)
    } else if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display())
    }
}

/// Extracts all workbooks in order; workbooks that fail to open are logged and skipped.
///
/// Returns the merged extraction and the number of workbooks read.
pub fn merge_workbooks(files: &[PathBuf], skip_sheets: &[String]) -> (Extraction, usize) {
    let mut merged = Extraction::default();
    let mut processed = 0;

    for file in files {
        match extract_workbook(file, skip_sheets) {
            Ok(extraction) => {
                merged.extend(extraction);
                processed += 1;
            }
            Err(e) => {
                warn!(workbook = %file.display(), error = ?e, "skipping workbook");
            }
        }
    }

    (merged, processed)
}
