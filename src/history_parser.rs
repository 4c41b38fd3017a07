use crate::column_mapper::{map_columns, ColumnMap, HistoryField, HISTORY_RULES};
use crate::excel_parser::{read_row, HEADER_COLUMNS};
use crate::grid::CellGrid;
use crate::models::{HistoryEvent, Value};
use crate::normalizer::normalize;
use tracing::debug;

/// Marker of the "REGISTRO HISTÓRICO" section
const SECTION_MARKER: &str = "REGISTRO";
const ANCHOR_SCAN_ROWS: u32 = 120;
const ANCHOR_SCAN_COLUMNS: u32 = 12;
/// Rows searched for the sub-header, starting at the anchor
const SUB_HEADER_WINDOW: u32 = 12;
const SUB_HEADER_LABEL: &str = "FECHA";
const MAX_HISTORY_ROWS: u32 = 400;
/// Consecutive blank rows that end the table
const BLANK_RUN_LIMIT: u32 = 5;

const DEFAULT_DATE_COLUMN: u32 = 1;
const DEFAULT_ACTION_COLUMN: u32 = 2;

/// Row of the first cell mentioning the history section.
pub fn locate_history_anchor<G: CellGrid + ?Sized>(grid: &G) -> Option<u32> {
    (1..=ANCHOR_SCAN_ROWS).find(|&row| {
        (1..=ANCHOR_SCAN_COLUMNS).any(|col| {
            normalize(grid.cell(row, col))
                .as_text()
                .is_some_and(|s| s.to_uppercase().contains(SECTION_MARKER))
        })
    })
}

/// Finds the history sub-header (a row with a cell reading exactly "FECHA") and maps it.
pub fn locate_sub_header<G: CellGrid + ?Sized>(
    grid: &G,
    anchor: u32,
) -> Option<(u32, ColumnMap<HistoryField>)> {
    (anchor..anchor + SUB_HEADER_WINDOW).find_map(|row| {
        let cells = read_row(grid, row, HEADER_COLUMNS);
        let is_sub_header = cells
            .iter()
            .filter_map(Value::as_text)
            .any(|s| s.to_uppercase() == SUB_HEADER_LABEL);
        is_sub_header.then(|| (row, map_columns(&cells, HISTORY_RULES)))
    })
}

/// Parses the embedded history table; empty if the sheet has none.
pub fn parse_history<G: CellGrid + ?Sized>(grid: &G, case_code: &str) -> Vec<HistoryEvent> {
    let Some(anchor) = locate_history_anchor(grid) else {
        return Vec::new();
    };
    let Some((sub_header, columns)) = locate_sub_header(grid, anchor) else {
        debug!(case_code, anchor, "history marker without sub-header");
        return Vec::new();
    };

    let date_col = columns.get(HistoryField::Fecha).unwrap_or(DEFAULT_DATE_COLUMN);
    let action_col = columns.get(HistoryField::Gestion).unwrap_or(DEFAULT_ACTION_COLUMN);
    let optional = |row: u32, field: HistoryField| {
        columns
            .get(field)
            .map(|col| normalize(grid.cell(row, col)))
            .unwrap_or_default()
    };

    let mut events = Vec::new();
    let mut blank_run = 0;

    for row in sub_header + 1..=sub_header + MAX_HISTORY_ROWS {
        let date = normalize(grid.cell(row, date_col));
        let action = normalize(grid.cell(row, action_col));

        if date.is_absent() && action.is_absent() {
            blank_run += 1;
            if blank_run >= BLANK_RUN_LIMIT {
                break;
            }
            continue;
        }
        blank_run = 0;

        events.push(HistoryEvent {
            case_code: case_code.to_string(),
            date,
            action,
            routed_to: optional(row, HistoryField::SeGiroA),
            current_department: optional(row, HistoryField::DependenciaActual),
        });
    }

    debug!(case_code, sub_header, events = events.len(), "history parsed");
    events
}
