use crate::case_code::derive_case_code;
use crate::column_mapper::{map_columns, ColumnMap, Field, MAIN_RULES};
use crate::grid::CellGrid;
use crate::models::{CaseFile, Value};
use crate::normalizer::normalize;
use calamine::Data;
use tracing::debug;

/// Rows scanned from the top of the sheet for the header
pub const HEADER_SCAN_ROWS: u32 = 20;
/// Columns read for any header row
pub const HEADER_COLUMNS: u32 = 24;
/// Rows below the header scanned for the main data row
pub const MAIN_ROW_WINDOW: u32 = 15;

const CASE_ID_MARKERS: [&str; 4] = ["Exp.", "EXPTE", "EXPTE.", "Expte"];
const YEAR_MARKER: &str = "AÑO";
const YEAR_PREFIX: &str = "año";

/// Located header row with its normalized cells
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    pub row: u32,
    pub cells: Vec<Value>,
}

/// Reads and normalizes columns 1..=`width` of one row.
pub fn read_row<G: CellGrid + ?Sized>(grid: &G, row: u32, width: u32) -> Vec<Value> {
    (1..=width).map(|col| normalize(grid.cell(row, col))).collect()
}

/// Finds the main header: a row mentioning both the case number and the year.
pub fn locate_header<G: CellGrid + ?Sized>(grid: &G) -> Option<HeaderRow> {
    (1..=HEADER_SCAN_ROWS).find_map(|row| {
        let cells = read_row(grid, row, HEADER_COLUMNS);
        is_header(&cells).then_some(HeaderRow { row, cells })
    })
}

fn is_header(cells: &[Value]) -> bool {
    let joined = cells
        .iter()
        .filter_map(Value::to_field)
        .collect::<Vec<_>>()
        .join("|");

    if !CASE_ID_MARKERS.iter().any(|m| joined.contains(m)) {
        return false;
    }

    joined.contains(YEAR_MARKER)
        || cells
            .iter()
            .filter_map(Value::as_text)
            .any(|s| s.to_lowercase().starts_with(YEAR_PREFIX))
}

/// First row under the header whose year cell is filled in.
pub fn find_main_row<G: CellGrid + ?Sized>(grid: &G, header_row: u32, year_col: u32) -> Option<u32> {
    (header_row + 1..=header_row + MAIN_ROW_WINDOW)
        .find(|&row| !normalize(grid.cell(row, year_col)).is_absent())
}

/// Extracts the sheet's case file; always yields a record.
pub fn extract_case_file<G: CellGrid + ?Sized>(grid: &G, sheet_name: &str) -> CaseFile {
    let Some(header) = locate_header(grid) else {
        debug!(sheet = sheet_name, "no header row");
        return CaseFile::bare(derive_case_code(sheet_name, &Data::Empty));
    };

    let columns = map_columns(&header.cells, MAIN_RULES);
    let main_row = columns
        .get(Field::Anio)
        .and_then(|year_col| find_main_row(grid, header.row, year_col));

    let Some(main_row) = main_row else {
        debug!(sheet = sheet_name, header_row = header.row, "no main data row");
        return CaseFile::bare(derive_case_code(sheet_name, &Data::Empty));
    };

    let case_code = match columns.get(Field::Expte) {
        Some(col) => derive_case_code(sheet_name, grid.cell(main_row, col)),
        None => derive_case_code(sheet_name, &Data::Empty),
    };
    debug!(sheet = sheet_name, main_row, case_code = %case_code, "main row found");

    project(grid, &columns, main_row, case_code)
}

fn project<G: CellGrid + ?Sized>(
    grid: &G,
    columns: &ColumnMap<Field>,
    row: u32,
    case_code: String,
) -> CaseFile {
    let get = |field: Field| {
        columns
            .get(field)
            .map(|col| normalize(grid.cell(row, col)))
            .unwrap_or_default()
    };

    CaseFile {
        case_code,
        year: get(Field::Anio),
        building: get(Field::Edificio),
        subject_line: get(Field::Caratula),
        intake_date: get(Field::FechaIngreso),
        last_action: get(Field::UltimaGestion),
        routed_to: get(Field::SeGiroA),
        procedure_type: get(Field::TipoTramite),
        date: get(Field::Fecha),
        tag: get(Field::Etiqueta),
        resolution: get(Field::Resolucion),
        current_department: get(Field::DependenciaActual),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::{put, sheet, text};

    #[test]
    fn accepts_header_with_both_markers() {
        let grid = sheet(&[&["Planilla de seguimiento"], &["N° EXPTE.", "AÑO", "EDIFICIO"]]);
        let header = locate_header(&grid).unwrap();
        assert_eq!(header.row, 2);
        assert_eq!(header.cells.len(), HEADER_COLUMNS as usize);
        assert_eq!(header.cells[1], Value::Text("AÑO".into()));
    }

    #[test]
    fn rejects_header_without_case_marker() {
        let grid = sheet(&[&["AÑO", "EDIFICIO"]]);
        assert_eq!(locate_header(&grid), None);
    }

    #[test]
    fn year_marker_matches_lowercase_prefix() {
        let grid = sheet(&[&["Expte", "Año de inicio"]]);
        assert_eq!(locate_header(&grid).map(|h| h.row), Some(1));
        let grid = sheet(&[&["Expte", "Edificio"]]);
        assert_eq!(locate_header(&grid), None);
    }

    #[test]
    fn header_beyond_scan_window_is_ignored() {
        let mut grid = sheet(&[&["titulo"]]);
        put(&mut grid, HEADER_SCAN_ROWS + 1, 1, text("EXPTE"));
        put(&mut grid, HEADER_SCAN_ROWS + 1, 2, text("AÑO"));
        assert_eq!(locate_header(&grid), None);
    }

    #[test]
    fn main_row_must_sit_within_window() {
        let last = 1 + MAIN_ROW_WINDOW;
        let mut grid = sheet(&[&["EXPTE", "AÑO"]]);
        put(&mut grid, last, 1, Data::Float(77.0));
        put(&mut grid, last, 2, Data::Float(2020.0));
        assert_eq!(find_main_row(&grid, 1, 2), Some(last));
        assert_eq!(extract_case_file(&grid, "Hoja 1").case_code, "77");

        let mut grid = sheet(&[&["EXPTE", "AÑO"]]);
        put(&mut grid, last + 1, 1, Data::Float(77.0));
        put(&mut grid, last + 1, 2, Data::Float(2020.0));
        assert_eq!(find_main_row(&grid, 1, 2), None);
        assert_eq!(extract_case_file(&grid, "Hoja 1"), CaseFile::bare("1".into()));
    }

    #[test]
    fn extracts_first_row_with_year() {
        let mut grid = sheet(&[
            &["EXPTE", "AÑO", "EDIFICIO", "CARÁTULA", "FECHA DE INGRESO", "SE GIRÓ A"],
            &[],
            &["", "", "nota suelta"],
        ]);
        put(&mut grid, 4, 1, Data::Float(1532.0));
        put(&mut grid, 4, 2, Data::Float(2021.0));
        put(&mut grid, 4, 3, text("Escuela  N° 5\n"));
        put(&mut grid, 4, 4, text("Reparación de techos"));
        put(&mut grid, 4, 6, text("Mesa de entradas"));

        let case = extract_case_file(&grid, "Hoja 12");
        assert_eq!(case.case_code, "1532");
        assert_eq!(case.year, Value::Number(2021.0));
        assert_eq!(case.building, Value::Text("Escuela N° 5".into()));
        assert_eq!(case.subject_line, Value::Text("Reparación de techos".into()));
        assert_eq!(case.intake_date, Value::Absent);
        assert_eq!(case.routed_to, Value::Text("Mesa de entradas".into()));
        assert_eq!(case.resolution, Value::Absent);
    }

    #[test]
    fn no_header_yields_bare_record() {
        let grid = sheet(&[&["sin formato"], &["", "algo"]]);
        assert_eq!(extract_case_file(&grid, "Hoja 31"), CaseFile::bare("31".into()));
    }

    #[test]
    fn header_without_year_column_yields_bare_record() {
        // "AÑO" appears in the joined text but no cell classifies as the year column
        let grid = sheet(&[&["EXPTE", "EDIFICIO / AÑO"], &["44", "Escuela"]]);
        assert_eq!(extract_case_file(&grid, "Caso B"), CaseFile::bare("Caso B".into()));
    }

    #[test]
    fn missing_main_row_ignores_identifier_column() {
        let grid = sheet(&[&["EXPTE", "AÑO"], &["987", ""]]);
        assert_eq!(extract_case_file(&grid, "Hoja 5"), CaseFile::bare("5".into()));
    }
}
