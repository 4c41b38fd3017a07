use crate::models::{CaseFileRow, HistoryEventRow, CASE_FILE_COLUMNS, HISTORY_COLUMNS};
use anyhow::Result;
use chrono::NaiveDate;
use rust_xlsxwriter::*;
use std::path::Path;

pub const WORKBOOK_FILE: &str = "expedientes.xlsx";
pub const CASE_FILES_SHEET: &str = "expedientes";
pub const HISTORY_SHEET: &str = "gestiones";

/// Writes both tables into one workbook, one sheet each.
pub fn write_workbook(
    output_file: &Path,
    case_files: &[CaseFileRow],
    history: &[HistoryEventRow],
) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_font_size(11)
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(0xD3D3D3))
        .set_border(FormatBorder::Thin);

    let case_cells: Vec<Vec<Option<String>>> = case_files.iter().map(case_file_cells).collect();
    write_sheet(
        workbook.add_worksheet(),
        CASE_FILES_SHEET,
        &CASE_FILE_COLUMNS,
        &case_cells,
        &header_format,
    )?;

    let event_cells: Vec<Vec<Option<String>>> = history.iter().map(history_cells).collect();
    write_sheet(
        workbook.add_worksheet(),
        HISTORY_SHEET,
        &HISTORY_COLUMNS,
        &event_cells,
        &header_format,
    )?;

    workbook.save(output_file)?;

    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    columns: &[&str],
    rows: &[Vec<Option<String>>],
    header_format: &Format,
) -> Result<()> {
    worksheet.set_name(name)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (col, header) in columns.iter().enumerate() {
        worksheet.set_column_width(col as u16, 18)?;
        worksheet.write_with_format(0, col as u16, *header, header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            // absent values stay as blank cells
            if let Some(text) = cell {
                worksheet.write_string(row_num, col as u16, text)?;
            }
        }
    }

    Ok(())
}

fn format_date(date: &Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn case_file_cells(row: &CaseFileRow) -> Vec<Option<String>> {
    vec![
        Some(row.case_code.clone()),
        row.anio.clone(),
        row.edificio.clone(),
        row.caratula.clone(),
        format_date(&row.fecha_ingreso),
        row.ultima_gestion.clone(),
        row.se_giro_a.clone(),
        row.tipo_tramite.clone(),
        format_date(&row.fecha),
        row.etiqueta.clone(),
        row.resolucion.clone(),
        row.dependencia_actual.clone(),
    ]
}

fn history_cells(row: &HistoryEventRow) -> Vec<Option<String>> {
    vec![
        Some(row.case_code.clone()),
        format_date(&row.fecha),
        row.gestion.clone(),
        row.se_giro_a.clone(),
        row.dependencia_actual.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};

    #[test]
    fn writes_both_sheets_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WORKBOOK_FILE);
        let history = vec![HistoryEventRow {
            case_code: "45".into(),
            fecha: NaiveDate::from_ymd_opt(2021, 2, 1),
            gestion: Some("Ingreso".into()),
            se_giro_a: None,
            dependencia_actual: Some("Obras".into()),
        }];
        write_workbook(&path, &[], &history).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![CASE_FILES_SHEET, HISTORY_SHEET]);

        let cases = workbook.worksheet_range(CASE_FILES_SHEET).unwrap();
        assert_eq!(cases.height(), 1);
        assert_eq!(cases.get_value((0, 11)), Some(&Data::String("dependencia_actual".into())));

        let events = workbook.worksheet_range(HISTORY_SHEET).unwrap();
        assert_eq!(events.get_value((1, 0)), Some(&Data::String("45".into())));
        assert_eq!(events.get_value((1, 1)), Some(&Data::String("2021-02-01".into())));
        assert_eq!(events.get_value((1, 3)), Some(&Data::Empty));
        assert_eq!(events.get_value((1, 4)), Some(&Data::String("Obras".into())));
    }
}
