use crate::models::{CaseFileRow, HistoryEventRow, CASE_FILE_COLUMNS, HISTORY_COLUMNS};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub const CASE_FILES_CSV: &str = "expedientes.csv";
pub const HISTORY_CSV: &str = "gestiones.csv";

/// Writes the case file table, header included even when empty.
pub fn write_case_files(path: &Path, rows: &[CaseFileRow]) -> Result<()> {
    write_table(path, &CASE_FILE_COLUMNS, rows)
}

/// Writes the history table, header included even when empty.
pub fn write_history_events(path: &Path, rows: &[HistoryEventRow]) -> Result<()> {
    write_table(path, &HISTORY_COLUMNS, rows)
}

pub fn read_case_files(path: &Path) -> Result<Vec<CaseFileRow>> {
    read_table(path)
}

pub fn read_history_events(path: &Path) -> Result<Vec<HistoryEventRow>> {
    read_table(path)
}

fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    // serde would only emit the header with the first row
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn case_row(code: &str) -> CaseFileRow {
        CaseFileRow {
            case_code: code.to_string(),
            anio: Some("2021".into()),
            edificio: Some("Escuela N° 5, anexo".into()),
            caratula: Some("Reparación \"urgente\" de techos".into()),
            fecha_ingreso: NaiveDate::from_ymd_opt(2021, 3, 15),
            ultima_gestion: None,
            se_giro_a: Some("Mesa de entradas".into()),
            tipo_tramite: None,
            fecha: None,
            etiqueta: Some("URGENTE".into()),
            resolucion: None,
            dependencia_actual: Some("Obras".into()),
        }
    }

    #[test]
    fn empty_tables_still_have_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_CSV);
        write_history_events(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "case_code,fecha,gestion,se_giro_a,dependencia_actual\n");
        assert!(read_history_events(&path).unwrap().is_empty());
    }

    #[test]
    fn case_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CASE_FILES_CSV);
        let rows = vec![case_row("45"), CaseFileRow { anio: None, ..case_row("Hoja A") }];
        write_case_files(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(CASE_FILE_COLUMNS.join(",").as_str()));
        assert!(lines.next().unwrap().starts_with("45,2021,\"Escuela N° 5, anexo\","));

        assert_eq!(read_case_files(&path).unwrap(), rows);
    }

    #[test]
    fn history_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_CSV);
        let rows = vec![
            HistoryEventRow {
                case_code: "45".into(),
                fecha: NaiveDate::from_ymd_opt(2020, 1, 2),
                gestion: Some("Ingreso".into()),
                se_giro_a: None,
                dependencia_actual: Some("Legales".into()),
            },
            HistoryEventRow {
                case_code: "45".into(),
                fecha: None,
                gestion: Some("Sin fecha".into()),
                se_giro_a: None,
                dependencia_actual: None,
            },
        ];
        write_history_events(&path, &rows).unwrap();
        assert_eq!(read_history_events(&path).unwrap(), rows);
    }
}
