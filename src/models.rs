use crate::date_coercion::coerce_date;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Normalized cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value: unset cell or blank text
    #[default]
    Absent,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as an export field; `None` for absent.
    pub fn to_field(&self) -> Option<String> {
        match self {
            Value::Absent => None,
            Value::Text(s) => Some(s.clone()),
            // whole numbers lose the spurious ".0" (years typed as numbers)
            Value::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
            Value::Number(f) => Some(f.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(dt) => {
                if dt.num_seconds_from_midnight() == 0 {
                    Some(dt.format("%Y-%m-%d").to_string())
                } else {
                    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
        }
    }
}

/// Case file (expediente): one per sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    /// Canonical case code, never empty
    pub case_code: String,
    /// "AÑO" column
    pub year: Value,
    pub building: Value,
    /// Carátula / referencia
    pub subject_line: Value,
    pub intake_date: Value,
    pub last_action: Value,
    pub routed_to: Value,
    pub procedure_type: Value,
    pub date: Value,
    pub tag: Value,
    pub resolution: Value,
    pub current_department: Value,
}

impl CaseFile {
    /// A record carrying only its code, every other field absent.
    pub fn bare(case_code: String) -> Self {
        Self {
            case_code,
            year: Value::Absent,
            building: Value::Absent,
            subject_line: Value::Absent,
            intake_date: Value::Absent,
            last_action: Value::Absent,
            routed_to: Value::Absent,
            procedure_type: Value::Absent,
            date: Value::Absent,
            tag: Value::Absent,
            resolution: Value::Absent,
            current_department: Value::Absent,
        }
    }
}

/// History event from the "registro histórico" block
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub case_code: String,
    pub date: Value,
    pub action: Value,
    pub routed_to: Value,
    pub current_department: Value,
}

/// Exported case file row; field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFileRow {
    pub case_code: String,
    pub anio: Option<String>,
    pub edificio: Option<String>,
    pub caratula: Option<String>,
    pub fecha_ingreso: Option<NaiveDate>,
    pub ultima_gestion: Option<String>,
    pub se_giro_a: Option<String>,
    pub tipo_tramite: Option<String>,
    pub fecha: Option<NaiveDate>,
    pub etiqueta: Option<String>,
    pub resolucion: Option<String>,
    pub dependencia_actual: Option<String>,
}

pub const CASE_FILE_COLUMNS: [&str; 12] = [
    "case_code",
    "anio",
    "edificio",
    "caratula",
    "fecha_ingreso",
    "ultima_gestion",
    "se_giro_a",
    "tipo_tramite",
    "fecha",
    "etiqueta",
    "resolucion",
    "dependencia_actual",
];

impl From<&CaseFile> for CaseFileRow {
    fn from(case: &CaseFile) -> Self {
        Self {
            case_code: case.case_code.clone(),
            anio: case.year.to_field(),
            edificio: case.building.to_field(),
            caratula: case.subject_line.to_field(),
            fecha_ingreso: coerce_date(&case.intake_date),
            ultima_gestion: case.last_action.to_field(),
            se_giro_a: case.routed_to.to_field(),
            tipo_tramite: case.procedure_type.to_field(),
            fecha: coerce_date(&case.date),
            etiqueta: case.tag.to_field(),
            resolucion: case.resolution.to_field(),
            dependencia_actual: case.current_department.to_field(),
        }
    }
}

/// Exported history row; field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEventRow {
    pub case_code: String,
    pub fecha: Option<NaiveDate>,
    pub gestion: Option<String>,
    pub se_giro_a: Option<String>,
    pub dependencia_actual: Option<String>,
}

pub const HISTORY_COLUMNS: [&str; 5] = [
    "case_code",
    "fecha",
    "gestion",
    "se_giro_a",
    "dependencia_actual",
];

impl From<&HistoryEvent> for HistoryEventRow {
    fn from(event: &HistoryEvent) -> Self {
        Self {
            case_code: event.case_code.clone(),
            fecha: coerce_date(&event.date),
            gestion: event.action.to_field(),
            se_giro_a: event.routed_to.to_field(),
            dependencia_actual: event.current_department.to_field(),
        }
    }
}

/// Records extracted from one workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub case_files: Vec<CaseFile>,
    pub history: Vec<HistoryEvent>,
    /// Denylisted sheets that were not read
    pub skipped_sheets: Vec<String>,
}

impl Extraction {
    pub fn extend(&mut self, other: Extraction) {
        self.case_files.extend(other.case_files);
        self.history.extend(other.history);
        self.skipped_sheets.extend(other.skipped_sheets);
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Workbook file, or a directory scanned for workbooks
    pub input_path: String,
    /// Output directory
    pub output_path: String,
    /// Sheets that are summaries/indexes, never case files
    pub skip_sheets: Vec<String>,
    /// Also write `expedientes.xlsx`
    pub export_xlsx: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: "excel/datos.xlsx".to_string(),
            output_path: ".".to_string(),
            skip_sheets: ["INGRESO", "PLANILLA", "1", "Hoja 3", "Hoja 4"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            export_xlsx: false,
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub workbooks: usize,
    pub case_files: usize,
    pub history_events: usize,
    pub skipped_sheets: Vec<String>,
    pub output_path: String,
}
