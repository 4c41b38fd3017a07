//! Ordered rule tables that classify free-text column labels.
//!
//! Each table is evaluated top to bottom against the lowercased label and the
//! first matching rule names the canonical field. When a field matches more
//! than one label, the leftmost column is kept.

use crate::models::Value;
use std::collections::HashMap;
use std::hash::Hash;

/// Canonical fields of the main record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Expte,
    Anio,
    Edificio,
    Caratula,
    FechaIngreso,
    UltimaGestion,
    SeGiroA,
    TipoTramite,
    Fecha,
    Etiqueta,
    Resolucion,
    DependenciaActual,
}

/// Canonical fields of the history sub-table header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryField {
    Fecha,
    Gestion,
    SeGiroA,
    DependenciaActual,
}

/// One classification rule: predicate over the lowercased label.
pub struct ColumnRule<F> {
    pub field: F,
    pub matches: fn(&str) -> bool,
}

pub const MAIN_RULES: &[ColumnRule<Field>] = &[
    ColumnRule { field: Field::Expte, matches: |v| v.starts_with("exp") || v.contains("expte") },
    ColumnRule { field: Field::Anio, matches: |v| v.starts_with("año") || v == "anio" },
    ColumnRule { field: Field::Edificio, matches: |v| v.contains("edificio") },
    ColumnRule {
        field: Field::Caratula,
        matches: |v| v.contains("carátula") || v.contains("caratula") || v.contains("referencia"),
    },
    ColumnRule { field: Field::FechaIngreso, matches: |v| v.contains("fecha de ingreso") },
    ColumnRule { field: Field::UltimaGestion, matches: is_last_action },
    ColumnRule { field: Field::SeGiroA, matches: is_routed_to },
    ColumnRule { field: Field::TipoTramite, matches: |v| v.contains("tipo") && v.contains("tramite") },
    ColumnRule { field: Field::Fecha, matches: |v| v == "fecha" },
    ColumnRule { field: Field::Etiqueta, matches: |v| v.contains("etiqueta") },
    ColumnRule { field: Field::Resolucion, matches: |v| v.contains("resol") },
    ColumnRule { field: Field::DependenciaActual, matches: is_current_department },
];

pub const HISTORY_RULES: &[ColumnRule<HistoryField>] = &[
    ColumnRule { field: HistoryField::Fecha, matches: |v| v == "fecha" },
    ColumnRule { field: HistoryField::Gestion, matches: is_last_action },
    ColumnRule { field: HistoryField::SeGiroA, matches: is_routed_to },
    ColumnRule { field: HistoryField::DependenciaActual, matches: is_current_department },
];

fn is_last_action(v: &str) -> bool {
    v.contains("última gestión") || v.contains("ultima gestion")
}

fn is_routed_to(v: &str) -> bool {
    v.contains("se giró a") || v.contains("se giro a")
}

fn is_current_department(v: &str) -> bool {
    v.contains("dependencia") && v.contains("actual")
}

/// Canonical field → 1-based column index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap<F: Eq + Hash> {
    columns: HashMap<F, u32>,
}

impl<F: Copy + Eq + Hash> ColumnMap<F> {
    pub fn get(&self, field: F) -> Option<u32> {
        self.columns.get(&field).copied()
    }

    #[cfg(test)]
    fn contains(&self, field: F) -> bool {
        self.columns.contains_key(&field)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.columns.len()
    }
}

/// Classifies a header row's text cells against `rules`.
pub fn map_columns<F: Copy + Eq + Hash>(header: &[Value], rules: &[ColumnRule<F>]) -> ColumnMap<F> {
    let mut columns = HashMap::new();

    for (idx, cell) in header.iter().enumerate() {
        let Some(label) = cell.as_text() else {
            continue;
        };
        let label = label.to_lowercase();

        if let Some(rule) = rules.iter().find(|rule| (rule.matches)(&label)) {
            columns.entry(rule.field).or_insert(idx as u32 + 1);
        }
    }

    ColumnMap { columns }
}
