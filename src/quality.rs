use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::parser::text::MIN_NAME_LEN;
use crate::period::clean_cedula;
use crate::records::ActivityRecord;

// ── Extraction diagnostics ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A classified or section-forced table had no recognisable header row.
    HeaderNotFound,
    /// No hours column or fallback cell; hours defaulted to 0.
    HoursMissing,
    /// An hours cell held something that is not a number; hours defaulted to 0.
    HoursUnparsable,
    /// A data row failed its family's validity check.
    RowDropped,
    /// No personal-info table was found on the page.
    PersonalInfoMissing,
}

/// One anomaly met while extracting a document. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub table: Option<usize>,
    pub row: Option<usize>,
    pub detail: String,
}

/// Per-call accumulator. Each entry is logged once, when recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        table: Option<usize>,
        row: Option<usize>,
        detail: impl Into<String>,
    ) {
        let detail = detail.into();
        warn!(?kind, ?table, ?row, "{}", detail);
        self.items.push(Diagnostic {
            kind,
            table,
            row,
            detail,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

// ── Record quality ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    EmptyName,
    NameEndsWithPercent,
    NameTooShort,
    NonPositiveHours,
    MissingDepartamento,
    MissingProfesor,
    CedulaMismatch,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityIssue::EmptyName => "empty activity name",
            QualityIssue::NameEndsWithPercent => "activity name ends with %",
            QualityIssue::NameTooShort => "activity name too short",
            QualityIssue::NonPositiveHours => "hours not positive",
            QualityIssue::MissingDepartamento => "missing departamento",
            QualityIssue::MissingProfesor => "missing nombre_profesor",
            QualityIssue::CedulaMismatch => "cedula does not match the requested one",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssues {
    pub index: usize,
    pub nombre_actividad: String,
    pub issues: Vec<QualityIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub total: usize,
    pub flagged: Vec<RecordIssues>,
}

impl QualityReport {
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} records had quality issues",
            self.flagged.len(),
            self.total
        )
    }
}

fn record_issues(record: &ActivityRecord, expected: Option<&str>) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let name = record.nombre_actividad.trim();
    if name.is_empty() {
        issues.push(QualityIssue::EmptyName);
    } else {
        if name.ends_with('%') {
            issues.push(QualityIssue::NameEndsWithPercent);
        }
        if name.chars().count() < MIN_NAME_LEN {
            issues.push(QualityIssue::NameTooShort);
        }
    }
    if record.numero_horas <= 0.0 {
        issues.push(QualityIssue::NonPositiveHours);
    }
    if record.departamento.trim().is_empty() {
        issues.push(QualityIssue::MissingDepartamento);
    }
    if record.nombre_profesor.trim().is_empty() {
        issues.push(QualityIssue::MissingProfesor);
    }
    if let Some(expected) = expected {
        if clean_cedula(&record.cedula) != clean_cedula(expected) {
            issues.push(QualityIssue::CedulaMismatch);
        }
    }
    issues
}

/// Check assembled records for the anomalies that usually mean a layout
/// changed under the extractor. One warning per flagged record plus a summary.
pub fn validate_records(records: &[ActivityRecord], expected_cedula: Option<&str>) -> QualityReport {
    let flagged: Vec<RecordIssues> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let issues = record_issues(record, expected_cedula);
            if issues.is_empty() {
                return None;
            }
            let listed = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(
                record = index,
                nombre_actividad = %record.nombre_actividad,
                "quality issues: {}",
                listed
            );
            Some(RecordIssues {
                index,
                nombre_actividad: record.nombre_actividad.clone(),
                issues,
            })
        })
        .collect();

    let report = QualityReport {
        total: records.len(),
        flagged,
    };
    if report.is_clean() {
        info!("{}", report.summary());
    } else {
        warn!("{}", report.summary());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, horas: f64) -> ActivityRecord {
        ActivityRecord {
            cedula: "16.789.012".into(),
            nombre_profesor: "JUAN PEREZ".into(),
            escuela: "INGENIERIA DE SISTEMAS".into(),
            departamento: "ESCUELA".into(),
            tipo_actividad: "Pregrado".into(),
            categoria: "ASOCIADO".into(),
            nombre_actividad: name.into(),
            numero_horas: horas,
            periodo: "2024-1".into(),
            actividad: "TEORICA".into(),
            vinculacion: "NOMBRADO".into(),
            dedicacion: "TIEMPO COMPLETO".into(),
            nivel: "DOCTORADO".into(),
        }
    }

    #[test]
    fn clean_records_pass() {
        let report = validate_records(&[record("750001C - CALCULO I", 64.0)], Some("16789012"));
        assert!(report.is_clean());
        assert_eq!(report.summary(), "0 of 1 records had quality issues");
    }

    #[test]
    fn flags_each_issue() {
        let mut bad = record("50%", 0.0);
        bad.departamento.clear();
        let report = validate_records(&[record("FISICA", 32.0), bad], Some("999"));
        assert_eq!(report.flagged_count(), 2);
        assert_eq!(report.flagged[0].issues, vec![QualityIssue::CedulaMismatch]);
        assert_eq!(
            report.flagged[1].issues,
            vec![
                QualityIssue::NameEndsWithPercent,
                QualityIssue::NameTooShort,
                QualityIssue::NonPositiveHours,
                QualityIssue::MissingDepartamento,
                QualityIssue::CedulaMismatch,
            ]
        );
        assert_eq!(report.summary(), "2 of 2 records had quality issues");
    }

    #[test]
    fn empty_name_reported_once() {
        let report = validate_records(&[record("", 10.0)], None);
        assert_eq!(report.flagged[0].issues, vec![QualityIssue::EmptyName]);
    }

    #[test]
    fn diagnostics_accumulate() {
        let mut diags = Diagnostics::new();
        diags.record(DiagnosticKind::HoursMissing, Some(2), Some(1), "no hours");
        assert_eq!(diags.len(), 1);
        let items = diags.into_vec();
        assert_eq!(items[0].table, Some(2));
    }
}
