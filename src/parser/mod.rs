pub mod assemble;
pub mod classify;
pub mod extract;
pub mod sections;
pub mod tables;
pub mod text;
pub mod track;

use serde::Serialize;
use tracing::{debug, info};

use crate::quality::{validate_records, Diagnostic, DiagnosticKind, Diagnostics, QualityReport};
use crate::records::{Activity, ActivityRecord, PersonalInfo};
use classify::{classify, locate, TableKind};
use sections::{SectionTracker, Step};

/// Everything one page yields.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub personal: PersonalInfo,
    pub activities: Vec<Activity>,
    pub records: Vec<ActivityRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn validate(&self, expected_cedula: Option<&str>) -> QualityReport {
        validate_records(&self.records, expected_cedula)
    }
}

/// Turn one decoded, frame-resolved assignment page into typed activities
/// and output records. Never fails: anomalies end up in `diagnostics`.
pub fn process_document(html: &str, periodo: &str) -> Extraction {
    let tables = tables::segment(html);
    let mut diags = Diagnostics::new();

    let personal = extract::personal::extract(&tables, html);
    if !personal.has_identity() {
        diags.record(
            DiagnosticKind::PersonalInfoMissing,
            None,
            None,
            "no personal-info table with cedula or name",
        );
    }

    let mut tracker = SectionTracker::new();
    let mut consumed = vec![false; tables.len()];
    let mut activities: Vec<Activity> = Vec::new();

    for table in &tables {
        if consumed[table.index] || table.is_blank() {
            continue;
        }
        let pending = match tracker.step(table) {
            Step::Title(_) => continue,
            Step::Data(pending) => pending,
        };
        let kind = match pending {
            Some(section) => section.forced_kind(),
            None => match classify(table, &tables) {
                Some(kind) => kind,
                None => {
                    debug!(table = table.index, "unclassified table skipped");
                    continue;
                }
            },
        };
        if kind == TableKind::PersonalInfo {
            continue;
        }

        let Some(located) = locate(kind, table, &tables) else {
            diags.record(
                DiagnosticKind::HeaderNotFound,
                Some(table.index),
                None,
                format!("no {kind:?} header row (section {pending:?})"),
            );
            continue;
        };
        if located.table != table.index {
            consumed[located.table] = true;
        }

        let forced_track = pending.and_then(|s| s.track());
        let found = extract::extract_table(
            kind,
            &tables[located.table],
            located.header,
            forced_track,
            &mut diags,
        );
        debug!(
            table = table.index,
            source = located.table,
            ?kind,
            ?pending,
            records = found.len(),
            "table extracted"
        );
        activities.extend(found);
    }

    let activities = assemble::dedup_teaching(activities);
    let records = assemble::assemble(&activities, &personal, periodo);
    info!(
        tables = tables.len(),
        records = records.len(),
        diagnostics = diags.len(),
        "document processed"
    );

    Extraction {
        personal,
        activities,
        records,
        diagnostics: diags.into_vec(),
    }
}

pub fn extract_records(html: &str, periodo: &str) -> Vec<ActivityRecord> {
    process_document(html, periodo).records
}
