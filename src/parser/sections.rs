use serde::Serialize;
use tracing::debug;

use super::tables::TableFragment;
use super::text::fold;

/// Section announced by a title-only table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Pregrado,
    Postgrado,
    Tesis,
    Investigacion,
    Intelectuales,
    Extension,
    Administrativas,
    Complementarias,
    Comision,
}

/// Header phrases that only appear on real data tables. A table carrying any
/// of them is never a title, whatever section keyword it also contains.
const DATA_VOCABULARY: &[&str] = &[
    "NOMBRE DE ASIGNATURA",
    "HORAS SEMESTRE",
    "CODIGO ESTUDIANTE",
    "APROBADO POR",
    "CEDULA",
    "PARTICIPACION EN",
    "DESCRIPCION DEL CARGO",
    "TIPO DE COMISION",
];

impl Section {
    /// Section keyword in upper-cased, accent-free text. TESIS is checked
    /// before the graduate tokens: thesis titles often name a MAESTRIA or
    /// DOCTORADO program.
    pub fn detect(folded: &str) -> Option<Section> {
        if folded.contains("DIRECCION") && folded.contains("TESIS") {
            Some(Section::Tesis)
        } else if folded.contains("ACTIVIDADES DE INVESTIGACION") {
            Some(Section::Investigacion)
        } else if folded.contains("ACTIVIDADES INTELECTUALES") {
            Some(Section::Intelectuales)
        } else if folded.contains("ACTIVIDADES DE EXTENSION") {
            Some(Section::Extension)
        } else if folded.contains("ACTIVIDADES ADMINISTRATIVAS") {
            Some(Section::Administrativas)
        } else if folded.contains("ACTIVIDADES COMPLEMENTARIAS") {
            Some(Section::Complementarias)
        } else if folded.contains("DOCENTE EN COMISION") {
            Some(Section::Comision)
        } else if folded.contains("POSTGRADO") || folded.contains("POSGRADO") {
            Some(Section::Postgrado)
        } else if folded.contains("PREGRADO") {
            Some(Section::Pregrado)
        } else {
            None
        }
    }
}

/// Non-blank rows a wrapper may have of its own and still be a title.
const WRAPPER_MAX_ROWS: usize = 2;

fn has_data_vocabulary(folded: &str) -> bool {
    DATA_VOCABULARY.iter().any(|v| folded.contains(v))
}

fn title_in(folded: &str) -> Option<Section> {
    if has_data_vocabulary(folded) {
        return None;
    }
    Section::detect(folded)
}

/// Section a table announces, if it is a title-only table.
///
/// A small wrapper table whose own rows read like a title also counts even
/// when a nested data table sits inside it: the data table is next in
/// document order and picks up the section from here. Page layout tables
/// have many rows of their own and never qualify.
pub fn title_section(table: &TableFragment) -> Option<Section> {
    if let Some(section) = title_in(&table.flat_folded()) {
        return Some(section);
    }
    let own_rows = table.rows.iter().filter(|r| !r.is_blank()).count();
    if !table.children.is_empty() && own_rows <= WRAPPER_MAX_ROWS {
        return title_in(&fold(&table.own_text));
    }
    None
}

/// What the tracker decided for one table of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Title-only table. Nothing to extract.
    Title(Section),
    /// Data table, carrying the section that was pending when it arrived.
    Data(Option<Section>),
}

/// Carries a section from a title-only table to exactly one following table.
#[derive(Debug, Default)]
pub struct SectionTracker {
    pending: Option<Section>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<Section> {
        self.pending
    }

    /// Feed the next non-blank table in document order. A title replaces any
    /// section still pending; a data table takes the pending section and
    /// clears it whether or not it yields records.
    pub fn step(&mut self, table: &TableFragment) -> Step {
        if let Some(section) = title_section(table) {
            if let Some(previous) = self.pending.replace(section) {
                debug!(table = table.index, ?previous, ?section, "title replaces unconsumed section");
            } else {
                debug!(table = table.index, ?section, "section title");
            }
            return Step::Title(section);
        }
        Step::Data(self.pending.take())
    }
}
