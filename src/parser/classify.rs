use serde::Serialize;

use super::sections::Section;
use super::tables::TableFragment;
use super::text::{fold, is_numeric_token};

/// Header rows are looked for among this many leading rows of a table.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Service-activity families that share one loosely shaped table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericFamily {
    Extension,
    Intellectual,
    Administrative,
    Complementary,
    Commission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    PersonalInfo,
    Teaching,
    Research,
    Thesis,
    Generic(GenericFamily),
}

impl Section {
    /// Extractor a pending section forces on the next data table.
    pub fn forced_kind(self) -> TableKind {
        match self {
            Section::Pregrado | Section::Postgrado => TableKind::Teaching,
            Section::Tesis => TableKind::Thesis,
            Section::Investigacion => TableKind::Research,
            Section::Intelectuales => TableKind::Generic(GenericFamily::Intellectual),
            Section::Extension => TableKind::Generic(GenericFamily::Extension),
            Section::Administrativas => TableKind::Generic(GenericFamily::Administrative),
            Section::Complementarias => TableKind::Generic(GenericFamily::Complementary),
            Section::Comision => TableKind::Generic(GenericFamily::Commission),
        }
    }
}

fn any(cells: &[String], pred: impl Fn(&str) -> bool) -> bool {
    cells.iter().any(|c| pred(c))
}

pub fn is_personal_header(cells: &[String]) -> bool {
    any(cells, |c| c.contains("CEDULA") || c.contains("DOCUMENTO"))
        && any(cells, |c| c.contains("APELLIDO") || c.contains("NOMBRE"))
}

fn is_teaching_header(cells: &[String]) -> bool {
    any(cells, |c| c.contains("CODIGO") && !c.contains("ESTUDIANTE"))
        && any(cells, |c| c.contains("NOMBRE") && c.contains("ASIGNATURA"))
        && any(cells, |c| c.contains("HORAS") || c.contains("SEMESTRE"))
        && !any(cells, |c| c.contains("ESTUDIANTE") || c.contains("TESIS"))
}

fn is_thesis_header(cells: &[String]) -> bool {
    any(cells, |c| c.contains("ESTUDIANTE"))
        && any(cells, |c| c.contains("PLAN") || c.contains("TITULO") || c.contains("TESIS"))
}

impl GenericFamily {
    /// Families the classifier can recognise from headers alone, in the
    /// order they are tried. Intellectual tables only arrive by section.
    const CLASSIFIABLE: [GenericFamily; 4] = [
        GenericFamily::Complementary,
        GenericFamily::Commission,
        GenericFamily::Administrative,
        GenericFamily::Extension,
    ];

    fn is_header(self, cells: &[String]) -> bool {
        match self {
            GenericFamily::Complementary => any(cells, |c| c.contains("PARTICIPACION EN")),
            GenericFamily::Commission => any(cells, |c| c.contains("TIPO DE COMISION")),
            GenericFamily::Administrative => {
                any(cells, |c| c == "CARGO") && any(cells, |c| c.contains("DESCRIPCION DEL CARGO"))
            }
            GenericFamily::Extension => {
                any(cells, |c| c == "TIPO")
                    && any(cells, |c| c == "NOMBRE")
                    && any(cells, |c| c.contains("HORAS") || c.contains("SEMESTRE"))
                    && !any(cells, |c| c.contains("APROBADO"))
            }
            GenericFamily::Intellectual => false,
        }
    }

    fn is_loose_header(self, cells: &[String]) -> bool {
        match self {
            GenericFamily::Extension => any(cells, |c| c == "TIPO" || c.contains("NOMBRE")),
            GenericFamily::Intellectual => {
                any(cells, |c| c.contains("TITULO") || c.contains("NOMBRE") || c == "TIPO")
            }
            GenericFamily::Administrative => any(cells, |c| c.contains("CARGO")),
            GenericFamily::Complementary => any(cells, |c| c.contains("PARTICIPACION")),
            GenericFamily::Commission => {
                any(cells, |c| c.contains("COMISION") || c.contains("DESCRIPCION"))
            }
        }
    }
}

impl TableKind {
    /// Header row as the classifier recognises it.
    pub fn is_header(self, cells: &[String]) -> bool {
        match self {
            TableKind::PersonalInfo => is_personal_header(cells),
            TableKind::Teaching => is_teaching_header(cells),
            TableKind::Research => any(cells, |c| c.contains("PROYECTO"))
                && any(cells, |c| c.contains("HORAS SEMESTRE")),
            TableKind::Thesis => is_thesis_header(cells),
            TableKind::Generic(family) => family.is_header(cells),
        }
    }

    /// Header row good enough for an extractor that section context has
    /// already chosen. Rows holding numbers are data, never headers.
    pub fn is_loose_header(self, cells: &[String]) -> bool {
        if self.is_header(cells) {
            return true;
        }
        if any(cells, is_numeric_token) {
            return false;
        }
        match self {
            TableKind::PersonalInfo => false,
            TableKind::Teaching => any(cells, |c| c.contains("CODIGO") || c.contains("ASIGNATURA")),
            TableKind::Research => any(cells, |c| c.contains("PROYECTO")),
            TableKind::Thesis => {
                any(cells, |c| c.contains("ESTUDIANTE") || c.contains("TESIS") || c.contains("TITULO"))
            }
            TableKind::Generic(family) => family.is_loose_header(cells),
        }
    }
}

fn scan_rows(table: &TableFragment) -> impl Iterator<Item = Vec<String>> + '_ {
    table.rows.iter().take(HEADER_SCAN_ROWS).map(|r| r.folded())
}

/// Own text of the table, its parent and its direct children. Research pages
/// put the section banner in an outer table and the project list in a nested
/// one, so the banner is looked for one level up and down but no further.
fn neighbourhood_text(table: &TableFragment, tables: &[TableFragment]) -> String {
    let mut parts = vec![table.own_text.as_str()];
    if let Some(parent) = table.parent.and_then(|p| tables.get(p)) {
        parts.push(&parent.own_text);
    }
    for child in table.children.iter().filter_map(|&c| tables.get(c)) {
        parts.push(&child.own_text);
    }
    fold(&parts.join(" "))
}

fn is_research_table(table: &TableFragment, tables: &[TableFragment]) -> bool {
    let text = neighbourhood_text(table, tables);
    text.contains("ACTIVIDADES DE INVESTIGACION")
        && text.contains("PROYECTO")
        && text.contains("HORAS SEMESTRE")
}

/// Record family of a table that no section title announced.
pub fn classify(table: &TableFragment, tables: &[TableFragment]) -> Option<TableKind> {
    if table
        .header()
        .is_some_and(|h| is_personal_header(&h.folded()))
    {
        return Some(TableKind::PersonalInfo);
    }
    let rows: Vec<Vec<String>> = scan_rows(table).collect();
    if rows.iter().any(|r| is_teaching_header(r)) {
        return Some(TableKind::Teaching);
    }
    if is_research_table(table, tables) {
        return Some(TableKind::Research);
    }
    if rows.iter().any(|r| is_thesis_header(r)) {
        return Some(TableKind::Thesis);
    }
    GenericFamily::CLASSIFIABLE
        .into_iter()
        .find(|family| rows.iter().any(|r| family.is_header(r)))
        .map(TableKind::Generic)
}

/// Where an extractor should read: the table holding the header row and the
/// row's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub table: usize,
    pub header: usize,
}

/// A row the classifier would recognise wins over a merely plausible one.
/// Single-cell rows are banners, not headers.
fn find_header(kind: TableKind, table: &TableFragment) -> Option<usize> {
    let rows: Vec<Vec<String>> = scan_rows(table).collect();
    rows.iter().position(|cells| kind.is_header(cells)).or_else(|| {
        rows.iter().position(|cells| {
            cells.iter().filter(|c| !c.is_empty()).count() >= 2 && kind.is_loose_header(cells)
        })
    })
}

/// Header row for `kind` in the table itself, else in its first nested table.
pub fn locate(kind: TableKind, table: &TableFragment, tables: &[TableFragment]) -> Option<Located> {
    if let Some(header) = find_header(kind, table) {
        return Some(Located {
            table: table.index,
            header,
        });
    }
    let child = tables.get(*table.children.first()?)?;
    find_header(kind, child).map(|header| Located {
        table: child.index,
        header,
    })
}
