pub mod generic;
pub mod personal;
pub mod research;
pub mod teaching;
pub mod thesis;

use std::sync::LazyLock;

use regex::Regex;

use super::classify::TableKind;
use super::tables::{TableFragment, TableRow};
use super::text::{is_code_shaped, is_numeric_token, normalize_ws, sanitize_name, MIN_NAME_LEN};
use crate::quality::{DiagnosticKind, Diagnostics};
use crate::records::{Activity, Track};

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// Smallest value the right-most-decimal fallback accepts as hours.
pub const HOURS_FALLBACK_MIN: f64 = 10.0;

/// Ranked header phrases for one field. Earlier phrases are more specific;
/// a header containing any `exclude` token never matches.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub phrases: &'static [&'static str],
    pub exclude: &'static [&'static str],
}

impl Field {
    pub const fn new(phrases: &'static [&'static str], exclude: &'static [&'static str]) -> Self {
        Field { phrases, exclude }
    }
}

const HOURS_SEMESTER: Field = Field::new(&["HORAS SEMESTRE"], &[]);
const HOURS_ANY: Field = Field::new(&["HORAS"], &[]);

/// Folded header cells with the virtual column each one starts at.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    cells: Vec<String>,
    starts: Vec<usize>,
}

impl HeaderMap {
    pub fn new(header: &TableRow) -> Self {
        HeaderMap {
            cells: header.folded(),
            starts: (0..header.len()).map(|i| header.virtual_start(i)).collect(),
        }
    }

    /// Folded header texts, one per cell.
    pub fn columns(&self) -> &[String] {
        &self.cells
    }

    pub fn find(&self, field: &Field) -> Option<usize> {
        let allowed = |c: &String| !field.exclude.iter().any(|x| c.contains(x));
        for &phrase in field.phrases {
            let exact = self
                .cells
                .iter()
                .position(|c| c.as_str() == phrase && allowed(c));
            let found = exact.or_else(|| {
                self.cells
                    .iter()
                    .position(|c| c.contains(phrase) && allowed(c))
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Cell under header column `col`. Rows shaped like the header are read
    /// by position; otherwise the cell covering the header's virtual column
    /// is used, falling back to position.
    pub fn value<'r>(&self, row: &'r TableRow, col: usize) -> &'r str {
        if row.len() == self.cells.len() {
            return row.text(col);
        }
        self.starts
            .get(col)
            .and_then(|&start| row.cell_at_column(start))
            .map(|idx| row.text(idx))
            .unwrap_or_else(|| row.text(col))
    }

    /// Whitespace-normalized value of a plain text field, empty when the
    /// header has no such column.
    pub fn text(&self, row: &TableRow, field: &Field) -> String {
        self.find(field)
            .map(|col| normalize_ws(self.value(row, col)))
            .unwrap_or_default()
    }

    /// Primary label of a row. A missing, empty or numeric match means the
    /// columns are misaligned, so the longest plausible text cell is used
    /// instead. If nothing qualifies the raw match is kept for the validity
    /// check to judge.
    pub fn label(&self, row: &TableRow, field: &Field) -> String {
        let matched = self.find(field).map(|col| self.value(row, col)).unwrap_or("");
        if !matched.is_empty() && !is_numeric_token(matched) {
            return sanitize_name(matched);
        }
        match longest_text_cell(row) {
            Some(text) => sanitize_name(text),
            None => sanitize_name(matched),
        }
    }

    /// Hours for a row: `HORAS SEMESTRE` column, any `HORAS` column, then
    /// the right-most decimal cell of at least `HOURS_FALLBACK_MIN`.
    /// Anything else is 0.0 with a diagnostic.
    pub fn hours(&self, row: &TableRow, at: RowAt, diags: &mut Diagnostics) -> f64 {
        let mut unparsable: Option<String> = None;
        for field in [HOURS_SEMESTER, HOURS_ANY] {
            let Some(col) = self.find(&field) else {
                continue;
            };
            let raw = self.value(row, col);
            match parse_hours(raw) {
                Some(hours) => return hours,
                None if !raw.is_empty() => unparsable = Some(raw.to_string()),
                None => {}
            }
        }
        if let Some(hours) = rightmost_decimal(row) {
            return hours;
        }
        match unparsable {
            Some(raw) => diags.record(
                DiagnosticKind::HoursUnparsable,
                Some(at.table),
                Some(at.row),
                format!("hours value {raw:?} is not a number, using 0"),
            ),
            None => diags.record(
                DiagnosticKind::HoursMissing,
                Some(at.table),
                Some(at.row),
                "no hours column or value, using 0",
            ),
        }
        0.0
    }
}

/// Position of a data row, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAt {
    pub table: usize,
    pub row: usize,
}

/// Keep digits, dots and commas; comma is the decimal separator.
pub fn parse_hours(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|h| h.is_finite())
}

fn rightmost_decimal(row: &TableRow) -> Option<f64> {
    row.texts()
        .rev()
        .filter(|t| DECIMAL_RE.is_match(t))
        .filter_map(|t| t.parse::<f64>().ok())
        .find(|h| *h >= HOURS_FALLBACK_MIN)
}

/// Longest cell that reads like a name: not a number or percentage, longer
/// than three characters, not a code.
pub fn longest_text_cell(row: &TableRow) -> Option<&str> {
    let mut best: Option<&str> = None;
    for text in row.texts() {
        let len = text.chars().count();
        if len < MIN_NAME_LEN || is_numeric_token(text) || is_code_shaped(text) {
            continue;
        }
        if best.map_or(true, |b| len > b.chars().count()) {
            best = Some(text);
        }
    }
    best
}

/// Data rows of a table below its header row.
pub struct DataRows<'a> {
    pub table: usize,
    pub header: HeaderMap,
    header_idx: usize,
    rows: &'a [TableRow],
}

impl<'a> DataRows<'a> {
    pub fn new(table: &'a TableFragment, header_idx: usize) -> Self {
        let header = table
            .rows
            .get(header_idx)
            .map(HeaderMap::new)
            .unwrap_or_else(|| HeaderMap::new(&TableRow::default()));
        DataRows {
            table: table.index,
            header,
            header_idx,
            rows: &table.rows,
        }
    }

    /// Rows after the header, skipping blank rows, repeated headers and
    /// `TOTAL` lines.
    pub fn iter(&self) -> impl Iterator<Item = (RowAt, &'a TableRow)> + '_ {
        let table = self.table;
        self.rows
            .iter()
            .enumerate()
            .skip(self.header_idx + 1)
            .filter(move |(_, row)| !row.is_blank() && !self.is_noise(row))
            .map(move |(row_idx, row)| (RowAt { table, row: row_idx }, row))
    }

    fn is_noise(&self, row: &TableRow) -> bool {
        let folded = row.folded();
        if folded == self.header.cells {
            return true;
        }
        folded
            .iter()
            .find(|c| !c.is_empty())
            .is_some_and(|c| c.starts_with("TOTAL"))
    }
}

/// Run the extractor for `kind` over the rows below `header_idx`.
pub fn extract_table(
    kind: TableKind,
    table: &TableFragment,
    header_idx: usize,
    forced_track: Option<Track>,
    diags: &mut Diagnostics,
) -> Vec<Activity> {
    let rows = DataRows::new(table, header_idx);
    match kind {
        TableKind::PersonalInfo => Vec::new(),
        TableKind::Teaching => teaching::extract(&rows, forced_track, diags)
            .into_iter()
            .map(Activity::Teaching)
            .collect(),
        TableKind::Research => research::extract(&rows, diags)
            .into_iter()
            .map(Activity::Research)
            .collect(),
        TableKind::Thesis => thesis::extract(&rows, diags)
            .into_iter()
            .map(Activity::Thesis)
            .collect(),
        TableKind::Generic(family) => generic::extract(family, &rows, diags)
            .into_iter()
            .map(Activity::Generic)
            .collect(),
    }
}

/// Record a dropped row.
pub(crate) fn dropped(diags: &mut Diagnostics, at: RowAt, what: &str, row: &TableRow) {
    diags.record(
        DiagnosticKind::RowDropped,
        Some(at.table),
        Some(at.row),
        format!("{what} row dropped: {:?}", row.joined()),
    );
}

/// True when `s` would read as a bare quantity rather than a label.
pub(crate) fn is_bare_number(s: &str) -> bool {
    !s.is_empty() && is_numeric_token(s)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::parser::tables::segment;
    use crate::parser::tables::TableFragment;

    /// Single table built from plain cell rows.
    pub fn table(rows: &[&[&str]]) -> TableFragment {
        let body: String = rows
            .iter()
            .map(|r| {
                let tds: String = r.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        segment(&format!("<table>{body}</table>")).remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::table;
    use super::*;
    use crate::parser::tables::segment;

    const NAME: Field = Field::new(&["NOMBRE DE ASIGNATURA", "ASIGNATURA", "NOMBRE"], &["CODIGO"]);

    #[test]
    fn ranked_phrases_prefer_specific_header() {
        let t = table(&[&["NOMBRE", "CODIGO", "NOMBRE DE ASIGNATURA"]]);
        let header = HeaderMap::new(&t.rows[0]);
        assert_eq!(header.find(&NAME), Some(2));
    }

    #[test]
    fn exclusions_skip_headers() {
        let t = table(&[&["CODIGO NOMBRE", "TITULO"]]);
        let header = HeaderMap::new(&t.rows[0]);
        assert_eq!(header.find(&NAME), None);
    }

    #[test]
    fn colspan_misalignment_uses_virtual_columns() {
        let html = r#"<table>
            <tr><td>CODIGO</td><td colspan="2">NOMBRE DE ASIGNATURA</td><td>GRUPO</td><td>HORAS SEMESTRE</td></tr>
            <tr><td>760001C</td><td>CALCULO I</td><td></td><td>01</td><td>48.00</td></tr>
        </table>"#;
        let t = segment(html).remove(0);
        let header = HeaderMap::new(&t.rows[0]);
        let row = &t.rows[1];
        let mut diags = Diagnostics::new();
        assert_eq!(header.label(row, &NAME), "CALCULO I");
        assert_eq!(header.text(row, &Field::new(&["GRUPO"], &[])), "01");
        assert_eq!(header.hours(row, RowAt { table: 0, row: 1 }, &mut diags), 48.0);
        assert!(diags.is_empty());
    }

    #[test]
    fn numeric_name_cell_falls_back_to_longest_text() {
        let t = table(&[
            &["CODIGO", "NOMBRE DE ASIGNATURA", "TIPO", "HORAS SEMESTRE"],
            &["750001C", "100%", "FISICA GENERAL", "64.00"],
        ]);
        let header = HeaderMap::new(&t.rows[0]);
        assert_eq!(header.label(&t.rows[1], &NAME), "FISICA GENERAL");
    }

    #[test]
    fn percent_only_name_is_kept_raw() {
        let t = table(&[&["CODIGO", "NOMBRE DE ASIGNATURA", "HORAS"], &["710020C", "12%", "30.00"]]);
        let header = HeaderMap::new(&t.rows[0]);
        assert_eq!(header.label(&t.rows[1], &NAME), "12%");
    }

    #[test]
    fn hours_fallback_to_rightmost_decimal() {
        let t = table(&[&["CODIGO", "ASIGNATURA", "CRED", "TOTAL"], &["760003C", "CALCULO II", "3", "96.00"]]);
        let header = HeaderMap::new(&t.rows[0]);
        let mut diags = Diagnostics::new();
        assert_eq!(header.hours(&t.rows[1], RowAt { table: 0, row: 1 }, &mut diags), 96.0);
    }

    #[test]
    fn missing_hours_default_to_zero_with_diagnostic() {
        let t = table(&[&["CODIGO", "ASIGNATURA", "HORAS"], &["760003C", "CALCULO II", "N/A"]]);
        let header = HeaderMap::new(&t.rows[0]);
        let mut diags = Diagnostics::new();
        assert_eq!(header.hours(&t.rows[1], RowAt { table: 0, row: 1 }, &mut diags), 0.0);
        let items = diags.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, DiagnosticKind::HoursUnparsable);
    }

    #[test]
    fn parse_hours_variants() {
        assert_eq!(parse_hours("64.00"), Some(64.0));
        assert_eq!(parse_hours("32,5"), Some(32.5));
        assert_eq!(parse_hours(" 40 h"), Some(40.0));
        assert_eq!(parse_hours(""), None);
        assert_eq!(parse_hours("1.2.3"), None);
    }

    #[test]
    fn data_rows_skip_noise() {
        let t = table(&[
            &["CODIGO", "NOMBRE"],
            &["1", "A"],
            &["", ""],
            &["CODIGO", "NOMBRE"],
            &["TOTAL HORAS", "90"],
            &["2", "B"],
        ]);
        let rows = DataRows::new(&t, 0);
        let kept: Vec<usize> = rows.iter().map(|(at, _)| at.row).collect();
        assert_eq!(kept, vec![1, 5]);
    }
}
