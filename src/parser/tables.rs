use std::collections::HashMap;

use scraper::{ElementRef, Html, Node};

use super::text::{fold, normalize_ws};

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub colspan: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell text by ordinal position; missing cells read as empty.
    pub fn text(&self, idx: usize) -> &str {
        self.cells.get(idx).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn texts(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.cells.iter().map(|c| c.text.as_str())
    }

    /// Every cell is blank (spacer rows, `&nbsp;` padding).
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.text.is_empty())
    }

    /// First virtual column occupied by the cell at `idx`.
    pub fn virtual_start(&self, idx: usize) -> usize {
        self.cells.iter().take(idx).map(|c| c.colspan).sum()
    }

    /// Ordinal index of the cell covering virtual column `col`.
    pub fn cell_at_column(&self, col: usize) -> Option<usize> {
        let mut start = 0;
        for (i, cell) in self.cells.iter().enumerate() {
            if col < start + cell.colspan {
                return Some(i);
            }
            start += cell.colspan;
        }
        None
    }

    /// Upper-cased, accent-free cell texts.
    pub fn folded(&self) -> Vec<String> {
        self.cells.iter().map(|c| fold(&c.text)).collect()
    }

    pub fn joined(&self) -> String {
        self.texts().filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
    }
}

/// One `<table>…</table>` span. Nested tables are separate fragments; the
/// parent keeps their indices in `children` and excludes their rows from its
/// own `rows`.
#[derive(Debug, Clone)]
pub struct TableFragment {
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub rows: Vec<TableRow>,
    /// Text of the whole span, nested tables included.
    pub flat_text: String,
    /// Text of this table's own rows only.
    pub own_text: String,
}

impl TableFragment {
    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    /// Carries nothing to read: no rows, or only blank cells and no nested tables.
    pub fn is_blank(&self) -> bool {
        self.children.is_empty() && self.rows.iter().all(TableRow::is_blank)
    }

    pub fn flat_folded(&self) -> String {
        fold(&self.flat_text)
    }
}

/// Split a document into table fragments in order of their opening tags.
pub fn segment(html: &str) -> Vec<TableFragment> {
    let doc = Html::parse_document(html);
    let elements: Vec<ElementRef> = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "table")
        .collect();
    let index_of: HashMap<_, usize> = elements.iter().enumerate().map(|(i, e)| (e.id(), i)).collect();

    let parents: Vec<Option<usize>> = elements
        .iter()
        .map(|e| {
            e.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table")
                .and_then(|a| index_of.get(&a.id()).copied())
        })
        .collect();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
    for (idx, parent) in parents.iter().enumerate() {
        if let Some(p) = parent {
            children[*p].push(idx);
        }
    }

    elements
        .iter()
        .enumerate()
        .map(|(idx, table)| {
            let rows: Vec<TableRow> = direct_rows(*table)
                .into_iter()
                .map(|tr| TableRow { cells: direct_cells(tr) })
                .filter(|row| !row.is_empty())
                .collect();
            let own_text = rows
                .iter()
                .map(TableRow::joined)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            TableFragment {
                index: idx,
                parent: parents[idx],
                children: children[idx].clone(),
                rows,
                flat_text: normalize_ws(&table.text().collect::<Vec<_>>().join(" ")),
                own_text,
            }
        })
        .collect()
}

/// Visible text of a whole document, nested tables included.
pub fn document_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    normalize_ws(&doc.root_element().text().collect::<Vec<_>>().join(" "))
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// `tr` rows of this table only; row groups are looked through, nested
/// tables are not.
fn direct_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(child).filter(|e| e.value().name() == "tr"));
            }
            _ => {}
        }
    }
    rows
}

/// Cells with the colspan declared on their own tag. Cells are never
/// replicated across the columns they span.
fn direct_cells(row: ElementRef<'_>) -> Vec<Cell> {
    child_elements(row)
        .filter(|e| matches!(e.value().name(), "td" | "th"))
        .map(|cell| Cell {
            text: own_cell_text(cell),
            colspan: cell
                .value()
                .attr("colspan")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1),
        })
        .collect()
}

/// Text of a cell minus any table nested in it. Element boundaries count as
/// word breaks so `HORAS<br>SEMESTRE` stays two words.
fn own_cell_text(cell: ElementRef<'_>) -> String {
    fn walk(el: ElementRef<'_>, out: &mut String) {
        for child in el.children() {
            match child.value() {
                Node::Text(t) => out.push_str(&t.text),
                Node::Element(e) if e.name() == "table" => out.push(' '),
                Node::Element(_) => {
                    if let Some(inner) = ElementRef::wrap(child) {
                        out.push(' ');
                        walk(inner, out);
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
    }
    let mut out = String::new();
    walk(cell, &mut out);
    normalize_ws(&out)
}
