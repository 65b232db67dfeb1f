use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::HeaderMap;
use crate::parser::classify::is_personal_header;
use crate::parser::tables::{TableFragment, TableRow};
use crate::parser::text::{fold, normalize_ws};
use crate::period::clean_cedula;
use crate::records::{set_once, PersonalInfo};

/// Rows scanned for `LABEL | value` pairs below the two header/value blocks.
const LABEL_ROWS: std::ops::Range<usize> = 4..10;
/// Flat-text values this long are page noise, not field values.
const MAX_FLAT_VALUE_LEN: usize = 100;

const UNIT_PREFIXES: &[&str] = &[
    "DEPARTAMENTO DE ",
    "DEPARTAMENTO ",
    "DEPTO. ",
    "DEPTO ",
    "ESCUELA DE ",
    "ESCUELA ",
    "FACULTAD DE ",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Cedula,
    Nombre,
    Apellido1,
    Apellido2,
    UnidadAcademica,
    Escuela,
    Departamento,
    Vinculacion,
    Categoria,
    Dedicacion,
    NivelAlcanzado,
    Cargo,
    CentroCosto,
}

static FLAT_FIELDS: LazyLock<Vec<(Slot, Regex)>> = LazyLock::new(|| {
    [
        (Slot::Vinculacion, r"VINCULACI[OÓ]N"),
        (Slot::Categoria, r"CATEGOR[IÍ]A"),
        (Slot::Dedicacion, r"DEDICACI[OÓ]N"),
        (Slot::NivelAlcanzado, r"NIVEL\s+ALCANZADO"),
    ]
    .into_iter()
    .map(|(slot, label)| {
        let re = Regex::new(&format!(r#"(?i){label}\s*[=:]\s*([^\s,<>&"']+)"#)).unwrap();
        (slot, re)
    })
    .collect()
});

fn slot_mut(info: &mut PersonalInfo, slot: Slot) -> &mut String {
    match slot {
        Slot::Cedula => &mut info.cedula,
        Slot::Nombre => &mut info.nombre,
        Slot::Apellido1 => &mut info.apellido1,
        Slot::Apellido2 => &mut info.apellido2,
        Slot::UnidadAcademica => &mut info.unidad_academica,
        Slot::Escuela => &mut info.escuela,
        Slot::Departamento => &mut info.departamento,
        Slot::Vinculacion => &mut info.vinculacion,
        Slot::Categoria => &mut info.categoria,
        Slot::Dedicacion => &mut info.dedicacion,
        Slot::NivelAlcanzado => &mut info.nivel_alcanzado,
        Slot::Cargo => &mut info.cargo,
        Slot::CentroCosto => &mut info.centro_costo,
    }
}

/// Field a folded header names.
fn slot_for_header(h: &str) -> Option<Slot> {
    let slot = if h.contains("CEDULA") || h.contains("DOCUMENTO") {
        Slot::Cedula
    } else if h.contains("APELLIDO") {
        if h.contains('2') || h.contains("SEGUNDO") {
            Slot::Apellido2
        } else {
            Slot::Apellido1
        }
    } else if h.contains("NOMBRE") {
        Slot::Nombre
    } else if h.contains("UNIDAD") {
        Slot::UnidadAcademica
    } else if h.contains("VINCULACION") {
        Slot::Vinculacion
    } else if h.contains("CATEGORIA") {
        Slot::Categoria
    } else if h.contains("DEDICACION") {
        Slot::Dedicacion
    } else if h.contains("NIVEL") {
        Slot::NivelAlcanzado
    } else if h.contains("CENTRO") {
        Slot::CentroCosto
    } else if h.contains("CARGO") {
        Slot::Cargo
    } else if h.contains("ESCUELA") {
        Slot::Escuela
    } else if h.contains("DEPARTAMENTO") || h.contains("DPTO") || h.contains("DEPTO") {
        Slot::Departamento
    } else {
        return None;
    };
    Some(slot)
}

/// Field an inline label cell names (`CARGO:`, `DEPARTAMENTO`, ...).
fn slot_for_label(cell: &str) -> Option<Slot> {
    match cell.trim_end_matches(':').trim() {
        "CARGO" => Some(Slot::Cargo),
        "DEPARTAMENTO" | "DPTO" | "DPTO." | "DEPTO" | "DEPTO." => Some(Slot::Departamento),
        "ESCUELA" => Some(Slot::Escuela),
        _ => None,
    }
}

/// Strip a leading unit-type prefix and upper-case.
pub fn normalize_unit(value: &str) -> String {
    let upper = normalize_ws(value).to_uppercase();
    let folded = fold(&upper);
    for prefix in UNIT_PREFIXES {
        if folded.starts_with(prefix) {
            // Folding keeps char counts, so the prefix length carries over.
            let skip = prefix.chars().count();
            return upper.chars().skip(skip).collect::<String>().trim().to_string();
        }
    }
    upper
}

fn assign(info: &mut PersonalInfo, slot: Slot, value: &str) -> bool {
    let value = match slot {
        Slot::Cedula => clean_cedula(value),
        Slot::Escuela | Slot::Departamento => normalize_unit(value),
        _ => normalize_ws(value),
    };
    set_once(slot_mut(info, slot), &value)
}

/// Map the values of `values` under the headers of `headers`.
fn map_block(info: &mut PersonalInfo, headers: &TableRow, values: &TableRow) {
    let map = HeaderMap::new(headers);
    for (col, header) in map.columns().iter().enumerate() {
        if let Some(slot) = slot_for_header(header) {
            assign(info, slot, map.value(values, col));
        }
    }
}

fn scan_labels(info: &mut PersonalInfo, rows: &[TableRow]) {
    for row in rows.iter().skip(LABEL_ROWS.start).take(LABEL_ROWS.len()) {
        let folded = row.folded();
        for (i, label) in folded.iter().enumerate() {
            let Some(slot) = slot_for_label(label) else {
                continue;
            };
            if let Some(value) = row.texts().skip(i + 1).find(|v| !v.is_empty()) {
                assign(info, slot, value);
            }
        }
    }
}

/// Row 3 carrying five values with no usable headers above it reads as
/// vinculación, categoría, dedicación, nivel, centro de costo.
fn positional_fallbacks(info: &mut PersonalInfo, rows: &[TableRow]) {
    if let Some(row) = rows.get(3) {
        let values: Vec<&str> = row.texts().filter(|t| !t.is_empty()).collect();
        if values.len() >= 5 && info.vinculacion.is_empty() {
            let slots = [
                Slot::Vinculacion,
                Slot::Categoria,
                Slot::Dedicacion,
                Slot::NivelAlcanzado,
                Slot::CentroCosto,
            ];
            for (slot, value) in slots.into_iter().zip(values) {
                assign(info, slot, value);
            }
        }
    }
}

/// Structural pass over one personal-info table.
fn read_table(info: &mut PersonalInfo, table: &TableFragment) {
    let rows = &table.rows;
    if let (Some(h), Some(v)) = (rows.first(), rows.get(1)) {
        map_block(info, h, v);
    }
    if let (Some(h), Some(v)) = (rows.get(2), rows.get(3)) {
        map_block(info, h, v);
    }
    positional_fallbacks(info, rows);
    scan_labels(info, rows);
}

/// `FIELD: value` / `FIELD=value` anywhere in the page; fills gaps only.
fn read_flat_text(info: &mut PersonalInfo, html: &str) {
    let text = html.replace("&nbsp;", " ");
    for (slot, re) in FLAT_FIELDS.iter() {
        if let Some(caps) = re.captures(&text) {
            let value = &caps[1];
            if value.chars().count() < MAX_FLAT_VALUE_LEN && assign(info, *slot, value) {
                debug!(?slot, value, "personal field from flat text");
            }
        }
    }
}

/// Department and school. A UNIDAD ACADEMICA value decides both: its first
/// token is the department, the rest (minus ESCUELA / DEPARTAMENTO) the
/// school. Labeled values only stand when there is no unit.
fn derive_units(info: &mut PersonalInfo, rows: &[TableRow]) {
    let tokens: Vec<&str> = info.unidad_academica.split_whitespace().collect();
    if let Some((first, rest)) = tokens.split_first() {
        let escuela = rest
            .iter()
            .filter(|t| {
                let f = fold(t);
                f != "ESCUELA" && f != "DEPARTAMENTO"
            })
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        info.departamento = first.to_string();
        info.escuela = escuela;
        return;
    }
    if info.departamento.is_empty() {
        if let Some(cell) = rows.get(1).map(|r| r.text(4)) {
            if fold(cell).contains("DEPARTAMENTO") {
                assign(info, Slot::Departamento, cell);
            }
        }
    }
}

/// Identity block of the page: the first personal-info table that yields a
/// cédula or name, then flat-text values for whatever it left empty.
pub fn extract(tables: &[TableFragment], html: &str) -> PersonalInfo {
    let mut info = PersonalInfo::default();
    let mut source: Option<&TableFragment> = None;

    for table in tables {
        let is_personal = table
            .header()
            .is_some_and(|h| is_personal_header(&h.folded()));
        if !is_personal {
            continue;
        }
        read_table(&mut info, table);
        if info.has_identity() {
            debug!(table = table.index, cedula = %info.cedula, "personal info table");
            source = Some(table);
            break;
        }
    }

    read_flat_text(&mut info, html);
    let rows = source.map(|t| t.rows.as_slice()).unwrap_or(&[]);
    derive_units(&mut info, rows);
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::table;
    use crate::parser::tables::segment;

    fn personal(rows: &[&[&str]], html: &str) -> PersonalInfo {
        let t = table(rows);
        extract(&[t], html)
    }

    #[test]
    fn unidad_academica_splits_into_department_and_school() {
        let info = personal(
            &[
                &["CEDULA", "1 APELLIDO", "2 APELLIDO", "NOMBRE", "UNIDAD ACADEMICA"],
                &["123456", "PEREZ", "GOMEZ", "JUAN", "ESCUELA INGENIERIA DE SISTEMAS"],
            ],
            "",
        );
        assert_eq!(info.cedula, "123456");
        assert_eq!(info.apellido1, "PEREZ");
        assert_eq!(info.apellido2, "GOMEZ");
        assert_eq!(info.departamento, "ESCUELA");
        assert_eq!(info.escuela, "INGENIERIA DE SISTEMAS");
        assert_eq!(info.nombre_completo(), "JUAN PEREZ GOMEZ");
    }

    #[test]
    fn unidad_academica_wins_over_labeled_department() {
        let info = personal(
            &[
                &["CEDULA", "1 APELLIDO", "2 APELLIDO", "NOMBRE", "UNIDAD ACADEMICA"],
                &["123456", "PEREZ", "GOMEZ", "JUAN", "ESCUELA INGENIERIA DE SISTEMAS"],
                &["VINCULACION", "CATEGORIA"],
                &["NOMBRADO", "ASOCIADO"],
                &["DEPARTAMENTO", "DEPARTAMENTO DE FISICA"],
                &["ESCUELA:", "ESCUELA DE CIENCIAS"],
            ],
            "",
        );
        assert_eq!(info.departamento, "ESCUELA");
        assert_eq!(info.escuela, "INGENIERIA DE SISTEMAS");
    }

    #[test]
    fn second_block_and_labels() {
        let info = personal(
            &[
                &["CEDULA", "APELLIDOS", "NOMBRE"],
                &["16.789.012", "PEREZ", "JUAN"],
                &["VINCULACION", "CATEGORIA", "DEDICACION", "NIVEL ALCANZADO", "CENTRO COSTO"],
                &["NOMBRADO", "ASOCIADO", "TIEMPO COMPLETO", "DOCTORADO", "7101"],
                &["CARGO", "PROFESOR TITULAR"],
                &["DEPARTAMENTO:", "DEPARTAMENTO DE FISICA"],
            ],
            "",
        );
        assert_eq!(info.cedula, "16789012");
        assert_eq!(info.vinculacion, "NOMBRADO");
        assert_eq!(info.dedicacion, "TIEMPO COMPLETO");
        assert_eq!(info.nivel_alcanzado, "DOCTORADO");
        assert_eq!(info.centro_costo, "7101");
        assert_eq!(info.cargo, "PROFESOR TITULAR");
        assert_eq!(info.departamento, "FISICA");
    }

    #[test]
    fn positional_row_three() {
        let info = personal(
            &[
                &["CEDULA", "NOMBRE"],
                &["123456", "JUAN"],
                &["", "", "", "", ""],
                &["OCASIONAL", "AUXILIAR", "MEDIO TIEMPO", "MAESTRIA", "7200"],
            ],
            "",
        );
        assert_eq!(info.vinculacion, "OCASIONAL");
        assert_eq!(info.categoria, "AUXILIAR");
        assert_eq!(info.centro_costo, "7200");
    }

    #[test]
    fn flat_text_fills_gaps_only() {
        let html = "<input name=x value='VINCULACION=CONTRATISTA'>Categoría:&nbsp;TITULAR";
        let info = personal(
            &[
                &["CEDULA", "NOMBRE"],
                &["123456", "JUAN"],
                &["VINCULACION"],
                &["NOMBRADO"],
            ],
            html,
        );
        assert_eq!(info.vinculacion, "NOMBRADO");
        assert_eq!(info.categoria, "TITULAR");
    }

    #[test]
    fn department_from_unit_column_without_header() {
        let info = personal(
            &[
                &["CEDULA", "1 APELLIDO", "2 APELLIDO", "NOMBRE", "SEDE"],
                &["123456", "PEREZ", "GOMEZ", "JUAN", "DEPARTAMENTO DE QUIMICA"],
            ],
            "",
        );
        assert_eq!(info.departamento, "QUIMICA");
        assert_eq!(info.escuela, "");
    }

    #[test]
    fn skips_tables_without_identity() {
        let html = "<table><tr><td>CEDULA</td><td>NOMBRE</td></tr></table>\
                    <table><tr><td>CEDULA</td><td>NOMBRE</td></tr><tr><td>99887766</td><td>ANA</td></tr></table>";
        let tables = segment(html);
        let info = extract(&tables, html);
        assert_eq!(info.cedula, "99887766");
        assert_eq!(info.nombre, "ANA");
    }

    #[test]
    fn no_personal_table() {
        let info = extract(&[], "");
        assert!(!info.has_identity());
    }

    #[test]
    fn unit_prefixes() {
        assert_eq!(normalize_unit("Departamento de Física"), "FÍSICA");
        assert_eq!(normalize_unit("ESCUELA DE INGENIERIA CIVIL"), "INGENIERIA CIVIL");
        assert_eq!(normalize_unit("DEPTO. MATEMATICAS"), "MATEMATICAS");
        assert_eq!(normalize_unit("BIOLOGIA"), "BIOLOGIA");
    }
}
