use tracing::debug;

use super::{dropped, is_bare_number, DataRows, Field};
use crate::parser::track::classify_track;
use crate::quality::Diagnostics;
use crate::records::{TeachingActivity, Track};

const CODIGO: Field = Field::new(&["CODIGO ASIGNATURA", "CODIGO"], &["ESTUDIANTE"]);
const NOMBRE: Field = Field::new(
    &[
        "NOMBRE DE ASIGNATURA",
        "NOMBRE DE LA ASIGNATURA",
        "NOMBRE ASIGNATURA",
        "ASIGNATURA",
        "NOMBRE",
    ],
    &["CODIGO"],
);
const GRUPO: Field = Field::new(&["GRUPO", "GRP"], &[]);
const TIPO: Field = Field::new(&["TIPO"], &[]);
const CRED: Field = Field::new(&["CRED"], &[]);
const PORC: Field = Field::new(&["PORC", "%"], &[]);
const FREC: Field = Field::new(&["FREC"], &[]);
const INTEN: Field = Field::new(&["INTEN"], &[]);

/// Subject rows. A section-asserted track applies to every row; otherwise
/// each row is classified on its own.
pub fn extract(
    rows: &DataRows<'_>,
    forced_track: Option<Track>,
    diags: &mut Diagnostics,
) -> Vec<TeachingActivity> {
    let header = &rows.header;
    let mut items = Vec::new();

    for (at, row) in rows.iter() {
        let codigo = header.text(row, &CODIGO);
        let nombre = header.label(row, &NOMBRE);
        let grupo = header.text(row, &GRUPO);
        let tipo = header.text(row, &TIPO);

        if !is_valid(&codigo, &nombre) {
            dropped(diags, at, "subject", row);
            continue;
        }

        let horas_semestre = header.hours(row, at, diags);
        let track = forced_track.unwrap_or_else(|| classify_track(&codigo, &nombre, &tipo));
        debug!(table = at.table, row = at.row, %codigo, %nombre, ?track, "subject");

        items.push(TeachingActivity {
            cred: header.text(row, &CRED),
            porc: header.text(row, &PORC),
            frec: header.text(row, &FREC),
            inten: header.text(row, &INTEN),
            codigo,
            nombre_asignatura: nombre,
            grupo,
            tipo,
            horas_semestre,
            track,
        });
    }

    items
}

/// Code or name present and the name is not a bare quantity.
fn is_valid(codigo: &str, nombre: &str) -> bool {
    if codigo.is_empty() && nombre.is_empty() {
        return false;
    }
    !is_bare_number(nombre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::table;
    use crate::quality::DiagnosticKind;

    fn run(rows: &[&[&str]], forced: Option<Track>) -> (Vec<TeachingActivity>, Diagnostics) {
        let t = table(rows);
        let data = DataRows::new(&t, 0);
        let mut diags = Diagnostics::new();
        let items = extract(&data, forced, &mut diags);
        (items, diags)
    }

    #[test]
    fn basic_subject_row() {
        let (items, diags) = run(
            &[
                &["CODIGO", "NOMBRE DE ASIGNATURA", "HORAS SEMESTRE"],
                &["745010C", "FUNDAMENTOS DE BASES DE DATOS", "64.00"],
            ],
            None,
        );
        assert!(diags.is_empty());
        assert_eq!(items.len(), 1);
        let s = &items[0];
        assert_eq!(s.codigo, "745010C");
        assert_eq!(s.nombre_asignatura, "FUNDAMENTOS DE BASES DE DATOS");
        assert_eq!(s.horas_semestre, 64.0);
        assert_eq!(s.track, Track::Postgrado);
    }

    #[test]
    fn percent_name_row_is_dropped() {
        let (items, diags) = run(
            &[
                &["CODIGO", "NOMBRE DE ASIGNATURA", "HORAS SEMESTRE"],
                &["710020C", "12%", "30.00"],
            ],
            None,
        );
        assert!(items.is_empty());
        let diags = diags.into_vec();
        assert_eq!(diags[0].kind, DiagnosticKind::RowDropped);
    }

    #[test]
    fn forced_track_overrides_code() {
        let (items, _) = run(
            &[
                &["CODIGO", "GRUPO", "TIPO", "NOMBRE DE ASIGNATURA", "HORAS SEMESTRE"],
                &["750001C", "01", "TEORICA", "INTRODUCCION A LA PROGRAMACION", "64.00"],
            ],
            Some(Track::Pregrado),
        );
        assert_eq!(items[0].track, Track::Pregrado);
        assert_eq!(items[0].grupo, "01");
        assert_eq!(items[0].tipo, "TEORICA");
    }

    #[test]
    fn trailing_percent_is_stripped_from_names() {
        let (items, _) = run(
            &[
                &["CODIGO", "NOMBRE DE ASIGNATURA", "PORC", "HORAS SEMESTRE"],
                &["750002C", "ESTRUCTURAS DE DATOS 50%", "50", "32,5"],
            ],
            None,
        );
        assert_eq!(items[0].nombre_asignatura, "ESTRUCTURAS DE DATOS");
        assert_eq!(items[0].porc, "50");
        assert_eq!(items[0].horas_semestre, 32.5);
    }

    #[test]
    fn numeric_code_without_name_is_kept() {
        let (items, diags) = run(
            &[
                &["CODIGO", "NOMBRE DE ASIGNATURA", "HORAS SEMESTRE"],
                &["750001", "", "64.00"],
            ],
            None,
        );
        assert!(diags.is_empty());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].codigo, "750001");
        assert_eq!(items[0].nombre_asignatura, "");
        assert_eq!(items[0].horas_semestre, 64.0);
    }

    #[test]
    fn validity_rules() {
        assert!(is_valid("750001C", ""));
        assert!(is_valid("", "CALCULO"));
        assert!(!is_valid("", ""));
        assert!(!is_valid("750001C", "12%"));
        assert!(is_valid("750001", ""));
    }
}
