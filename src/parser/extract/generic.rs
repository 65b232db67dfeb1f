use super::{dropped, DataRows, Field, HeaderMap, RowAt};
use crate::parser::classify::GenericFamily;
use crate::parser::tables::TableRow;
use crate::quality::Diagnostics;
use crate::records::GenericActivity;

const TIPO: Field = Field::new(&["TIPO"], &["COMISION"]);
const NOMBRE: Field = Field::new(&["NOMBRE"], &[]);
const TITULO: Field = Field::new(&["TITULO", "NOMBRE"], &[]);
const CARGO: Field = Field::new(&["CARGO"], &["DESCRIPCION"]);
const DESCRIPCION_CARGO: Field = Field::new(&["DESCRIPCION DEL CARGO", "DESCRIPCION"], &[]);
const PARTICIPACION: Field = Field::new(&["PARTICIPACION EN", "PARTICIPACION"], &[]);
const NOMBRE_COMPLEMENTARIA: Field = Field::new(&["NOMBRE"], &["PARTICIPACION"]);
const TIPO_COMISION: Field = Field::new(&["TIPO DE COMISION", "TIPO"], &[]);
const DESCRIPCION: Field = Field::new(&["DESCRIPCION"], &["TIPO"]);

fn read_row(
    family: GenericFamily,
    header: &HeaderMap,
    row: &TableRow,
    at: RowAt,
    diags: &mut Diagnostics,
) -> GenericActivity {
    match family {
        GenericFamily::Extension => GenericActivity::Extension {
            tipo: header.text(row, &TIPO),
            nombre: header.label(row, &NOMBRE),
            horas: header.hours(row, at, diags),
        },
        GenericFamily::Intellectual => GenericActivity::Intelectual {
            tipo: header.text(row, &TIPO),
            titulo: header.label(row, &TITULO),
            horas: header.hours(row, at, diags),
        },
        GenericFamily::Administrative => GenericActivity::Administrativa {
            cargo: header.label(row, &CARGO),
            descripcion: header.text(row, &DESCRIPCION_CARGO),
            horas: header.hours(row, at, diags),
        },
        GenericFamily::Complementary => GenericActivity::Complementaria {
            participacion: header.label(row, &PARTICIPACION),
            nombre: header.text(row, &NOMBRE_COMPLEMENTARIA),
            horas: header.hours(row, at, diags),
        },
        GenericFamily::Commission => GenericActivity::Comision {
            tipo_comision: header.text(row, &TIPO_COMISION),
            descripcion: header.label(row, &DESCRIPCION),
            horas: header.hours(row, at, diags),
        },
    }
}

/// Rows of one service family. A row survives if its name, title or
/// description resolved.
pub fn extract(
    family: GenericFamily,
    rows: &DataRows<'_>,
    diags: &mut Diagnostics,
) -> Vec<GenericActivity> {
    let mut items = Vec::new();
    for (at, row) in rows.iter() {
        let activity = read_row(family, &rows.header, row, at, diags);
        if activity.is_valid() {
            items.push(activity);
        } else {
            dropped(diags, at, "service activity", row);
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::table;

    fn run(family: GenericFamily, rows: &[&[&str]]) -> Vec<GenericActivity> {
        let t = table(rows);
        let mut diags = Diagnostics::new();
        extract(family, &DataRows::new(&t, 0), &mut diags)
    }

    #[test]
    fn extension_rows() {
        let items = run(
            GenericFamily::Extension,
            &[
                &["TIPO", "NOMBRE", "HORAS SEMESTRE"],
                &["CURSO", "DIPLOMADO EN ANALITICA DE DATOS", "40.00"],
            ],
        );
        assert_eq!(
            items,
            vec![GenericActivity::Extension {
                tipo: "CURSO".into(),
                nombre: "DIPLOMADO EN ANALITICA DE DATOS".into(),
                horas: 40.0,
            }]
        );
    }

    #[test]
    fn administrative_rows() {
        let items = run(
            GenericFamily::Administrative,
            &[
                &["CARGO", "DESCRIPCION DEL CARGO", "HORAS SEMESTRE"],
                &["DIRECTOR DE PROGRAMA", "DIRECCION DEL PROGRAMA ACADEMICO", "200.00"],
            ],
        );
        assert_eq!(items[0].label(), "DIRECTOR DE PROGRAMA");
        assert_eq!(items[0].horas(), 200.0);
    }

    #[test]
    fn commission_keeps_type_as_category() {
        let items = run(
            GenericFamily::Commission,
            &[
                &["TIPO DE COMISION", "DESCRIPCION", "HORAS SEMESTRE"],
                &["ESTUDIOS", "COMISION DE ESTUDIOS DOCTORALES", "100.00"],
            ],
        );
        assert_eq!(items[0].category(), Some("ESTUDIOS"));
        assert_eq!(items[0].label(), "COMISION DE ESTUDIOS DOCTORALES");
    }

    #[test]
    fn complementary_and_intellectual() {
        let items = run(
            GenericFamily::Complementary,
            &[&["PARTICIPACION EN", "HORAS SEMESTRE"], &["COMITE DE PROGRAMA ACADEMICO", "20.00"]],
        );
        assert_eq!(items[0].label(), "COMITE DE PROGRAMA ACADEMICO");

        let items = run(
            GenericFamily::Intellectual,
            &[
                &["TIPO", "TITULO", "HORAS SEMESTRE"],
                &["ARTICULO", "REDES BAYESIANAS APLICADAS", "30.00"],
            ],
        );
        assert_eq!(items[0].label(), "REDES BAYESIANAS APLICADAS");
        assert_eq!(items[0].category(), Some("ARTICULO"));
    }

    #[test]
    fn rows_without_label_are_dropped() {
        let items = run(
            GenericFamily::Extension,
            &[&["TIPO", "NOMBRE", "HORAS SEMESTRE"], &["", "", "40.00"]],
        );
        assert!(items.is_empty());
    }
}
