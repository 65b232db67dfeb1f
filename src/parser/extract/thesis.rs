use super::{dropped, is_bare_number, DataRows, Field};
use crate::quality::Diagnostics;
use crate::records::ThesisActivity;

const CODIGO_ESTUDIANTE: Field = Field::new(&["CODIGO ESTUDIANTE", "CODIGO", "ESTUDIANTE"], &[]);
const TITULO: Field = Field::new(
    &["TITULO DE LA TESIS", "TITULO", "TESIS", "NOMBRE"],
    &["CODIGO", "ESTUDIANTE", "PLAN"],
);

pub fn extract(rows: &DataRows<'_>, diags: &mut Diagnostics) -> Vec<ThesisActivity> {
    let header = &rows.header;
    let mut items = Vec::new();

    for (at, row) in rows.iter() {
        let codigo_estudiante = header.text(row, &CODIGO_ESTUDIANTE);
        let titulo = header.label(row, &TITULO);
        if (codigo_estudiante.is_empty() && titulo.is_empty()) || is_bare_number(&titulo) {
            dropped(diags, at, "thesis", row);
            continue;
        }
        items.push(ThesisActivity {
            horas_semestre: header.hours(row, at, diags),
            titulo,
            codigo_estudiante,
        });
    }

    items
}
