use super::{dropped, is_bare_number, DataRows, Field};
use crate::quality::Diagnostics;
use crate::records::ResearchActivity;

const CODIGO: Field = Field::new(&["CODIGO"], &["ESTUDIANTE"]);
const NOMBRE: Field = Field::new(
    &[
        "NOMBRE DEL PROYECTO",
        "NOMBRE DEL ANTEPROYECTO",
        "NOMBRE DEL ANTE PROYECTO",
        "ANTEPROYECTO",
        "PROYECTO",
        "NOMBRE",
    ],
    &["CODIGO", "APROBADO"],
);
const APROBADO: Field = Field::new(&["APROBADO POR", "APROBADO"], &[]);

pub fn extract(rows: &DataRows<'_>, diags: &mut Diagnostics) -> Vec<ResearchActivity> {
    let header = &rows.header;
    let mut items = Vec::new();

    for (at, row) in rows.iter() {
        let codigo = header.text(row, &CODIGO);
        let nombre_proyecto = header.label(row, &NOMBRE);
        if (codigo.is_empty() && nombre_proyecto.is_empty()) || is_bare_number(&nombre_proyecto) {
            dropped(diags, at, "research", row);
            continue;
        }
        items.push(ResearchActivity {
            aprobado_por: header.text(row, &APROBADO),
            horas_semestre: header.hours(row, at, diags),
            codigo,
            nombre_proyecto,
        });
    }

    items
}
