use std::collections::HashSet;

use tracing::debug;

use super::classify::GenericFamily;
use crate::records::{Activity, ActivityRecord, GenericActivity, PersonalInfo, TeachingActivity};

impl GenericFamily {
    /// Output label; doubles as the `actividad` value of the family.
    pub fn label(self) -> &'static str {
        match self {
            GenericFamily::Extension => "extensión",
            GenericFamily::Intellectual => "intelectuales o artísticas",
            GenericFamily::Administrative => "administrativas",
            GenericFamily::Complementary => "complementarias",
            GenericFamily::Commission => "comisión",
        }
    }
}

/// Drop later copies of teaching rows sharing code, name, group and type.
/// Rows with neither code nor name are never treated as duplicates. Order is
/// kept and the first occurrence wins.
pub fn dedup_teaching(activities: Vec<Activity>) -> Vec<Activity> {
    let mut seen: HashSet<String> = HashSet::new();
    activities
        .into_iter()
        .filter(|activity| {
            let Activity::Teaching(t) = activity else {
                return true;
            };
            if t.codigo.is_empty() && t.nombre_asignatura.is_empty() {
                return true;
            }
            let fresh = seen.insert(t.dedup_key());
            if !fresh {
                debug!(key = %t.dedup_key(), "duplicate subject dropped");
            }
            fresh
        })
        .collect()
}

fn teaching_name(t: &TeachingActivity) -> String {
    match (t.codigo.is_empty(), t.nombre_asignatura.is_empty()) {
        (false, false) => format!("{} - {}", t.codigo, t.nombre_asignatura),
        (false, true) => t.codigo.clone(),
        _ => t.nombre_asignatura.clone(),
    }
}

fn teaching_detail(t: &TeachingActivity) -> String {
    match (t.tipo.is_empty(), t.grupo.is_empty()) {
        (_, true) => t.tipo.clone(),
        (false, false) => format!("{} - Grupo {}", t.tipo, t.grupo),
        (true, false) => format!("Grupo {}", t.grupo),
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Flatten one typed activity into an output row carrying the page's
/// identity block.
pub fn to_record(activity: &Activity, personal: &PersonalInfo, periodo: &str) -> ActivityRecord {
    let (tipo_actividad, categoria, nombre_actividad, actividad) = match activity {
        Activity::Teaching(t) => (
            t.track.label().to_string(),
            personal.categoria.clone(),
            teaching_name(t),
            teaching_detail(t),
        ),
        Activity::Research(r) => (
            "Investigación".to_string(),
            personal.categoria.clone(),
            r.nombre_proyecto.clone(),
            or_default(&r.aprobado_por, "Proyecto de Investigación"),
        ),
        Activity::Thesis(t) => (
            "Dirección de Tesis".to_string(),
            personal.categoria.clone(),
            t.titulo.clone(),
            if t.codigo_estudiante.is_empty() {
                "Tesis".to_string()
            } else {
                format!("Estudiante: {}", t.codigo_estudiante)
            },
        ),
        Activity::Generic(g) => {
            let label = g.family().label().to_string();
            let categoria = match g {
                GenericActivity::Comision { tipo_comision, .. } => tipo_comision.clone(),
                _ => personal.categoria.clone(),
            };
            (label.clone(), categoria, g.label().to_string(), label)
        }
    };

    ActivityRecord {
        cedula: personal.cedula.clone(),
        nombre_profesor: personal.nombre_completo(),
        escuela: personal.escuela.clone(),
        departamento: personal.departamento.clone(),
        tipo_actividad,
        categoria,
        nombre_actividad,
        numero_horas: activity.horas(),
        periodo: periodo.to_string(),
        actividad,
        vinculacion: personal.vinculacion.clone(),
        dedicacion: personal.dedicacion.clone(),
        nivel: personal.nivel_alcanzado.clone(),
    }
}

pub fn assemble(activities: &[Activity], personal: &PersonalInfo, periodo: &str) -> Vec<ActivityRecord> {
    activities
        .iter()
        .map(|a| to_record(a, personal, periodo))
        .collect()
}
