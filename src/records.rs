use serde::Serialize;

use crate::parser::classify::GenericFamily;

// ── Identity ──

/// Identity and affiliation block of the professor the page belongs to.
/// Fields are write-once: the first non-empty value wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonalInfo {
    pub cedula: String,
    pub nombre: String,
    pub apellido1: String,
    pub apellido2: String,
    pub unidad_academica: String,
    pub escuela: String,
    pub departamento: String,
    pub vinculacion: String,
    pub categoria: String,
    pub dedicacion: String,
    pub nivel_alcanzado: String,
    pub cargo: String,
    pub centro_costo: String,
}

impl PersonalInfo {
    /// `NOMBRE APELLIDO1 APELLIDO2`, skipping empty parts.
    pub fn nombre_completo(&self) -> String {
        [&self.nombre, &self.apellido1, &self.apellido2]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_identity(&self) -> bool {
        !self.cedula.is_empty() || !self.nombre.is_empty()
    }
}

/// Fill `slot` only while it is still empty.
pub fn set_once(slot: &mut String, value: &str) -> bool {
    let value = value.trim();
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
        true
    } else {
        false
    }
}

// ── Typed activities ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Pregrado,
    Postgrado,
}

impl Track {
    pub fn label(self) -> &'static str {
        match self {
            Track::Pregrado => "Pregrado",
            Track::Postgrado => "Postgrado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeachingActivity {
    pub codigo: String,
    pub nombre_asignatura: String,
    pub grupo: String,
    pub tipo: String,
    pub horas_semestre: f64,
    pub cred: String,
    pub porc: String,
    pub frec: String,
    pub inten: String,
    pub track: Track,
}

impl TeachingActivity {
    /// Lower-cased `code|name|group|type`.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.codigo, self.nombre_asignatura, self.grupo, self.tipo
        )
        .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchActivity {
    pub codigo: String,
    pub nombre_proyecto: String,
    pub aprobado_por: String,
    pub horas_semestre: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThesisActivity {
    pub titulo: String,
    pub codigo_estudiante: String,
    pub horas_semestre: f64,
}

/// One case per service family; each keeps the columns its table carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum GenericActivity {
    Extension {
        tipo: String,
        nombre: String,
        horas: f64,
    },
    Intelectual {
        tipo: String,
        titulo: String,
        horas: f64,
    },
    Administrativa {
        cargo: String,
        descripcion: String,
        horas: f64,
    },
    Complementaria {
        participacion: String,
        nombre: String,
        horas: f64,
    },
    Comision {
        tipo_comision: String,
        descripcion: String,
        horas: f64,
    },
}

impl GenericActivity {
    pub fn family(&self) -> GenericFamily {
        match self {
            GenericActivity::Extension { .. } => GenericFamily::Extension,
            GenericActivity::Intelectual { .. } => GenericFamily::Intellectual,
            GenericActivity::Administrativa { .. } => GenericFamily::Administrative,
            GenericActivity::Complementaria { .. } => GenericFamily::Complementary,
            GenericActivity::Comision { .. } => GenericFamily::Commission,
        }
    }

    pub fn horas(&self) -> f64 {
        match self {
            GenericActivity::Extension { horas, .. }
            | GenericActivity::Intelectual { horas, .. }
            | GenericActivity::Administrativa { horas, .. }
            | GenericActivity::Complementaria { horas, .. }
            | GenericActivity::Comision { horas, .. } => *horas,
        }
    }

    /// Name, title or description that identifies the activity.
    pub fn label(&self) -> &str {
        match self {
            GenericActivity::Extension { nombre, .. } => nombre,
            GenericActivity::Intelectual { titulo, .. } => titulo,
            GenericActivity::Administrativa { cargo, descripcion, .. } => {
                if cargo.is_empty() {
                    descripcion
                } else {
                    cargo
                }
            }
            GenericActivity::Complementaria {
                participacion,
                nombre,
                ..
            } => {
                if participacion.is_empty() {
                    nombre
                } else {
                    participacion
                }
            }
            GenericActivity::Comision { descripcion, .. } => descripcion,
        }
    }

    /// Row-level category column, when the family has one.
    pub fn category(&self) -> Option<&str> {
        match self {
            GenericActivity::Extension { tipo, .. } | GenericActivity::Intelectual { tipo, .. } => {
                Some(tipo.as_str())
            }
            GenericActivity::Comision { tipo_comision, .. } => Some(tipo_comision.as_str()),
            _ => None,
        }
    }

    /// At least one of name, title or description resolved.
    pub fn is_valid(&self) -> bool {
        match self {
            GenericActivity::Administrativa { cargo, descripcion, .. } => {
                !cargo.is_empty() || !descripcion.is_empty()
            }
            _ => !self.label().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    Teaching(TeachingActivity),
    Research(ResearchActivity),
    Thesis(ThesisActivity),
    Generic(GenericActivity),
}

impl Activity {
    pub fn horas(&self) -> f64 {
        match self {
            Activity::Teaching(t) => t.horas_semestre,
            Activity::Research(r) => r.horas_semestre,
            Activity::Thesis(t) => t.horas_semestre,
            Activity::Generic(g) => g.horas(),
        }
    }
}

// ── Unified output ──

/// One output row. Field order is the column order downstream consumers read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub cedula: String,
    pub nombre_profesor: String,
    pub escuela: String,
    pub departamento: String,
    pub tipo_actividad: String,
    pub categoria: String,
    pub nombre_actividad: String,
    pub numero_horas: f64,
    pub periodo: String,
    pub actividad: String,
    pub vinculacion: String,
    pub dedicacion: String,
    pub nivel: String,
}

impl ActivityRecord {
    pub const COLUMNS: [&'static str; 13] = [
        "cedula",
        "nombre_profesor",
        "escuela",
        "departamento",
        "tipo_actividad",
        "categoria",
        "nombre_actividad",
        "numero_horas",
        "periodo",
        "actividad",
        "vinculacion",
        "dedicacion",
        "nivel",
    ];

    /// Values in `COLUMNS` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.cedula.clone(),
            self.nombre_profesor.clone(),
            self.escuela.clone(),
            self.departamento.clone(),
            self.tipo_actividad.clone(),
            self.categoria.clone(),
            self.nombre_actividad.clone(),
            self.numero_horas.to_string(),
            self.periodo.clone(),
            self.actividad.clone(),
            self.vinculacion.clone(),
            self.dedicacion.clone(),
            self.nivel.clone(),
        ]
    }
}
