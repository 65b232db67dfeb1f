use std::sync::LazyLock;

use regex::Regex;

use super::sections::Section;
use super::text::fold;
use crate::records::Track;

static POSTGRADO_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[7-9]\d{2,}$").unwrap());
static PREGRADO_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-5]\d{3,}$").unwrap());

const POSTGRADO_KEYWORDS: &[&str] = &[
    "MAESTRIA",
    "MAGISTER",
    "MASTER",
    "MAESTR",
    "DOCTORADO",
    "DOCTORAL",
    "PHD",
    "DOCTOR",
    "ESPECIALIZA",
    "POSTGRADO",
    "POSGRADO",
    "POST-GRADO",
    "POST GRADO",
];

const PREGRADO_KEYWORDS: &[&str] = &[
    "LICENCIATURA",
    "INGENIERIA",
    "BACHILLERATO",
    "TECNOLOGIA",
    "PROFESIONAL",
    "CARRERA",
    "PREGRADO",
];

impl Section {
    /// Track a teaching section asserts, if it is one.
    pub fn track(self) -> Option<Track> {
        match self {
            Section::Pregrado => Some(Track::Pregrado),
            Section::Postgrado => Some(Track::Postgrado),
            _ => None,
        }
    }
}

/// Undergraduate or graduate track of a subject with no section context.
/// Keywords in the name or type outrank the numeric code ranges.
pub fn classify_track(codigo: &str, nombre: &str, tipo: &str) -> Track {
    let text = fold(&format!("{nombre} {tipo}"));
    if POSTGRADO_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Track::Postgrado;
    }
    if PREGRADO_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Track::Pregrado;
    }
    code_range(codigo).unwrap_or(Track::Pregrado)
}

/// Track implied by the digits of a subject code once letters are removed.
fn code_range(codigo: &str) -> Option<Track> {
    let digits: String = codigo.chars().filter(|c| !c.is_alphabetic()).collect();
    let digits = digits.trim();
    if POSTGRADO_CODE_RE.is_match(digits) {
        Some(Track::Postgrado)
    } else if PREGRADO_CODE_RE.is_match(digits) {
        Some(Track::Pregrado)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_ranges() {
        assert_eq!(classify_track("745010C", "FUNDAMENTOS DE BASES DE DATOS", ""), Track::Postgrado);
        assert_eq!(classify_track("150010M", "SEMINARIO", ""), Track::Pregrado);
        assert_eq!(classify_track("00A", "TALLER", ""), Track::Pregrado);
        assert_eq!(code_range("750001C"), Some(Track::Postgrado));
        assert_eq!(code_range("1500"), Some(Track::Pregrado));
        assert_eq!(code_range("60"), None);
    }

    #[test]
    fn keywords_outrank_codes() {
        assert_eq!(
            classify_track("150010M", "MAESTRÍA EN INGENIERÍA - TRABAJO DE GRADO", ""),
            Track::Postgrado
        );
        assert_eq!(
            classify_track("750001C", "INGENIERIA DE SOFTWARE I", ""),
            Track::Pregrado
        );
        assert_eq!(classify_track("910000", "", "DOCTORADO"), Track::Postgrado);
    }

    #[test]
    fn graduate_keyword_beats_undergraduate_keyword() {
        assert_eq!(
            classify_track("320045M", "MAESTRIA EN INGENIERIA - TRABAJO DE GRADO", ""),
            Track::Postgrado
        );
    }

    #[test]
    fn section_tracks() {
        assert_eq!(Section::Pregrado.track(), Some(Track::Pregrado));
        assert_eq!(Section::Postgrado.track(), Some(Track::Postgrado));
        assert_eq!(Section::Tesis.track(), None);
    }
}
