use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

static FRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<frame\b[^>]*\bname\s*=\s*["']?mainFrame_[^>]*>"#).unwrap()
});
static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']?([^"'\s>]+)"#).unwrap());

/// What a saved portal page turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Data,
    Login,
    Error,
}

impl PageKind {
    pub fn detect(html: &str) -> PageKind {
        let upper = html.to_uppercase();
        let has_password = upper.contains("TYPE=\"PASSWORD\"")
            || upper.contains("TYPE='PASSWORD'")
            || upper.contains("TYPE=PASSWORD");
        if has_password && !upper.contains("HORAS SEMESTRE") {
            PageKind::Login
        } else if upper.contains("INTERNAL SERVER ERROR")
            || upper.contains("SERVICE UNAVAILABLE")
            || upper.contains("ERROR 500")
        {
            PageKind::Error
        } else {
            PageKind::Data
        }
    }
}

/// Portal pages are served as ISO-8859-1; UTF-8 files saved by hand are
/// accepted too.
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}

/// `src` of the main frame when the page is a frameset.
pub fn frame_source(html: &str) -> Option<String> {
    let tag = FRAME_RE.find(html)?;
    SRC_RE
        .captures(tag.as_str())
        .map(|caps| caps[1].to_string())
}

fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(decode(bytes))
}

/// Read a saved page, following a frameset to its main frame when that file
/// sits next to it.
pub fn load(path: &Path) -> Result<String> {
    let html = read_page(path)?;
    let Some(src) = frame_source(&html) else {
        return Ok(html);
    };

    let name = src.rsplit('/').next().unwrap_or(&src);
    let name = name.split('?').next().unwrap_or(name);
    let frame: PathBuf = path.parent().unwrap_or(Path::new(".")).join(name);
    if frame.is_file() {
        debug!(page = %path.display(), frame = %frame.display(), "following main frame");
        read_page(&frame)
    } else {
        warn!(page = %path.display(), %src, "frameset without saved main frame");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_fallback() {
        let bytes = b"DIRECCI\xd3N".to_vec();
        assert_eq!(decode(bytes), "DIRECCIÓN");
        assert_eq!(decode("AÑO".as_bytes().to_vec()), "AÑO");
    }

    #[test]
    fn finds_main_frame() {
        let html = r#"<frameset rows="80,*"><frame name="top" src="top.html">
            <frame src="asignacion.php?cedula=1" name="mainFrame_"></frameset>"#;
        assert_eq!(frame_source(html).as_deref(), Some("asignacion.php?cedula=1"));
        assert_eq!(frame_source("<table></table>"), None);
    }

    #[test]
    fn page_kinds() {
        let login = r#"<form><input type="password" name="clave"></form>"#;
        assert_eq!(PageKind::detect(login), PageKind::Login);
        assert_eq!(
            PageKind::detect("<h1>Internal Server Error</h1>"),
            PageKind::Error
        );
        assert_eq!(
            PageKind::detect("<table><tr><td>HORAS SEMESTRE</td></tr></table>"),
            PageKind::Data
        );
    }

    #[test]
    fn loads_fixture_without_frames() {
        let html = load(Path::new("tests/fixtures/portal.html")).unwrap();
        assert!(html.contains("PREGRADO"));
    }
}
