use std::sync::LazyLock;

use regex::Regex;

static NUMBER_OR_PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d*)?\s*%?$").unwrap());
static CODE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{5,8}[A-Za-z]?$").unwrap());

/// Names shorter than this are never picked by the fallback scan.
pub const MIN_NAME_LEN: usize = 4;

/// Collapse whitespace runs to one space and drop control characters.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Upper-case and drop diacritics so keyword tests see `INVESTIGACION`
/// whether the page wrote `Investigación` or `investigacion`.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

/// `64`, `64.00`, `32,5`, `12%`: a cell that holds a quantity, not a label.
pub fn is_numeric_token(s: &str) -> bool {
    NUMBER_OR_PERCENT_RE.is_match(s.trim())
}

/// Course/project codes such as `745010C` or `M12345`.
pub fn is_code_shaped(s: &str) -> bool {
    let s = s.trim();
    CODE_SHAPE_RE.is_match(s) && s.chars().any(|c| c.is_ascii_digit())
}

/// Strip a trailing percentage (`FISICA I 100%` -> `FISICA I`) and collapse
/// whitespace. A value that is only a percentage is left alone so validity
/// checks can still reject it.
pub fn sanitize_name(s: &str) -> String {
    let s = normalize_ws(s);
    let Some(body) = s.strip_suffix('%') else {
        return s;
    };
    let body = body.trim_end();
    let head = body.trim_end_matches(|c: char| c.is_ascii_digit());
    if head.len() == body.len() || head.trim().is_empty() {
        return s;
    }
    head.trim_end().to_string()
}
