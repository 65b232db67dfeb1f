use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})\s*-\s*0?([0-9])\s*$").unwrap());
static PERIOD_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\s*-\s*0?([12])\b").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid period {0:?}: expected YYYY-1 or YYYY-2")]
    InvalidPeriod(String),
    #[error("invalid cedula {0:?}: expected 7 to 10 digits")]
    InvalidCedula(String),
}

/// Academic term, `YYYY-1` or `YYYY-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period {
    pub year: u16,
    pub term: u8,
}

impl Period {
    /// Accepts `2024-1`, `2024 - 2`, `2024-02`.
    pub fn parse(s: &str) -> Result<Period, InputError> {
        let invalid = || InputError::InvalidPeriod(s.to_string());
        let caps = PERIOD_RE.captures(s).ok_or_else(invalid)?;
        let year: u16 = caps[1].parse().map_err(|_| invalid())?;
        let term: u8 = caps[2].parse().map_err(|_| invalid())?;
        if !(1..=2).contains(&term) {
            return Err(invalid());
        }
        Ok(Period { year, term })
    }
}

impl FromStr for Period {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.term)
    }
}

/// First period mentioned in free text, e.g. a page banner.
pub fn find_period(text: &str) -> Option<Period> {
    let caps = PERIOD_IN_TEXT_RE.captures(text)?;
    Some(Period {
        year: caps[1].parse().ok()?,
        term: caps[2].parse().ok()?,
    })
}

/// Drop the separators people type into IDs: spaces, dots, hyphens.
pub fn clean_cedula(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != '-')
        .collect()
}

pub fn validate_cedula(raw: &str) -> Result<String, InputError> {
    let cleaned = clean_cedula(raw);
    let ok = (7..=10).contains(&cleaned.len()) && cleaned.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(cleaned)
    } else {
        Err(InputError::InvalidCedula(raw.to_string()))
    }
}
