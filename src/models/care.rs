use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar date format used in the plant document (`2024-01-31`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareKind {
    Water,
    Fertilize,
}

impl CareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareKind::Water => "Water",
            CareKind::Fertilize => "Fertilize",
        }
    }

    /// Gerund used in notification text ("need watering today").
    pub fn verb(&self) -> &'static str {
        match self {
            CareKind::Water => "watering",
            CareKind::Fertilize => "fertilizing",
        }
    }

    /// Key of the due list in HTTP responses.
    pub fn response_key(&self) -> &'static str {
        match self {
            CareKind::Water => "needsWater",
            CareKind::Fertilize => "needsFertilizer",
        }
    }

    pub fn all() -> &'static [CareKind] {
        &[CareKind::Water, CareKind::Fertilize]
    }
}

impl std::fmt::Display for CareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored "last done" date, classified for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareDate<'a> {
    /// Field absent or empty: the action was never recorded.
    Never,
    On(NaiveDate),
    /// Present but not a `YYYY-MM-DD` date.
    Unreadable(&'a str),
}

impl<'a> CareDate<'a> {
    pub fn classify(raw: Option<&'a str>) -> Self {
        match raw {
            None | Some("") => CareDate::Never,
            Some(s) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(date) => CareDate::On(date),
                Err(_) => CareDate::Unreadable(s),
            },
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
