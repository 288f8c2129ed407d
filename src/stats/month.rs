use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

/// Calendar month used to filter transactions by their sale date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month(u8);

impl Month {
    pub fn new(n: u8) -> Option<Self> {
        (1..=12).contains(&n).then_some(Self(n))
    }

    /// Parses the `month` query parameter. Accepts `1`-`12` with or without
    /// a leading zero; anything else, including absence, is rejected.
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        lazy_static! {
            static ref MONTH_RE: Regex = Regex::new(r"^(0?[1-9]|1[0-2])$").unwrap();
        }
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::InvalidMonth("month query parameter is required".into()))?;
        raw.parse::<u8>()
            .ok()
            .filter(|_| MONTH_RE.is_match(raw))
            .and_then(Self::new)
            .ok_or_else(|| {
                ApiError::InvalidMonth(format!("month must be between 01 and 12, got {raw:?}"))
            })
    }
}

/// Two-digit form, as stored in the month component of `dateOfSale`.
impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}
