//! Context resolution
//!
//! Derives the reporting period and the bearer credential for a turn.
//! Neither resolver fails: bad input falls back to a default.

use crate::models::Tracker;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PERIOD_SLOT: &str = "period";
pub const TOKEN_SLOT: &str = "auth_token";
pub const TOKEN_METADATA_KEY: &str = "token";

const BEARER_PREFIX: &str = "bearer ";

/// A calendar month, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Years before 1 are rejected
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if year < 1 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Strict `YYYY-MM` parse; month may be one or two digits
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.split_once('-')?;

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Self::new(year.parse().ok()?, month.parse().ok()?)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Resolve a raw period, falling back to the current month
pub fn resolve_period(raw: Option<&str>) -> Period {
    resolve_period_at(raw, Local::now().date_naive())
}

pub fn resolve_period_at(raw: Option<&str>, today: NaiveDate) -> Period {
    raw.and_then(Period::parse)
        .unwrap_or_else(|| Period::containing(today))
}

/// Resolve the bearer credential: slot, then message metadata, then default.
///
/// A leading `Bearer ` (any case) is stripped. The result may be empty.
pub fn resolve_token(tracker: &Tracker, default_token: &str) -> String {
    let token = tracker
        .slot_str(TOKEN_SLOT)
        .or_else(|| tracker.metadata_str(TOKEN_METADATA_KEY))
        .unwrap_or(default_token);

    strip_bearer(token).to_string()
}

fn strip_bearer(token: &str) -> &str {
    match token.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => &token[BEARER_PREFIX.len()..],
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn tracker_with(slot: Option<&str>, metadata: Option<&str>) -> Tracker {
        let mut tracker = Tracker {
            sender_id: "user-1".to_string(),
            ..Default::default()
        };
        if let Some(slot) = slot {
            tracker.slots.insert(TOKEN_SLOT.to_string(), json!(slot));
        }
        if let Some(token) = metadata {
            let mut meta = Map::new();
            meta.insert(TOKEN_METADATA_KEY.to_string(), Value::from(token));
            tracker.latest_message.metadata = Some(meta);
        }
        tracker
    }

    #[test]
    fn test_valid_period_is_identity() {
        for raw in ["2024-05", "1999-12", "2030-01"] {
            assert_eq!(resolve_period_at(Some(raw), today()).to_string(), raw);
        }
    }

    #[test]
    fn test_single_digit_month_is_padded() {
        assert_eq!(resolve_period_at(Some("2024-5"), today()).to_string(), "2024-05");
    }

    #[test]
    fn test_malformed_period_falls_back_to_current_month() {
        let cases = [
            None,
            Some(""),
            Some("May 2024"),
            Some("2024-13"),
            Some("2024-00"),
            Some("2024/05"),
            Some("24-05"),
            Some("2024-05-01"),
            Some("2024-"),
            Some("+024-05"),
            Some("0000-05"),
        ];

        for raw in cases {
            assert_eq!(
                resolve_period_at(raw, today()).to_string(),
                "2025-03",
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_resolve_period_uses_local_clock() {
        let expected = Local::now().format("%Y-%m").to_string();
        assert_eq!(resolve_period(Some("garbage")).to_string(), expected);
    }

    #[test]
    fn test_token_precedence() {
        let tracker = tracker_with(Some("slot-token"), Some("meta-token"));
        assert_eq!(resolve_token(&tracker, "default"), "slot-token");

        let tracker = tracker_with(None, Some("meta-token"));
        assert_eq!(resolve_token(&tracker, "default"), "meta-token");

        let tracker = tracker_with(None, None);
        assert_eq!(resolve_token(&tracker, "default"), "default");
    }

    #[test]
    fn test_empty_slot_falls_through() {
        let tracker = tracker_with(Some(""), Some("meta-token"));
        assert_eq!(resolve_token(&tracker, "default"), "meta-token");
    }

    #[test]
    fn test_bearer_prefix_stripped_any_case() {
        for raw in ["Bearer abc", "bearer abc", "BEARER abc", "bEaReR abc"] {
            let tracker = tracker_with(Some(raw), None);
            assert_eq!(resolve_token(&tracker, ""), "abc");
        }

        let tracker = tracker_with(None, None);
        assert_eq!(resolve_token(&tracker, "Bearer from-env"), "from-env");
    }

    #[test]
    fn test_no_token_anywhere_is_empty() {
        let tracker = tracker_with(None, None);
        assert_eq!(resolve_token(&tracker, ""), "");
    }

    #[test]
    fn test_non_ascii_token_is_left_alone() {
        let tracker = tracker_with(Some("béarer x"), None);
        assert_eq!(resolve_token(&tracker, ""), "béarer x");
    }
}
