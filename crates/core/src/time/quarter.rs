use anyhow::Context;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar quarter, 1-indexed. Fixed regardless of year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub fn new(n: u8) -> Option<Self> {
        (1..=4).contains(&n).then_some(Self(n))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self((date.month0() / 3 + 1) as u8)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quarter {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quarter must be 1..=4 (got {value})"))
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Evaluation date for a request: the explicit argument when given, otherwise "today" at the
/// configured UTC offset.
pub fn resolve_eval_date(
    eval_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_hours: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = eval_date_arg.map(str::trim).filter(|s| !s.is_empty()) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("eval date must be YYYY-MM-DD (got {s:?})"));
    }

    let offset = chrono::FixedOffset::east_opt(utc_offset_hours * 3600)
        .context("invalid evaluation UTC offset")?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(Quarter::of(d(2026, 1, 1)).number(), 1);
        assert_eq!(Quarter::of(d(2026, 3, 31)).number(), 1);
        assert_eq!(Quarter::of(d(2026, 4, 1)).number(), 2);
        assert_eq!(Quarter::of(d(2026, 5, 15)).number(), 2);
        assert_eq!(Quarter::of(d(2026, 9, 30)).number(), 3);
        assert_eq!(Quarter::of(d(2026, 12, 31)).number(), 4);
        // Year does not matter.
        assert_eq!(Quarter::of(d(1999, 11, 2)), Quarter::of(d(2031, 10, 9)));
    }

    #[test]
    fn rejects_out_of_range_quarters() {
        assert!(Quarter::new(0).is_none());
        assert!(Quarter::new(5).is_none());
        assert!(serde_json::from_str::<Quarter>("7").is_err());
        assert_eq!(serde_json::from_str::<Quarter>("3").unwrap().to_string(), "Q3");
    }

    #[test]
    fn explicit_eval_date_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        let date = resolve_eval_date(Some("2026-05-20"), now, 0).unwrap();
        assert_eq!(date, d(2026, 5, 20));
        assert!(resolve_eval_date(Some("20/05/2026"), now, 0).is_err());
    }

    #[test]
    fn applies_utc_offset_when_defaulting() {
        // 2026-03-31 22:00 UTC is already April 1st at UTC+9.
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 22, 0, 0).unwrap();
        assert_eq!(resolve_eval_date(None, now, 0).unwrap(), d(2026, 3, 31));
        assert_eq!(resolve_eval_date(None, now, 9).unwrap(), d(2026, 4, 1));
        assert_eq!(resolve_eval_date(Some("  "), now, 9).unwrap(), d(2026, 4, 1));
    }
}
