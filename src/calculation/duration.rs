//! Duration parsing for invoice lines.
//!
//! Durations arrive as free text typed into an invoice line ("3 Months",
//! "6", "2 weeks"). Pricing needs a whole number of months; billing periods
//! also accept weeks and days.

use std::sync::LazyLock;

use chrono::{Days, Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DurationParseError;

/// A billing period length parsed from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum BillingDuration {
    /// Calendar months.
    Months(u32),
    /// Weeks of seven days.
    Weeks(u32),
    /// Days.
    Days(u32),
}

static MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*month").expect("valid months pattern"));
static WEEKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*week").expect("valid weeks pattern"));
static DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*day").expect("valid days pattern"));
static BARE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\s*$").expect("valid count pattern"));
static LEADING_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)").expect("valid leading count pattern"));

/// Returns the digits captured by the first match of `re` in `text`.
fn capture_count<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_count(digits: &str, input: &str) -> Result<u32, DurationParseError> {
    let count: u32 = digits.parse().map_err(|_| DurationParseError::OutOfRange {
        input: input.to_string(),
    })?;
    if count == 0 {
        return Err(DurationParseError::Zero {
            input: input.to_string(),
        });
    }
    Ok(count)
}

/// Parses a free-text duration into a whole number of months.
///
/// Accepts `"<N> month(s)"` anywhere in the text (any case) or a bare
/// integer. Anything else is [`DurationParseError::Unrecognised`], so a
/// caller can leave the amount for manual entry; a parsed zero is reported
/// separately as [`DurationParseError::Zero`].
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::parse_duration_months;
///
/// assert_eq!(parse_duration_months("3 Months"), Ok(3));
/// assert_eq!(parse_duration_months("6"), Ok(6));
/// assert!(parse_duration_months("two months").is_err());
/// ```
pub fn parse_duration_months(text: &str) -> Result<u32, DurationParseError> {
    let digits = capture_count(&MONTHS_RE, text)
        .or_else(|| capture_count(&BARE_COUNT_RE, text))
        .ok_or_else(|| DurationParseError::Unrecognised {
            input: text.to_string(),
        })?;
    parse_count(digits, text)
}

/// Parses a billing period length.
///
/// Months take precedence over weeks, weeks over days. Text that starts with
/// a number but names no unit is read as months.
pub fn parse_billing_duration(text: &str) -> Result<BillingDuration, DurationParseError> {
    if let Some(digits) = capture_count(&MONTHS_RE, text) {
        return parse_count(digits, text).map(BillingDuration::Months);
    }
    if let Some(digits) = capture_count(&WEEKS_RE, text) {
        return parse_count(digits, text).map(BillingDuration::Weeks);
    }
    if let Some(digits) = capture_count(&DAYS_RE, text) {
        return parse_count(digits, text).map(BillingDuration::Days);
    }

    let digits = capture_count(&LEADING_COUNT_RE, text).ok_or_else(|| {
        DurationParseError::Unrecognised {
            input: text.to_string(),
        }
    })?;
    parse_count(digits, text).map(BillingDuration::Months)
}

/// Derives the last day of a billing period.
///
/// The end date is the start date advanced by the duration, minus one day,
/// so 1 January plus one month ends on 31 January. Month arithmetic clamps
/// to the end of shorter months.
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::derive_end_date;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// assert_eq!(
///     derive_end_date(start, "3 months"),
///     Ok(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap())
/// );
/// ```
pub fn derive_end_date(start: NaiveDate, text: &str) -> Result<NaiveDate, DurationParseError> {
    let out_of_range = || DurationParseError::OutOfRange {
        input: text.to_string(),
    };

    let advanced = match parse_billing_duration(text)? {
        BillingDuration::Months(n) => start.checked_add_months(Months::new(n)),
        BillingDuration::Weeks(n) => start.checked_add_days(Days::new(u64::from(n) * 7)),
        BillingDuration::Days(n) => start.checked_add_days(Days::new(u64::from(n))),
    }
    .ok_or_else(out_of_range)?;

    advanced.pred_opt().ok_or_else(out_of_range)
}
