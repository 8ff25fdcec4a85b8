//! Leave models.
//!
//! Leave is drawn from three independent pools (casual, sick and privilege).
//! Balances are kept as decimals so half-day leave is representable.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the three leave pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    /// Casual leave.
    Cl,
    /// Sick leave.
    Sl,
    /// Privilege leave.
    Pl,
}

impl LeaveType {
    /// Returns the short code used in requests ("CL", "SL", "PL").
    pub fn code(&self) -> &'static str {
        match self {
            LeaveType::Cl => "CL",
            LeaveType::Sl => "SL",
            LeaveType::Pl => "PL",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A leave type string together with its half-day suffix.
///
/// Requests arrive as strings such as `"CL"`, `"sl"` or `"CL_HALF"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveKind {
    /// The pool the leave is drawn from.
    pub leave_type: LeaveType,
    /// Whether the string carried a half-day marker.
    pub is_half_day: bool,
}

impl FromStr for LeaveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let leave_type = if upper.starts_with("CL") {
            LeaveType::Cl
        } else if upper.starts_with("SL") {
            LeaveType::Sl
        } else if upper.starts_with("PL") {
            LeaveType::Pl
        } else {
            return Err(format!("unknown leave type '{}'", s));
        };

        Ok(LeaveKind {
            leave_type,
            is_half_day: upper.contains("HALF"),
        })
    }
}

/// Review status of a leave request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved and deducted.
    Approved,
    /// Rejected; nothing deducted.
    Rejected,
}

/// A request for leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier of the request.
    pub id: String,
    /// The requesting user.
    pub user_id: String,
    /// The pool to draw from.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Whether only half of `start_date` is taken.
    #[serde(default)]
    pub is_half_day: bool,
    /// Review status.
    #[serde(default)]
    pub status: LeaveStatus,
    /// The reason given by the user.
    #[serde(default)]
    pub reason: String,
}

impl LeaveRequest {
    /// Returns the number of days this request consumes.
    ///
    /// A half-day request consumes 0.5 regardless of its date range; otherwise
    /// the range is counted inclusively.
    ///
    /// # Examples
    ///
    /// ```
    /// use institute_engine::models::{LeaveRequest, LeaveStatus, LeaveType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let request = LeaveRequest {
    ///     id: "lv_001".to_string(),
    ///     user_id: "emp_001".to_string(),
    ///     leave_type: LeaveType::Cl,
    ///     start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
    ///     is_half_day: false,
    ///     status: LeaveStatus::Pending,
    ///     reason: "family function".to_string(),
    /// };
    /// assert_eq!(request.days(), Decimal::from(3));
    /// ```
    pub fn days(&self) -> Decimal {
        if self.is_half_day {
            return Decimal::new(5, 1);
        }
        let span = (self.end_date - self.start_date).num_days().abs() + 1;
        Decimal::from(span)
    }
}

/// Available leave per pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Casual leave days.
    pub cl: Decimal,
    /// Sick leave days.
    pub sl: Decimal,
    /// Privilege leave days.
    pub pl: Decimal,
}

impl LeaveBalance {
    /// Returns the balance of one pool.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        match leave_type {
            LeaveType::Cl => self.cl,
            LeaveType::Sl => self.sl,
            LeaveType::Pl => self.pl,
        }
    }

    /// Returns a mutable reference to one pool.
    pub fn pool_mut(&mut self, leave_type: LeaveType) -> &mut Decimal {
        match leave_type {
            LeaveType::Cl => &mut self.cl,
            LeaveType::Sl => &mut self.sl,
            LeaveType::Pl => &mut self.pl,
        }
    }
}
