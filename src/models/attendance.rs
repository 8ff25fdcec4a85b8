//! Attendance models.
//!
//! An [`AttendanceRecord`] covers one user on one calendar day. Its state is
//! derived from which timestamps are present.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Admin review status of an attendance day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Awaiting admin review.
    #[default]
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

/// The attendance mark assigned by the timing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceMark {
    /// Arrived on time.
    Present,
    /// Arrived after the late deadline.
    Late,
    /// Counted as absent (repeated lateness or too few hours).
    Absent,
}

/// Where an attendance day is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceState {
    /// No record exists for the day.
    None,
    /// Logged in, not yet logged out.
    CheckedIn,
    /// Logged in and out.
    CheckedOut,
}

/// One user's attendance for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The user this record belongs to.
    pub user_id: String,
    /// The attendance day.
    pub date: NaiveDate,
    /// When the user checked in.
    pub login_time: NaiveDateTime,
    /// When the user checked out; `None` while the day is open.
    #[serde(default)]
    pub logout_time: Option<NaiveDateTime>,
    /// Admin review status.
    #[serde(default)]
    pub status: ApprovalStatus,
    /// Attendance mark from the timing rules.
    pub mark: AttendanceMark,
    /// Comma separated remarks explaining the mark.
    #[serde(default)]
    pub remarks: String,
    /// Month-to-date corrections used by this user when the record last changed.
    #[serde(default)]
    pub correction_count: u32,
}

impl AttendanceRecord {
    /// Returns true while the user has not checked out.
    pub fn is_open(&self) -> bool {
        self.logout_time.is_none()
    }

    /// Returns the lifecycle state of this record.
    pub fn state(&self) -> AttendanceState {
        if self.is_open() {
            AttendanceState::CheckedIn
        } else {
            AttendanceState::CheckedOut
        }
    }

    /// Appends a remark, separating it from existing remarks with a comma.
    pub fn add_remark(&mut self, remark: &str) {
        if self.remarks.is_empty() {
            self.remarks = remark.to_string();
        } else {
            self.remarks = format!("{}, {}", self.remarks, remark);
        }
    }
}

/// Returns the state of an optional record; a missing record is [`AttendanceState::None`].
pub fn state_of(record: Option<&AttendanceRecord>) -> AttendanceState {
    record.map_or(AttendanceState::None, AttendanceRecord::state)
}

/// Month-scoped count of attendance corrections for one user.
///
/// The counter resets whenever it is consulted for a different calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionCounter {
    /// Calendar year of the counted month.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Corrections used in that month.
    pub used: u32,
}

impl CorrectionCounter {
    /// Creates an empty counter for the month containing `date`.
    pub fn for_month_of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            used: 0,
        }
    }

    /// Returns the counter applicable to `date`, resetting it if the month changed.
    pub fn rolled_to(self, date: NaiveDate) -> Self {
        if self.year == date.year() && self.month == date.month() {
            self
        } else {
            Self::for_month_of(date)
        }
    }
}
