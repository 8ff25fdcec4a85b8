//! Request types for the Institute Rules Engine API.
//!
//! The engine is stateless: requests carry the records a rule needs, and
//! responses return the updated records for the caller to store.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    ApprovalStatus, AttendanceRecord, CorrectionCounter, LeaveBalance, LeaveKind, LeaveRequest,
    LeaveStatus, SalaryStructure,
};

/// Request body for `POST /internships/price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipPriceRequest {
    /// The internship domain (e.g. "AI/ML").
    pub domain: String,
    /// Free-text duration (e.g. "3 Months").
    pub duration: String,
}

/// Request body for `POST /billing/end-date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndDateRequest {
    /// The first day of the billing period.
    pub start_date: NaiveDate,
    /// Free-text duration (e.g. "2 weeks").
    pub duration: String,
}

/// Request body for `POST /attendance/check-in`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// The check-in time; defaults to the server's local time.
    #[serde(default)]
    pub at: Option<NaiveDateTime>,
    /// The caller's record for the day, if one exists.
    #[serde(default)]
    pub existing: Option<AttendanceRecord>,
    /// The caller's earlier records this month, used for the late-strike rule.
    #[serde(default)]
    pub history: Vec<AttendanceRecord>,
}

/// Request body for `POST /attendance/check-out`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOutRequest {
    /// The check-out time; defaults to the server's local time.
    #[serde(default)]
    pub at: Option<NaiveDateTime>,
    /// The open record being closed.
    #[serde(default)]
    pub record: Option<AttendanceRecord>,
}

/// Request body for `POST /attendance/resume`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeRequest {
    /// Today's date; defaults to the server's local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// The checked-out record being reopened.
    #[serde(default)]
    pub record: Option<AttendanceRecord>,
    /// The caller's correction counter; an empty counter is assumed when absent.
    #[serde(default)]
    pub corrections: Option<CorrectionCounter>,
}

/// Request body for `POST /attendance/review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAttendanceRequest {
    /// The record under review.
    pub record: AttendanceRecord,
    /// APPROVED or REJECTED.
    pub decision: ApprovalStatus,
    /// An optional remark appended to the record.
    #[serde(default)]
    pub remark: Option<String>,
}

/// A leave request as submitted by a client.
///
/// `leave_type` accepts the short codes with an optional half-day suffix
/// (`"CL"`, `"sl"`, `"CL_HALF"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestBody {
    /// Unique identifier of the request.
    pub id: String,
    /// The requesting user.
    pub user_id: String,
    /// Leave type code.
    pub leave_type: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave; defaults to `start_date`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Whether only half a day is taken.
    #[serde(default)]
    pub is_half_day: bool,
    /// Review status.
    #[serde(default)]
    pub status: LeaveStatus,
    /// The reason given by the user.
    #[serde(default)]
    pub reason: String,
}

impl TryFrom<LeaveRequestBody> for LeaveRequest {
    type Error = String;

    fn try_from(body: LeaveRequestBody) -> Result<Self, Self::Error> {
        let kind: LeaveKind = body.leave_type.parse()?;
        Ok(LeaveRequest {
            id: body.id,
            user_id: body.user_id,
            leave_type: kind.leave_type,
            start_date: body.start_date,
            end_date: body.end_date.unwrap_or(body.start_date),
            is_half_day: body.is_half_day || kind.is_half_day,
            status: body.status,
            reason: body.reason,
        })
    }
}

/// Converts submitted leave requests, reporting the first one that does not parse.
pub fn convert_leaves(bodies: Vec<LeaveRequestBody>) -> Result<Vec<LeaveRequest>, String> {
    bodies.into_iter().map(LeaveRequest::try_from).collect()
}

/// Request body for `POST /leaves/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveLeaveRequest {
    /// The pending request.
    pub request: LeaveRequestBody,
    /// The requester's current balance.
    pub balance: LeaveBalance,
}

/// Request body for `POST /leaves/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectLeaveRequest {
    /// The pending request.
    pub request: LeaveRequestBody,
}

/// Request body for `POST /leaves/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalanceRequest {
    /// Whose balance to compute; defaults to the caller.
    #[serde(default)]
    pub user_id: Option<String>,
    /// When the user joined.
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
    /// The calendar year; defaults to the year of `as_of`.
    #[serde(default)]
    pub year: Option<i32>,
    /// The date the balance is computed for; defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Stored privilege leave.
    #[serde(default)]
    pub opening_pl: Decimal,
    /// The user's leave requests.
    #[serde(default)]
    pub leaves: Vec<LeaveRequestBody>,
}

/// Request body for `POST /payroll/salary-slip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySlipRequest {
    /// The employee being paid.
    pub employee_id: String,
    /// Payroll year.
    pub year: i32,
    /// Payroll month (1-12).
    pub month: u32,
    /// When the employee joined.
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
    /// Stored privilege leave.
    #[serde(default)]
    pub opening_pl: Decimal,
    /// The salary structure; the configured default when absent.
    #[serde(default)]
    pub structure: Option<SalaryStructure>,
    /// The employee's leave requests.
    #[serde(default)]
    pub leaves: Vec<LeaveRequestBody>,
}
