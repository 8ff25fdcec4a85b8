//! Response types for the Institute Rules Engine API.
//!
//! This module defines the success bodies returned by each endpoint and the
//! error response structures for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{BillingDuration, PricingBand};
use crate::error::EngineError;
use crate::models::{
    AttendanceRecord, AuditTrace, CorrectionCounter, InvoiceItem, InvoiceTotals, LeaveBalance,
    LeaveRequest, SalarySlip,
};

/// Body of `POST /invoices/totals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceTotalsResponse {
    /// The computed totals.
    pub totals: InvoiceTotals,
    /// How the totals were reached.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /invoices/price-items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedItemsResponse {
    /// The invoice lines with derived amounts and end dates.
    pub items: Vec<InvoiceItem>,
    /// Pricing steps and lines left for manual pricing.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /internships/price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipPriceResponse {
    /// The domain as named in the pricing table.
    pub domain: String,
    /// The parsed month count.
    pub months: u32,
    /// The band that was applied.
    pub band: PricingBand,
    /// The fee.
    pub price: Decimal,
    /// How the price was reached.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /billing/end-date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndDateResponse {
    /// The first day of the period.
    pub start_date: NaiveDate,
    /// The parsed period length.
    pub duration: BillingDuration,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

/// Body of the check-in, check-out and review endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceResponse {
    /// The record after the transition.
    pub record: AttendanceRecord,
    /// How the mark was reached.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /attendance/resume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeResponse {
    /// The reopened record.
    pub record: AttendanceRecord,
    /// The caller's correction counter after this resume.
    pub corrections: CorrectionCounter,
    /// The correction that was recorded.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /leaves/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApprovalResponse {
    /// The approved request.
    pub request: LeaveRequest,
    /// The balance after deduction.
    pub balance: LeaveBalance,
    /// Days the request consumed.
    pub days: Decimal,
    /// Days covered by the balance.
    pub paid_days: Decimal,
    /// Days not covered by the balance.
    pub loss_of_pay_days: Decimal,
    /// The deduction that was recorded.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /leaves/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRejectionResponse {
    /// The rejected request.
    pub request: LeaveRequest,
    /// The rejection that was recorded.
    pub audit_trace: AuditTrace,
}

/// Body of `POST /leaves/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalanceResponse {
    /// The user the balance belongs to.
    pub user_id: String,
    /// The calendar year.
    pub year: i32,
    /// Available leave per pool.
    pub balance: LeaveBalance,
    /// Months that accrued leave.
    pub months_accrued: u32,
    /// Approved leave taken in the year.
    pub used: LeaveBalance,
    /// How the balance was reached.
    pub audit_trace: AuditTrace,
}

/// Month-end leave figures reported alongside a salary slip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveSettlement {
    /// Balances before the month's leave.
    pub opening: LeaveBalance,
    /// Balances after the month's leave.
    pub closing: LeaveBalance,
    /// Leave days taken in the month.
    pub leaves_taken: Decimal,
    /// Days not covered by any balance.
    pub loss_of_pay_days: Decimal,
}

/// Body of `POST /payroll/salary-slip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySlipResponse {
    /// The computed slip.
    pub slip: SalarySlip,
    /// The leave settlement that produced the loss-of-pay days.
    pub leave_settlement: LeaveSettlement,
    /// How the slip was reached.
    pub audit_trace: AuditTrace,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// A 400 response for a request body that parsed but is not acceptable.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::validation_error(message))
    }

    /// A 401 response for a request without a usable identity.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    /// A 403 response for an identity without the required role.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                )
            }
            EngineError::DomainNotFound { domain } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "DOMAIN_NOT_FOUND",
                    message,
                    format!("'{}' is not in the internship pricing table", domain),
                ),
            ),
            EngineError::InvalidDuration(_) => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_DURATION", message),
            ),
            EngineError::InvalidAttendanceTransition { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("INVALID_ATTENDANCE_TRANSITION", message),
            ),
            EngineError::CorrectionLimitReached { limit, .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CORRECTION_LIMIT_REACHED",
                    message,
                    format!("At most {} attendance corrections are allowed per month", limit),
                ),
            ),
            EngineError::InvalidLeaveRequest { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_LEAVE_REQUEST", message),
            ),
            EngineError::InvalidPeriod { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            EngineError::CalculationError { message } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}
