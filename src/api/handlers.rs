//! HTTP request handlers for the Institute Rules Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Datelike, Local};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    approve_leave, calculate_invoice_totals, calculate_leave_balance, check_in, check_out,
    count_late_marks, derive_end_date, generate_salary_slip, parse_billing_duration,
    price_invoice_items, reject_leave, resolve_internship_price, resume_day, review_attendance,
    settle_monthly_leave,
};
use crate::error::EngineError;
use crate::models::{AttendanceRecord, AuditStep, AuditTrace, AuditWarning, CorrectionCounter, Invoice, LeaveRequest};

use super::auth::{AuthContext, Role};
use super::request::{
    ApproveLeaveRequest, CheckInRequest, CheckOutRequest, EndDateRequest, InternshipPriceRequest,
    LeaveBalanceRequest, RejectLeaveRequest, ResumeRequest, ReviewAttendanceRequest,
    SalarySlipRequest, convert_leaves,
};
use super::response::{
    ApiError, ApiErrorResponse, AttendanceResponse, EndDateResponse, InternshipPriceResponse,
    InvoiceTotalsResponse, LeaveApprovalResponse, LeaveBalanceResponse, LeaveRejectionResponse,
    LeaveSettlement, PricedItemsResponse, ResumeResponse, SalarySlipResponse,
};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Roles whose attendance is tracked.
const ATTENDANCE_ROLES: &[Role] = &[Role::Admin, Role::Employee, Role::Student];

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/invoices/totals", post(invoice_totals_handler))
        .route("/invoices/price-items", post(price_items_handler))
        .route("/internships/price", post(internship_price_handler))
        .route("/billing/end-date", post(billing_end_date_handler))
        .route("/attendance/check-in", post(check_in_handler))
        .route("/attendance/check-out", post(check_out_handler))
        .route("/attendance/resume", post(resume_handler))
        .route("/attendance/review", post(review_attendance_handler))
        .route("/leaves/approve", post(approve_leave_handler))
        .route("/leaves/reject", post(reject_leave_handler))
        .route("/leaves/balance", post(leave_balance_handler))
        .route("/payroll/salary-slip", post(salary_slip_handler))
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::new(StatusCode::BAD_REQUEST, error))
}

/// Logs a failed rule and converts it into an error response.
fn engine_failure(correlation_id: Uuid, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Calculation failed"
    );
    err.into()
}

fn ok_json<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn audit_trace(steps: Vec<AuditStep>, warnings: Vec<AuditWarning>, started: Instant) -> AuditTrace {
    AuditTrace {
        steps,
        warnings,
        duration_us: started.elapsed().as_micros() as u64,
    }
}

/// Rejects attendance records that belong to someone other than the caller.
fn ensure_own_record(
    auth: &AuthContext,
    record: Option<&AttendanceRecord>,
) -> Result<(), ApiErrorResponse> {
    match record {
        Some(r) if r.user_id != auth.user_id => Err(ApiErrorResponse::forbidden(format!(
            "Attendance record belongs to '{}'",
            r.user_id
        ))),
        _ => Ok(()),
    }
}

/// Handler for POST /invoices/totals.
async fn invoice_totals_handler(
    State(state): State<AppState>,
    payload: Result<Json<Invoice>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice totals request");
    let invoice = parse_body(payload, correlation_id)?;

    let started = Instant::now();
    let result = calculate_invoice_totals(&invoice, state.config().config().tax(), 1)
        .map_err(|err| engine_failure(correlation_id, err))?;
    let trace = audit_trace(result.audit_steps, result.warnings, started);

    info!(
        correlation_id = %correlation_id,
        items_count = invoice.items.len(),
        total = %result.totals.total,
        warnings = trace.warnings.len(),
        duration_us = trace.duration_us,
        "Invoice totals calculated"
    );
    Ok(ok_json(InvoiceTotalsResponse {
        totals: result.totals,
        audit_trace: trace,
    }))
}

/// Handler for POST /invoices/price-items.
async fn price_items_handler(
    State(state): State<AppState>,
    payload: Result<Json<Invoice>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice pricing request");
    let invoice = parse_body(payload, correlation_id)?;

    let started = Instant::now();
    let result = price_invoice_items(&invoice, state.config().config().pricing(), 1);
    let trace = audit_trace(result.audit_steps, result.warnings, started);

    info!(
        correlation_id = %correlation_id,
        priced = trace.steps.len(),
        manual = trace.warnings.len(),
        "Invoice items priced"
    );
    Ok(ok_json(PricedItemsResponse {
        items: result.items,
        audit_trace: trace,
    }))
}

/// Handler for POST /internships/price.
async fn internship_price_handler(
    State(state): State<AppState>,
    payload: Result<Json<InternshipPriceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing internship price request");
    let request = parse_body(payload, correlation_id)?;

    let started = Instant::now();
    let result = resolve_internship_price(
        &request.domain,
        &request.duration,
        state.config().config().pricing(),
        1,
    )
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        domain = %result.domain,
        months = result.months,
        price = %result.price,
        "Internship price resolved"
    );
    Ok(ok_json(InternshipPriceResponse {
        domain: result.domain,
        months: result.months,
        band: result.band,
        price: result.price,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /billing/end-date.
async fn billing_end_date_handler(
    payload: Result<Json<EndDateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;

    let duration = parse_billing_duration(&request.duration)
        .map_err(|err| engine_failure(correlation_id, err.into()))?;
    let end_date = derive_end_date(request.start_date, &request.duration)
        .map_err(|err| engine_failure(correlation_id, err.into()))?;

    info!(
        correlation_id = %correlation_id,
        start_date = %request.start_date,
        end_date = %end_date,
        "Billing end date derived"
    );
    Ok(ok_json(EndDateResponse {
        start_date: request.start_date,
        duration,
        end_date,
    }))
}

/// Handler for POST /attendance/check-in.
async fn check_in_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %auth.user_id, "Processing check-in");
    auth.require_role(ATTENDANCE_ROLES)?;
    let request = parse_body(payload, correlation_id)?;
    ensure_own_record(&auth, request.existing.as_ref())?;

    let started = Instant::now();
    let now = request.at.unwrap_or_else(|| Local::now().naive_local());
    let prior_late_marks = count_late_marks(&request.history, &auth.user_id, now.date());
    let result = check_in(
        request.existing.as_ref(),
        &auth.user_id,
        now,
        prior_late_marks,
        state.config().attendance(),
        1,
    )
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        user_id = %auth.user_id,
        mark = ?result.record.mark,
        "Checked in"
    );
    Ok(ok_json(AttendanceResponse {
        record: result.record,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /attendance/check-out.
async fn check_out_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CheckOutRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %auth.user_id, "Processing check-out");
    auth.require_role(ATTENDANCE_ROLES)?;
    let request = parse_body(payload, correlation_id)?;
    ensure_own_record(&auth, request.record.as_ref())?;

    let started = Instant::now();
    let now = request.at.unwrap_or_else(|| Local::now().naive_local());
    let result = check_out(
        request.record.as_ref(),
        &auth.user_id,
        now,
        state.config().attendance(),
        1,
    )
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        user_id = %auth.user_id,
        mark = ?result.record.mark,
        "Checked out"
    );
    Ok(ok_json(AttendanceResponse {
        record: result.record,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /attendance/resume.
async fn resume_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<ResumeRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %auth.user_id, "Processing resume");
    auth.require_role(ATTENDANCE_ROLES)?;
    let request = parse_body(payload, correlation_id)?;
    ensure_own_record(&auth, request.record.as_ref())?;

    let started = Instant::now();
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let corrections = request
        .corrections
        .unwrap_or_else(|| CorrectionCounter::for_month_of(today));
    let result = resume_day(
        request.record.as_ref(),
        &auth.user_id,
        today,
        corrections,
        state.config().attendance(),
        1,
    )
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        user_id = %auth.user_id,
        corrections_used = result.corrections.used,
        "Attendance day resumed"
    );
    Ok(ok_json(ResumeResponse {
        record: result.record,
        corrections: result.corrections,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /attendance/review.
async fn review_attendance_handler(
    auth: AuthContext,
    payload: Result<Json<ReviewAttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    auth.require_admin()?;
    let request = parse_body(payload, correlation_id)?;

    let started = Instant::now();
    let result = review_attendance(
        &request.record,
        request.decision,
        request.remark.as_deref(),
        1,
    )
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        reviewer = %auth.user_id,
        user_id = %result.record.user_id,
        status = ?result.record.status,
        "Attendance reviewed"
    );
    Ok(ok_json(AttendanceResponse {
        record: result.record,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /leaves/approve.
async fn approve_leave_handler(
    auth: AuthContext,
    payload: Result<Json<ApproveLeaveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    auth.require_admin()?;
    let request = parse_body(payload, correlation_id)?;
    let leave = LeaveRequest::try_from(request.request).map_err(ApiErrorResponse::bad_request)?;

    let started = Instant::now();
    let result = approve_leave(&leave, request.balance, 1)
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        reviewer = %auth.user_id,
        request_id = %leave.id,
        days = %result.days,
        loss_of_pay_days = %result.loss_of_pay_days,
        "Leave approved"
    );
    Ok(ok_json(LeaveApprovalResponse {
        request: result.request,
        balance: result.balance,
        days: result.days,
        paid_days: result.paid_days,
        loss_of_pay_days: result.loss_of_pay_days,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /leaves/reject.
async fn reject_leave_handler(
    auth: AuthContext,
    payload: Result<Json<RejectLeaveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    auth.require_admin()?;
    let request = parse_body(payload, correlation_id)?;
    let leave = LeaveRequest::try_from(request.request).map_err(ApiErrorResponse::bad_request)?;

    let started = Instant::now();
    let result = reject_leave(&leave, 1).map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        reviewer = %auth.user_id,
        request_id = %leave.id,
        "Leave rejected"
    );
    Ok(ok_json(LeaveRejectionResponse {
        request: result.request,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /leaves/balance.
///
/// Callers may query their own balance; admins may query anyone's.
async fn leave_balance_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<LeaveBalanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(payload, correlation_id)?;
    let user_id = request.user_id.unwrap_or_else(|| auth.user_id.clone());
    auth.require_self_or_admin(&user_id)?;

    let leaves: Vec<LeaveRequest> = convert_leaves(request.leaves)
        .map_err(ApiErrorResponse::bad_request)?
        .into_iter()
        .filter(|l| l.user_id == user_id)
        .collect();
    let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());
    let year = request.year.unwrap_or(as_of.year());

    let started = Instant::now();
    let result = calculate_leave_balance(
        request.joining_date,
        year,
        as_of,
        request.opening_pl,
        &leaves,
        state.config().leave(),
        1,
    );

    info!(
        correlation_id = %correlation_id,
        user_id = %user_id,
        year,
        months_accrued = result.months_accrued,
        "Leave balance calculated"
    );
    Ok(ok_json(LeaveBalanceResponse {
        user_id,
        year,
        balance: result.balance,
        months_accrued: result.months_accrued,
        used: result.used,
        audit_trace: audit_trace(vec![result.audit_step], Vec::new(), started),
    }))
}

/// Handler for POST /payroll/salary-slip.
///
/// Settles the month's leave, then builds the slip with the resulting
/// loss-of-pay days.
async fn salary_slip_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<SalarySlipRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary slip request");
    auth.require_admin()?;
    let request = parse_body(payload, correlation_id)?;

    let leaves: Vec<LeaveRequest> = convert_leaves(request.leaves)
        .map_err(ApiErrorResponse::bad_request)?
        .into_iter()
        .filter(|l| l.user_id == request.employee_id)
        .collect();
    let config = state.config().config();
    let structure = request
        .structure
        .unwrap_or_else(|| config.payroll().default_salary.clone());

    let started = Instant::now();
    let mut trace = AuditTrace::default();
    let settlement = settle_monthly_leave(
        request.joining_date,
        request.year,
        request.month,
        request.opening_pl,
        &leaves,
        config.leave(),
        trace.next_step_number(),
    )
    .map_err(|err| engine_failure(correlation_id, err))?;
    trace.steps.push(settlement.audit_step);
    let slip = generate_salary_slip(
        &request.employee_id,
        request.year,
        request.month,
        &structure,
        settlement.loss_of_pay_days,
        trace.next_step_number(),
    )
    .map_err(|err| engine_failure(correlation_id, err))?;
    trace.steps.push(slip.audit_step);
    trace.duration_us = started.elapsed().as_micros() as u64;

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        loss_of_pay_days = %settlement.loss_of_pay_days,
        net_pay = %slip.slip.net_pay,
        "Salary slip generated"
    );
    Ok(ok_json(SalarySlipResponse {
        slip: slip.slip,
        leave_settlement: LeaveSettlement {
            opening: settlement.opening,
            closing: settlement.closing,
            leaves_taken: settlement.leaves_taken,
            loss_of_pay_days: settlement.loss_of_pay_days,
        },
        audit_trace: trace,
    }))
}
