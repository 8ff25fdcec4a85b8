//! Leave approval against balances.
//!
//! Each leave type draws only from its own pool. A pool never goes below
//! zero: whatever the pool cannot cover is reported as loss-of-pay days.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};

/// How a number of leave days was covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveDraw {
    /// Days covered by the pool.
    pub paid_days: Decimal,
    /// Days the pool could not cover.
    pub unpaid_days: Decimal,
}

/// Draws `days` from one pool of `balance`, never taking it below zero.
pub fn draw_from_pool(balance: &mut LeaveBalance, leave_type: LeaveType, days: Decimal) -> LeaveDraw {
    let pool = balance.pool_mut(leave_type);
    let available = (*pool).max(Decimal::ZERO);
    let paid_days = days.min(available);
    *pool = available - paid_days;

    LeaveDraw {
        paid_days,
        unpaid_days: days - paid_days,
    }
}

/// The result of approving a leave request.
#[derive(Debug, Clone)]
pub struct LeaveApprovalResult {
    /// The request, now APPROVED.
    pub request: LeaveRequest,
    /// The balance after deduction.
    pub balance: LeaveBalance,
    /// Days the request consumed.
    pub days: Decimal,
    /// Days covered by the balance.
    pub paid_days: Decimal,
    /// Days not covered by the balance.
    pub loss_of_pay_days: Decimal,
    /// The audit step recording the approval.
    pub audit_step: AuditStep,
}

/// The result of rejecting a leave request.
#[derive(Debug, Clone)]
pub struct LeaveRejectionResult {
    /// The request, now REJECTED.
    pub request: LeaveRequest,
    /// The audit step recording the rejection.
    pub audit_step: AuditStep,
}

fn ensure_reviewable(request: &LeaveRequest) -> EngineResult<()> {
    if request.status != LeaveStatus::Pending {
        return Err(EngineError::InvalidLeaveRequest {
            request_id: request.id.clone(),
            message: format!("request is already {:?}", request.status),
        });
    }
    if request.end_date < request.start_date {
        return Err(EngineError::InvalidLeaveRequest {
            request_id: request.id.clone(),
            message: "end date precedes start date".to_string(),
        });
    }
    Ok(())
}

/// Approves a pending leave request and deducts it from the matching pool.
///
/// A full-day request for one day deducts exactly 1; a half-day request
/// deducts 0.5. If the pool is short, it is emptied and the remainder is
/// returned as `loss_of_pay_days`.
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::approve_leave;
/// use institute_engine::models::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let request = LeaveRequest {
///     id: "lv_001".to_string(),
///     user_id: "emp_001".to_string(),
///     leave_type: LeaveType::Cl,
///     start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     is_half_day: false,
///     status: LeaveStatus::Pending,
///     reason: "personal".to_string(),
/// };
/// let balance = LeaveBalance { cl: Decimal::from(3), ..Default::default() };
///
/// let result = approve_leave(&request, balance, 1).unwrap();
/// assert_eq!(result.balance.cl, Decimal::from(2));
/// ```
pub fn approve_leave(
    request: &LeaveRequest,
    balance: LeaveBalance,
    step_number: u32,
) -> EngineResult<LeaveApprovalResult> {
    ensure_reviewable(request)?;

    let days = request.days();
    let before = balance.get(request.leave_type);
    let mut updated_balance = balance;
    let draw = draw_from_pool(&mut updated_balance, request.leave_type, days);
    let after = updated_balance.get(request.leave_type);

    let mut approved = request.clone();
    approved.status = LeaveStatus::Approved;

    let reasoning = if draw.unpaid_days > Decimal::ZERO {
        format!(
            "{} {} day(s) requested, {} available; {} paid, {} loss of pay",
            days.normalize(),
            request.leave_type,
            before.normalize(),
            draw.paid_days.normalize(),
            draw.unpaid_days.normalize()
        )
    } else {
        format!(
            "{} - {} {} day(s) = {}",
            before.normalize(),
            days.normalize(),
            request.leave_type,
            after.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_approval".to_string(),
        rule_name: "Leave Approval".to_string(),
        input: serde_json::json!({
            "request_id": request.id,
            "leave_type": request.leave_type,
            "is_half_day": request.is_half_day,
            "days": days.normalize().to_string(),
            "balance_before": before.normalize().to_string()
        }),
        output: serde_json::json!({
            "balance_after": after.normalize().to_string(),
            "paid_days": draw.paid_days.normalize().to_string(),
            "loss_of_pay_days": draw.unpaid_days.normalize().to_string()
        }),
        reasoning,
    };

    Ok(LeaveApprovalResult {
        request: approved,
        balance: updated_balance,
        days,
        paid_days: draw.paid_days,
        loss_of_pay_days: draw.unpaid_days,
        audit_step,
    })
}

/// Rejects a pending leave request. Balances are untouched.
pub fn reject_leave(request: &LeaveRequest, step_number: u32) -> EngineResult<LeaveRejectionResult> {
    ensure_reviewable(request)?;

    let mut rejected = request.clone();
    rejected.status = LeaveStatus::Rejected;

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_rejection".to_string(),
        rule_name: "Leave Rejection".to_string(),
        input: serde_json::json!({
            "request_id": request.id,
            "leave_type": request.leave_type
        }),
        output: serde_json::json!({
            "status": rejected.status
        }),
        reasoning: "Leave rejected; no balance deducted".to_string(),
    };

    Ok(LeaveRejectionResult {
        request: rejected,
        audit_step,
    })
}
