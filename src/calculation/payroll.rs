//! Monthly payroll: leave settlement and salary slips.
//!
//! Leave taken in the payroll month is settled against the balances accrued
//! up to the end of that month. Days no pool can cover become loss-of-pay
//! days, deducted pro rata from the fixed monthly pay.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, SalarySlip, SalaryStructure,
};

use super::invoice_totals::{checked_sum, overflow, round_half_up};
use super::leave_balance::draw_from_pool;

fn first_of_month(year: i32, month: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(EngineError::InvalidPeriod { year, month })
}

/// Returns the number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> EngineResult<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    Ok((next - first).num_days() as u32)
}

/// Counts the months from the joining month through the payroll month, inclusive.
///
/// Returns zero when the user joined after the payroll month.
pub fn months_worked_through(joining_date: NaiveDate, year: i32, month: u32) -> u32 {
    let months = (year - joining_date.year()) * 12 + month as i32 - joining_date.month() as i32 + 1;
    months.max(0) as u32
}

/// The result of settling a month's leave.
#[derive(Debug, Clone)]
pub struct LeaveSettlementResult {
    /// Balances available before the month's leave.
    pub opening: LeaveBalance,
    /// Balances left after the month's leave.
    pub closing: LeaveBalance,
    /// Total leave days starting in the month.
    pub leaves_taken: Decimal,
    /// Days not covered by any balance.
    pub loss_of_pay_days: Decimal,
    /// The audit step recording the settlement.
    pub audit_step: AuditStep,
}

/// Settles the approved leave of one payroll month.
///
/// # Arguments
///
/// * `joining_date` - When the employee joined; `None` accrues from 1 January of `year`
/// * `year`, `month` - The payroll month
/// * `opening_pl` - Stored privilege leave
/// * `leaves` - The employee's leave requests; only APPROVED ones are used
/// * `policy` - The accrual rates
/// * `step_number` - The step number for audit trail sequencing
///
/// CL and SL accrue for every month worked through the end of the payroll
/// month. Leave starting before the month reduces the opening balance; leave
/// starting in the month is settled in start-date order.
pub fn settle_monthly_leave(
    joining_date: Option<NaiveDate>,
    year: i32,
    month: u32,
    opening_pl: Decimal,
    leaves: &[LeaveRequest],
    policy: &LeavePolicy,
    step_number: u32,
) -> EngineResult<LeaveSettlementResult> {
    let month_start = first_of_month(year, month)?;
    let joining = joining_date.unwrap_or(first_of_month(year, 1)?);
    let months = months_worked_through(joining, year, month);

    let mut opening = LeaveBalance {
        cl: policy.cl_per_month * Decimal::from(months),
        sl: policy.sl_per_month * Decimal::from(months),
        pl: opening_pl,
    };

    let approved = leaves.iter().filter(|l| l.status == LeaveStatus::Approved);

    let mut this_month: Vec<&LeaveRequest> = Vec::new();
    for leave in approved {
        let start = leave.start_date;
        if start.year() == year && start.month() == month {
            this_month.push(leave);
        } else if start < month_start {
            let pool = opening.pool_mut(leave.leave_type);
            *pool = pool.saturating_sub(leave.days());
        }
    }
    this_month.sort_by_key(|l| l.start_date);
    for leave_type in [LeaveType::Cl, LeaveType::Sl, LeaveType::Pl] {
        let pool = opening.pool_mut(leave_type);
        *pool = (*pool).max(Decimal::ZERO);
    }

    let mut closing = opening;
    let mut leaves_taken = Decimal::ZERO;
    let mut loss_of_pay_days = Decimal::ZERO;
    for leave in &this_month {
        let days = leave.days();
        leaves_taken += days;
        loss_of_pay_days += draw_from_pool(&mut closing, leave.leave_type, days).unpaid_days;
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "monthly_leave_settlement".to_string(),
        rule_name: "Monthly Leave Settlement".to_string(),
        input: serde_json::json!({
            "period": format!("{}-{:02}", year, month),
            "months_worked": months,
            "opening_cl": opening.cl.normalize().to_string(),
            "opening_sl": opening.sl.normalize().to_string(),
            "opening_pl": opening.pl.normalize().to_string(),
            "leaves_this_month": this_month.len()
        }),
        output: serde_json::json!({
            "closing_cl": closing.cl.normalize().to_string(),
            "closing_sl": closing.sl.normalize().to_string(),
            "closing_pl": closing.pl.normalize().to_string(),
            "leaves_taken": leaves_taken.normalize().to_string(),
            "loss_of_pay_days": loss_of_pay_days.normalize().to_string()
        }),
        reasoning: format!(
            "{} day(s) of leave in {}-{:02}; {} not covered by balances",
            leaves_taken.normalize(),
            year,
            month,
            loss_of_pay_days.normalize()
        ),
    };

    Ok(LeaveSettlementResult {
        opening,
        closing,
        leaves_taken,
        loss_of_pay_days,
        audit_step,
    })
}

/// Calculates the pay deducted for loss-of-pay days.
///
/// `round(lop_days x (basic + hra + special) / days_in_month)`
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::calculate_leave_deduction;
/// use institute_engine::models::SalaryStructure;
/// use rust_decimal::Decimal;
///
/// let structure = SalaryStructure {
///     basic: Decimal::from(15000),
///     hra: Decimal::from(6000),
///     special_allowance: Decimal::from(4000),
///     ..Default::default()
/// };
/// // 25000 / 30 days in April 2026 x 2 days
/// let deduction = calculate_leave_deduction(&structure, Decimal::from(2), 2026, 4).unwrap();
/// assert_eq!(deduction, Decimal::from(1667));
/// ```
pub fn calculate_leave_deduction(
    structure: &SalaryStructure,
    loss_of_pay_days: Decimal,
    year: i32,
    month: u32,
) -> EngineResult<Decimal> {
    let days = days_in_month(year, month)?;
    let per_day = structure
        .monthly_fixed_pay()
        .ok_or_else(|| overflow("Monthly fixed pay"))?
        / Decimal::from(days);
    let deduction = loss_of_pay_days
        .checked_mul(per_day)
        .ok_or_else(|| overflow("Leave deduction"))?;
    Ok(round_half_up(deduction))
}

/// The result of generating a salary slip.
#[derive(Debug, Clone)]
pub struct SalarySlipResult {
    /// The computed slip.
    pub slip: SalarySlip,
    /// The audit step recording the computation.
    pub audit_step: AuditStep,
}

/// Generates a salary slip for one employee and month.
pub fn generate_salary_slip(
    employee_id: &str,
    year: i32,
    month: u32,
    structure: &SalaryStructure,
    loss_of_pay_days: Decimal,
    step_number: u32,
) -> EngineResult<SalarySlipResult> {
    let leave_deduction = calculate_leave_deduction(structure, loss_of_pay_days, year, month)?;

    let total_earnings = checked_sum(
        [
            structure.basic,
            structure.hra,
            structure.special_allowance,
            structure.conveyance,
            structure.medical,
            structure.bonus,
        ],
        "Total earnings",
    )?;
    let total_deductions = checked_sum(
        [
            structure.pf,
            structure.professional_tax,
            structure.tds,
            structure.loan,
            structure.other_deductions,
            leave_deduction,
        ],
        "Total deductions",
    )?;
    let net_pay = total_earnings
        .checked_sub(total_deductions)
        .ok_or_else(|| overflow("Net pay"))?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "salary_slip".to_string(),
        rule_name: "Salary Slip".to_string(),
        input: serde_json::json!({
            "employee_id": employee_id,
            "period": format!("{}-{:02}", year, month),
            "loss_of_pay_days": loss_of_pay_days.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_earnings": total_earnings.normalize().to_string(),
            "leave_deduction": leave_deduction.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
            "net_pay": net_pay.normalize().to_string()
        }),
        reasoning: format!(
            "{} earnings - {} deductions (incl. {} leave deduction) = {}",
            total_earnings.normalize(),
            total_deductions.normalize(),
            leave_deduction.normalize(),
            net_pay.normalize()
        ),
    };

    Ok(SalarySlipResult {
        slip: SalarySlip {
            employee_id: employee_id.to_string(),
            year,
            month,
            structure: structure.clone(),
            loss_of_pay_days,
            leave_deduction,
            total_earnings,
            total_deductions,
            net_pay,
        },
        audit_step,
    })
}
