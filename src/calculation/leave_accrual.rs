//! Leave accrual.
//!
//! Casual and sick leave accrue monthly within a calendar year, starting from
//! the later of the joining date and 1 January. Privilege leave is not
//! accrued; it comes from a stored opening balance.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;
use crate::models::{AuditStep, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};

/// Counts the months of `year` that have accrued leave as of `as_of`.
///
/// - Past years accrue all twelve months, or from the joining month when the
///   user joined during that year.
/// - The current year accrues from the start month through the current month.
/// - Future years, and years before the joining year, accrue nothing.
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::months_accrued;
/// use chrono::NaiveDate;
///
/// let joined = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
/// assert_eq!(months_accrued(Some(joined), 2025, today), 9);
/// assert_eq!(months_accrued(Some(joined), 2026, today), 3);
/// ```
pub fn months_accrued(joining_date: Option<NaiveDate>, year: i32, as_of: NaiveDate) -> u32 {
    let joining = joining_date
        .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
        .unwrap_or(as_of);

    if joining > as_of || joining.year() > year || year > as_of.year() {
        return 0;
    }

    let start_month = if joining.year() == year {
        joining.month()
    } else {
        1
    };
    let end_month = if year < as_of.year() { 12 } else { as_of.month() };

    (end_month + 1).saturating_sub(start_month)
}

/// The result of computing a leave balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalanceResult {
    /// Available leave per pool, never negative.
    pub balance: LeaveBalance,
    /// Months that accrued leave.
    pub months_accrued: u32,
    /// Casual leave accrued before usage.
    pub accrued_cl: Decimal,
    /// Sick leave accrued before usage.
    pub accrued_sl: Decimal,
    /// Approved leave taken in the year, per pool.
    pub used: LeaveBalance,
    /// The audit step recording the computation.
    pub audit_step: AuditStep,
}

/// Computes a user's available leave for a calendar year.
///
/// # Arguments
///
/// * `joining_date` - When the user joined; `None` accrues from 1 January
/// * `year` - The calendar year
/// * `as_of` - The date the balance is computed for
/// * `opening_pl` - Stored privilege leave for the year
/// * `leaves` - The user's leave requests; only APPROVED ones starting in `year` count
/// * `policy` - The accrual rates
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_leave_balance(
    joining_date: Option<NaiveDate>,
    year: i32,
    as_of: NaiveDate,
    opening_pl: Decimal,
    leaves: &[LeaveRequest],
    policy: &LeavePolicy,
    step_number: u32,
) -> LeaveBalanceResult {
    let months = months_accrued(joining_date, year, as_of);
    let joined_later = joining_date.is_some_and(|d| d > as_of);

    let accrued_cl = policy.cl_per_month * Decimal::from(months);
    let accrued_sl = policy.sl_per_month * Decimal::from(months);

    let mut used = LeaveBalance::default();
    for leave in leaves
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved && l.start_date.year() == year)
    {
        *used.pool_mut(leave.leave_type) += leave.days();
    }

    let balance = if joined_later {
        LeaveBalance::default()
    } else {
        LeaveBalance {
            cl: (accrued_cl - used.cl).max(Decimal::ZERO),
            sl: (accrued_sl - used.sl).max(Decimal::ZERO),
            pl: opening_pl.saturating_sub(used.pl).max(Decimal::ZERO),
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_accrual".to_string(),
        rule_name: "Leave Accrual".to_string(),
        input: serde_json::json!({
            "joining_date": joining_date.map(|d| d.to_string()),
            "year": year,
            "as_of": as_of.to_string(),
            "opening_pl": opening_pl.normalize().to_string()
        }),
        output: serde_json::json!({
            "months_accrued": months,
            "cl": balance.cl.normalize().to_string(),
            "sl": balance.sl.normalize().to_string(),
            "pl": balance.pl.normalize().to_string()
        }),
        reasoning: format!(
            "{} month(s): CL {} - {} used, SL {} - {} used, PL {} - {} used",
            months,
            accrued_cl.normalize(),
            used.get(LeaveType::Cl).normalize(),
            accrued_sl.normalize(),
            used.get(LeaveType::Sl).normalize(),
            opening_pl.normalize(),
            used.get(LeaveType::Pl).normalize()
        ),
    };

    LeaveBalanceResult {
        balance,
        months_accrued: months,
        accrued_cl,
        accrued_sl,
        used,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn policy() -> LeavePolicy {
        LeavePolicy {
            cl_per_month: dec("1.0"),
            sl_per_month: dec("0.5"),
        }
    }

    fn leave(leave_type: LeaveType, start: NaiveDate, end: NaiveDate, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: format!("lv_{}", start),
            user_id: "emp_001".to_string(),
            leave_type,
            start_date: start,
            end_date: end,
            is_half_day: false,
            status,
            reason: String::new(),
        }
    }

    #[test]
    fn test_months_accrued_current_year_from_january() {
        assert_eq!(months_accrued(Some(date(2020, 6, 1)), 2026, date(2026, 3, 15)), 3);
        assert_eq!(months_accrued(None, 2026, date(2026, 3, 15)), 3);
    }

    #[test]
    fn test_months_accrued_joined_this_year() {
        assert_eq!(months_accrued(Some(date(2026, 2, 20)), 2026, date(2026, 3, 1)), 2);
    }

    #[test]
    fn test_months_accrued_past_years() {
        assert_eq!(months_accrued(Some(date(2020, 6, 1)), 2025, date(2026, 3, 15)), 12);
        assert_eq!(months_accrued(Some(date(2025, 6, 1)), 2025, date(2026, 3, 15)), 7);
    }

    #[test]
    fn test_months_accrued_nothing_before_joining_or_in_future() {
        assert_eq!(months_accrued(Some(date(2025, 6, 1)), 2024, date(2026, 3, 15)), 0);
        assert_eq!(months_accrued(Some(date(2020, 6, 1)), 2027, date(2026, 3, 15)), 0);
        assert_eq!(months_accrued(Some(date(2026, 5, 1)), 2026, date(2026, 3, 15)), 0);
    }

    #[test]
    fn test_balance_subtracts_approved_leave() {
        let leaves = vec![
            leave(LeaveType::Cl, date(2026, 1, 5), date(2026, 1, 6), LeaveStatus::Approved),
            leave(LeaveType::Sl, date(2026, 2, 9), date(2026, 2, 9), LeaveStatus::Approved),
            leave(LeaveType::Cl, date(2026, 3, 2), date(2026, 3, 2), LeaveStatus::Pending),
            leave(LeaveType::Cl, date(2025, 12, 30), date(2025, 12, 31), LeaveStatus::Approved),
        ];
        let result = calculate_leave_balance(
            Some(date(2020, 1, 1)),
            2026,
            date(2026, 3, 15),
            dec("5"),
            &leaves,
            &policy(),
            1,
        );
        assert_eq!(result.months_accrued, 3);
        assert_eq!(result.accrued_cl, dec("3"));
        assert_eq!(result.accrued_sl, dec("1.5"));
        assert_eq!(result.balance.cl, dec("1"));
        assert_eq!(result.balance.sl, dec("0.5"));
        assert_eq!(result.balance.pl, dec("5"));
    }

    #[test]
    fn test_balance_never_negative() {
        let leaves = vec![leave(
            LeaveType::Cl,
            date(2026, 1, 5),
            date(2026, 1, 14),
            LeaveStatus::Approved,
        )];
        let result = calculate_leave_balance(
            Some(date(2020, 1, 1)),
            2026,
            date(2026, 2, 1),
            Decimal::ZERO,
            &leaves,
            &policy(),
            1,
        );
        assert_eq!(result.balance.cl, Decimal::ZERO);
        assert_eq!(result.used.cl, dec("10"));
    }

    #[test]
    fn test_future_joiner_has_nothing() {
        let result = calculate_leave_balance(
            Some(date(2026, 6, 1)),
            2026,
            date(2026, 3, 15),
            dec("4"),
            &[],
            &policy(),
            1,
        );
        assert_eq!(result.balance, LeaveBalance::default());
        assert_eq!(result.audit_step.output["months_accrued"], 0);
    }
}
