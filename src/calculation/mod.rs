//! Calculation logic for the institute engine.
//!
//! This module contains the pure business rules: invoice totals with GST,
//! internship pricing bands, billing-period end dates, the attendance state
//! machine, leave approval and accrual, and monthly payroll. Every operation
//! returns its result together with an audit step describing how it was
//! reached.

mod attendance_policy;
mod duration;
mod internship_pricing;
mod invoice_totals;
mod leave_accrual;
mod leave_balance;
mod payroll;

pub use attendance_policy::{
    AttendanceResult, EARLY_LEAVE_REMARK, LATE_STRIKE_REMARK, ResumeResult, check_in, check_out,
    count_late_marks, resume_day, review_attendance,
};
pub use duration::{BillingDuration, derive_end_date, parse_billing_duration, parse_duration_months};
pub use internship_pricing::{
    InternshipPriceResult, InvoicePricingResult, PricingBand, price_invoice_items,
    resolve_internship_price,
};
pub use invoice_totals::{InvoiceTotalsResult, calculate_invoice_totals, round_half_up};
pub use leave_accrual::{LeaveBalanceResult, calculate_leave_balance, months_accrued};
pub use leave_balance::{
    LeaveApprovalResult, LeaveDraw, LeaveRejectionResult, approve_leave, draw_from_pool,
    reject_leave,
};
pub use payroll::{
    LeaveSettlementResult, SalarySlipResult, calculate_leave_deduction, days_in_month,
    generate_salary_slip, months_worked_through, settle_monthly_leave,
};
