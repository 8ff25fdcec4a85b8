//! Salary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly salary components for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryStructure {
    /// Basic salary.
    pub basic: Decimal,
    /// House rent allowance.
    pub hra: Decimal,
    /// Special allowance.
    pub special_allowance: Decimal,
    /// Conveyance allowance.
    pub conveyance: Decimal,
    /// Medical allowance.
    pub medical: Decimal,
    /// One-off bonus.
    pub bonus: Decimal,
    /// Provident fund contribution.
    pub pf: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// Tax deducted at source.
    pub tds: Decimal,
    /// Loan repayment.
    pub loan: Decimal,
    /// Any other deductions.
    pub other_deductions: Decimal,
}

impl SalaryStructure {
    /// The monthly pay that loss-of-pay days are pro-rated against.
    ///
    /// Returns `None` when the components overflow.
    pub fn monthly_fixed_pay(&self) -> Option<Decimal> {
        self.basic
            .checked_add(self.hra)?
            .checked_add(self.special_allowance)
    }
}

/// A computed salary slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySlip {
    /// The employee the slip is for.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// The salary components used.
    pub structure: SalaryStructure,
    /// Days of leave not covered by any balance.
    pub loss_of_pay_days: Decimal,
    /// Deduction for loss-of-pay days.
    pub leave_deduction: Decimal,
    /// Sum of all earnings.
    pub total_earnings: Decimal,
    /// Sum of all deductions including the leave deduction.
    pub total_deductions: Decimal,
    /// `total_earnings - total_deductions`.
    pub net_pay: Decimal,
}
