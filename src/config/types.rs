//! Configuration types for the institute rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::SalaryStructure;

/// Fee rates for one internship domain.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainRates {
    /// Fee for a single month; multiplied for durations other than 3 or 6 months.
    pub one_month: Decimal,
    /// Fee for a three-month enrolment.
    pub three_months: Decimal,
}

/// Pricing configuration from pricing.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Map of domain name to its rates.
    pub domains: BTreeMap<String, DomainRates>,
}

/// Tax configuration from tax.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
    /// Currency code amounts are expressed in.
    pub currency: String,
    /// State GST rate as a fraction (0.09 = 9%).
    pub sgst_rate: Decimal,
    /// Central GST rate as a fraction.
    pub cgst_rate: Decimal,
}

impl TaxConfig {
    /// Combined GST rate.
    pub fn combined_rate(&self) -> Decimal {
        self.sgst_rate + self.cgst_rate
    }
}

/// Attendance timing rules.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendancePolicy {
    /// Check-ins strictly after this time are late.
    pub late_after: NaiveTime,
    /// The late mark that turns into an absence (3 = third late mark in a month).
    pub late_strike_limit: u32,
    /// Minimum hours between check-in and check-out to avoid an absence.
    pub minimum_hours: Decimal,
    /// Resumes allowed per user per calendar month.
    pub monthly_correction_limit: u32,
}

/// Leave accrual rates.
#[derive(Debug, Clone, Deserialize)]
pub struct LeavePolicy {
    /// Casual leave accrued per month.
    pub cl_per_month: Decimal,
    /// Sick leave accrued per month.
    pub sl_per_month: Decimal,
}

/// Payroll defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollPolicy {
    /// Structure used for employees without their own salary details.
    pub default_salary: SalaryStructure,
}

/// Policy configuration from policy.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Attendance rules.
    pub attendance: AttendancePolicy,
    /// Leave accrual rules.
    pub leave: LeavePolicy,
    /// Payroll defaults.
    pub payroll: PayrollPolicy,
}

/// The complete institute configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct InstituteConfig {
    pricing: PricingConfig,
    tax: TaxConfig,
    policy: PolicyConfig,
}

impl InstituteConfig {
    /// Creates a new InstituteConfig from its component parts.
    pub fn new(pricing: PricingConfig, tax: TaxConfig, policy: PolicyConfig) -> Self {
        Self {
            pricing,
            tax,
            policy,
        }
    }

    /// Returns the internship pricing table.
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Returns the tax configuration.
    pub fn tax(&self) -> &TaxConfig {
        &self.tax
    }

    /// Returns the attendance policy.
    pub fn attendance(&self) -> &AttendancePolicy {
        &self.policy.attendance
    }

    /// Returns the leave policy.
    pub fn leave(&self) -> &LeavePolicy {
        &self.policy.leave
    }

    /// Returns the payroll policy.
    pub fn payroll(&self) -> &PayrollPolicy {
        &self.policy.payroll
    }
}
