//! Invoice models.
//!
//! This module defines invoice line items, the invoice input and the
//! computed totals returned by the invoice calculator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of invoice being raised.
///
/// Only internship invoices have their line amounts derived from the
/// pricing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceKind {
    /// Training course fees, priced manually.
    #[default]
    Training,
    /// Internship fees, priced by domain and duration.
    Internship,
}

/// Payment status derived from the amount paid against the invoice total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// The paid amount covers the total.
    Paid,
    /// Some of the total is still outstanding.
    Partial,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Free-text description; for internships this is the domain name.
    pub description: String,
    /// First day covered by this line.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day covered by this line.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Free-text duration, e.g. "3 Months".
    #[serde(default)]
    pub duration_text: String,
    /// Line amount in rupees.
    pub amount: Decimal,
}

/// An invoice ready for total computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// The kind of invoice.
    #[serde(default)]
    pub kind: InvoiceKind,
    /// Ordered invoice lines.
    pub items: Vec<InvoiceItem>,
    /// Whether SGST and CGST are levied.
    #[serde(default = "default_apply_tax")]
    pub apply_tax: bool,
    /// Discount as a percentage of the subtotal.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Amount already paid against this invoice.
    #[serde(default)]
    pub paid_amount: Decimal,
    /// Payment due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

fn default_apply_tax() -> bool {
    true
}

/// Computed invoice totals.
///
/// `total` is always a whole rupee amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of all line amounts.
    pub subtotal: Decimal,
    /// The discount taken off the subtotal.
    pub discount_amount: Decimal,
    /// Subtotal after discount.
    pub taxable_amount: Decimal,
    /// State GST.
    pub sgst: Decimal,
    /// Central GST.
    pub cgst: Decimal,
    /// Rounded grand total.
    pub total: Decimal,
    /// Amount already paid.
    pub paid_amount: Decimal,
    /// Outstanding amount (`total - paid_amount`).
    pub balance_due: Decimal,
    /// Payment status.
    pub status: InvoiceStatus,
}
