//! Invoice total calculation.
//!
//! Totals are computed as subtotal, then discount, then SGST and CGST on the
//! discounted amount, and finally rounded to whole rupees.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::TaxConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, Invoice, InvoiceStatus, InvoiceTotals};

/// Rounds to a whole number with halves going up (2.5 → 3, -2.5 → -2).
///
/// # Examples
///
/// ```
/// use institute_engine::calculation::round_half_up;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_half_up(Decimal::from_str("1061.5").unwrap()), Decimal::from(1062));
/// assert_eq!(round_half_up(Decimal::from_str("-2.5").unwrap()), Decimal::from(-2));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(0, strategy)
}

pub(crate) fn overflow(stage: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} exceeds the supported amount range", stage),
    }
}

/// Sums amounts, failing instead of overflowing.
pub(crate) fn checked_sum<I>(values: I, stage: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| overflow(stage))
    })
}

/// The result of an invoice total calculation.
#[derive(Debug, Clone)]
pub struct InvoiceTotalsResult {
    /// The computed totals.
    pub totals: InvoiceTotals,
    /// One audit step per stage (subtotal, discount, tax, total).
    pub audit_steps: Vec<AuditStep>,
    /// Inputs that were accepted but look wrong.
    pub warnings: Vec<AuditWarning>,
}

/// Calculates the totals for an invoice.
///
/// # Arguments
///
/// * `invoice` - The invoice lines, discount, tax toggle and paid amount
/// * `tax` - The GST rates to apply when tax is enabled
/// * `step_number` - The step number of the first audit step
///
/// Negative line amounts and discounts outside 0-100 are not rejected; each
/// produces a warning so the caller can decide. Amounts too large for
/// decimal arithmetic fail with `CalculationError`.
///
/// # Examples
///
/// ```no_run
/// use institute_engine::calculation::calculate_invoice_totals;
/// use institute_engine::config::ConfigLoader;
/// use institute_engine::models::{Invoice, InvoiceItem, InvoiceKind};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/institute").unwrap();
/// let invoice = Invoice {
///     kind: InvoiceKind::Training,
///     items: vec![InvoiceItem {
///         description: "Full stack course".to_string(),
///         start_date: None,
///         end_date: None,
///         duration_text: String::new(),
///         amount: Decimal::from(1000),
///     }],
///     apply_tax: true,
///     discount_percent: Decimal::from(10),
///     paid_amount: Decimal::ZERO,
///     due_date: None,
/// };
///
/// let result = calculate_invoice_totals(&invoice, loader.config().tax(), 1).unwrap();
/// assert_eq!(result.totals.total, Decimal::from(1062));
/// ```
pub fn calculate_invoice_totals(
    invoice: &Invoice,
    tax: &TaxConfig,
    step_number: u32,
) -> EngineResult<InvoiceTotalsResult> {
    let mut audit_steps = Vec::with_capacity(4);
    let mut warnings = Vec::new();
    let mut step = step_number;

    for (index, item) in invoice.items.iter().enumerate() {
        if item.amount < Decimal::ZERO {
            warnings.push(AuditWarning::new(
                "NEGATIVE_ITEM_AMOUNT",
                format!(
                    "Line {} ('{}') has a negative amount of {}",
                    index + 1,
                    item.description,
                    item.amount
                ),
                "medium",
            ));
        }
    }

    let subtotal = checked_sum(invoice.items.iter().map(|item| item.amount), "Invoice subtotal")?;
    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "invoice_subtotal".to_string(),
        rule_name: "Invoice Subtotal".to_string(),
        input: serde_json::json!({
            "amounts": invoice
                .items
                .iter()
                .map(|item| item.amount.normalize().to_string())
                .collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "subtotal": subtotal.normalize().to_string()
        }),
        reasoning: format!(
            "Sum of {} line(s) = {}",
            invoice.items.len(),
            subtotal.normalize()
        ),
    });
    step += 1;

    let discount_percent = invoice.discount_percent;
    if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        warnings.push(AuditWarning::new(
            "DISCOUNT_OUT_OF_RANGE",
            format!("Discount of {}% is outside 0-100%", discount_percent),
            "medium",
        ));
    }

    let discount_amount = subtotal
        .checked_mul(discount_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow("Invoice discount"))?;
    let taxable_amount = subtotal
        .checked_sub(discount_amount)
        .ok_or_else(|| overflow("Taxable amount"))?;
    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "invoice_discount".to_string(),
        rule_name: "Invoice Discount".to_string(),
        input: serde_json::json!({
            "subtotal": subtotal.normalize().to_string(),
            "discount_percent": discount_percent.normalize().to_string()
        }),
        output: serde_json::json!({
            "discount_amount": discount_amount.normalize().to_string(),
            "taxable_amount": taxable_amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} - {}% ({}) = {}",
            subtotal.normalize(),
            discount_percent.normalize(),
            discount_amount.normalize(),
            taxable_amount.normalize()
        ),
    });
    step += 1;

    let (sgst, cgst) = if invoice.apply_tax {
        (
            taxable_amount
                .checked_mul(tax.sgst_rate)
                .ok_or_else(|| overflow("SGST"))?,
            taxable_amount
                .checked_mul(tax.cgst_rate)
                .ok_or_else(|| overflow("CGST"))?,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };
    let tax_reasoning = if invoice.apply_tax {
        format!(
            "SGST {} x {} = {}, CGST {} x {} = {}",
            taxable_amount.normalize(),
            tax.sgst_rate.normalize(),
            sgst.normalize(),
            taxable_amount.normalize(),
            tax.cgst_rate.normalize(),
            cgst.normalize()
        )
    } else {
        "Tax not applied to this invoice".to_string()
    };
    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "invoice_gst".to_string(),
        rule_name: "Invoice GST".to_string(),
        input: serde_json::json!({
            "taxable_amount": taxable_amount.normalize().to_string(),
            "apply_tax": invoice.apply_tax,
            "sgst_rate": tax.sgst_rate.normalize().to_string(),
            "cgst_rate": tax.cgst_rate.normalize().to_string(),
            "combined_rate": tax.combined_rate().normalize().to_string()
        }),
        output: serde_json::json!({
            "sgst": sgst.normalize().to_string(),
            "cgst": cgst.normalize().to_string()
        }),
        reasoning: tax_reasoning,
    });
    step += 1;

    let unrounded = checked_sum([taxable_amount, sgst, cgst], "Invoice total")?;
    let total = round_half_up(unrounded);
    let balance_due = total
        .checked_sub(invoice.paid_amount)
        .ok_or_else(|| overflow("Balance due"))?;
    let status = if invoice.paid_amount >= total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    };
    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "invoice_total".to_string(),
        rule_name: "Invoice Total".to_string(),
        input: serde_json::json!({
            "unrounded_total": unrounded.normalize().to_string(),
            "paid_amount": invoice.paid_amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "total": total.normalize().to_string(),
            "balance_due": balance_due.normalize().to_string(),
            "status": status
        }),
        reasoning: format!(
            "round({}) = {}; paid {} leaves {} due",
            unrounded.normalize(),
            total.normalize(),
            invoice.paid_amount.normalize(),
            balance_due.normalize()
        ),
    });

    Ok(InvoiceTotalsResult {
        totals: InvoiceTotals {
            subtotal,
            discount_amount,
            taxable_amount,
            sgst,
            cgst,
            total,
            paid_amount: invoice.paid_amount,
            balance_due,
            status,
        },
        audit_steps,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItem, InvoiceKind};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn gst() -> TaxConfig {
        TaxConfig {
            currency: "INR".to_string(),
            sgst_rate: dec("0.09"),
            cgst_rate: dec("0.09"),
        }
    }

    fn item(amount: &str) -> InvoiceItem {
        InvoiceItem {
            description: "Course fee".to_string(),
            start_date: None,
            end_date: None,
            duration_text: String::new(),
            amount: dec(amount),
        }
    }

    fn invoice(amounts: &[&str], discount: &str, apply_tax: bool) -> Invoice {
        Invoice {
            kind: InvoiceKind::Training,
            items: amounts.iter().map(|a| item(a)).collect(),
            apply_tax,
            discount_percent: dec(discount),
            paid_amount: Decimal::ZERO,
            due_date: None,
        }
    }

    #[test]
    fn test_ten_percent_discount_with_tax() {
        let result = calculate_invoice_totals(&invoice(&["1000"], "10", true), &gst(), 1).unwrap();
        let totals = result.totals;

        assert_eq!(totals.subtotal, dec("1000"));
        assert_eq!(totals.discount_amount, dec("100"));
        assert_eq!(totals.taxable_amount, dec("900"));
        assert_eq!(totals.sgst, dec("81"));
        assert_eq!(totals.cgst, dec("81"));
        assert_eq!(totals.total, dec("1062"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_no_tax_no_discount_is_rounded_subtotal() {
        let result =
            calculate_invoice_totals(&invoice(&["1200.40", "300.20"], "0", false), &gst(), 1).unwrap();
        assert_eq!(result.totals.subtotal, dec("1500.60"));
        assert_eq!(result.totals.sgst, Decimal::ZERO);
        assert_eq!(result.totals.cgst, Decimal::ZERO);
        assert_eq!(result.totals.total, dec("1501"));
    }

    #[test]
    fn test_total_rounds_half_up() {
        // 2425 * 0.18 = 436.5 → 2861.5 → 2862
        let result = calculate_invoice_totals(&invoice(&["2425"], "0", true), &gst(), 1).unwrap();
        assert_eq!(result.totals.total, dec("2862"));
    }

    #[test]
    fn test_empty_invoice_is_zero() {
        let result = calculate_invoice_totals(&invoice(&[], "0", true), &gst(), 1).unwrap();
        assert_eq!(result.totals.subtotal, Decimal::ZERO);
        assert_eq!(result.totals.total, Decimal::ZERO);
        assert_eq!(result.totals.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_negative_amount_is_kept_but_warned() {
        let result = calculate_invoice_totals(&invoice(&["2900", "-500"], "0", false), &gst(), 1).unwrap();
        assert_eq!(result.totals.subtotal, dec("2400"));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "NEGATIVE_ITEM_AMOUNT");
        assert!(result.warnings[0].message.contains("Line 2"));
    }

    #[test]
    fn test_discount_out_of_range_is_warned() {
        let result = calculate_invoice_totals(&invoice(&["1000"], "120", false), &gst(), 1).unwrap();
        assert_eq!(result.totals.taxable_amount, dec("-200"));
        assert_eq!(result.warnings[0].code, "DISCOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn test_partial_and_paid_status() {
        let mut inv = invoice(&["1000"], "10", true);
        inv.paid_amount = dec("500");
        let result = calculate_invoice_totals(&inv, &gst(), 1).unwrap();
        assert_eq!(result.totals.status, InvoiceStatus::Partial);
        assert_eq!(result.totals.balance_due, dec("562"));

        inv.paid_amount = dec("1062");
        let result = calculate_invoice_totals(&inv, &gst(), 1).unwrap();
        assert_eq!(result.totals.status, InvoiceStatus::Paid);
        assert_eq!(result.totals.balance_due, Decimal::ZERO);
    }

    #[test]
    fn test_audit_steps_are_sequenced() {
        let result = calculate_invoice_totals(&invoice(&["1000"], "10", true), &gst(), 7).unwrap();
        let ids: Vec<_> = result.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["invoice_subtotal", "invoice_discount", "invoice_gst", "invoice_total"]
        );
        let numbers: Vec<_> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![7, 8, 9, 10]);
        assert_eq!(result.audit_steps[2].output["sgst"].as_str().unwrap(), "81");
        assert_eq!(result.audit_steps[3].output["status"], "PARTIAL");
    }

    #[test]
    fn test_tax_disabled_reasoning() {
        let result = calculate_invoice_totals(&invoice(&["1000"], "0", false), &gst(), 1).unwrap();
        assert!(result.audit_steps[2].reasoning.contains("not applied"));
    }

    #[test]
    fn test_amount_overflow_is_an_error() {
        let huge = "50000000000000000000000000000";
        let result = calculate_invoice_totals(&invoice(&[huge, huge], "0", false), &gst(), 1);
        match result {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("Invoice subtotal"));
            }
            other => panic!("Expected CalculationError, got {:?}", other.map(|r| r.totals)),
        }

        let result = calculate_invoice_totals(&invoice(&[huge], "0", true), &gst(), 1);
        assert!(result.is_ok());
    }

    #[test]
    fn test_gst_step_records_combined_rate() {
        let result = calculate_invoice_totals(&invoice(&["1000"], "0", true), &gst(), 1).unwrap();
        assert_eq!(result.audit_steps[2].input["combined_rate"], "0.18");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec("10.49")), dec("10"));
        assert_eq!(round_half_up(dec("10.5")), dec("11"));
        assert_eq!(round_half_up(dec("-10.5")), dec("-10"));
        assert_eq!(round_half_up(dec("-10.51")), dec("-11"));
        assert_eq!(round_half_up(Decimal::MAX), Decimal::MAX);
    }
}
