//! Internship pricing.
//!
//! Internship fees come from a per-domain table with a one-month and a
//! three-month rate. The bands are fixed:
//!
//! - 3 months: the three-month rate
//! - 6 months: twice the three-month rate
//! - any other N months: N times the one-month rate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PricingConfig, find_domain};
use crate::error::EngineResult;
use crate::models::{AuditStep, AuditWarning, Invoice, InvoiceItem, InvoiceKind};

use super::duration::{derive_end_date, parse_duration_months};

/// Which pricing band produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingBand {
    /// The tabulated three-month rate.
    ThreeMonth,
    /// Double the three-month rate.
    SixMonth,
    /// The one-month rate times the month count.
    PerMonth,
}

/// The result of resolving an internship price.
#[derive(Debug, Clone)]
pub struct InternshipPriceResult {
    /// The domain name as it appears in the pricing table.
    pub domain: String,
    /// The parsed number of months.
    pub months: u32,
    /// The band that was applied.
    pub band: PricingBand,
    /// The resolved fee.
    pub price: Decimal,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Resolves the fee for an internship domain and duration.
///
/// # Returns
///
/// Returns an error if the domain is not in the pricing table
/// (`DomainNotFound`) or the duration does not parse to a positive number of
/// months (`InvalidDuration`).
///
/// # Examples
///
/// ```no_run
/// use institute_engine::calculation::resolve_internship_price;
/// use institute_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/institute").unwrap();
/// let pricing = loader.config().pricing();
///
/// let result = resolve_internship_price("AI/ML", "6 Months", pricing, 1).unwrap();
/// assert_eq!(result.price, Decimal::from(5800));
/// ```
pub fn resolve_internship_price(
    domain: &str,
    duration_text: &str,
    pricing: &PricingConfig,
    step_number: u32,
) -> EngineResult<InternshipPriceResult> {
    let (canonical, rates) = find_domain(pricing, domain)?;
    let months = parse_duration_months(duration_text)?;

    let (band, price, reasoning) = match months {
        3 => (
            PricingBand::ThreeMonth,
            rates.three_months,
            format!("3 months of {} at the 3-month rate = {}", canonical, rates.three_months),
        ),
        6 => {
            let price = rates.three_months * Decimal::TWO;
            (
                PricingBand::SixMonth,
                price,
                format!(
                    "6 months of {} = 2 x 3-month rate {} = {}",
                    canonical, rates.three_months, price
                ),
            )
        }
        n => {
            let price = rates.one_month * Decimal::from(n);
            (
                PricingBand::PerMonth,
                price,
                format!(
                    "{} month(s) of {} x 1-month rate {} = {}",
                    n, canonical, rates.one_month, price
                ),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "internship_pricing".to_string(),
        rule_name: "Internship Pricing".to_string(),
        input: serde_json::json!({
            "domain": domain,
            "duration": duration_text
        }),
        output: serde_json::json!({
            "domain": canonical,
            "months": months,
            "band": band,
            "price": price.normalize().to_string()
        }),
        reasoning,
    };

    Ok(InternshipPriceResult {
        domain: canonical.to_string(),
        months,
        band,
        price,
        audit_step,
    })
}

/// The result of auto-pricing the lines of an invoice.
#[derive(Debug, Clone)]
pub struct InvoicePricingResult {
    /// The invoice lines with derived amounts and end dates filled in.
    pub items: Vec<InvoiceItem>,
    /// Audit steps for every line that was priced.
    pub audit_steps: Vec<AuditStep>,
    /// One warning per internship line left for manual pricing.
    pub warnings: Vec<AuditWarning>,
}

/// Fills in derived fields on invoice lines.
///
/// Every line with a start date and a parseable duration gets its end date
/// derived. On internship invoices, lines whose description is a known domain
/// and whose duration resolves to a positive price get that price as their
/// amount. Lines that do not resolve keep their manual amount.
pub fn price_invoice_items(
    invoice: &Invoice,
    pricing: &PricingConfig,
    step_number: u32,
) -> InvoicePricingResult {
    let mut items = invoice.items.clone();
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step = step_number;

    for (index, item) in items.iter_mut().enumerate() {
        if let Some(start) = item.start_date {
            if let Ok(end) = derive_end_date(start, &item.duration_text) {
                item.end_date = Some(end);
            }
        }

        if invoice.kind != InvoiceKind::Internship {
            continue;
        }

        match resolve_internship_price(&item.description, &item.duration_text, pricing, step) {
            Ok(result) if result.price > Decimal::ZERO => {
                item.amount = result.price;
                audit_steps.push(result.audit_step);
                step += 1;
            }
            Ok(_) => warnings.push(AuditWarning::new(
                "ITEM_LEFT_FOR_MANUAL_PRICING",
                format!("Line {}: resolved price is zero", index + 1),
                "low",
            )),
            Err(err) => warnings.push(AuditWarning::new(
                "ITEM_LEFT_FOR_MANUAL_PRICING",
                format!("Line {}: {}", index + 1, err),
                "low",
            )),
        }
    }

    InvoicePricingResult {
        items,
        audit_steps,
        warnings,
    }
}
