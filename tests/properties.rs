//! Property tests for the invoice and leave rules.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use institute_engine::calculation::{
    approve_leave, calculate_invoice_totals, derive_end_date, round_half_up,
};
use institute_engine::config::TaxConfig;
use institute_engine::models::{
    Invoice, InvoiceItem, InvoiceKind, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType,
};

fn tax() -> TaxConfig {
    TaxConfig {
        currency: "INR".to_string(),
        sgst_rate: Decimal::new(9, 2),
        cgst_rate: Decimal::new(9, 2),
    }
}

fn invoice(amounts: &[Decimal], apply_tax: bool, discount_percent: Decimal) -> Invoice {
    Invoice {
        kind: InvoiceKind::Training,
        items: amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| InvoiceItem {
                description: format!("Line {}", i + 1),
                start_date: None,
                end_date: None,
                duration_text: String::new(),
                amount: *amount,
            })
            .collect(),
        apply_tax,
        discount_percent,
        paid_amount: Decimal::ZERO,
        due_date: None,
    }
}

/// Paise-precision amounts up to one lakh rupees.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

proptest! {
    #[test]
    fn subtotal_is_independent_of_item_order(
        amounts in prop::collection::vec(amount(), 0..12),
        apply_tax in any::<bool>(),
        discount in 0u32..=100,
    ) {
        let forward = calculate_invoice_totals(&invoice(&amounts, apply_tax, Decimal::from(discount)), &tax(), 1).unwrap();
        let mut reversed_amounts = amounts.clone();
        reversed_amounts.reverse();
        let reversed = calculate_invoice_totals(&invoice(&reversed_amounts, apply_tax, Decimal::from(discount)), &tax(), 1).unwrap();

        let expected: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(forward.totals.subtotal, expected);
        prop_assert_eq!(reversed.totals.subtotal, expected);
        prop_assert_eq!(forward.totals.total, reversed.totals.total);
    }

    #[test]
    fn untaxed_undiscounted_total_is_rounded_subtotal(
        amounts in prop::collection::vec(amount(), 0..12),
    ) {
        let result = calculate_invoice_totals(&invoice(&amounts, false, Decimal::ZERO), &tax(), 1).unwrap();
        prop_assert_eq!(result.totals.total, round_half_up(result.totals.subtotal));
        prop_assert_eq!(result.totals.sgst, Decimal::ZERO);
        prop_assert!(result.warnings.is_empty());
    }

    #[test]
    fn total_is_a_whole_rupee_amount(
        amounts in prop::collection::vec(amount(), 1..8),
        discount in 0u32..=100,
    ) {
        let result = calculate_invoice_totals(&invoice(&amounts, true, Decimal::from(discount)), &tax(), 1).unwrap();
        prop_assert_eq!(result.totals.total, result.totals.total.trunc());
    }

    #[test]
    fn approval_never_drives_a_pool_negative(
        pool_halves in 0i64..40,
        days in 1i64..15,
        is_half_day in any::<bool>(),
    ) {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let request = LeaveRequest {
            id: "lv_prop".to_string(),
            user_id: "emp_001".to_string(),
            leave_type: LeaveType::Cl,
            start_date: start,
            end_date: start + chrono::Days::new(days as u64 - 1),
            is_half_day,
            status: LeaveStatus::Pending,
            reason: String::new(),
        };
        let balance = LeaveBalance { cl: Decimal::new(pool_halves * 5, 1), ..Default::default() };

        let result = approve_leave(&request, balance, 1).unwrap();
        prop_assert!(result.balance.cl >= Decimal::ZERO);
        prop_assert_eq!(result.paid_days + result.loss_of_pay_days, request.days());
        prop_assert_eq!(balance.cl - result.paid_days, result.balance.cl);
    }

    #[test]
    fn billing_period_ends_the_day_before_the_next_starts(
        offset in 0u64..3650,
        days in 1u32..400,
    ) {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(offset);
        let end = derive_end_date(start, &format!("{} days", days)).unwrap();
        prop_assert_eq!((end - start).num_days() + 1, days as i64);
    }
}
