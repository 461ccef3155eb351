//! Comprehensive tests for domain_billing

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    BillingPeriod, DormitoryId, InvoiceId, LineItemId, Money, PaymentId, RoomId, TenantId,
};

use domain_billing::error::BillingError;
use domain_billing::invoice::{Invoice, SettlementStatus};
use domain_billing::late_fee::LateFeePolicy;
use domain_billing::line_item::{ChargeKind, LineItem, LineItemDraft};
use domain_billing::payment::{Payment, PaymentDraft, PaymentMethod};
use domain_billing::ports::InvoiceRecord;
use domain_billing::totals;
use domain_billing::view::InvoiceView;

const INVOICE: InvoiceId = InvoiceId::from_raw(1);

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()
}

fn item(raw_id: i64, kind: ChargeKind, units: Decimal, rate: Money) -> LineItem {
    LineItemDraft::new(kind, kind.to_string(), units, rate)
        .unwrap()
        .into_item(LineItemId::from_raw(raw_id), INVOICE)
}

fn payment(raw_id: i64, amount: Money) -> Payment {
    PaymentDraft::new(amount, PaymentMethod::Cash, due_date())
        .unwrap()
        .into_payment(PaymentId::from_raw(raw_id), INVOICE)
}

fn invoice_with(items: Vec<LineItem>, payments: Vec<Payment>) -> Invoice {
    Invoice::from(InvoiceRecord {
        id: INVOICE,
        dormitory_id: DormitoryId::from_raw(1),
        room_id: RoomId::from_raw(101),
        tenant_id: TenantId::from_raw(7),
        period: BillingPeriod::new(2026, 8).unwrap(),
        due_date: due_date(),
        stored_status: None,
        items,
        payments,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    })
}

fn generated_bill() -> Invoice {
    invoice_with(
        vec![
            item(1, ChargeKind::Rent, dec!(1), Money::new(dec!(3000))),
            item(2, ChargeKind::Water, dec!(10), Money::new(dec!(15))),
            item(3, ChargeKind::Electric, dec!(20), Money::new(dec!(8))),
        ],
        Vec::new(),
    )
}

// ============================================================================
// Line Item Tests
// ============================================================================

mod line_item_tests {
    use super::*;

    #[test]
    fn test_kind_management_split() {
        for kind in [
            ChargeKind::Rent,
            ChargeKind::Water,
            ChargeKind::Electric,
            ChargeKind::LateFee,
        ] {
            assert!(kind.is_system_managed());
            assert!(!kind.is_user_editable());
        }
        for kind in [ChargeKind::Service, ChargeKind::Discount] {
            assert!(kind.is_user_editable());
            assert!(!kind.is_system_managed());
        }
    }

    #[test]
    fn test_validation_names_the_offending_field() {
        let err =
            LineItemDraft::new(ChargeKind::Service, "keys", dec!(-1), Money::new(dec!(100)))
                .unwrap_err();
        assert!(err.to_string().contains("unit_count"));

        let err =
            LineItemDraft::new(ChargeKind::Water, "water", dec!(10), Money::new(dec!(-15)))
                .unwrap_err();
        assert!(err.to_string().contains("rate"));
    }

    #[test]
    fn test_discount_rate_may_be_negative() {
        let draft =
            LineItemDraft::new(ChargeKind::Discount, "loyalty", dec!(1), Money::new(dec!(-50)));
        assert!(draft.is_ok());
    }
}

// ============================================================================
// Totals Calculator Tests
// ============================================================================

mod totals_tests {
    use super::*;

    #[test]
    fn test_generated_bill_total() {
        let invoice = generated_bill();
        assert_eq!(invoice.total(), Money::new(dec!(3310)));
        assert_eq!(invoice.balance(), Money::new(dec!(3310)));
    }

    #[test]
    fn test_totals_are_recomputed_not_cached() {
        let mut invoice = generated_bill();
        let before = invoice.total();
        invoice
            .add_item(item(4, ChargeKind::Service, dec!(1), Money::new(dec!(100))))
            .unwrap();
        assert_eq!(invoice.total(), before + Money::new(dec!(100)));
        invoice.remove_item(LineItemId::from_raw(4)).unwrap();
        assert_eq!(invoice.total(), before);
    }
}

// ============================================================================
// Payment Ledger Tests
// ============================================================================

mod payment_ledger_tests {
    use super::*;

    #[test]
    fn test_payment_decreases_balance_exactly() {
        let mut invoice = generated_bill();
        let before = invoice.balance();

        let after = invoice.record_payment(payment(1, Money::new(dec!(1000)))).unwrap();
        assert_eq!(after, before - Money::new(dec!(1000)));
    }

    #[test]
    fn test_payment_deletion_restores_prior_balance() {
        let mut invoice = generated_bill();
        let before = invoice.balance();

        invoice.record_payment(payment(1, Money::new(dec!(1234.56)))).unwrap();
        let restored = invoice.delete_payment(PaymentId::from_raw(1)).unwrap();
        assert_eq!(restored, before);
    }

    #[test]
    fn test_settled_invoice_rejects_new_payment() {
        let mut invoice = generated_bill();
        invoice.record_payment(payment(1, Money::new(dec!(3310)))).unwrap();

        let err = invoice
            .record_payment(payment(2, Money::new(dec!(1))))
            .unwrap_err();
        assert!(matches!(err, BillingError::AlreadySettled));
        // Ledger unchanged by the rejected call
        assert_eq!(invoice.payments().len(), 1);
    }

    #[test]
    fn test_overpayment_is_flagged_by_negative_balance() {
        let mut invoice = generated_bill();
        let balance = invoice
            .record_payment(payment(1, Money::new(dec!(4000))))
            .unwrap();
        assert_eq!(balance, Money::new(dec!(-690)));
        assert_eq!(invoice.status(), SettlementStatus::Settled);
    }

    #[test]
    fn test_payment_deletion_allowed_after_reported_paid() {
        let mut invoice = generated_bill();
        invoice.record_payment(payment(1, Money::new(dec!(3310)))).unwrap();
        assert_eq!(invoice.status(), SettlementStatus::Settled);

        // No business-rule block even though the invoice looked paid
        let restored = invoice.delete_payment(PaymentId::from_raw(1)).unwrap();
        assert_eq!(restored, Money::new(dec!(3310)));
        assert_eq!(invoice.status(), SettlementStatus::Unsettled);
    }
}

// ============================================================================
// Lifecycle Controller Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_guard_follows_balance() {
        let mut invoice = generated_bill();
        assert!(invoice.can_mutate());

        invoice.record_payment(payment(1, Money::new(dec!(3310)))).unwrap();
        assert!(!invoice.can_mutate());

        invoice.delete_payment(PaymentId::from_raw(1)).unwrap();
        assert!(invoice.can_mutate());
    }

    #[test]
    fn test_item_edit_can_settle_invoice() {
        // Balance 100 with an editable discount; growing the discount to
        // cover the balance settles the invoice.
        let mut invoice = invoice_with(
            vec![
                item(1, ChargeKind::Rent, dec!(1), Money::new(dec!(150))),
                item(2, ChargeKind::Discount, dec!(1), Money::new(dec!(50))),
            ],
            Vec::new(),
        );
        assert_eq!(invoice.balance(), Money::new(dec!(100)));

        invoice
            .update_item(LineItemId::from_raw(2), dec!(1), Money::new(dec!(150)))
            .unwrap();
        assert_eq!(invoice.status(), SettlementStatus::Settled);
        assert!(!invoice.can_mutate());
    }

    #[test]
    fn test_stored_status_never_wins_over_derived() {
        let invoice = Invoice::from(InvoiceRecord {
            id: INVOICE,
            dormitory_id: DormitoryId::from_raw(1),
            room_id: RoomId::from_raw(101),
            tenant_id: TenantId::from_raw(7),
            period: BillingPeriod::new(2026, 8).unwrap(),
            due_date: due_date(),
            // Backend cache says paid; the ledger says otherwise
            stored_status: Some("paid".to_string()),
            items: vec![item(1, ChargeKind::Rent, dec!(1), Money::new(dec!(3000)))],
            payments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert_eq!(invoice.status(), SettlementStatus::Unsettled);
    }
}

// ============================================================================
// Late Fee and View Tests
// ============================================================================

mod view_tests {
    use super::*;

    #[test]
    fn test_view_matches_aggregate() {
        let invoice = generated_bill();
        let view = InvoiceView::project(
            &invoice,
            &LateFeePolicy::disabled(),
            due_date(),
        );
        assert_eq!(view.total, invoice.total());
        assert_eq!(view.balance, invoice.balance());
        assert_eq!(view.status, invoice.status());
        assert_eq!(view.can_mutate, invoice.can_mutate());
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn test_view_serializes_for_print_and_export() {
        let invoice = generated_bill();
        let view = InvoiceView::project(
            &invoice,
            &LateFeePolicy::new(Money::new(dec!(20))),
            due_date() + chrono::Days::new(10),
        );
        let json = serde_json::to_string(&view).unwrap();
        let back: InvoiceView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_late_fee_layered_without_touching_total() {
        let invoice = generated_bill();
        let policy = LateFeePolicy::new(Money::new(dec!(20)));
        let view = InvoiceView::project(&invoice, &policy, due_date() + chrono::Days::new(10));

        assert_eq!(view.late_days, 10);
        assert_eq!(view.late_fee, Money::new(dec!(200)));
        assert_eq!(view.total, Money::new(dec!(3310)));
        assert_eq!(view.total_due, Money::new(dec!(3510)));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn charge_kind_strategy() -> impl Strategy<Value = ChargeKind> {
    prop_oneof![
        Just(ChargeKind::Rent),
        Just(ChargeKind::Water),
        Just(ChargeKind::Electric),
        Just(ChargeKind::Service),
        Just(ChargeKind::Discount),
    ]
}

fn item_input_strategy() -> impl Strategy<Value = (ChargeKind, Decimal, Money)> {
    (charge_kind_strategy(), 1i64..1_000i64, 1i64..1_000_000i64).prop_map(
        |(kind, units, rate_minor)| {
            (kind, Decimal::from(units), Money::from_minor(rate_minor))
        },
    )
}

proptest! {
    #[test]
    fn total_is_order_independent(inputs in prop::collection::vec(item_input_strategy(), 0..12)) {
        let items: Vec<LineItem> = inputs
            .iter()
            .enumerate()
            .map(|(i, (kind, units, rate))| item(i as i64 + 1, *kind, *units, *rate))
            .collect();

        let forward = totals::invoice_total(&items);
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(forward, totals::invoice_total(&reversed));

        // total == sum(non-discount) - sum(abs(discount))
        let expected = items.iter().fold(Money::zero(), |acc, i| {
            if i.kind == ChargeKind::Discount {
                acc - i.amount.abs()
            } else {
                acc + i.amount
            }
        });
        prop_assert_eq!(forward, expected);
    }

    #[test]
    fn payment_roundtrip_restores_balance(amount_minor in 1i64..10_000_000i64) {
        let mut invoice = generated_bill();
        let before = invoice.balance();
        let amount = Money::from_minor(amount_minor);

        let after = invoice.record_payment(payment(1, amount)).unwrap();
        prop_assert_eq!(after, before - amount);

        let restored = invoice.delete_payment(PaymentId::from_raw(1)).unwrap();
        prop_assert_eq!(restored, before);
    }

    #[test]
    fn status_derivation_matches_balance(paid_minor in 0i64..10_000_000i64) {
        let mut invoice = generated_bill();
        if paid_minor > 0 {
            invoice.record_payment(payment(1, Money::from_minor(paid_minor))).unwrap();
        }
        let settled = invoice.balance() <= Money::zero();
        prop_assert_eq!(invoice.status() == SettlementStatus::Settled, settled);
        prop_assert_eq!(invoice.can_mutate(), !settled);
    }

    #[test]
    fn view_projection_is_idempotent(paid_minor in 0i64..400_000i64, days_late in 0i64..60i64) {
        let mut invoice = generated_bill();
        if paid_minor > 0 {
            invoice.record_payment(payment(1, Money::from_minor(paid_minor))).unwrap();
        }
        let policy = LateFeePolicy::new(Money::new(dec!(20)));
        let today = due_date() + chrono::Days::new(days_late as u64);

        let first = InvoiceView::project(&invoice, &policy, today);
        let second = InvoiceView::project(&invoice, &policy, today);
        prop_assert_eq!(first, second);
    }
}
