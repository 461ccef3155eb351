//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants.

use core_kernel::Money;
use domain_billing::line_item::{ChargeKind, LineItemDraft};
use domain_billing::payment::PaymentMethod;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for positive amounts in minor units (satang)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for unit counts (1 to 1000, whole units)
pub fn unit_count_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000i64).prop_map(Decimal::from)
}

/// Strategy for any charge kind
pub fn charge_kind_strategy() -> impl Strategy<Value = ChargeKind> {
    prop_oneof![
        Just(ChargeKind::Rent),
        Just(ChargeKind::Water),
        Just(ChargeKind::Electric),
        Just(ChargeKind::Service),
        Just(ChargeKind::Discount),
        Just(ChargeKind::LateFee),
    ]
}

/// Strategy for the kinds staff may edit
pub fn editable_kind_strategy() -> impl Strategy<Value = ChargeKind> {
    prop_oneof![Just(ChargeKind::Service), Just(ChargeKind::Discount)]
}

/// Strategy for payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Transfer),
        Just(PaymentMethod::PromptPay),
        Just(PaymentMethod::Card),
    ]
}

/// Strategy for valid line item drafts
///
/// Generated drafts always pass validation: positive unit counts and
/// non-negative rates (any charge kind accepts a non-negative rate).
pub fn line_item_draft_strategy() -> impl Strategy<Value = LineItemDraft> {
    (
        charge_kind_strategy(),
        unit_count_strategy(),
        positive_money_strategy(),
    )
        .prop_map(|(kind, units, rate)| {
            LineItemDraft::new(kind, format!("{kind} row"), units, rate)
                .expect("generated inputs are valid")
        })
}
