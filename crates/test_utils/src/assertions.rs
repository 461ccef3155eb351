//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_billing::invoice::{Invoice, SettlementStatus};

/// Asserts that two Money values are equal
pub fn assert_money_eq(actual: Money, expected: Money) {
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={actual}, expected={expected}"
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: Money) {
    assert!(money.is_zero(), "Expected zero money, got {money}");
}

/// Asserts that money values sum to a total
pub fn assert_money_sum_equals(parts: &[Money], total: Money) {
    let sum: Money = parts.iter().copied().sum();
    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({sum}) doesn't equal total ({total})"
    );
}

/// Asserts that an invoice is settled with its guard disabled
pub fn assert_settled(invoice: &Invoice) {
    assert_eq!(
        invoice.status(),
        SettlementStatus::Settled,
        "Expected settled invoice, balance is {}",
        invoice.balance()
    );
    assert!(
        !invoice.can_mutate(),
        "Settled invoice must not accept mutations"
    );
}

/// Asserts that an invoice is unsettled with the expected balance
pub fn assert_unsettled_with_balance(invoice: &Invoice, expected: Money) {
    assert_eq!(
        invoice.status(),
        SettlementStatus::Unsettled,
        "Expected unsettled invoice, balance is {}",
        invoice.balance()
    );
    assert_money_eq(invoice.balance(), expected);
    assert!(
        invoice.can_mutate(),
        "Unsettled invoice must accept mutations"
    );
}
