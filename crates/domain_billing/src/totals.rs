//! Totals calculator
//!
//! Pure derivation of invoice totals and outstanding balances. These
//! functions are deterministic and side-effect free, and they are re-run
//! after every item or payment mutation; no cached total anywhere in the
//! system is authoritative over their output.

use core_kernel::Money;

use crate::line_item::{ChargeKind, LineItem};
use crate::payment::Payment;

/// Sums line item amounts into the invoice total
///
/// Discount items contribute `-abs(amount)` even if their stored amount
/// is already negative, so an upstream sign error cannot turn a discount
/// into a charge.
pub fn invoice_total(items: &[LineItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + effective_amount(item))
}

/// Sums payment amounts received against the invoice
pub fn payments_total(payments: &[Payment]) -> Money {
    payments
        .iter()
        .fold(Money::zero(), |acc, p| acc + p.amount)
}

/// Outstanding balance: total minus payments received
///
/// A balance at or below zero means the invoice is settled; overpayment
/// shows up as a negative balance.
pub fn outstanding_balance(total: Money, payments: &[Payment]) -> Money {
    total - payments_total(payments)
}

fn effective_amount(item: &LineItem) -> Money {
    if item.kind == ChargeKind::Discount {
        -item.amount.abs()
    } else {
        item.amount
    }
}
