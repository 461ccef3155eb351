//! Late-fee accrual
//!
//! Late fees are derived at read time from the due date and the
//! dormitory's per-day charge. The accrued fee is layered into the
//! invoice view; it is never persisted here. Materializing the fee as a
//! real line item is the nightly billing job's business, and until that
//! happens every read must derive the same figure for the same day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::invoice::Invoice;

/// Per-dormitory late-fee configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateFeePolicy {
    /// Surcharge per day past due
    pub charge_per_day: Money,
    /// Days past due before the surcharge starts counting
    pub grace_days: u32,
}

impl LateFeePolicy {
    /// Creates a policy with no grace period
    pub fn new(charge_per_day: Money) -> Self {
        Self {
            charge_per_day,
            grace_days: 0,
        }
    }

    /// Sets the grace period
    pub fn with_grace_days(mut self, grace_days: u32) -> Self {
        self.grace_days = grace_days;
        self
    }

    /// A policy that never charges
    pub fn disabled() -> Self {
        Self::new(Money::zero())
    }

    /// Chargeable days past due as of `today`
    pub fn late_days(&self, due_date: NaiveDate, today: NaiveDate) -> u32 {
        if today <= due_date {
            return 0;
        }
        let days_past = (today - due_date).num_days().max(0) as u32;
        days_past.saturating_sub(self.grace_days)
    }

    /// Accrued fee as of `today` for an unsettled invoice
    ///
    /// Settled invoices never accrue; the fee is `late_days ×
    /// charge_per_day` otherwise.
    pub fn accrue(&self, invoice: &Invoice, today: NaiveDate) -> AccruedLateFee {
        if invoice.is_settled() {
            return AccruedLateFee::none();
        }
        let late_days = self.late_days(invoice.due_date(), today);
        AccruedLateFee {
            late_days,
            amount: self.charge_per_day * Decimal::from(late_days),
        }
    }
}

/// The fee derived for one read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccruedLateFee {
    pub late_days: u32,
    pub amount: Money,
}

impl AccruedLateFee {
    pub fn none() -> Self {
        Self {
            late_days: 0,
            amount: Money::zero(),
        }
    }

    pub fn is_charged(&self) -> bool {
        self.amount.is_positive()
    }
}
