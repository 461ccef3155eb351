//! Invoice line items
//!
//! A line item is one charge or discount row on a monthly invoice. The
//! rent, water, electric, and late-fee rows are produced by the system
//! (bill generation, meter readings, late-fee accrual) and are frozen
//! once created; only service charges and discounts can be edited or
//! deleted by staff, and only while the invoice is unsettled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{InvoiceId, LineItemId, Money};

use crate::error::BillingError;

/// The kind of charge a line item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// Monthly room rent
    Rent,
    /// Metered water usage
    Water,
    /// Metered electricity usage
    Electric,
    /// Ad-hoc service charge (key replacement, cleaning, ...)
    Service,
    /// Discount; always contributes negatively to the total
    Discount,
    /// Late-payment surcharge accrued from the due date
    LateFee,
}

impl ChargeKind {
    /// Returns true for kinds created and owned by the system
    pub fn is_system_managed(&self) -> bool {
        matches!(
            self,
            ChargeKind::Rent | ChargeKind::Water | ChargeKind::Electric | ChargeKind::LateFee
        )
    }

    /// Returns true for kinds staff may edit or delete
    pub fn is_user_editable(&self) -> bool {
        matches!(self, ChargeKind::Service | ChargeKind::Discount)
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChargeKind::Rent => "rent",
            ChargeKind::Water => "water",
            ChargeKind::Electric => "electric",
            ChargeKind::Service => "service",
            ChargeKind::Discount => "discount",
            ChargeKind::LateFee => "late_fee",
        };
        write!(f, "{label}")
    }
}

/// A validated, not-yet-persisted line item
///
/// Drafts carry everything except the ids the persistence layer assigns.
/// Validation happens here, before any external call, so a rejected draft
/// leaves no state behind anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDraft {
    pub kind: ChargeKind,
    pub description: String,
    pub unit_count: Decimal,
    pub rate: Money,
}

impl LineItemDraft {
    /// Creates a validated draft
    ///
    /// # Errors
    ///
    /// Returns a field-level validation error if `unit_count` is not
    /// positive, or if `rate` is negative for a non-discount kind.
    pub fn new(
        kind: ChargeKind,
        description: impl Into<String>,
        unit_count: Decimal,
        rate: Money,
    ) -> Result<Self, BillingError> {
        validate_pricing(kind, unit_count, rate)?;
        Ok(Self {
            kind,
            description: description.into(),
            unit_count,
            rate,
        })
    }

    /// Materializes the draft with persistence-assigned ids
    pub fn into_item(self, id: LineItemId, invoice_id: InvoiceId) -> LineItem {
        LineItem {
            id,
            invoice_id,
            kind: self.kind,
            description: self.description,
            unit_count: self.unit_count,
            rate: self.rate,
            amount: derive_amount(self.kind, self.unit_count, self.rate),
        }
    }
}

/// One charge or discount row on an invoice
///
/// `amount` is always derived as `unit_count × rate`, negated for
/// discounts; it is recomputed on every pricing change and never set
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
    pub kind: ChargeKind,
    pub description: String,
    pub unit_count: Decimal,
    pub rate: Money,
    pub amount: Money,
}

impl LineItem {
    /// Creates a line item from already-persisted values
    ///
    /// The amount is re-derived rather than trusted, so a row that was
    /// stored with a stale or wrongly-signed amount comes back corrected.
    pub fn from_persisted(
        id: LineItemId,
        invoice_id: InvoiceId,
        kind: ChargeKind,
        description: impl Into<String>,
        unit_count: Decimal,
        rate: Money,
    ) -> Result<Self, BillingError> {
        validate_pricing(kind, unit_count, rate)?;
        Ok(Self {
            id,
            invoice_id,
            kind,
            description: description.into(),
            unit_count,
            rate,
            amount: derive_amount(kind, unit_count, rate),
        })
    }

    /// Updates unit count and rate, re-deriving the amount
    ///
    /// # Errors
    ///
    /// Returns `SystemManagedItem` for rent, water, electric, and
    /// late-fee rows; validation errors for bad pricing inputs.
    pub fn update_pricing(&mut self, unit_count: Decimal, rate: Money) -> Result<(), BillingError> {
        if !self.kind.is_user_editable() {
            return Err(BillingError::SystemManagedItem(self.kind));
        }
        validate_pricing(self.kind, unit_count, rate)?;
        self.unit_count = unit_count;
        self.rate = rate;
        self.amount = derive_amount(self.kind, unit_count, rate);
        Ok(())
    }
}

/// Derives the signed amount for a line item
///
/// Discounts are stored as negative amounts regardless of the rate's
/// sign, so a discount entered with a positive rate still reduces the
/// total.
pub(crate) fn derive_amount(kind: ChargeKind, unit_count: Decimal, rate: Money) -> Money {
    let gross = rate * unit_count;
    if kind == ChargeKind::Discount {
        -gross.abs()
    } else {
        gross
    }
}

pub(crate) fn validate_pricing(
    kind: ChargeKind,
    unit_count: Decimal,
    rate: Money,
) -> Result<(), BillingError> {
    if unit_count <= Decimal::ZERO {
        return Err(BillingError::validation(
            "unit_count",
            format!("must be positive, got {unit_count}"),
        ));
    }
    if rate.is_negative() && kind != ChargeKind::Discount {
        return Err(BillingError::validation(
            "rate",
            format!("negative rate is only allowed for discounts, got {rate} on {kind}"),
        ));
    }
    Ok(())
}
