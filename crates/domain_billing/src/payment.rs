//! Payment records
//!
//! Payments form an append-only ledger per invoice. A payment is recorded
//! in full or not at all; there is no partial or pending payment state in
//! this core. Receipt numbers are assigned when the record is created.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{InvoiceId, Money, PaymentId};

use crate::error::BillingError;

/// How the tenant paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the front desk
    Cash,
    /// Bank transfer
    Transfer,
    /// PromptPay QR
    PromptPay,
    /// Credit/debit card
    Card,
}

/// A validated, not-yet-persisted payment
///
/// The core does not enforce a server-side dedup key: disabling
/// re-submission while a request is pending is the caller's job. The
/// optional `client_reference` gives callers a place to carry their own
/// idempotency token end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    pub client_reference: Option<Uuid>,
}

impl PaymentDraft {
    /// Creates a validated draft
    ///
    /// # Errors
    ///
    /// Returns a validation error if `amount` is not strictly positive.
    pub fn new(
        amount: Money,
        method: PaymentMethod,
        paid_on: NaiveDate,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::validation(
                "amount",
                format!("must be positive, got {amount}"),
            ));
        }
        Ok(Self {
            amount,
            method,
            paid_on,
            note: None,
            client_reference: None,
        })
    }

    /// Attaches a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attaches a caller-side idempotency reference
    pub fn with_client_reference(mut self, reference: Uuid) -> Self {
        self.client_reference = Some(reference);
        self
    }

    /// Materializes the draft with a persistence-assigned id
    ///
    /// The receipt number is generated here, at creation time.
    pub fn into_payment(self, id: PaymentId, invoice_id: InvoiceId) -> Payment {
        Payment {
            id,
            invoice_id,
            amount: self.amount,
            method: self.method,
            paid_on: self.paid_on,
            note: self.note,
            receipt_number: generate_receipt_number(),
            client_reference: self.client_reference,
            recorded_at: Utc::now(),
        }
    }
}

/// A recorded payment against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    /// Receipt number assigned at creation
    pub receipt_number: String,
    /// Caller-supplied idempotency reference, if any
    pub client_reference: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

/// Generates a unique receipt number
fn generate_receipt_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("RCP-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn paid_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    #[test]
    fn test_draft_rejects_non_positive_amount() {
        for amount in [Money::zero(), Money::new(dec!(-10))] {
            let err = PaymentDraft::new(amount, PaymentMethod::Cash, paid_on()).unwrap_err();
            match err {
                BillingError::Validation { field, .. } => assert_eq!(field, "amount"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_payment_gets_receipt_number() {
        let payment = PaymentDraft::new(Money::new(dec!(500)), PaymentMethod::PromptPay, paid_on())
            .unwrap()
            .with_note("August rent, part 1")
            .into_payment(PaymentId::from_raw(1), InvoiceId::from_raw(9));

        assert!(payment.receipt_number.starts_with("RCP-"));
        assert_eq!(payment.note.as_deref(), Some("August rent, part 1"));
        assert_eq!(payment.invoice_id, InvoiceId::from_raw(9));
    }

    #[test]
    fn test_client_reference_is_carried() {
        let reference = Uuid::new_v4();
        let payment = PaymentDraft::new(Money::new(dec!(500)), PaymentMethod::Card, paid_on())
            .unwrap()
            .with_client_reference(reference)
            .into_payment(PaymentId::from_raw(2), InvoiceId::from_raw(9));

        assert_eq!(payment.client_reference, Some(reference));
    }
}
