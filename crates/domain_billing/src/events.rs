//! Domain events for the invoice aggregate
//!
//! Events capture ledger changes so collaborators (email notifier,
//! receipt printer, report exporter) can react without embedding any
//! ledger logic of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, LineItemId, Money, PaymentId};

use crate::line_item::ChargeKind;

/// Domain events emitted by the Invoice aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InvoiceEvent {
    /// A line item was added
    ItemAdded {
        invoice_id: InvoiceId,
        item_id: LineItemId,
        kind: ChargeKind,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A line item's pricing changed
    ItemUpdated {
        invoice_id: InvoiceId,
        item_id: LineItemId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A line item was deleted
    ItemRemoved {
        invoice_id: InvoiceId,
        item_id: LineItemId,
        timestamp: DateTime<Utc>,
    },

    /// A payment was recorded
    PaymentRecorded {
        invoice_id: InvoiceId,
        payment_id: PaymentId,
        amount: Money,
        receipt_number: String,
        /// Balance after the payment; negative on overpayment
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },

    /// A payment was deleted
    PaymentDeleted {
        invoice_id: InvoiceId,
        payment_id: PaymentId,
        amount: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },

    /// Balance reached zero or below; mutation-guarded actions disabled
    InvoiceSettled {
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    /// A previously settled invoice has a positive balance again
    InvoiceReopened {
        invoice_id: InvoiceId,
        balance: Money,
        timestamp: DateTime<Utc>,
    },
}

impl InvoiceEvent {
    /// Returns the invoice the event belongs to
    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            InvoiceEvent::ItemAdded { invoice_id, .. }
            | InvoiceEvent::ItemUpdated { invoice_id, .. }
            | InvoiceEvent::ItemRemoved { invoice_id, .. }
            | InvoiceEvent::PaymentRecorded { invoice_id, .. }
            | InvoiceEvent::PaymentDeleted { invoice_id, .. }
            | InvoiceEvent::InvoiceSettled { invoice_id, .. }
            | InvoiceEvent::InvoiceReopened { invoice_id, .. } => *invoice_id,
        }
    }
}
