//! Billing Domain Ports
//!
//! This module defines the persistence seam for the billing core. The
//! core owns no storage or wire protocol; every read and mutation goes
//! through [`BillingPort`], and the deployment wires in an adapter for
//! whatever backend it talks to (the REST billing service in production,
//! [`crate::adapters::memory::MemoryBillingAdapter`] in tests).
//!
//! Mutations are applied to the persisted store before the in-memory
//! aggregate is told about them: the service calls the port first and
//! applies the returned entity only on success, so a failed call leaves
//! no partial local state.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    BillingPeriod, DomainPort, DormitoryId, InvoiceId, LineItemId, Money, PaymentId, PortError,
    RoomId, TenantId,
};

use crate::line_item::{LineItem, LineItemDraft};
use crate::payment::{Payment, PaymentDraft};

/// The raw fetched shape of one invoice
///
/// `stored_status` is whatever status string the backend has cached.
/// It is carried for diagnostics but never trusted; the aggregate
/// derives status from items and payments on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub dormitory_id: DormitoryId,
    pub room_id: RoomId,
    pub tenant_id: TenantId,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
    /// Backend status cache; invalidated on read, never authoritative
    pub stored_status: Option<String>,
    pub items: Vec<LineItem>,
    pub payments: Vec<Payment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item mutation request
#[derive(Debug, Clone)]
pub enum ItemMutation {
    /// Create a new item from a validated draft
    Add(LineItemDraft),
    /// Re-price an existing item
    Edit {
        item_id: LineItemId,
        unit_count: Decimal,
        rate: Money,
    },
    /// Delete an item
    Delete { item_id: LineItemId },
}

/// A payment mutation request
#[derive(Debug, Clone)]
pub enum PaymentMutation {
    /// Record a new payment from a validated draft
    Add(PaymentDraft),
    /// Delete a payment
    Delete { payment_id: PaymentId },
}

/// Persistence port for the billing domain
///
/// Implementations must be atomic per call: a mutation either lands
/// fully or reports an error having changed nothing. Concurrent-write
/// detection is the backend's job, surfaced as [`PortError::Conflict`]
/// so the caller can refetch and retry.
#[async_trait]
pub trait BillingPort: DomainPort {
    /// Fetches an invoice with its items and payments
    async fn fetch_invoice(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceRecord, PortError>;

    /// Fetches just the payment ledger of an invoice
    async fn fetch_payments(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, PortError>;

    /// Applies an item mutation
    ///
    /// Returns the created/updated item for `Add`/`Edit`, `None` for
    /// `Delete`.
    async fn mutate_item(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
        mutation: ItemMutation,
    ) -> Result<Option<LineItem>, PortError>;

    /// Applies a payment mutation
    ///
    /// Returns the created payment for `Add`, `None` for `Delete`.
    async fn mutate_payment(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
        mutation: PaymentMutation,
    ) -> Result<Option<Payment>, PortError>;

    /// Deletes the invoice itself
    async fn delete_invoice(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<(), PortError>;
}
