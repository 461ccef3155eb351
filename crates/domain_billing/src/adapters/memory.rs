//! In-memory billing adapter
//!
//! Implements [`BillingPort`] over a process-local store. Used by the
//! test suites and local demos in place of the real persistence service.
//! Ids are allocated monotonically the way the backend's sequences
//! would, and the store keeps its own `stored_status` cache up to date
//! after every mutation, mirroring the backend recomputation the core
//! deliberately does not rely on.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use core_kernel::{
    BillingPeriod, DomainPort, DormitoryId, InvoiceId, LineItemId, PaymentId, PortError, RoomId,
    TenantId,
};

use crate::error::BillingError;
use crate::line_item::LineItemDraft;
use crate::payment::Payment;
use crate::ports::{BillingPort, InvoiceRecord, ItemMutation, PaymentMutation};
use crate::totals;

#[derive(Default)]
struct MemoryStore {
    invoices: HashMap<(DormitoryId, InvoiceId), InvoiceRecord>,
    next_invoice_id: i64,
    next_item_id: i64,
    next_payment_id: i64,
}

impl MemoryStore {
    fn next_invoice_id(&mut self) -> InvoiceId {
        self.next_invoice_id += 1;
        InvoiceId::from_raw(self.next_invoice_id)
    }

    fn next_item_id(&mut self) -> LineItemId {
        self.next_item_id += 1;
        LineItemId::from_raw(self.next_item_id)
    }

    fn next_payment_id(&mut self) -> PaymentId {
        self.next_payment_id += 1;
        PaymentId::from_raw(self.next_payment_id)
    }
}

/// Process-local [`BillingPort`] implementation
#[derive(Default)]
pub struct MemoryBillingAdapter {
    state: RwLock<MemoryStore>,
}

impl MemoryBillingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a generated bill the way the external billing job does
    ///
    /// Items are materialized with allocated ids; the invoice id is
    /// returned for subsequent fetches.
    pub async fn seed_invoice(
        &self,
        dormitory_id: DormitoryId,
        room_id: RoomId,
        tenant_id: TenantId,
        period: BillingPeriod,
        due_date: NaiveDate,
        drafts: Vec<LineItemDraft>,
    ) -> InvoiceId {
        let mut store = self.state.write().await;
        let invoice_id = store.next_invoice_id();
        let items = drafts
            .into_iter()
            .map(|draft| {
                let item_id = store.next_item_id();
                draft.into_item(item_id, invoice_id)
            })
            .collect::<Vec<_>>();
        let now = Utc::now();

        let mut record = InvoiceRecord {
            id: invoice_id,
            dormitory_id,
            room_id,
            tenant_id,
            period,
            due_date,
            stored_status: None,
            items,
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        refresh_status_cache(&mut record);
        store.invoices.insert((dormitory_id, invoice_id), record);
        invoice_id
    }
}

impl DomainPort for MemoryBillingAdapter {}

#[async_trait]
impl BillingPort for MemoryBillingAdapter {
    async fn fetch_invoice(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceRecord, PortError> {
        let store = self.state.read().await;
        store
            .invoices
            .get(&(dormitory_id, invoice_id))
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", invoice_id))
    }

    async fn fetch_payments(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, PortError> {
        let store = self.state.read().await;
        store
            .invoices
            .get(&(dormitory_id, invoice_id))
            .map(|record| record.payments.clone())
            .ok_or_else(|| PortError::not_found("Invoice", invoice_id))
    }

    async fn mutate_item(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
        mutation: ItemMutation,
    ) -> Result<Option<crate::line_item::LineItem>, PortError> {
        let mut store = self.state.write().await;
        let item_id = match &mutation {
            ItemMutation::Add(_) => Some(store.next_item_id()),
            _ => None,
        };
        let record = store
            .invoices
            .get_mut(&(dormitory_id, invoice_id))
            .ok_or_else(|| PortError::not_found("Invoice", invoice_id))?;

        let result = match mutation {
            ItemMutation::Add(draft) => {
                let item = draft.into_item(
                    item_id.unwrap_or_else(|| LineItemId::from_raw(0)),
                    invoice_id,
                );
                record.items.push(item.clone());
                Some(item)
            }
            ItemMutation::Edit {
                item_id,
                unit_count,
                rate,
            } => {
                let item = record
                    .items
                    .iter_mut()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| PortError::not_found("LineItem", item_id))?;
                item.update_pricing(unit_count, rate)
                    .map_err(to_port_error)?;
                Some(item.clone())
            }
            ItemMutation::Delete { item_id } => {
                let index = record
                    .items
                    .iter()
                    .position(|i| i.id == item_id)
                    .ok_or_else(|| PortError::not_found("LineItem", item_id))?;
                record.items.remove(index);
                None
            }
        };

        record.updated_at = Utc::now();
        refresh_status_cache(record);
        Ok(result)
    }

    async fn mutate_payment(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
        mutation: PaymentMutation,
    ) -> Result<Option<Payment>, PortError> {
        let mut store = self.state.write().await;
        let payment_id = match &mutation {
            PaymentMutation::Add(_) => Some(store.next_payment_id()),
            _ => None,
        };
        let record = store
            .invoices
            .get_mut(&(dormitory_id, invoice_id))
            .ok_or_else(|| PortError::not_found("Invoice", invoice_id))?;

        let result = match mutation {
            PaymentMutation::Add(draft) => {
                let payment = draft.into_payment(
                    payment_id.unwrap_or_else(|| PaymentId::from_raw(0)),
                    invoice_id,
                );
                record.payments.push(payment.clone());
                Some(payment)
            }
            PaymentMutation::Delete { payment_id } => {
                let index = record
                    .payments
                    .iter()
                    .position(|p| p.id == payment_id)
                    .ok_or_else(|| PortError::not_found("Payment", payment_id))?;
                record.payments.remove(index);
                None
            }
        };

        record.updated_at = Utc::now();
        refresh_status_cache(record);
        Ok(result)
    }

    async fn delete_invoice(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<(), PortError> {
        let mut store = self.state.write().await;
        store
            .invoices
            .remove(&(dormitory_id, invoice_id))
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Invoice", invoice_id))
    }
}

/// Keeps the backend-style status cache current after a mutation
fn refresh_status_cache(record: &mut InvoiceRecord) {
    let total = totals::invoice_total(&record.items);
    let balance = totals::outstanding_balance(total, &record.payments);
    record.stored_status = Some(if balance.is_positive() {
        "unpaid".to_string()
    } else {
        "paid".to_string()
    });
}

fn to_port_error(err: BillingError) -> PortError {
    match err {
        BillingError::Validation { field, message } => PortError::validation_field(message, field),
        BillingError::SystemManagedItem(kind) => {
            PortError::validation(format!("{kind} items are system-managed"))
        }
        other => PortError::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::ChargeKind;
    use crate::payment::{PaymentDraft, PaymentMethod};
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn rent_draft(amount: Money) -> LineItemDraft {
        LineItemDraft::new(ChargeKind::Rent, "rent", dec!(1), amount).unwrap()
    }

    async fn seeded(adapter: &MemoryBillingAdapter) -> (DormitoryId, InvoiceId) {
        let dorm = DormitoryId::from_raw(1);
        let id = adapter
            .seed_invoice(
                dorm,
                RoomId::from_raw(101),
                TenantId::from_raw(7),
                BillingPeriod::new(2026, 8).unwrap(),
                NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                vec![rent_draft(Money::new(dec!(3000)))],
            )
            .await;
        (dorm, id)
    }

    #[tokio::test]
    async fn test_seed_and_fetch() {
        let adapter = MemoryBillingAdapter::new();
        let (dorm, id) = seeded(&adapter).await;

        let record = adapter.fetch_invoice(dorm, id).await.unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.stored_status.as_deref(), Some("unpaid"));
    }

    #[tokio::test]
    async fn test_fetch_unknown_invoice() {
        let adapter = MemoryBillingAdapter::new();
        let err = adapter
            .fetch_invoice(DormitoryId::from_raw(1), InvoiceId::from_raw(99))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_cache_tracks_payments() {
        let adapter = MemoryBillingAdapter::new();
        let (dorm, id) = seeded(&adapter).await;

        let draft = PaymentDraft::new(
            Money::new(dec!(3000)),
            PaymentMethod::Transfer,
            NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
        )
        .unwrap();
        let payment = adapter
            .mutate_payment(dorm, id, PaymentMutation::Add(draft))
            .await
            .unwrap()
            .unwrap();
        assert!(payment.receipt_number.starts_with("RCP-"));

        let record = adapter.fetch_invoice(dorm, id).await.unwrap();
        assert_eq!(record.stored_status.as_deref(), Some("paid"));

        adapter
            .mutate_payment(dorm, id, PaymentMutation::Delete { payment_id: payment.id })
            .await
            .unwrap();
        let record = adapter.fetch_invoice(dorm, id).await.unwrap();
        assert_eq!(record.stored_status.as_deref(), Some("unpaid"));
    }

    #[tokio::test]
    async fn test_edit_system_managed_item_rejected() {
        let adapter = MemoryBillingAdapter::new();
        let (dorm, id) = seeded(&adapter).await;
        let record = adapter.fetch_invoice(dorm, id).await.unwrap();
        let rent_id = record.items[0].id;

        let err = adapter
            .mutate_item(
                dorm,
                id,
                ItemMutation::Edit {
                    item_id: rent_id,
                    unit_count: dec!(2),
                    rate: Money::new(dec!(3000)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation { .. }));
    }
}
