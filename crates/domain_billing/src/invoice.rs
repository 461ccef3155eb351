//! Invoice Aggregate Root
//!
//! The Invoice aggregate is the consistency boundary for the monthly
//! ledger. It owns the line items and the payment ledger of one billing
//! statement and gates every mutation on the derived settlement state.
//!
//! # Invariants
//!
//! - Settlement status is derived from the balance on every read; a
//!   stored status is never trusted.
//! - Item mutations and new payments are rejected once the balance is at
//!   or below zero.
//! - Payment deletion is allowed in any state and may reopen the invoice.
//! - Totals are recomputed through the totals calculator after every
//!   mutation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, DormitoryId, InvoiceId, LineItemId, Money, PaymentId, RoomId, TenantId};

use crate::error::BillingError;
use crate::events::InvoiceEvent;
use crate::line_item::LineItem;
use crate::payment::Payment;
use crate::ports::InvoiceRecord;
use crate::totals;

/// Derived lifecycle state of an invoice
///
/// `Settled` exactly when the outstanding balance is at or below zero.
/// The two states are freely re-entered as payments and items come and
/// go; neither is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Balance is positive; all mutations permitted
    Unsettled,
    /// Balance is zero or negative; only viewing and payment deletion permitted
    Settled,
}

/// One monthly billing statement for a room/tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    dormitory_id: DormitoryId,
    room_id: RoomId,
    tenant_id: TenantId,
    period: BillingPeriod,
    due_date: NaiveDate,
    items: Vec<LineItem>,
    payments: Vec<Payment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Domain events accumulated since the last drain
    #[serde(skip)]
    events: Vec<InvoiceEvent>,
}

impl Invoice {
    /// Creates an empty invoice
    ///
    /// Bill generation (the external billing job) normally populates the
    /// system-managed rows right after creation.
    pub fn new(
        id: InvoiceId,
        dormitory_id: DormitoryId,
        room_id: RoomId,
        tenant_id: TenantId,
        period: BillingPeriod,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            dormitory_id,
            room_id,
            tenant_id,
            period,
            due_date,
            items: Vec::new(),
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn dormitory_id(&self) -> DormitoryId {
        self.dormitory_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Looks up a line item by id
    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Looks up a payment by id
    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Invoice total, recomputed from the line items
    pub fn total(&self) -> Money {
        totals::invoice_total(&self.items)
    }

    /// Sum of payments received
    pub fn paid_total(&self) -> Money {
        totals::payments_total(&self.payments)
    }

    /// Outstanding balance, recomputed from items and payments
    pub fn balance(&self) -> Money {
        totals::outstanding_balance(self.total(), &self.payments)
    }

    /// Derived settlement status; never read from storage
    pub fn status(&self) -> SettlementStatus {
        if self.balance() > Money::zero() {
            SettlementStatus::Unsettled
        } else {
            SettlementStatus::Settled
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status() == SettlementStatus::Settled
    }

    /// Single source of truth for whether add/edit/delete/payment actions
    /// are enabled
    pub fn can_mutate(&self) -> bool {
        !self.is_settled()
    }

    /// Returns `AlreadySettled` unless the invoice accepts mutations
    pub fn ensure_mutable(&self) -> Result<(), BillingError> {
        if self.can_mutate() {
            Ok(())
        } else {
            Err(BillingError::AlreadySettled)
        }
    }

    /// True when the due date has passed and the invoice is unsettled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && !self.is_settled()
    }

    /// Adds a persisted line item to the ledger
    ///
    /// # Errors
    ///
    /// `AlreadySettled` if the invoice no longer accepts mutations, or a
    /// validation error if the item belongs to another invoice.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), BillingError> {
        self.ensure_mutable()?;
        if item.invoice_id != self.id {
            return Err(BillingError::validation(
                "invoice_id",
                format!("item belongs to {}, not {}", item.invoice_id, self.id),
            ));
        }

        let was_settled = self.is_settled();
        let now = Utc::now();
        self.events.push(InvoiceEvent::ItemAdded {
            invoice_id: self.id,
            item_id: item.id,
            kind: item.kind,
            amount: item.amount,
            timestamp: now,
        });
        self.items.push(item);
        self.touch(now);
        self.emit_transition(was_settled, now);
        Ok(())
    }

    /// Updates the pricing of a service or discount item
    pub fn update_item(
        &mut self,
        item_id: LineItemId,
        unit_count: Decimal,
        rate: Money,
    ) -> Result<(), BillingError> {
        self.ensure_mutable()?;
        let was_settled = self.is_settled();

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(BillingError::ItemNotFound(item_id))?;
        item.update_pricing(unit_count, rate)?;
        let amount = item.amount;

        let now = Utc::now();
        self.events.push(InvoiceEvent::ItemUpdated {
            invoice_id: self.id,
            item_id,
            amount,
            timestamp: now,
        });
        self.touch(now);
        self.emit_transition(was_settled, now);
        Ok(())
    }

    /// Deletes a service or discount item
    pub fn remove_item(&mut self, item_id: LineItemId) -> Result<(), BillingError> {
        self.ensure_mutable()?;
        let was_settled = self.is_settled();

        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(BillingError::ItemNotFound(item_id))?;
        if !self.items[index].kind.is_user_editable() {
            return Err(BillingError::SystemManagedItem(self.items[index].kind));
        }
        self.items.remove(index);

        let now = Utc::now();
        self.events.push(InvoiceEvent::ItemRemoved {
            invoice_id: self.id,
            item_id,
            timestamp: now,
        });
        self.touch(now);
        self.emit_transition(was_settled, now);
        Ok(())
    }

    /// Appends a payment to the ledger and returns the new balance
    ///
    /// Overpayment is accepted; the returned balance goes negative and it
    /// is the caller's decision whether to treat that as credit or error.
    ///
    /// # Errors
    ///
    /// `AlreadySettled` when the balance is already at or below zero.
    pub fn record_payment(&mut self, payment: Payment) -> Result<Money, BillingError> {
        self.ensure_mutable()?;
        if payment.invoice_id != self.id {
            return Err(BillingError::validation(
                "invoice_id",
                format!("payment belongs to {}, not {}", payment.invoice_id, self.id),
            ));
        }

        let was_settled = self.is_settled();
        let now = Utc::now();
        let payment_id = payment.id;
        let amount = payment.amount;
        let receipt_number = payment.receipt_number.clone();
        self.payments.push(payment);

        let balance = self.balance();
        self.events.push(InvoiceEvent::PaymentRecorded {
            invoice_id: self.id,
            payment_id,
            amount,
            receipt_number,
            balance_after: balance,
            timestamp: now,
        });
        self.touch(now);
        self.emit_transition(was_settled, now);
        Ok(balance)
    }

    /// Deletes a payment and returns the restored balance
    ///
    /// Permitted in any state, including on a settled invoice that was
    /// already reported paid; the invoice simply reopens.
    pub fn delete_payment(&mut self, payment_id: PaymentId) -> Result<Money, BillingError> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or(BillingError::PaymentNotFound(payment_id))?;

        let was_settled = self.is_settled();
        let removed = self.payments.remove(index);
        let now = Utc::now();

        let balance = self.balance();
        self.events.push(InvoiceEvent::PaymentDeleted {
            invoice_id: self.id,
            payment_id,
            amount: removed.amount,
            balance_after: balance,
            timestamp: now,
        });
        self.touch(now);
        self.emit_transition(was_settled, now);
        Ok(balance)
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<InvoiceEvent> {
        std::mem::take(&mut self.events)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn emit_transition(&mut self, was_settled: bool, now: DateTime<Utc>) {
        let settled = self.is_settled();
        if !was_settled && settled {
            self.events.push(InvoiceEvent::InvoiceSettled {
                invoice_id: self.id,
                timestamp: now,
            });
        } else if was_settled && !settled {
            self.events.push(InvoiceEvent::InvoiceReopened {
                invoice_id: self.id,
                balance: self.balance(),
                timestamp: now,
            });
        }
    }
}

impl From<InvoiceRecord> for Invoice {
    /// Rebuilds the aggregate from a fetched record
    ///
    /// The record's `stored_status` is a backend cache and is discarded;
    /// status is derived from items and payments alone.
    fn from(record: InvoiceRecord) -> Self {
        Self {
            id: record.id,
            dormitory_id: record.dormitory_id,
            room_id: record.room_id,
            tenant_id: record.tenant_id,
            period: record.period,
            due_date: record.due_date,
            items: record.items,
            payments: record.payments,
            created_at: record.created_at,
            updated_at: record.updated_at,
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{ChargeKind, LineItemDraft};
    use crate::payment::{PaymentDraft, PaymentMethod};
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        Invoice::new(
            InvoiceId::from_raw(1),
            DormitoryId::from_raw(1),
            RoomId::from_raw(101),
            TenantId::from_raw(7),
            BillingPeriod::new(2026, 8).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        )
    }

    /// Seeds a row the way the external billing job does, bypassing the
    /// settlement guard (a brand-new empty invoice has zero balance)
    fn seed(invoice: &mut Invoice, raw_id: i64, kind: ChargeKind, units: Decimal, rate: Money) {
        let item = LineItemDraft::new(kind, kind.to_string(), units, rate)
            .unwrap()
            .into_item(LineItemId::from_raw(raw_id), invoice.id());
        invoice.items.push(item);
    }

    fn add(invoice: &mut Invoice, raw_id: i64, kind: ChargeKind, units: Decimal, rate: Money) {
        let item = LineItemDraft::new(kind, kind.to_string(), units, rate)
            .unwrap()
            .into_item(LineItemId::from_raw(raw_id), invoice.id());
        invoice.add_item(item).unwrap();
    }

    fn pay(invoice: &mut Invoice, raw_id: i64, amount: Money) -> Money {
        let payment = PaymentDraft::new(
            amount,
            PaymentMethod::Cash,
            NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
        )
        .unwrap()
        .into_payment(PaymentId::from_raw(raw_id), invoice.id());
        invoice.record_payment(payment).unwrap()
    }

    #[test]
    fn test_fresh_empty_invoice_is_settled() {
        // Zero balance means settled, even before the billing job runs
        assert!(invoice().is_settled());
    }

    #[test]
    fn test_status_follows_balance() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(3000)));
        assert_eq!(inv.status(), SettlementStatus::Unsettled);
        assert!(inv.can_mutate());

        pay(&mut inv, 1, Money::new(dec!(3000)));
        assert_eq!(inv.status(), SettlementStatus::Settled);
        assert!(!inv.can_mutate());
    }

    #[test]
    fn test_settled_invoice_rejects_mutations() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(100)));
        pay(&mut inv, 1, Money::new(dec!(100)));

        let item = LineItemDraft::new(ChargeKind::Service, "keys", dec!(1), Money::new(dec!(50)))
            .unwrap()
            .into_item(LineItemId::from_raw(2), inv.id());
        assert!(matches!(
            inv.add_item(item).unwrap_err(),
            BillingError::AlreadySettled
        ));

        let payment = PaymentDraft::new(
            Money::new(dec!(10)),
            PaymentMethod::Cash,
            NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
        )
        .unwrap()
        .into_payment(PaymentId::from_raw(2), inv.id());
        assert!(matches!(
            inv.record_payment(payment).unwrap_err(),
            BillingError::AlreadySettled
        ));
    }

    #[test]
    fn test_payment_deletion_reopens_settled_invoice() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(3360)));
        pay(&mut inv, 1, Money::new(dec!(3360)));
        assert!(inv.is_settled());

        let balance = inv.delete_payment(PaymentId::from_raw(1)).unwrap();
        assert_eq!(balance, Money::new(dec!(3360)));
        assert!(!inv.is_settled());
        assert!(inv.can_mutate());

        let events = inv.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, InvoiceEvent::InvoiceReopened { .. })));
    }

    #[test]
    fn test_delete_unknown_payment() {
        let mut inv = invoice();
        assert!(matches!(
            inv.delete_payment(PaymentId::from_raw(99)).unwrap_err(),
            BillingError::PaymentNotFound(_)
        ));
    }

    #[test]
    fn test_overpayment_is_accepted_and_goes_negative() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(100)));
        let balance = pay(&mut inv, 1, Money::new(dec!(150)));
        assert_eq!(balance, Money::new(dec!(-50)));
        assert!(inv.is_settled());
    }

    #[test]
    fn test_full_month_worked_example() {
        let mut inv = invoice();
        // The generated bill arrives with the system-managed rows
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(3000)));
        seed(&mut inv, 2, ChargeKind::Water, dec!(10), Money::new(dec!(15)));
        seed(&mut inv, 3, ChargeKind::Electric, dec!(20), Money::new(dec!(8)));
        assert_eq!(inv.total(), Money::new(dec!(3310)));

        add(&mut inv, 4, ChargeKind::Service, dec!(1), Money::new(dec!(100)));
        assert_eq!(inv.total(), Money::new(dec!(3410)));

        add(&mut inv, 5, ChargeKind::Discount, dec!(1), Money::new(dec!(50)));
        assert_eq!(inv.total(), Money::new(dec!(3360)));

        let balance = pay(&mut inv, 1, Money::new(dec!(3360)));
        assert!(balance.is_zero());
        assert_eq!(inv.status(), SettlementStatus::Settled);
        assert!(!inv.can_mutate());

        let restored = inv.delete_payment(PaymentId::from_raw(1)).unwrap();
        assert_eq!(restored, Money::new(dec!(3360)));
        assert_eq!(inv.status(), SettlementStatus::Unsettled);
        assert!(inv.can_mutate());
    }

    #[test]
    fn test_settlement_event_emitted_once() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(200)));
        pay(&mut inv, 1, Money::new(dec!(100)));
        pay(&mut inv, 2, Money::new(dec!(100)));

        let settled_events: Vec<_> = inv
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, InvoiceEvent::InvoiceSettled { .. }))
            .collect();
        assert_eq!(settled_events.len(), 1);
    }

    #[test]
    fn test_is_overdue_requires_unsettled() {
        let mut inv = invoice();
        seed(&mut inv, 1, ChargeKind::Rent, dec!(1), Money::new(dec!(100)));
        let after_due = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        assert!(inv.is_overdue(after_due));

        pay(&mut inv, 1, Money::new(dec!(100)));
        assert!(!inv.is_overdue(after_due));
    }
}
