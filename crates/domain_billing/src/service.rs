//! Invoice application service
//!
//! `InvoiceService` drives every ledger operation end-to-end: it checks
//! the settlement guard on the in-memory aggregate, applies the mutation
//! to the persisted store through the port, and only then applies the
//! confirmed entity locally and recomputes totals. A failed or timed-out
//! port call therefore leaves the aggregate exactly as it was; there is
//! no partial local mutation to roll back.
//!
//! Domain events drained from the aggregate after a successful mutation
//! are forwarded to registered observers, so the email notifier and the
//! receipt printer react without holding any ledger logic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use core_kernel::{AdapterConfig, DormitoryId, InvoiceId, LineItemId, Money, PaymentId, PortError};

use crate::error::BillingError;
use crate::events::InvoiceEvent;
use crate::invoice::Invoice;
use crate::late_fee::LateFeePolicy;
use crate::line_item::LineItemDraft;
use crate::payment::PaymentDraft;
use crate::ports::{BillingPort, ItemMutation, PaymentMutation};
use crate::view::InvoiceView;

/// Callback invoked for every published domain event
pub type EventObserver = Box<dyn Fn(&InvoiceEvent) + Send + Sync>;

/// Application service over one billing port
pub struct InvoiceService {
    port: Arc<dyn BillingPort>,
    config: AdapterConfig,
    late_fees: LateFeePolicy,
    observers: Vec<EventObserver>,
}

impl InvoiceService {
    /// Creates a service with the default adapter configuration
    pub fn new(port: Arc<dyn BillingPort>, late_fees: LateFeePolicy) -> Self {
        Self {
            port,
            config: AdapterConfig::default(),
            late_fees,
            observers: Vec::new(),
        }
    }

    /// Overrides the adapter configuration (timeouts, retries)
    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers an observer for published domain events
    pub fn subscribe(&mut self, observer: impl Fn(&InvoiceEvent) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Fetches and rebuilds the invoice aggregate
    ///
    /// Any status the backend stored alongside the invoice is discarded;
    /// the aggregate derives settlement state from items and payments.
    pub async fn load_invoice(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, BillingError> {
        let record = self
            .call_port("fetch_invoice", self.port.fetch_invoice(dormitory_id, invoice_id))
            .await
            .map_err(|err| match err {
                BillingError::Transport(e) if e.is_not_found() => {
                    BillingError::InvoiceNotFound(invoice_id)
                }
                other => other,
            })?;
        debug!(invoice = %invoice_id, "loaded invoice, deriving status");
        Ok(Invoice::from(record))
    }

    /// Fetches just the payment ledger, for payment-history panels
    pub async fn payment_history(
        &self,
        dormitory_id: DormitoryId,
        invoice_id: InvoiceId,
    ) -> Result<Vec<crate::payment::Payment>, BillingError> {
        self.call_port(
            "fetch_payments",
            self.port.fetch_payments(dormitory_id, invoice_id),
        )
        .await
    }

    /// Adds a service or discount item and returns the new balance
    pub async fn add_item(
        &self,
        invoice: &mut Invoice,
        draft: LineItemDraft,
    ) -> Result<Money, BillingError> {
        self.guard(invoice)?;
        let item = self
            .call_port(
                "mutate_item",
                self.port
                    .mutate_item(invoice.dormitory_id(), invoice.id(), ItemMutation::Add(draft)),
            )
            .await?
            .ok_or_else(|| {
                BillingError::Transport(PortError::internal("add returned no item"))
            })?;

        invoice.add_item(item)?;
        let balance = invoice.balance();
        info!(invoice = %invoice.id(), %balance, "item added");
        self.publish(invoice);
        Ok(balance)
    }

    /// Re-prices a service or discount item and returns the new balance
    pub async fn update_item(
        &self,
        invoice: &mut Invoice,
        item_id: LineItemId,
        unit_count: Decimal,
        rate: Money,
    ) -> Result<Money, BillingError> {
        self.guard(invoice)?;
        let kind = self.check_item_editable(invoice, item_id)?;
        crate::line_item::validate_pricing(kind, unit_count, rate)?;

        self.call_port(
            "mutate_item",
            self.port.mutate_item(
                invoice.dormitory_id(),
                invoice.id(),
                ItemMutation::Edit {
                    item_id,
                    unit_count,
                    rate,
                },
            ),
        )
        .await?;

        invoice.update_item(item_id, unit_count, rate)?;
        let balance = invoice.balance();
        info!(invoice = %invoice.id(), item = %item_id, %balance, "item updated");
        self.publish(invoice);
        Ok(balance)
    }

    /// Deletes a service or discount item and returns the new balance
    pub async fn remove_item(
        &self,
        invoice: &mut Invoice,
        item_id: LineItemId,
    ) -> Result<Money, BillingError> {
        self.guard(invoice)?;
        self.check_item_editable(invoice, item_id)?;

        self.call_port(
            "mutate_item",
            self.port.mutate_item(
                invoice.dormitory_id(),
                invoice.id(),
                ItemMutation::Delete { item_id },
            ),
        )
        .await?;

        invoice.remove_item(item_id)?;
        let balance = invoice.balance();
        info!(invoice = %invoice.id(), item = %item_id, %balance, "item removed");
        self.publish(invoice);
        Ok(balance)
    }

    /// Records a payment and returns the new balance
    ///
    /// Overpayment is accepted; the returned balance is negative in that
    /// case and the caller decides whether to treat it as credit.
    /// Duplicate-submission protection is the caller's responsibility:
    /// disable re-submission while this call is pending.
    pub async fn record_payment(
        &self,
        invoice: &mut Invoice,
        draft: PaymentDraft,
    ) -> Result<Money, BillingError> {
        self.guard(invoice)?;
        let payment = self
            .call_port(
                "mutate_payment",
                self.port.mutate_payment(
                    invoice.dormitory_id(),
                    invoice.id(),
                    PaymentMutation::Add(draft),
                ),
            )
            .await?
            .ok_or_else(|| {
                BillingError::Transport(PortError::internal("add returned no payment"))
            })?;

        let receipt = payment.receipt_number.clone();
        let balance = invoice.record_payment(payment)?;
        info!(invoice = %invoice.id(), %balance, %receipt, "payment recorded");
        self.publish(invoice);
        Ok(balance)
    }

    /// Deletes a payment and returns the restored balance
    ///
    /// Permitted in any state; deleting a payment from a settled invoice
    /// reopens it.
    pub async fn delete_payment(
        &self,
        invoice: &mut Invoice,
        payment_id: PaymentId,
    ) -> Result<Money, BillingError> {
        if invoice.payment(payment_id).is_none() {
            return Err(BillingError::PaymentNotFound(payment_id));
        }

        self.call_port(
            "mutate_payment",
            self.port.mutate_payment(
                invoice.dormitory_id(),
                invoice.id(),
                PaymentMutation::Delete { payment_id },
            ),
        )
        .await?;

        let balance = invoice.delete_payment(payment_id)?;
        info!(invoice = %invoice.id(), payment = %payment_id, %balance, "payment deleted");
        self.publish(invoice);
        Ok(balance)
    }

    /// Deletes an unsettled invoice
    ///
    /// Allowed whenever the invoice is unsettled, even with partial
    /// payment history. Consumes the aggregate on success.
    pub async fn delete_invoice(&self, invoice: Invoice) -> Result<(), BillingError> {
        invoice.ensure_mutable().inspect_err(|_| {
            warn!(invoice = %invoice.id(), "refusing to delete settled invoice");
        })?;
        self.call_port(
            "delete_invoice",
            self.port.delete_invoice(invoice.dormitory_id(), invoice.id()),
        )
        .await?;
        info!(invoice = %invoice.id(), "invoice deleted");
        Ok(())
    }

    /// Projects the canonical read model as of today
    pub fn view(&self, invoice: &Invoice) -> InvoiceView {
        self.view_as_of(invoice, Utc::now().date_naive())
    }

    /// Projects the canonical read model as of a given date
    pub fn view_as_of(&self, invoice: &Invoice, today: NaiveDate) -> InvoiceView {
        InvoiceView::project(invoice, &self.late_fees, today)
    }

    /// Single source of truth for enabling mutation actions in the UI
    pub fn can_mutate(&self, invoice: &Invoice) -> bool {
        invoice.can_mutate()
    }

    fn guard(&self, invoice: &Invoice) -> Result<(), BillingError> {
        invoice.ensure_mutable().inspect_err(|_| {
            warn!(invoice = %invoice.id(), "mutation rejected: already settled");
        })
    }

    fn check_item_editable(
        &self,
        invoice: &Invoice,
        item_id: LineItemId,
    ) -> Result<crate::line_item::ChargeKind, BillingError> {
        let item = invoice
            .item(item_id)
            .ok_or(BillingError::ItemNotFound(item_id))?;
        if !item.kind.is_user_editable() {
            return Err(BillingError::SystemManagedItem(item.kind));
        }
        Ok(item.kind)
    }

    /// Runs a port call under the configured timeout
    async fn call_port<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, PortError>>,
    ) -> Result<T, BillingError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(BillingError::from),
            Err(_) => {
                warn!(operation, timeout_ms = self.config.timeout_ms, "port call timed out");
                Err(BillingError::Transport(PortError::timeout(
                    operation,
                    self.config.timeout_ms,
                )))
            }
        }
    }

    fn publish(&self, invoice: &mut Invoice) {
        for event in invoice.take_events() {
            debug!(invoice = %event.invoice_id(), ?event, "publishing event");
            for observer in &self.observers {
                observer(&event);
            }
        }
    }
}
