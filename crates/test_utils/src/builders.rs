//! Test Data Builders
//!
//! Provides builder patterns for constructing test invoices with
//! sensible defaults. Tests specify only the fields they care about and
//! get the worked-example dormitory bill for everything else.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    BillingPeriod, DormitoryId, InvoiceId, LineItemId, Money, PaymentId, RoomId, TenantId,
};
use domain_billing::invoice::Invoice;
use domain_billing::line_item::{ChargeKind, LineItem, LineItemDraft};
use domain_billing::payment::{Payment, PaymentDraft, PaymentMethod};
use domain_billing::ports::InvoiceRecord;

use crate::fixtures::{IdFixtures, TemporalFixtures};

/// Builder for constructing test invoices
///
/// Produces an [`InvoiceRecord`] (the raw fetched shape) or a rebuilt
/// [`Invoice`] aggregate. Item and payment ids are allocated
/// sequentially the way the persistence layer would.
pub struct TestInvoiceBuilder {
    invoice_id: InvoiceId,
    dormitory_id: DormitoryId,
    room_id: RoomId,
    tenant_id: TenantId,
    period: BillingPeriod,
    due_date: NaiveDate,
    stored_status: Option<String>,
    items: Vec<(ChargeKind, String, Decimal, Money)>,
    payments: Vec<(Money, PaymentMethod)>,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a builder with default ids and an empty ledger
    pub fn new() -> Self {
        Self {
            invoice_id: IdFixtures::invoice_id(),
            dormitory_id: IdFixtures::dormitory_id(),
            room_id: IdFixtures::room_id(),
            tenant_id: IdFixtures::tenant_id(),
            period: TemporalFixtures::period(),
            due_date: TemporalFixtures::due_date(),
            stored_status: None,
            items: Vec::new(),
            payments: Vec::new(),
        }
    }

    /// Starts from the worked-example generated bill
    /// (rent 3000 + water 10×15 + electric 20×8 = 3310)
    pub fn generated_bill() -> Self {
        Self::new()
            .with_rent(Money::new(dec!(3000)))
            .with_water(dec!(10), Money::new(dec!(15)))
            .with_electric(dec!(20), Money::new(dec!(8)))
    }

    pub fn with_invoice_id(mut self, id: InvoiceId) -> Self {
        self.invoice_id = id;
        self
    }

    pub fn with_tenant_id(mut self, id: TenantId) -> Self {
        self.tenant_id = id;
        self
    }

    pub fn with_period(mut self, period: BillingPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets the backend's cached status string
    pub fn with_stored_status(mut self, status: impl Into<String>) -> Self {
        self.stored_status = Some(status.into());
        self
    }

    pub fn with_rent(mut self, amount: Money) -> Self {
        self.items
            .push((ChargeKind::Rent, "rent".to_string(), dec!(1), amount));
        self
    }

    pub fn with_water(mut self, units: Decimal, rate: Money) -> Self {
        self.items
            .push((ChargeKind::Water, "water".to_string(), units, rate));
        self
    }

    pub fn with_electric(mut self, units: Decimal, rate: Money) -> Self {
        self.items
            .push((ChargeKind::Electric, "electric".to_string(), units, rate));
        self
    }

    pub fn with_service(mut self, description: impl Into<String>, units: Decimal, rate: Money) -> Self {
        self.items
            .push((ChargeKind::Service, description.into(), units, rate));
        self
    }

    pub fn with_discount(mut self, description: impl Into<String>, units: Decimal, rate: Money) -> Self {
        self.items
            .push((ChargeKind::Discount, description.into(), units, rate));
        self
    }

    pub fn with_payment(mut self, amount: Money, method: PaymentMethod) -> Self {
        self.payments.push((amount, method));
        self
    }

    /// Builds the raw fetched record
    pub fn build_record(self) -> InvoiceRecord {
        let invoice_id = self.invoice_id;
        let items: Vec<LineItem> = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, (kind, description, units, rate))| {
                LineItemDraft::new(kind, description, units, rate)
                    .expect("builder inputs are valid")
                    .into_item(LineItemId::from_raw(i as i64 + 1), invoice_id)
            })
            .collect();
        let payments: Vec<Payment> = self
            .payments
            .into_iter()
            .enumerate()
            .map(|(i, (amount, method))| {
                PaymentDraft::new(amount, method, self.due_date)
                    .expect("builder inputs are valid")
                    .into_payment(PaymentId::from_raw(i as i64 + 1), invoice_id)
            })
            .collect();

        let now = Utc::now();
        InvoiceRecord {
            id: invoice_id,
            dormitory_id: self.dormitory_id,
            room_id: self.room_id,
            tenant_id: self.tenant_id,
            period: self.period,
            due_date: self.due_date,
            stored_status: self.stored_status,
            items,
            payments,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds the rebuilt aggregate
    pub fn build(self) -> Invoice {
        Invoice::from(self.build_record())
    }
}
