//! Invoice read model
//!
//! `InvoiceView` is the canonical projection that presentation, print,
//! and export collaborators consume instead of recomputing totals
//! themselves. The projection is pure in `(invoice, policy, today)`:
//! projecting twice without an intervening mutation yields identical
//! output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, DormitoryId, InvoiceId, Money, RoomId, TenantId};

use crate::invoice::{Invoice, SettlementStatus};
use crate::late_fee::LateFeePolicy;
use crate::line_item::LineItem;

/// Canonical read model of one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceView {
    pub invoice_id: InvoiceId,
    pub dormitory_id: DormitoryId,
    pub room_id: RoomId,
    pub tenant_id: TenantId,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
    /// Persisted line items; the accrued late fee is reported separately
    pub items: Vec<LineItem>,
    /// Invoice total over persisted items
    pub total: Money,
    /// Payments received to date
    pub paid: Money,
    /// Outstanding balance; negative on overpayment
    pub balance: Money,
    pub status: SettlementStatus,
    /// Chargeable days past due as of the projection date
    pub late_days: u32,
    /// Late fee accrued at read time, not yet materialized
    pub late_fee: Money,
    /// Balance plus accrued late fee; what the tenant owes today
    pub total_due: Money,
    /// Whether add/edit/delete/payment actions should be enabled
    pub can_mutate: bool,
    /// Whether a reminder email is appropriate (unsettled and overdue)
    pub can_remind: bool,
}

impl InvoiceView {
    /// Projects the invoice as of `today`
    pub fn project(invoice: &Invoice, policy: &LateFeePolicy, today: NaiveDate) -> Self {
        let total = invoice.total();
        let paid = invoice.paid_total();
        let balance = invoice.balance();
        let status = invoice.status();
        let accrued = policy.accrue(invoice, today);

        Self {
            invoice_id: invoice.id(),
            dormitory_id: invoice.dormitory_id(),
            room_id: invoice.room_id(),
            tenant_id: invoice.tenant_id(),
            period: invoice.period(),
            due_date: invoice.due_date(),
            items: invoice.items().to_vec(),
            total,
            paid,
            balance,
            status,
            late_days: accrued.late_days,
            late_fee: accrued.amount,
            total_due: balance + accrued.amount,
            can_mutate: invoice.can_mutate(),
            can_remind: invoice.is_overdue(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{ChargeKind, LineItemDraft};
    use crate::payment::{PaymentDraft, PaymentMethod};
    use crate::ports::InvoiceRecord;
    use chrono::Utc;
    use core_kernel::{LineItemId, PaymentId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn overdue_invoice(total: Money, paid: Money, due: NaiveDate) -> Invoice {
        let id = InvoiceId::from_raw(1);
        let items = vec![LineItemDraft::new(ChargeKind::Rent, "rent", dec!(1), total)
            .unwrap()
            .into_item(LineItemId::from_raw(1), id)];
        let payments = if paid.is_positive() {
            vec![
                PaymentDraft::new(paid, PaymentMethod::Transfer, due)
                    .unwrap()
                    .into_payment(PaymentId::from_raw(1), id),
            ]
        } else {
            Vec::new()
        };
        Invoice::from(InvoiceRecord {
            id,
            dormitory_id: DormitoryId::from_raw(1),
            room_id: RoomId::from_raw(101),
            tenant_id: TenantId::from_raw(7),
            period: BillingPeriod::from_date(due),
            due_date: due,
            stored_status: Some("paid".to_string()),
            items,
            payments,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_overdue_surcharge_display() {
        // Due 10 days ago, 20/day, unsettled balance 500
        let invoice = overdue_invoice(
            Money::new(dec!(500)),
            Money::zero(),
            date(2026, 7, 28),
        );
        let policy = LateFeePolicy::new(Money::new(dec!(20)));
        let view = InvoiceView::project(&invoice, &policy, date(2026, 8, 7));

        assert_eq!(view.late_days, 10);
        assert_eq!(view.late_fee, Money::new(dec!(200)));
        assert_eq!(view.balance, Money::new(dec!(500)));
        assert_eq!(view.total_due, Money::new(dec!(700)));
        // Stored total is unaffected until a billing job materializes the fee
        assert_eq!(view.total, Money::new(dec!(500)));
        assert!(view.can_remind);
    }

    #[test]
    fn test_stored_status_is_ignored() {
        // The record claims "paid"; the derived view says unsettled
        let invoice = overdue_invoice(Money::new(dec!(500)), Money::zero(), date(2026, 7, 28));
        let policy = LateFeePolicy::disabled();
        let view = InvoiceView::project(&invoice, &policy, date(2026, 8, 7));
        assert_eq!(view.status, SettlementStatus::Unsettled);
        assert!(view.can_mutate);
    }

    #[test]
    fn test_settled_invoice_accrues_no_fee() {
        let invoice = overdue_invoice(
            Money::new(dec!(500)),
            Money::new(dec!(500)),
            date(2026, 7, 28),
        );
        let policy = LateFeePolicy::new(Money::new(dec!(20)));
        let view = InvoiceView::project(&invoice, &policy, date(2026, 8, 7));

        assert_eq!(view.status, SettlementStatus::Settled);
        assert_eq!(view.late_fee, Money::zero());
        assert_eq!(view.total_due, Money::zero());
        assert!(!view.can_mutate);
        assert!(!view.can_remind);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let invoice = overdue_invoice(Money::new(dec!(500)), Money::zero(), date(2026, 7, 28));
        let policy = LateFeePolicy::new(Money::new(dec!(20)));
        let today = date(2026, 8, 7);

        let first = InvoiceView::project(&invoice, &policy, today);
        let second = InvoiceView::project(&invoice, &policy, today);
        assert_eq!(first, second);
    }
}
