//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! billing system. These fixtures are designed to be consistent and
//! predictable for unit tests; anything that needs variation goes
//! through the builders instead.

use chrono::NaiveDate;
use core_kernel::{BillingPeriod, DormitoryId, InvoiceId, Money, RoomId, TenantId};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard monthly rent
    pub fn rent() -> Money {
        Money::new(dec!(3000.00))
    }

    /// Water rate per unit
    pub fn water_rate() -> Money {
        Money::new(dec!(15.00))
    }

    /// Electric rate per unit
    pub fn electric_rate() -> Money {
        Money::new(dec!(8.00))
    }

    /// Late-fee charge per day
    pub fn late_fee_per_day() -> Money {
        Money::new(dec!(20.00))
    }

    /// The worked-example invoice total (rent + 10 water + 20 electric)
    pub fn generated_bill_total() -> Money {
        Money::new(dec!(3310.00))
    }

    /// A zero amount
    pub fn zero() -> Money {
        Money::zero()
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard billing period (August 2026)
    pub fn period() -> BillingPeriod {
        BillingPeriod::new(2026, 8).expect("valid month")
    }

    /// Standard due date within the period
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 10).expect("valid date")
    }

    /// A date before the due date
    pub fn before_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).expect("valid date")
    }

    /// Ten days past the due date
    pub fn ten_days_late() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 20).expect("valid date")
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn dormitory_id() -> DormitoryId {
        DormitoryId::from_raw(1)
    }

    pub fn room_id() -> RoomId {
        RoomId::from_raw(101)
    }

    pub fn tenant_id() -> TenantId {
        TenantId::from_raw(7)
    }

    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_raw(1)
    }
}

/// Fixture for human-readable strings
pub struct StringFixtures;

impl StringFixtures {
    /// A realistic tenant name
    pub fn tenant_name() -> String {
        Name().fake()
    }

    /// A room label as the back office prints it
    pub fn room_label() -> String {
        "A-101".to_string()
    }
}
