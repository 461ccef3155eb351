//! Core Kernel - Foundational types and utilities for the dormitory billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money type with precise decimal arithmetic
//! - Billing periods (calendar months) and due-date math
//! - Strongly-typed identifiers for persistence-assigned ids

pub mod money;
pub mod period;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, MoneyError};
pub use period::{BillingPeriod, PeriodError};
pub use identifiers::{
    DormitoryId, RoomId, TenantId, InvoiceId, LineItemId, PaymentId,
};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, AdapterConfig};
