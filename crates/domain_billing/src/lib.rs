//! Billing Domain - Invoice Ledger and Payment Reconciliation
//!
//! This crate implements the monthly invoice ledger for the dormitory
//! back office: per-invoice charge and discount line items, derived
//! totals, cumulative payment tracking, and settlement gating of
//! mutations.
//!
//! # Core Rules
//!
//! - Totals and balances are always recomputed from line items and
//!   payments; no stored figure is authoritative.
//! - Settlement status is derived: an invoice is settled exactly when its
//!   balance is at or below zero.
//! - Settled invoices reject item mutations and further payments; payment
//!   deletion is permitted in any state and reopens the invoice.
//! - Late fees accrue at read time from the due date and are never
//!   persisted by this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Invoice, LineItemDraft, ChargeKind, PaymentDraft, PaymentMethod};
//!
//! let mut invoice = service.load_invoice(dorm_id, invoice_id).await?;
//! let balance = service
//!     .record_payment(&mut invoice, PaymentDraft::new(amount, PaymentMethod::PromptPay, today)?)
//!     .await?;
//! ```

pub mod line_item;
pub mod totals;
pub mod payment;
pub mod invoice;
pub mod late_fee;
pub mod view;
pub mod events;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod settings;
pub mod error;

pub use line_item::{LineItem, LineItemDraft, ChargeKind};
pub use payment::{Payment, PaymentDraft, PaymentMethod};
pub use invoice::{Invoice, SettlementStatus};
pub use late_fee::LateFeePolicy;
pub use view::InvoiceView;
pub use events::InvoiceEvent;
pub use ports::{BillingPort, InvoiceRecord, ItemMutation, PaymentMutation};
pub use adapters::memory::MemoryBillingAdapter;
pub use service::InvoiceService;
pub use settings::BillingSettings;
pub use error::BillingError;
