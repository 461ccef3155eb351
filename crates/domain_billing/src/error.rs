//! Billing domain errors

use thiserror::Error;

use core_kernel::{LineItemId, InvoiceId, PaymentId, PortError};

use crate::line_item::ChargeKind;

/// Errors that can occur in the billing domain
///
/// Every variant is scoped to a single invoice operation and leaves the
/// in-memory aggregate unchanged. `Conflict` requires the caller to
/// refetch the invoice before retrying; `Transport` failures are
/// retryable at the caller's discretion.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Malformed item or payment input
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// Mutation attempted on a settled invoice
    #[error("Invoice is already settled")]
    AlreadySettled,

    /// Edit or delete attempted on a system-managed line item
    #[error("{0} items are system-managed and cannot be edited or deleted")]
    SystemManagedItem(ChargeKind),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Line item not found on the invoice
    #[error("Line item not found: {0}")]
    ItemNotFound(LineItemId),

    /// Payment not found on the invoice
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Persistence layer reported a stale or concurrent write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External call failed or timed out; in-memory state is unchanged
    #[error("Transport error: {0}")]
    Transport(#[source] PortError),
}

impl BillingError {
    /// Creates a field-level validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::Transport(e) if e.is_transient())
    }

    /// Returns true if the caller must refetch the invoice before retrying
    pub fn requires_refetch(&self) -> bool {
        matches!(self, BillingError::Conflict(_))
    }
}

impl From<PortError> for BillingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Conflict { message } => BillingError::Conflict(message),
            PortError::Validation { message, field } => BillingError::Validation {
                field: field.unwrap_or_else(|| "request".to_string()),
                message,
            },
            other => BillingError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_distinctly_from_transport() {
        let conflict: BillingError = PortError::conflict("version changed").into();
        assert!(conflict.requires_refetch());
        assert!(!conflict.is_retryable());

        let transport: BillingError = PortError::timeout("mutate_item", 5000).into();
        assert!(transport.is_retryable());
        assert!(!transport.requires_refetch());
    }

    #[test]
    fn test_port_validation_keeps_field() {
        let err: BillingError = PortError::validation_field("must be positive", "amount").into();
        match err {
            BillingError::Validation { field, .. } => assert_eq!(field, "amount"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
