//! Error types for the escrow engine
//!
//! One enum covers every failure the engine surfaces. The transition kinds
//! (`NotFound`, `Unauthorized`, `IllegalTransition`, `TerminalState`,
//! `ValidationFailed`, `Retryable`) are permanent verdicts about a request,
//! except `Retryable`, which reports transient lock contention; the ledger
//! kinds (`InsufficientFunds`, `ArithmeticOverflow`) reject a money movement
//! before any state changes; the IO kinds belong to the CSV replay surfaces.

use crate::types::order::{OrderId, OrderStatus, PartyId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the escrow engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EscrowError {
    /// No record exists for the requested order
    #[error("Order {order} not found")]
    NotFound {
        /// The missing order id
        order: OrderId,
    },

    /// The acting party or role may not perform this event
    #[error("Actor is not authorized for {event} on order {order}")]
    Unauthorized {
        /// Order the event targeted
        order: OrderId,
        /// Name of the rejected event
        event: &'static str,
    },

    /// The current status does not permit the event
    #[error("Order {order} is {} and does not permit {event}", status.as_str())]
    IllegalTransition {
        /// Order the event targeted
        order: OrderId,
        /// Status at the time of the request
        status: OrderStatus,
        /// Name of the rejected event
        event: &'static str,
    },

    /// The record already reached a terminal outcome
    ///
    /// Returned for any event against a `cancelled`, `refunded`, or
    /// `released` record. This is what turns a duplicate settlement attempt
    /// into a harmless rejection.
    #[error("Order {order} is already settled as {}", status.as_str())]
    TerminalState {
        /// Order the event targeted
        order: OrderId,
        /// The terminal status
        status: OrderStatus,
    },

    /// An event-specific business rule failed
    #[error("Validation failed for order {order}: {message}")]
    ValidationFailed {
        /// Order the event targeted
        order: OrderId,
        /// What rule was violated
        message: String,
    },

    /// The record is locked by a concurrent request; the caller may retry
    ///
    /// Only produced by the fail-fast entry points; the blocking ones queue
    /// on the record lock instead.
    #[error("Order {order} is locked by a concurrent request")]
    Retryable {
        /// The contended order id
        order: OrderId,
    },

    /// A debit exceeds the party's spendable balance
    #[error(
        "Insufficient funds for party {party}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Party whose wallet was debited
        party: PartyId,
        /// Spendable balance at the time of the request
        available: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Checked decimal arithmetic failed
    #[error("Arithmetic overflow in {operation} for party {party}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Party whose wallet was involved
        party: PartyId,
    },

    /// I/O error while reading or writing a replay file
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error in a replay file
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for EscrowError {
    fn from(error: std::io::Error) -> Self {
        EscrowError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for EscrowError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        EscrowError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper constructors for the common kinds

impl EscrowError {
    /// Create a NotFound error
    pub fn not_found(order: OrderId) -> Self {
        EscrowError::NotFound { order }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(order: OrderId, event: &'static str) -> Self {
        EscrowError::Unauthorized { order, event }
    }

    /// Create an IllegalTransition error
    pub fn illegal_transition(order: OrderId, status: OrderStatus, event: &'static str) -> Self {
        EscrowError::IllegalTransition {
            order,
            status,
            event,
        }
    }

    /// Create a TerminalState error
    pub fn terminal_state(order: OrderId, status: OrderStatus) -> Self {
        EscrowError::TerminalState { order, status }
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(order: OrderId, message: &str) -> Self {
        EscrowError::ValidationFailed {
            order,
            message: message.to_string(),
        }
    }

    /// Create a Retryable error
    pub fn retryable(order: OrderId) -> Self {
        EscrowError::Retryable { order }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(party: PartyId, available: Decimal, requested: Decimal) -> Self {
        EscrowError::InsufficientFunds {
            party,
            available,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, party: PartyId) -> Self {
        EscrowError::ArithmeticOverflow {
            operation: operation.to_string(),
            party,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::not_found(
        EscrowError::NotFound { order: 9 },
        "Order 9 not found"
    )]
    #[case::unauthorized(
        EscrowError::Unauthorized { order: 1, event: "accept" },
        "Actor is not authorized for accept on order 1"
    )]
    #[case::illegal_transition(
        EscrowError::IllegalTransition { order: 1, status: OrderStatus::Pending, event: "deliver" },
        "Order 1 is pending and does not permit deliver"
    )]
    #[case::terminal_state(
        EscrowError::TerminalState { order: 1, status: OrderStatus::Released },
        "Order 1 is already settled as released"
    )]
    #[case::validation_failed(
        EscrowError::ValidationFailed { order: 1, message: "reason too short".to_string() },
        "Validation failed for order 1: reason too short"
    )]
    #[case::retryable(
        EscrowError::Retryable { order: 4 },
        "Order 4 is locked by a concurrent request"
    )]
    #[case::insufficient_funds(
        EscrowError::InsufficientFunds { party: 10, available: Decimal::new(5000, 4), requested: Decimal::new(10000, 4) },
        "Insufficient funds for party 10: available 0.5000, requested 1.0000"
    )]
    #[case::arithmetic_overflow(
        EscrowError::ArithmeticOverflow { operation: "credit".to_string(), party: 10 },
        "Arithmetic overflow in credit for party 10"
    )]
    #[case::io_error(
        EscrowError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::parse_error_with_line(
        EscrowError::ParseError { line: Some(3), message: "bad field".to_string() },
        "CSV parse error at line 3: bad field"
    )]
    #[case::parse_error_without_line(
        EscrowError::ParseError { line: None, message: "bad field".to_string() },
        "CSV parse error: bad field"
    )]
    fn test_error_display(#[case] error: EscrowError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::not_found(
        EscrowError::not_found(9),
        EscrowError::NotFound { order: 9 }
    )]
    #[case::unauthorized(
        EscrowError::unauthorized(1, "accept"),
        EscrowError::Unauthorized { order: 1, event: "accept" }
    )]
    #[case::terminal_state(
        EscrowError::terminal_state(1, OrderStatus::Refunded),
        EscrowError::TerminalState { order: 1, status: OrderStatus::Refunded }
    )]
    #[case::validation_failed(
        EscrowError::validation_failed(1, "reason too short"),
        EscrowError::ValidationFailed { order: 1, message: "reason too short".to_string() }
    )]
    fn test_helper_constructors(#[case] result: EscrowError, #[case] expected: EscrowError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: EscrowError = io_error.into();
        assert!(matches!(error, EscrowError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
