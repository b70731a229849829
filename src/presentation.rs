//! Presentation mapping for order statuses
//!
//! Pure derivations for UI surfaces. Status colors and labels are not core
//! state; admin and counterparty frontends derive them from the status they
//! read, through these functions.

use crate::types::OrderStatus;

/// Human-readable label for a status
pub fn label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Pending",
        OrderStatus::Accepted => "Accepted",
        OrderStatus::InProgress => "In progress",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Completed => "Completed",
        OrderStatus::Released => "Released",
        OrderStatus::Dispute => "In dispute",
        OrderStatus::Cancelled => "Cancelled",
        OrderStatus::Refunded => "Refunded",
    }
}

/// Display color for a status, as a hex string
pub fn color(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "#9e9e9e",
        OrderStatus::Accepted => "#2196f3",
        OrderStatus::InProgress => "#03a9f4",
        OrderStatus::Delivered => "#ff9800",
        OrderStatus::Completed => "#4caf50",
        OrderStatus::Released => "#2e7d32",
        OrderStatus::Dispute => "#f44336",
        OrderStatus::Cancelled => "#757575",
        OrderStatus::Refunded => "#795548",
    }
}
