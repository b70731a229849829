//! Order-related types for the escrow engine
//!
//! This module defines the order record held in escrow, its status and
//! lifecycle events, and the actor model used for authorization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order identifier
pub type OrderId = u64;

/// Party identifier (payer or payee)
pub type PartyId = u64;

/// Administrator identifier
pub type AdminId = u64;

/// Conversation the order was negotiated in
pub type ConversationId = u64;

/// Message the order originated from
pub type MessageId = u64;

/// Lifecycle status of an order transaction
///
/// The happy path runs `Pending -> Accepted -> InProgress -> Delivered ->
/// Completed -> Released`. `Dispute` branches off any pre-completion status
/// and is resolved by an administrator into `Refunded` or `Released`.
/// `Cancelled`, `Refunded`, and `Released` are terminal: once reached, no
/// further event is accepted and no further money moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, waiting for the payee to accept
    Pending,

    /// Accepted by the payee; the escrowed amount is committed
    Accepted,

    /// The payee is working on the order
    InProgress,

    /// Work handed over, waiting for the payer's confirmation
    Delivered,

    /// Confirmed by the payer or force-completed by an administrator
    ///
    /// Transient: completion is immediately followed by the internal
    /// release step within the same unit of work.
    Completed,

    /// Funds paid out to the payee (terminal)
    Released,

    /// Contested by either party, waiting for administrator arbitration
    Dispute,

    /// Cancelled by an administrator, payer refunded (terminal)
    Cancelled,

    /// Dispute resolved in the payer's favor, payer refunded (terminal)
    Refunded,
}

impl OrderStatus {
    /// Whether this status is terminal
    ///
    /// A terminal record accepts no further events; the escrowed amount has
    /// been credited to exactly one party.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Refunded | OrderStatus::Released
        )
    }

    /// Stable lowercase name, used in CSV output and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Released => "released",
            OrderStatus::Dispute => "dispute",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Who is performing an event
///
/// Administrators are a distinct privileged capability, not a party role:
/// override events require `Actor::Admin` and no party id ever satisfies
/// that check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// One of the two counterparties on the record
    Party(PartyId),

    /// A platform administrator
    Admin(AdminId),
}

/// Administrator ruling on a disputed order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisputeDecision {
    /// Return the escrowed amount to the payer
    Refund,

    /// Pay the escrowed amount out to the payee
    Release,
}

/// Lifecycle event applied to an order
///
/// Counterparty events (`Accept` through `RaiseDispute`) drive the normal
/// flow; `ResolveDispute`, `ForceCancel`, and `ForceComplete` are
/// administrator-only.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// Payee accepts the order (`pending -> accepted`)
    Accept,

    /// Payee starts working (`accepted -> in_progress`)
    StartWork,

    /// Payee hands the work over (`in_progress -> delivered`)
    Deliver,

    /// Payer sends delivered work back for rework (`delivered -> in_progress`)
    ///
    /// Increments the revision counter; no money moves.
    RequestRevision { reason: String },

    /// Payer confirms the delivered work (`delivered -> completed -> released`)
    ///
    /// Settles the escrowed amount to the payee.
    ConfirmCompletion,

    /// Either party contests the order (`-> dispute`)
    RaiseDispute { reason: String },

    /// Administrator arbitrates a disputed order (`dispute -> refunded | released`)
    ResolveDispute {
        decision: DisputeDecision,
        note: Option<String>,
    },

    /// Administrator cancels and refunds the payer (`-> cancelled`)
    ///
    /// Requires a reason of at least ten characters.
    ForceCancel { reason: String },

    /// Administrator completes and pays the payee (`-> completed -> released`)
    ForceComplete { note: Option<String> },
}

impl OrderEvent {
    /// Stable event name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::Accept => "accept",
            OrderEvent::StartWork => "start_work",
            OrderEvent::Deliver => "deliver",
            OrderEvent::RequestRevision { .. } => "request_revision",
            OrderEvent::ConfirmCompletion => "confirm_completion",
            OrderEvent::RaiseDispute { .. } => "raise_dispute",
            OrderEvent::ResolveDispute { .. } => "resolve_dispute",
            OrderEvent::ForceCancel { .. } => "force_cancel",
            OrderEvent::ForceComplete { .. } => "force_complete",
        }
    }
}

/// Request to create a new order in escrow
///
/// Supplied by the order-creation collaborator. The engine validates the
/// amount and counterparties, debits the payer's wallet, and inserts the
/// record in `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: OrderId,
    pub conversation: ConversationId,
    pub message: Option<MessageId>,
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub deadline: Option<DateTime<Utc>>,
    pub payer: PartyId,
    pub payee: PartyId,
}

/// The escrowed order transaction record
///
/// Single source of truth for one order's status, counterparties, audit
/// fields, and timestamps. `amount` is fixed for the life of the record.
/// Every timestamp is written on the first occurrence of its event and never
/// cleared; the three `revision_*` fields are the only ones overwritten, by
/// each subsequent revision request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub conversation: ConversationId,
    pub message: Option<MessageId>,
    pub title: String,
    pub description: String,

    /// Escrowed amount, immutable after creation
    pub amount: Decimal,

    pub status: OrderStatus,

    /// Advisory only; expiry drives no transition
    pub deadline: Option<DateTime<Utc>>,

    /// Party funding the order; receives any refund
    pub payer: PartyId,

    /// Party performing the work; receives the payout
    pub payee: PartyId,

    pub cancelled_by: Option<Actor>,
    pub dispute_raised_by: Option<Actor>,
    pub revision_requested_by: Option<Actor>,

    pub cancellation_reason: Option<String>,
    pub dispute_reason: Option<String>,
    pub revision_reason: Option<String>,

    /// Number of revision requests over the record's lifetime
    pub revision_count: u32,

    /// Administrator note attached by an override or arbitration
    pub admin_note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub dispute_raised_at: Option<DateTime<Utc>>,
    pub revision_requested_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Create a pending record from an open request
    pub fn new(request: OpenOrder, created_at: DateTime<Utc>) -> Self {
        OrderRecord {
            id: request.id,
            conversation: request.conversation,
            message: request.message,
            title: request.title,
            description: request.description,
            amount: request.amount,
            status: OrderStatus::Pending,
            deadline: request.deadline,
            payer: request.payer,
            payee: request.payee,
            cancelled_by: None,
            dispute_raised_by: None,
            revision_requested_by: None,
            cancellation_reason: None,
            dispute_reason: None,
            revision_reason: None,
            revision_count: 0,
            admin_note: None,
            created_at,
            accepted_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            released_at: None,
            dispute_raised_at: None,
            revision_requested_at: None,
        }
    }

    /// Whether an administrator can arbitrate this record
    pub fn can_resolve(&self) -> bool {
        self.status == OrderStatus::Dispute
    }

    /// Whether an administrator can force-cancel this record
    pub fn can_cancel(&self) -> bool {
        !self.status.is_terminal() && self.status != OrderStatus::Completed
    }

    /// Whether an administrator can force-complete this record
    pub fn can_complete(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Accepted | OrderStatus::InProgress | OrderStatus::Delivered
        )
    }

    /// Whether the given party is one of the two counterparties
    pub fn is_counterparty(&self, party: PartyId) -> bool {
        party == self.payer || party == self.payee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn open_request() -> OpenOrder {
        OpenOrder {
            id: 1,
            conversation: 7,
            message: Some(42),
            title: "logo design".to_string(),
            description: "three concepts, vector deliverables".to_string(),
            amount: Decimal::new(5000000, 4),
            deadline: None,
            payer: 10,
            payee: 20,
        }
    }

    #[rstest]
    #[case(OrderStatus::Pending, false)]
    #[case(OrderStatus::Accepted, false)]
    #[case(OrderStatus::InProgress, false)]
    #[case(OrderStatus::Delivered, false)]
    #[case(OrderStatus::Completed, false)]
    #[case(OrderStatus::Dispute, false)]
    #[case(OrderStatus::Released, true)]
    #[case(OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Refunded, true)]
    fn test_terminal_statuses(#[case] status: OrderStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    #[case(OrderStatus::Pending, "pending")]
    #[case(OrderStatus::InProgress, "in_progress")]
    #[case(OrderStatus::Released, "released")]
    #[case(OrderStatus::Refunded, "refunded")]
    fn test_status_names(#[case] status: OrderStatus, #[case] name: &str) {
        assert_eq!(status.as_str(), name);
    }

    #[test]
    fn test_new_record_is_pending_with_no_event_fields() {
        let record = OrderRecord::new(open_request(), Utc::now());

        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.revision_count, 0);
        assert_eq!(record.amount, Decimal::new(5000000, 4));
        assert!(record.accepted_at.is_none());
        assert!(record.delivered_at.is_none());
        assert!(record.completed_at.is_none());
        assert!(record.cancelled_at.is_none());
        assert!(record.released_at.is_none());
        assert!(record.dispute_raised_at.is_none());
        assert!(record.revision_requested_at.is_none());
        assert!(record.cancelled_by.is_none());
        assert!(record.admin_note.is_none());
    }

    #[rstest]
    #[case(OrderStatus::Dispute, true, true, false)]
    #[case(OrderStatus::Pending, false, true, false)]
    #[case(OrderStatus::Accepted, false, true, true)]
    #[case(OrderStatus::InProgress, false, true, true)]
    #[case(OrderStatus::Delivered, false, true, true)]
    #[case(OrderStatus::Completed, false, false, false)]
    #[case(OrderStatus::Released, false, false, false)]
    #[case(OrderStatus::Cancelled, false, false, false)]
    #[case(OrderStatus::Refunded, false, false, false)]
    fn test_admin_action_flags(
        #[case] status: OrderStatus,
        #[case] resolve: bool,
        #[case] cancel: bool,
        #[case] complete: bool,
    ) {
        let mut record = OrderRecord::new(open_request(), Utc::now());
        record.status = status;

        assert_eq!(record.can_resolve(), resolve);
        assert_eq!(record.can_cancel(), cancel);
        assert_eq!(record.can_complete(), complete);
    }

    #[test]
    fn test_counterparty_check() {
        let record = OrderRecord::new(open_request(), Utc::now());

        assert!(record.is_counterparty(10));
        assert!(record.is_counterparty(20));
        assert!(!record.is_counterparty(30));
    }

    #[test]
    fn test_event_names_are_stable() {
        assert_eq!(OrderEvent::Accept.name(), "accept");
        assert_eq!(
            OrderEvent::RequestRevision {
                reason: "r".to_string()
            }
            .name(),
            "request_revision"
        );
        assert_eq!(
            OrderEvent::ResolveDispute {
                decision: DisputeDecision::Refund,
                note: None
            }
            .name(),
            "resolve_dispute"
        );
    }
}
