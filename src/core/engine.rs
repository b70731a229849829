//! Escrow transition engine
//!
//! The `EscrowEngine` owns the order store and the ledger and is the only
//! path through which order state or escrowed money changes. Every event
//! goes through the same four checks, all before any mutation:
//!
//! 1. the record exists,
//! 2. the actor is authorized for the event,
//! 3. the current status permits the event (terminal statuses permit
//!    nothing),
//! 4. the event's own business rules hold.
//!
//! A transition that moves money performs the ledger settlement and the
//! status write inside the record's entry lock, so the pair commits as one
//! unit of work. After the lock is acquired the current status is checked
//! again, which is what makes two racing money-moving requests against the
//! same order resolve into one success and one `TerminalState` or
//! `IllegalTransition` rejection instead of a double payout.

use crate::core::ledger::{Ledger, MovementKind};
use crate::core::order_store::OrderStore;
use crate::types::{
    Actor, AdminId, DisputeDecision, EscrowError, OpenOrder, OrderEvent, OrderId, OrderRecord,
    OrderStatus, PartyId,
};
use chrono::Utc;
use rust_decimal::Decimal;

/// Escrow transition engine
///
/// Thread-safe behind a shared reference; callers on different orders never
/// block each other.
#[derive(Debug, Default)]
pub struct EscrowEngine {
    orders: OrderStore,
    ledger: Ledger,
}

impl EscrowEngine {
    /// Create an engine with no orders and an empty ledger
    pub fn new() -> Self {
        EscrowEngine {
            orders: OrderStore::new(),
            ledger: Ledger::new(),
        }
    }

    /// The ledger backing this engine
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Snapshot of one order record
    pub fn order(&self, id: OrderId) -> Option<OrderRecord> {
        self.orders.get(id)
    }

    /// Snapshot of all order records
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders.all()
    }

    /// Credit a party's wallet
    ///
    /// Collaborator-level top-up used by the replay surfaces and tests;
    /// not a lifecycle event.
    pub fn fund(&self, party: PartyId, amount: Decimal) -> Result<(), EscrowError> {
        self.ledger.credit(party, amount)
    }

    /// Create a new order in escrow
    ///
    /// Validates the request, debits the payer's wallet for the escrowed
    /// amount, and inserts the record in `Pending`. The debit and the
    /// insert run while the vacant id is reserved, so a failed debit
    /// inserts nothing and a duplicate id debits nothing.
    ///
    /// # Errors
    ///
    /// * `ValidationFailed` for a nonpositive amount, identical payer and
    ///   payee, or an id already in use
    /// * `InsufficientFunds` if the payer's wallet cannot cover the amount
    pub fn open(&self, request: OpenOrder) -> Result<OrderRecord, EscrowError> {
        let id = request.id;

        if request.amount <= Decimal::ZERO {
            return Err(EscrowError::validation_failed(
                id,
                "amount must be positive",
            ));
        }
        if request.payer == request.payee {
            return Err(EscrowError::validation_failed(
                id,
                "payer and payee must be different parties",
            ));
        }

        let record = self.orders.insert_new(id, || {
            self.ledger.debit(request.payer, request.amount)?;
            Ok(OrderRecord::new(request, Utc::now()))
        })?;

        tracing::info!(
            order = record.id,
            payer = record.payer,
            payee = record.payee,
            %record.amount,
            "order opened"
        );
        Ok(record)
    }

    /// Apply a lifecycle event to an order
    ///
    /// Blocks if the record is currently locked by another request, then
    /// validates against the state it finds under the lock.
    ///
    /// # Errors
    ///
    /// * `NotFound` if no record exists for the id
    /// * `Unauthorized` if the actor may not perform the event
    /// * `TerminalState` if the record is already settled
    /// * `IllegalTransition` if the current status forbids the event
    /// * `ValidationFailed` if an event-specific rule fails
    pub fn apply(
        &self,
        order: OrderId,
        actor: Actor,
        event: OrderEvent,
    ) -> Result<OrderRecord, EscrowError> {
        self.orders
            .update(order, |record| self.transition(record, actor, &event))
    }

    /// Apply a lifecycle event, failing fast on lock contention
    ///
    /// Identical to [`apply`](Self::apply) except that a record locked by a
    /// concurrent request yields `Retryable` instead of queueing.
    pub fn try_apply(
        &self,
        order: OrderId,
        actor: Actor,
        event: OrderEvent,
    ) -> Result<OrderRecord, EscrowError> {
        self.orders
            .try_update(order, |record| self.transition(record, actor, &event))
    }

    /// Payee accepts a pending order
    pub fn accept(&self, order: OrderId, payee: PartyId) -> Result<OrderRecord, EscrowError> {
        self.apply(order, Actor::Party(payee), OrderEvent::Accept)
    }

    /// Payer sends delivered work back for rework
    pub fn request_revision(
        &self,
        order: OrderId,
        payer: PartyId,
        reason: String,
    ) -> Result<OrderRecord, EscrowError> {
        self.apply(
            order,
            Actor::Party(payer),
            OrderEvent::RequestRevision { reason },
        )
    }

    /// Administrator arbitrates a disputed order
    pub fn resolve_dispute(
        &self,
        order: OrderId,
        admin: AdminId,
        decision: DisputeDecision,
        note: Option<String>,
    ) -> Result<OrderRecord, EscrowError> {
        self.apply(
            order,
            Actor::Admin(admin),
            OrderEvent::ResolveDispute { decision, note },
        )
    }

    /// Administrator cancels an unsettled order and refunds the payer
    pub fn force_cancel(
        &self,
        order: OrderId,
        admin: AdminId,
        reason: String,
    ) -> Result<OrderRecord, EscrowError> {
        self.apply(order, Actor::Admin(admin), OrderEvent::ForceCancel { reason })
    }

    /// Administrator completes an in-flight order and pays the payee
    pub fn force_complete(
        &self,
        order: OrderId,
        admin: AdminId,
        note: Option<String>,
    ) -> Result<OrderRecord, EscrowError> {
        self.apply(order, Actor::Admin(admin), OrderEvent::ForceComplete { note })
    }

    /// Validate and apply one event to a locked record
    ///
    /// All checks run before the first mutation; an error therefore leaves
    /// the record exactly as it was.
    fn transition(
        &self,
        record: &mut OrderRecord,
        actor: Actor,
        event: &OrderEvent,
    ) -> Result<(), EscrowError> {
        Self::authorize(record, actor, event)?;
        Self::check_status(record, event)?;

        let from = record.status;
        let now = Utc::now();

        match event {
            OrderEvent::Accept => {
                record.status = OrderStatus::Accepted;
                record.accepted_at.get_or_insert(now);
            }
            OrderEvent::StartWork => {
                record.status = OrderStatus::InProgress;
            }
            OrderEvent::Deliver => {
                record.status = OrderStatus::Delivered;
                // Redeliveries after a revision keep the first timestamp
                record.delivered_at.get_or_insert(now);
            }
            OrderEvent::RequestRevision { reason } => {
                record.status = OrderStatus::InProgress;
                record.revision_count += 1;
                // Only the latest revision request is retained
                record.revision_reason = Some(reason.clone());
                record.revision_requested_by = Some(actor);
                record.revision_requested_at = Some(now);
            }
            OrderEvent::ConfirmCompletion => {
                // Completion and the internal release commit as one unit
                self.ledger
                    .settle(record.id, MovementKind::Payout, record.payee, record.amount)?;
                record.status = OrderStatus::Released;
                record.completed_at.get_or_insert(now);
                record.released_at.get_or_insert(now);
            }
            OrderEvent::RaiseDispute { reason } => {
                record.status = OrderStatus::Dispute;
                record.dispute_reason = Some(reason.clone());
                record.dispute_raised_by = Some(actor);
                record.dispute_raised_at = Some(now);
            }
            OrderEvent::ResolveDispute { decision, note } => {
                if record.status != OrderStatus::Dispute {
                    return Err(EscrowError::validation_failed(
                        record.id,
                        "order is not under dispute",
                    ));
                }
                match decision {
                    DisputeDecision::Refund => {
                        self.ledger.settle(
                            record.id,
                            MovementKind::Refund,
                            record.payer,
                            record.amount,
                        )?;
                        record.status = OrderStatus::Refunded;
                    }
                    DisputeDecision::Release => {
                        self.ledger.settle(
                            record.id,
                            MovementKind::Payout,
                            record.payee,
                            record.amount,
                        )?;
                        record.status = OrderStatus::Released;
                        record.released_at.get_or_insert(now);
                    }
                }
                if let Some(note) = note {
                    record.admin_note = Some(note.clone());
                }
            }
            OrderEvent::ForceCancel { reason } => {
                if reason.chars().count() < 10 {
                    return Err(EscrowError::validation_failed(
                        record.id,
                        "cancellation reason must be at least 10 characters",
                    ));
                }
                self.ledger
                    .settle(record.id, MovementKind::Refund, record.payer, record.amount)?;
                record.status = OrderStatus::Cancelled;
                record.cancelled_by = Some(actor);
                record.cancellation_reason = Some(reason.clone());
                record.cancelled_at.get_or_insert(now);
            }
            OrderEvent::ForceComplete { note } => {
                self.ledger
                    .settle(record.id, MovementKind::Payout, record.payee, record.amount)?;
                record.status = OrderStatus::Released;
                record.completed_at.get_or_insert(now);
                record.released_at.get_or_insert(now);
                if let Some(note) = note {
                    record.admin_note = Some(note.clone());
                }
            }
        }

        tracing::info!(
            order = record.id,
            event = event.name(),
            from = from.as_str(),
            to = record.status.as_str(),
            "transition applied"
        );
        Ok(())
    }

    /// Check that the actor may perform the event (validation step 2)
    fn authorize(record: &OrderRecord, actor: Actor, event: &OrderEvent) -> Result<(), EscrowError> {
        let authorized = match event {
            // Payee-only: the executing party drives acceptance and delivery
            OrderEvent::Accept | OrderEvent::StartWork | OrderEvent::Deliver => {
                matches!(actor, Actor::Party(party) if party == record.payee)
            }
            // Payer-only: the funding party judges delivered work
            OrderEvent::ConfirmCompletion | OrderEvent::RequestRevision { .. } => {
                matches!(actor, Actor::Party(party) if party == record.payer)
            }
            // Either counterparty may contest
            OrderEvent::RaiseDispute { .. } => {
                matches!(actor, Actor::Party(party) if record.is_counterparty(party))
            }
            // Privileged overrides require the admin capability
            OrderEvent::ResolveDispute { .. }
            | OrderEvent::ForceCancel { .. }
            | OrderEvent::ForceComplete { .. } => matches!(actor, Actor::Admin(_)),
        };

        if authorized {
            Ok(())
        } else {
            Err(EscrowError::unauthorized(record.id, event.name()))
        }
    }

    /// Check that the current status permits the event (validation step 3)
    fn check_status(record: &OrderRecord, event: &OrderEvent) -> Result<(), EscrowError> {
        if record.status.is_terminal() {
            return Err(EscrowError::terminal_state(record.id, record.status));
        }
        if !Self::permits(record.status, event) {
            return Err(EscrowError::illegal_transition(
                record.id,
                record.status,
                event.name(),
            ));
        }
        Ok(())
    }

    /// The legal-transition table
    ///
    /// Terminal statuses are rejected before this table is consulted.
    /// `ResolveDispute` is admitted here from any non-terminal status; its
    /// own rule then reports a non-disputed record as `ValidationFailed`
    /// rather than `IllegalTransition`.
    fn permits(status: OrderStatus, event: &OrderEvent) -> bool {
        match event {
            OrderEvent::Accept => status == OrderStatus::Pending,
            OrderEvent::StartWork => status == OrderStatus::Accepted,
            OrderEvent::Deliver => status == OrderStatus::InProgress,
            OrderEvent::ConfirmCompletion | OrderEvent::RequestRevision { .. } => {
                status == OrderStatus::Delivered
            }
            OrderEvent::RaiseDispute { .. } => matches!(
                status,
                OrderStatus::Pending
                    | OrderStatus::Accepted
                    | OrderStatus::InProgress
                    | OrderStatus::Delivered
            ),
            OrderEvent::ForceCancel { .. } => status != OrderStatus::Completed,
            OrderEvent::ForceComplete { .. } => matches!(
                status,
                OrderStatus::Accepted | OrderStatus::InProgress | OrderStatus::Delivered
            ),
            OrderEvent::ResolveDispute { .. } => status != OrderStatus::Completed,
        }
    }
}
