//! CSV format handling for replay events and order summary output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `EventRow` structure for deserialization
//! - Conversion from rows to engine replay commands
//! - Order summary serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! Columns: `event,order,actor,peer,conversation,amount,detail`. The event
//! vocabulary is `fund`, `open`, `accept`, `start`, `deliver`, `revise`,
//! `confirm`, `dispute`, `refund`, `release`, `cancel`, `complete`; the
//! last four are administrator rows, with `refund`/`release` naming the two
//! dispute decisions. Unused columns are left empty per row: `fund` uses
//! actor and amount, `open` uses everything but detail-free events only
//! name the order and the actor.

use crate::types::{
    Actor, DisputeDecision, OpenOrder, OrderEvent, OrderId, OrderRecord, PartyId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV row structure for deserialization
///
/// Every column except `event` is optional; each event kind validates the
/// columns it needs during conversion.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventRow {
    pub event: String,
    pub order: Option<OrderId>,
    pub actor: Option<u64>,
    pub peer: Option<PartyId>,
    pub conversation: Option<u64>,
    pub amount: Option<String>,
    pub detail: Option<String>,
}

/// One replayable engine invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayCommand {
    /// Credit a party's wallet
    Fund { party: PartyId, amount: Decimal },

    /// Create an order in escrow
    Open(OpenOrder),

    /// Apply a lifecycle event
    Apply {
        order: OrderId,
        actor: Actor,
        event: OrderEvent,
    },
}

impl ReplayCommand {
    /// The order this command targets, if any
    ///
    /// `Fund` rows target a wallet, not an order.
    pub fn order(&self) -> Option<OrderId> {
        match self {
            ReplayCommand::Fund { .. } => None,
            ReplayCommand::Open(request) => Some(request.id),
            ReplayCommand::Apply { order, .. } => Some(*order),
        }
    }
}

/// Parse and validate the amount column
fn parse_amount(row: &EventRow, event: &str) -> Result<Decimal, String> {
    let raw = match &row.amount {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return Err(format!("{} row requires an amount", event)),
    };

    let amount = Decimal::from_str(raw).map_err(|_| format!("Invalid amount '{}'", raw))?;
    if amount <= Decimal::ZERO {
        return Err(format!("Amount '{}' must be positive", raw));
    }
    Ok(amount)
}

fn require_order(row: &EventRow, event: &str) -> Result<OrderId, String> {
    row.order
        .ok_or_else(|| format!("{} row requires an order", event))
}

fn require_actor(row: &EventRow, event: &str) -> Result<u64, String> {
    row.actor
        .ok_or_else(|| format!("{} row requires an actor", event))
}

fn require_detail(row: &EventRow, event: &str, meaning: &str) -> Result<String, String> {
    match &row.detail {
        Some(detail) if !detail.trim().is_empty() => Ok(detail.trim().to_string()),
        _ => Err(format!("{} row requires a {}", event, meaning)),
    }
}

/// Convert an `EventRow` to a `ReplayCommand`
///
/// Validates per event kind: funding and opening rows need amounts, revision
/// and dispute and cancellation rows need their reason text, administrator
/// rows read the actor column as an admin id.
pub fn convert_event_row(row: EventRow) -> Result<ReplayCommand, String> {
    let event = row.event.to_lowercase();

    match event.as_str() {
        "fund" => {
            let party = require_actor(&row, "fund")?;
            let amount = parse_amount(&row, "fund")?;
            Ok(ReplayCommand::Fund { party, amount })
        }
        "open" => {
            let order = require_order(&row, "open")?;
            let payer = require_actor(&row, "open")?;
            let payee = row
                .peer
                .ok_or_else(|| "open row requires a peer (the payee)".to_string())?;
            let amount = parse_amount(&row, "open")?;

            Ok(ReplayCommand::Open(OpenOrder {
                id: order,
                // A feed without a conversation anchor falls back to the order id
                conversation: row.conversation.unwrap_or(order),
                message: None,
                title: row.detail.clone().unwrap_or_default(),
                description: String::new(),
                amount,
                deadline: None,
                payer,
                payee,
            }))
        }
        "accept" | "start" | "deliver" | "confirm" => {
            let order = require_order(&row, event.as_str())?;
            let actor = Actor::Party(require_actor(&row, event.as_str())?);
            let event = match event.as_str() {
                "accept" => OrderEvent::Accept,
                "start" => OrderEvent::StartWork,
                "deliver" => OrderEvent::Deliver,
                _ => OrderEvent::ConfirmCompletion,
            };
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event,
            })
        }
        "revise" => {
            let order = require_order(&row, "revise")?;
            let actor = Actor::Party(require_actor(&row, "revise")?);
            let reason = require_detail(&row, "revise", "reason")?;
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event: OrderEvent::RequestRevision { reason },
            })
        }
        "dispute" => {
            let order = require_order(&row, "dispute")?;
            let actor = Actor::Party(require_actor(&row, "dispute")?);
            let reason = require_detail(&row, "dispute", "reason")?;
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event: OrderEvent::RaiseDispute { reason },
            })
        }
        "refund" | "release" => {
            let order = require_order(&row, event.as_str())?;
            let actor = Actor::Admin(require_actor(&row, event.as_str())?);
            let decision = if event == "refund" {
                DisputeDecision::Refund
            } else {
                DisputeDecision::Release
            };
            let note = row.detail.as_ref().map(|detail| detail.trim().to_string());
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event: OrderEvent::ResolveDispute { decision, note },
            })
        }
        "cancel" => {
            let order = require_order(&row, "cancel")?;
            let actor = Actor::Admin(require_actor(&row, "cancel")?);
            let reason = require_detail(&row, "cancel", "reason")?;
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event: OrderEvent::ForceCancel { reason },
            })
        }
        "complete" => {
            let order = require_order(&row, "complete")?;
            let actor = Actor::Admin(require_actor(&row, "complete")?);
            let note = row.detail.as_ref().map(|detail| detail.trim().to_string());
            Ok(ReplayCommand::Apply {
                order,
                actor,
                event: OrderEvent::ForceComplete { note },
            })
        }
        _ => Err(format!("Invalid event type: '{}'", row.event)),
    }
}

/// Write order summaries to CSV format
///
/// Columns: `order,status,amount,revisions`, sorted by order id for
/// deterministic output, amounts at four decimal places.
pub fn write_orders_csv(orders: &[OrderRecord], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["order", "status", "amount", "revisions"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&OrderRecord> = orders.iter().collect();
    sorted.sort_by_key(|record| record.id);

    for record in sorted {
        writer
            .write_record(&[
                record.id.to_string(),
                record.status.as_str().to_string(),
                format!("{:.4}", record.amount),
                record.revision_count.to_string(),
            ])
            .map_err(|e| format!("Failed to write order record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
