//! Order record storage
//!
//! The `OrderStore` is the single source of truth for order records. Every
//! mutation goes through a closure executed while the record's map entry is
//! locked, which gives each record a serialized read-modify-write cycle:
//! a transition re-validates the status it read only after the lock is held,
//! so two racing requests against one order cannot both pass validation.
//!
//! Different orders never contend with each other beyond map sharding.

use crate::types::{EscrowError, OrderId, OrderRecord};
use dashmap::mapref::entry::Entry;
use dashmap::try_result::TryResult;
use dashmap::DashMap;

/// Concurrent map of order id to record
#[derive(Debug, Default)]
pub struct OrderStore {
    /// Records by order id
    orders: DashMap<OrderId, OrderRecord>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        OrderStore {
            orders: DashMap::new(),
        }
    }

    /// Insert a record for an unused id
    ///
    /// The builder closure runs while the vacant entry is reserved, so any
    /// side effect it performs (the escrow debit) and the insert form one
    /// unit: either both happen or neither does, and a concurrent open for
    /// the same id cannot slip in between.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if a record already exists for the id, or
    /// the builder's error if it fails (nothing is inserted).
    pub fn insert_new<F>(&self, id: OrderId, build: F) -> Result<OrderRecord, EscrowError>
    where
        F: FnOnce() -> Result<OrderRecord, EscrowError>,
    {
        match self.orders.entry(id) {
            Entry::Occupied(_) => Err(EscrowError::validation_failed(
                id,
                "an order with this id already exists",
            )),
            Entry::Vacant(slot) => {
                let record = build()?;
                let inserted = slot.insert(record);
                Ok(inserted.value().clone())
            }
        }
    }

    /// Snapshot of a record
    pub fn get(&self, id: OrderId) -> Option<OrderRecord> {
        self.orders.get(&id).map(|record| record.value().clone())
    }

    /// Mutate a record under its entry lock, blocking on contention
    ///
    /// The closure sees the current record state and may reject the update
    /// by returning an error, in which case the record keeps its pre-call
    /// state. On success a snapshot of the updated record is returned.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists, or the closure's error.
    pub fn update<F>(&self, id: OrderId, mutate: F) -> Result<OrderRecord, EscrowError>
    where
        F: FnOnce(&mut OrderRecord) -> Result<(), EscrowError>,
    {
        let mut record = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| EscrowError::not_found(id))?;

        mutate(record.value_mut())?;
        Ok(record.value().clone())
    }

    /// Mutate a record under its entry lock, failing fast on contention
    ///
    /// Identical to [`update`](Self::update) except that a record currently
    /// locked by another request yields `Retryable` instead of queueing.
    pub fn try_update<F>(&self, id: OrderId, mutate: F) -> Result<OrderRecord, EscrowError>
    where
        F: FnOnce(&mut OrderRecord) -> Result<(), EscrowError>,
    {
        match self.orders.try_get_mut(&id) {
            TryResult::Present(mut record) => {
                mutate(record.value_mut())?;
                Ok(record.value().clone())
            }
            TryResult::Absent => Err(EscrowError::not_found(id)),
            TryResult::Locked => Err(EscrowError::retryable(id)),
        }
    }

    /// Snapshot of all records
    pub fn all(&self) -> Vec<OrderRecord> {
        self.orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
