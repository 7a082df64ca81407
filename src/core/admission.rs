//! Per-user admission control
//!
//! This module provides the `AdmissionGate` struct, one instance per user,
//! bounding how many operations may be in flight for that user at once.
//!
//! # Contract
//!
//! - The admission decision is a single indivisible compare-and-swap: two
//!   simultaneous requests arriving at `in_flight == limit - 1` cannot both
//!   be admitted.
//! - A full gate refuses immediately. There is no queue and no waiting -
//!   callers get a fast refusal instead of a latency spike, and a blocking
//!   semaphore would be the wrong tool here.
//! - Admitted operations run concurrently; the gate does not serialize them
//!   against each other. Serialization of effects belongs to the
//!   [`crate::core::AccountStore`].
//! - The slot is released through the permit's `Drop`, so the counter is
//!   decremented even when the admitted operation panics.

use crate::types::BankError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default bound on in-flight operations per user.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Bounded, non-blocking admission counter for one user.
///
/// The whole state is a single `AtomicUsize` in `0..=max_in_flight`.
/// Transitions: admit (increment, requires `in_flight < max_in_flight`) and
/// release (decrement, on permit drop). There is no terminal state.
#[derive(Debug)]
pub struct AdmissionGate {
    /// Upper bound on concurrently admitted operations
    max_in_flight: usize,
    /// Number of admitted operations that have not yet produced a result
    in_flight: AtomicUsize,
}

/// RAII admission slot.
///
/// Holding a permit means one in-flight operation is accounted for; dropping
/// it releases the slot. Dropping happens on every exit path, including an
/// unwind out of the admitted operation.
#[derive(Debug)]
pub struct InFlightPermit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AdmissionGate {
    /// Create a gate admitting at most `max_in_flight` concurrent operations.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Try to claim an admission slot.
    ///
    /// One atomic `fetch_update`: the counter is incremented only while it is
    /// below the bound, and the check and increment cannot interleave with
    /// another caller's.
    ///
    /// # Returns
    ///
    /// * `Some(InFlightPermit)` - admitted; the slot is released when the
    ///   permit drops
    /// * `None` - the gate is full; nothing was changed
    pub fn try_admit(&self) -> Option<InFlightPermit<'_>> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |in_flight| {
                (in_flight < self.max_in_flight).then_some(in_flight + 1)
            })
            .ok()
            .map(|_| InFlightPermit { gate: self })
    }

    /// Run `op` under an admission slot.
    ///
    /// If the gate is full the refusal is immediate and `op` is never
    /// started. Otherwise `op` runs to completion (concurrently with other
    /// admitted operations - this method holds no lock across the await) and
    /// the slot is released afterwards, whether `op` returns or panics.
    ///
    /// # Returns
    ///
    /// * `Ok(output)` - `op` was admitted and produced `output`
    /// * `Err(BankError::TooManyRequests)` - the gate was full
    pub async fn execute<F>(&self, op: F) -> Result<F::Output, BankError>
    where
        F: Future,
    {
        let _permit = self.try_admit().ok_or(BankError::TooManyRequests)?;
        Ok(op.await)
    }

    /// Number of operations currently admitted and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The gate's admission bound.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}
