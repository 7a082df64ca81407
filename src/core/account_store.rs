//! Per-user balance storage
//!
//! This module provides the `AccountStore` struct, one instance per user,
//! holding that user's currency → [`Money`] map.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) keyed by currency code.
//! The user's admission gate may run up to ten operations against the store
//! concurrently; DashMap's entry-level locking serializes their effects, so
//! each deposit and withdrawal is one atomic read-modify-write. The order in
//! which concurrently admitted operations land is unspecified - only their
//! atomicity is guaranteed.
//!
//! # Currency keys
//!
//! Currency codes are byte-compared: `"USD"` and `"usd"` are distinct
//! balances. A currency that has never been deposited reads as
//! [`Money::ZERO`].

use crate::types::{BankError, Money};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// One user's balances, keyed by case-sensitive currency code.
///
/// All methods are safe to call from multiple threads concurrently. An entry
/// is locked for the duration of each update, so no caller can observe a
/// partially applied deposit or withdrawal, and a withdrawal's balance check
/// and debit happen as one step.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Balance per currency. Entries are created on first deposit and never
    /// removed; a zero balance after a full withdrawal stays present.
    balances: DashMap<String, Money>,
}

impl AccountStore {
    /// Create an empty store. Every currency reads as zero.
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Current balance in `currency`, at full internal precision.
    ///
    /// Missing currencies read as [`Money::ZERO`]. The returned value is a
    /// snapshot; concurrent mutations are not reflected in it.
    pub fn balance(&self, currency: &str) -> Money {
        self.balances
            .get(currency)
            .map(|entry| *entry.value())
            .unwrap_or(Money::ZERO)
    }

    /// Credit `amount` to the balance in `currency`.
    ///
    /// Creates the currency entry at zero if absent. The add is exact and
    /// atomic with respect to other operations on the same currency.
    ///
    /// # Returns
    ///
    /// * `Ok(Money)` - the new balance, at full precision
    /// * `Err(BankError::ArithmeticOverflow)` - the exact sum would exceed
    ///   the mantissa range; the balance is unchanged
    pub fn deposit(&self, currency: &str, amount: Money) -> Result<Money, BankError> {
        let mut entry = self
            .balances
            .entry(currency.to_string())
            .or_insert(Money::ZERO);
        let updated = entry
            .value()
            .checked_add(amount)
            .ok_or_else(|| BankError::arithmetic_overflow("deposit"))?;
        *entry.value_mut() = updated;
        Ok(updated)
    }

    /// Debit `amount` from the balance in `currency`.
    ///
    /// The balance check and the debit are a single atomic step: the entry
    /// stays locked between comparing and storing, so two concurrent
    /// withdrawals cannot both pass the check against the same funds.
    ///
    /// # Returns
    ///
    /// * `Ok(Money)` - the new balance, at full precision
    /// * `Err(BankError::NotEnoughMoney)` - balance < amount (including a
    ///   currency that was never deposited); the balance is unchanged
    pub fn withdraw(&self, currency: &str, amount: Money) -> Result<Money, BankError> {
        match self.balances.entry(currency.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if !current.gte(amount) {
                    return Err(BankError::not_enough_money(
                        current.amount(),
                        amount.amount(),
                    ));
                }
                let updated = current
                    .checked_sub(amount)
                    .ok_or_else(|| BankError::arithmetic_overflow("withdraw"))?;
                *entry.get_mut() = updated;
                Ok(updated)
            }
            // Never-deposited currency: balance is zero and amounts are
            // strictly positive, so this is always short.
            Entry::Vacant(_) => Err(BankError::not_enough_money(
                Money::ZERO.amount(),
                amount.amount(),
            )),
        }
    }
}
