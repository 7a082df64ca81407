//! User directory and account provisioning
//!
//! This module provides the `UserRegistry`, the process-wide mapping from
//! username to that user's [`AccountStore`] and [`AdmissionGate`], and the
//! creation path that provisions the pair atomically.
//!
//! # Design
//!
//! The registry is the only mutable structure shared across users, and it is
//! read-mostly: every operation resolves a user, only creation writes. A
//! `DashMap` fits that profile. Creation goes through the map's entry API,
//! which is the compare-and-insert critical section: among any number of
//! concurrent creations of the same name, exactly one inserts and the rest
//! observe the occupied entry. The [`UserAccount`] is fully constructed
//! before it is published, so a resolved handle always has both components -
//! no reader can see a store without its gate or vice versa. If insertion
//! loses the race, the unpublished pair is simply dropped.

use crate::core::account_store::AccountStore;
use crate::core::admission::AdmissionGate;
use crate::types::BankError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// One user's pair of per-user components.
///
/// The registry owns the pair through an `Arc`; each component owns its own
/// state exclusively. The gate never touches the store's internals - it runs
/// the operations handed to it as opaque futures.
#[derive(Debug)]
pub struct UserAccount {
    store: AccountStore,
    gate: AdmissionGate,
}

impl UserAccount {
    fn new(max_in_flight: usize) -> Self {
        Self {
            store: AccountStore::new(),
            gate: AdmissionGate::new(max_in_flight),
        }
    }

    /// The user's balance store.
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// The user's admission gate.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }
}

/// Process-wide username → [`UserAccount`] directory.
///
/// Users are never removed; a registered name stays addressable for the life
/// of the registry.
#[derive(Debug)]
pub struct UserRegistry {
    users: DashMap<String, Arc<UserAccount>>,
    /// Admission bound handed to every newly provisioned gate
    max_in_flight: usize,
}

impl UserRegistry {
    /// Create an empty registry whose users get gates bounded at
    /// `max_in_flight`.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            users: DashMap::new(),
            max_in_flight,
        }
    }

    /// Register `user` with a fresh store and gate.
    ///
    /// Uniqueness under concurrency: the entry API makes the vacancy check
    /// and the insert one critical section, so among K simultaneous
    /// creations of the same name exactly one succeeds and K−1 get
    /// `UserAlreadyExists`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the user is registered; both components are addressable
    /// * `Err(BankError::UserAlreadyExists)` - the name was taken
    pub fn create_user(&self, user: &str) -> Result<(), BankError> {
        match self.users.entry(user.to_string()) {
            Entry::Occupied(_) => Err(BankError::user_already_exists(user)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(UserAccount::new(self.max_in_flight)));
                Ok(())
            }
        }
    }

    /// Look up the component pair for `user`.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<UserAccount>)` - the user's store and gate
    /// * `Err(BankError::UserDoesNotExist)` - no such user
    pub fn resolve(&self, user: &str) -> Result<Arc<UserAccount>, BankError> {
        self.users
            .get(user)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BankError::user_does_not_exist(user))
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
