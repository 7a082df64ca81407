//! Core business logic module
//!
//! This module contains the per-user components and the facade over them:
//! - `account_store` - one user's currency → balance map, serialized effects
//! - `admission` - the per-user bounded, non-blocking admission gate
//! - `registry` - username directory and atomic account provisioning
//! - `engine` - the five-operation API facade and error translation
//!
//! Concurrency model: distinct users are fully independent. Within one user,
//! the admission gate lets at most ten operations be in flight at once -
//! admitted operations interleave freely while the store makes each
//! individual read-modify-write atomic. The registry is the only structure
//! shared across users.

pub mod account_store;
pub mod admission;
pub mod engine;
pub mod registry;

pub use account_store::AccountStore;
pub use admission::{AdmissionGate, InFlightPermit, DEFAULT_MAX_IN_FLIGHT};
pub use engine::{BankEngine, EngineConfig};
pub use registry::{UserAccount, UserRegistry};
