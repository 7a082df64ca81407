//! Banking Engine Library
//! # Overview
//!
//! This library provides an in-memory, multi-currency banking core with
//! per-user admission control and exact decimal balances.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Money, Operation, error kinds)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The five-operation API facade
//!   - [`core::registry`] - Username directory and account provisioning
//!   - [`core::admission`] - Per-user bounded admission control
//!   - [`core::account_store`] - Per-user currency balances
//! - [`io`] - CSV input/output for the operations pipeline
//! - [`strategy`] - Serial and concurrent pipeline drivers
//!
//! # Operations
//!
//! The engine supports five operations:
//!
//! - **create**: Register a new user with empty balances
//! - **deposit**: Credit funds in one currency
//! - **withdraw**: Debit funds (requires a sufficient balance)
//! - **balance**: Read the displayed balance in one currency
//! - **send**: Transfer funds between two users, with compensation when the
//!   receiving leg is refused
//!
//! # Concurrency model
//!
//! Distinct users are fully independent. Within one user, at most ten
//! operations may be in flight at once; the eleventh is refused immediately
//! rather than queued. Admitted operations run concurrently while the
//! account store keeps every individual read-modify-write atomic.
//!
//! # Money
//!
//! Balances are exact decimals: arithmetic never rounds, and precision grows
//! with the operands (`0.1 + 0.001 = 0.101`). Externally reported balances
//! are always truncated - never rounded up - to exactly two fractional
//! digits, so a caller is never shown money the account does not hold.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{AccountStore, AdmissionGate, BankEngine, EngineConfig, UserRegistry};
pub use crate::io::write_outcomes_csv;
pub use crate::types::{ApiError, BankError, Money, Operation, OperationOutcome};
