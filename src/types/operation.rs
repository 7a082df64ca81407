//! Operation requests and outcomes
//!
//! [`Operation`] is the parsed form of one input row: the request a driver
//! hands to the engine. [`OperationOutcome`] is the corresponding result row
//! written back out, carrying either the displayed balances or an external
//! error name in its `status` field.

use crate::types::ApiError;
use rust_decimal::Decimal;

/// One of the five operations the engine exposes.
///
/// Amounts are raw decimals here; the engine validates them (strictly
/// positive) before converting to [`crate::types::Money`]. Usernames and
/// currencies are byte-compared everywhere, so case is preserved as parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Register a new user with empty balances.
    CreateUser {
        /// Name to register
        user: String,
    },

    /// Read a user's balance in one currency.
    GetBalance {
        /// Account owner
        user: String,
        /// Currency to read (case-sensitive)
        currency: String,
    },

    /// Credit an amount to a user's balance in one currency.
    Deposit {
        /// Account owner
        user: String,
        /// Amount to credit (must be strictly positive)
        amount: Decimal,
        /// Currency to credit (case-sensitive)
        currency: String,
    },

    /// Debit an amount from a user's balance in one currency.
    Withdraw {
        /// Account owner
        user: String,
        /// Amount to debit (must be strictly positive)
        amount: Decimal,
        /// Currency to debit (case-sensitive)
        currency: String,
    },

    /// Move an amount from one user to another in one currency.
    Send {
        /// Sending user
        from: String,
        /// Receiving user
        to: String,
        /// Amount to move (must be strictly positive)
        amount: Decimal,
        /// Currency to move (case-sensitive)
        currency: String,
    },
}

impl Operation {
    /// The operation name as it appears in the input and output CSV.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateUser { .. } => "create",
            Operation::GetBalance { .. } => "balance",
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Send { .. } => "send",
        }
    }

    /// The primary user of the operation (the sender, for transfers).
    pub fn user(&self) -> &str {
        match self {
            Operation::CreateUser { user }
            | Operation::GetBalance { user, .. }
            | Operation::Deposit { user, .. }
            | Operation::Withdraw { user, .. } => user,
            Operation::Send { from, .. } => from,
        }
    }

    /// The counterparty, for transfers.
    pub fn to(&self) -> Option<&str> {
        match self {
            Operation::Send { to, .. } => Some(to),
            _ => None,
        }
    }

    /// The currency the operation touches, if any.
    pub fn currency(&self) -> Option<&str> {
        match self {
            Operation::CreateUser { .. } => None,
            Operation::GetBalance { currency, .. }
            | Operation::Deposit { currency, .. }
            | Operation::Withdraw { currency, .. }
            | Operation::Send { currency, .. } => Some(currency),
        }
    }
}

/// Result of one input row, in input order.
///
/// `status` is `"ok"` or an external error name; balances are the displayed
/// (two-fractional-digit) values the operation reported, when it reported
/// any.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    /// 1-based input row number
    pub seq: u64,
    /// Operation name (`create`, `balance`, `deposit`, `withdraw`, `send`)
    pub op: String,
    /// Primary user (sender, for transfers)
    pub user: String,
    /// Counterparty, for transfers
    pub to: Option<String>,
    /// Currency, where the operation has one
    pub currency: Option<String>,
    /// `"ok"` or an external error name
    pub status: String,
    /// Displayed balance (the new or queried balance; the sender's, for
    /// transfers)
    pub balance: Option<Decimal>,
    /// Displayed receiver balance, for successful transfers
    pub to_balance: Option<Decimal>,
}

impl OperationOutcome {
    /// Status value of every successful outcome.
    pub const OK: &'static str = "ok";

    /// Build the outcome of a successful operation.
    pub fn success(
        seq: u64,
        operation: &Operation,
        balance: Option<Decimal>,
        to_balance: Option<Decimal>,
    ) -> Self {
        OperationOutcome {
            seq,
            op: operation.kind().to_string(),
            user: operation.user().to_string(),
            to: operation.to().map(str::to_string),
            currency: operation.currency().map(str::to_string),
            status: Self::OK.to_string(),
            balance,
            to_balance,
        }
    }

    /// Build the outcome of a failed operation.
    pub fn failure(seq: u64, operation: &Operation, error: ApiError) -> Self {
        OperationOutcome {
            seq,
            op: operation.kind().to_string(),
            user: operation.user().to_string(),
            to: operation.to().map(str::to_string),
            currency: operation.currency().map(str::to_string),
            status: error.name().to_string(),
            balance: None,
            to_balance: None,
        }
    }
}
