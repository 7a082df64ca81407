//! Error types for the banking engine
//!
//! Two layers of errors cross this crate:
//!
//! - [`BankError`] - the internal kinds produced by the core components
//!   (registry, admission gate, account store). These carry diagnostic
//!   context and are never shown to callers directly.
//! - [`ApiError`] - the externally named kinds of the five-operation API.
//!   Every internal error is translated into exactly one of these at the
//!   engine boundary; the transfer operation additionally distinguishes
//!   which leg failed (`sender_*` / `receiver_*` / `too_many_requests_to_*`).
//!
//! All errors are ordinary values propagated with `Result` and `?`.

use rust_decimal::Decimal;
use thiserror::Error;

/// Internal error kinds produced by the core components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// Input failed validation. Returned before any lookup or side effect.
    #[error("invalid argument: {reason}")]
    WrongArguments {
        /// What was wrong with the input
        reason: String,
    },

    /// User creation refused: the name is already registered.
    #[error("user '{user}' already exists")]
    UserAlreadyExists {
        /// The contested username
        user: String,
    },

    /// Operation target is not registered.
    #[error("user '{user}' does not exist")]
    UserDoesNotExist {
        /// The unknown username
        user: String,
    },

    /// The user's admission gate is at capacity; the request was refused
    /// without running.
    #[error("too many requests in flight")]
    TooManyRequests,

    /// Withdrawal found the balance short. The account is unchanged.
    #[error("not enough money: available {available}, requested {requested}")]
    NotEnoughMoney {
        /// Current balance in the requested currency
        available: Decimal,
        /// Amount the withdrawal asked for
        requested: Decimal,
    },

    /// The exact result would exceed the mantissa range. The account is
    /// unchanged.
    #[error("arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },
}

impl BankError {
    /// Create a WrongArguments error
    pub fn wrong_arguments(reason: impl Into<String>) -> Self {
        BankError::WrongArguments {
            reason: reason.into(),
        }
    }

    /// Create a UserAlreadyExists error
    pub fn user_already_exists(user: impl Into<String>) -> Self {
        BankError::UserAlreadyExists { user: user.into() }
    }

    /// Create a UserDoesNotExist error
    pub fn user_does_not_exist(user: impl Into<String>) -> Self {
        BankError::UserDoesNotExist { user: user.into() }
    }

    /// Create a NotEnoughMoney error
    pub fn not_enough_money(available: Decimal, requested: Decimal) -> Self {
        BankError::NotEnoughMoney {
            available,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: impl Into<String>) -> Self {
        BankError::ArithmeticOverflow {
            operation: operation.into(),
        }
    }
}

/// Externally visible error kinds of the five-operation API.
///
/// The `Display` form of each variant is its wire name, which is also what
/// the CSV result writer emits in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Input did not satisfy validation; nothing was looked up or mutated.
    #[error("wrong_arguments")]
    WrongArguments,

    /// Creation refused: the username is taken.
    #[error("user_already_exists")]
    UserAlreadyExists,

    /// The target user of a single-user operation is not registered.
    #[error("user_does_not_exist")]
    UserDoesNotExist,

    /// The target user's admission gate refused the operation.
    #[error("too_many_requests_to_user")]
    TooManyRequestsToUser,

    /// Withdrawal (or the withdraw leg of a transfer) found the balance short.
    #[error("not_enough_money")]
    NotEnoughMoney,

    /// The `from` user of a transfer is not registered.
    #[error("sender_does_not_exist")]
    SenderDoesNotExist,

    /// The `to` user of a transfer is not registered.
    #[error("receiver_does_not_exist")]
    ReceiverDoesNotExist,

    /// The sender's admission gate refused the withdraw leg.
    #[error("too_many_requests_to_sender")]
    TooManyRequestsToSender,

    /// The receiver's admission gate refused the deposit leg. The sender has
    /// been re-credited.
    #[error("too_many_requests_to_receiver")]
    TooManyRequestsToReceiver,
}

impl ApiError {
    /// The wire name of this error kind.
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::WrongArguments => "wrong_arguments",
            ApiError::UserAlreadyExists => "user_already_exists",
            ApiError::UserDoesNotExist => "user_does_not_exist",
            ApiError::TooManyRequestsToUser => "too_many_requests_to_user",
            ApiError::NotEnoughMoney => "not_enough_money",
            ApiError::SenderDoesNotExist => "sender_does_not_exist",
            ApiError::ReceiverDoesNotExist => "receiver_does_not_exist",
            ApiError::TooManyRequestsToSender => "too_many_requests_to_sender",
            ApiError::TooManyRequestsToReceiver => "too_many_requests_to_receiver",
        }
    }

    /// Translate an internal error from the sender leg of a transfer.
    ///
    /// Existence and admission failures are attributed to the sender;
    /// everything else translates as for a single-user operation.
    pub fn from_sender_leg(error: BankError) -> Self {
        match error {
            BankError::UserDoesNotExist { .. } => ApiError::SenderDoesNotExist,
            BankError::TooManyRequests => ApiError::TooManyRequestsToSender,
            other => ApiError::from(other),
        }
    }

    /// Translate an internal error from the receiver leg of a transfer.
    pub fn from_receiver_leg(error: BankError) -> Self {
        match error {
            BankError::UserDoesNotExist { .. } => ApiError::ReceiverDoesNotExist,
            BankError::TooManyRequests => ApiError::TooManyRequestsToReceiver,
            other => ApiError::from(other),
        }
    }
}

impl From<BankError> for ApiError {
    /// Translation for single-user operations.
    ///
    /// Overflow folds into `wrong_arguments`: the input magnitude, not the
    /// account, is at fault, and the external taxonomy stays closed.
    fn from(error: BankError) -> Self {
        match error {
            BankError::WrongArguments { .. } => ApiError::WrongArguments,
            BankError::UserAlreadyExists { .. } => ApiError::UserAlreadyExists,
            BankError::UserDoesNotExist { .. } => ApiError::UserDoesNotExist,
            BankError::TooManyRequests => ApiError::TooManyRequestsToUser,
            BankError::NotEnoughMoney { .. } => ApiError::NotEnoughMoney,
            BankError::ArithmeticOverflow { .. } => ApiError::WrongArguments,
        }
    }
}
