//! The five-operation banking facade
//!
//! This module provides `BankEngine`, the API surface over the per-user
//! components. Each method follows the same shape:
//!
//! 1. Validate arguments - malformed input is refused before any lookup.
//! 2. Resolve the user(s) in the registry - existence before admission.
//! 3. Pass the operation through the user's admission gate - a full gate
//!    refuses immediately.
//! 4. Run the balance operation against the user's store.
//!
//! Every internal error is translated into an [`ApiError`] exactly once, on
//! the way out of these methods. Transfers compose two single-user legs
//! (withdraw, then deposit) and re-credit the sender when the deposit leg is
//! refused.

use crate::core::admission::DEFAULT_MAX_IN_FLIGHT;
use crate::core::registry::{UserAccount, UserRegistry};
use crate::types::{ApiError, Money};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on in-flight operations per user
    pub max_in_flight: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl EngineConfig {
    /// Create a config with a custom in-flight bound.
    ///
    /// A zero bound would refuse every operation; it falls back to the
    /// default with a warning.
    pub fn new(max_in_flight: usize) -> Self {
        if max_in_flight == 0 {
            let default = Self::default();
            tracing::warn!(
                fallback = default.max_in_flight,
                "invalid max_in_flight (0), using default"
            );
            return default;
        }
        Self { max_in_flight }
    }
}

/// The banking engine: user creation, deposits, withdrawals, balance
/// queries, and transfers over an in-memory multi-currency ledger.
///
/// Cloning is cheap (the registry is shared through an `Arc`), so a driver
/// can hand one engine handle to every concurrent task. Distinct users are
/// fully independent; operations on one user contend only for that user's
/// ten admission slots.
///
/// Balances returned by the operations are the externally displayed form:
/// truncated to exactly two fractional digits. Internal arithmetic stays
/// exact at full precision.
#[derive(Debug, Clone)]
pub struct BankEngine {
    registry: Arc<UserRegistry>,
}

impl BankEngine {
    /// Create an engine with the default per-user in-flight bound of ten.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(UserRegistry::new(config.max_in_flight)),
        }
    }

    /// Register a new user with empty balances in every currency.
    ///
    /// # Errors
    ///
    /// * `wrong_arguments` - empty username
    /// * `user_already_exists` - the name is taken (under concurrent
    ///   creation of the same name, exactly one caller succeeds)
    pub async fn create_user(&self, user: &str) -> Result<(), ApiError> {
        validate_name(user)?;
        self.registry.create_user(user)?;
        tracing::debug!(user, "user created");
        Ok(())
    }

    /// Read `user`'s balance in `currency`, displayed to two fractional
    /// digits. A currency that was never deposited reads as `0.00`.
    ///
    /// # Errors
    ///
    /// * `wrong_arguments` - empty username or currency
    /// * `user_does_not_exist` - unknown user
    /// * `too_many_requests_to_user` - the user's gate is full
    pub async fn get_balance(&self, user: &str, currency: &str) -> Result<Decimal, ApiError> {
        validate_name(user)?;
        validate_name(currency)?;
        let account = self.registry.resolve(user)?;
        let balance = account
            .gate()
            .execute(async { account.store().balance(currency) })
            .await?;
        Ok(balance.displayed())
    }

    /// Credit `amount` to `user`'s balance in `currency`.
    ///
    /// # Returns
    ///
    /// The new displayed balance.
    ///
    /// # Errors
    ///
    /// * `wrong_arguments` - empty username/currency, or amount not
    ///   strictly positive
    /// * `user_does_not_exist` - unknown user
    /// * `too_many_requests_to_user` - the user's gate is full
    pub async fn deposit(
        &self,
        user: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, ApiError> {
        validate_name(user)?;
        validate_name(currency)?;
        let amount = validate_amount(amount)?;
        let account = self.registry.resolve(user)?;
        let balance = account
            .gate()
            .execute(async { account.store().deposit(currency, amount) })
            .await??;
        Ok(balance.displayed())
    }

    /// Debit `amount` from `user`'s balance in `currency`.
    ///
    /// The balance check and the debit are one atomic step; a refused
    /// withdrawal changes nothing.
    ///
    /// # Returns
    ///
    /// The new displayed balance.
    ///
    /// # Errors
    ///
    /// * `wrong_arguments` - empty username/currency, or amount not
    ///   strictly positive
    /// * `user_does_not_exist` - unknown user
    /// * `not_enough_money` - balance < amount (including a currency never
    ///   deposited)
    /// * `too_many_requests_to_user` - the user's gate is full
    pub async fn withdraw(
        &self,
        user: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, ApiError> {
        validate_name(user)?;
        validate_name(currency)?;
        let amount = validate_amount(amount)?;
        let account = self.registry.resolve(user)?;
        let balance = account
            .gate()
            .execute(async { account.store().withdraw(currency, amount) })
            .await??;
        Ok(balance.displayed())
    }

    /// Move `amount` of `currency` from `from` to `to`.
    ///
    /// Composed of a withdraw leg through the sender's gate and a deposit
    /// leg through the receiver's gate. The two legs are not atomic against
    /// other operations: between them, concurrently admitted operations may
    /// observe the sender already debited. If the deposit leg is refused,
    /// the sender is re-credited (a single compensation attempt through the
    /// sender's gate; see the module docs of [`crate::core`]).
    ///
    /// # Returns
    ///
    /// The pair (sender's post-withdraw displayed balance, receiver's
    /// post-deposit displayed balance).
    ///
    /// # Errors
    ///
    /// * `wrong_arguments` - empty name/currency, non-positive amount, or
    ///   `from == to`
    /// * `sender_does_not_exist` / `receiver_does_not_exist` - unknown
    ///   endpoint, checked before any side effect
    /// * `not_enough_money` - the withdraw leg found the sender short
    /// * `too_many_requests_to_sender` - the sender's gate refused the
    ///   withdraw leg
    /// * `too_many_requests_to_receiver` - the receiver's gate refused the
    ///   deposit leg; the sender has been re-credited
    pub async fn send(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<(Decimal, Decimal), ApiError> {
        validate_name(from)?;
        validate_name(to)?;
        validate_name(currency)?;
        let amount = validate_amount(amount)?;
        if from == to {
            return Err(ApiError::WrongArguments);
        }

        // Both endpoints must exist before the first leg runs; with no
        // delete-user operation they cannot disappear afterwards.
        let sender = self
            .registry
            .resolve(from)
            .map_err(ApiError::from_sender_leg)?;
        let receiver = self
            .registry
            .resolve(to)
            .map_err(ApiError::from_receiver_leg)?;

        let from_balance = match sender
            .gate()
            .execute(async { sender.store().withdraw(currency, amount) })
            .await
        {
            Ok(Ok(balance)) => balance,
            Ok(Err(domain)) => return Err(ApiError::from(domain)),
            Err(refusal) => {
                tracing::debug!(user = from, "withdraw leg refused by sender's gate");
                return Err(ApiError::from_sender_leg(refusal));
            }
        };

        match receiver
            .gate()
            .execute(async { receiver.store().deposit(currency, amount) })
            .await
        {
            Ok(Ok(to_balance)) => Ok((from_balance.displayed(), to_balance.displayed())),
            Ok(Err(domain)) => {
                self.compensate(&sender, from, currency, amount).await;
                Err(ApiError::from(domain))
            }
            Err(refusal) => {
                tracing::debug!(user = to, "deposit leg refused by receiver's gate");
                self.compensate(&sender, from, currency, amount).await;
                Err(ApiError::from_receiver_leg(refusal))
            }
        }
    }

    /// Re-credit the sender after a failed deposit leg.
    ///
    /// One attempt, through the sender's own gate like any other operation.
    /// If the gate is saturated at this instant the sender stays transiently
    /// debited; the caller still gets the receiver-leg error, and the window
    /// is logged. Retrying here would turn the non-blocking gate into a
    /// hidden queue.
    async fn compensate(
        &self,
        sender: &Arc<UserAccount>,
        from: &str,
        currency: &str,
        amount: Money,
    ) {
        match sender
            .gate()
            .execute(async { sender.store().deposit(currency, amount) })
            .await
        {
            Ok(Ok(_)) => {
                tracing::debug!(user = from, currency, "sender re-credited after failed deposit leg");
            }
            Ok(Err(error)) => {
                tracing::warn!(user = from, currency, %error, "compensation deposit failed");
            }
            Err(_) => {
                tracing::warn!(
                    user = from,
                    currency,
                    "compensation refused by the sender's gate; sender transiently debited"
                );
            }
        }
    }
}

impl Default for BankEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Usernames and currencies must be non-empty; emptiness is the only
/// malformed shape a typed `&str` can still carry.
fn validate_name(value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::WrongArguments);
    }
    Ok(())
}

/// Amounts must be strictly positive.
fn validate_amount(amount: Decimal) -> Result<Money, ApiError> {
    if amount <= Decimal::ZERO {
        return Err(ApiError::WrongArguments);
    }
    Money::from_amount(amount).ok_or(ApiError::WrongArguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_deposit_withdraw_balance_flow() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();

        assert_eq!(
            engine.deposit("alice", dec("0.01"), "USD").await.unwrap(),
            dec("0.01")
        );
        assert_eq!(
            engine.deposit("alice", dec("0.01"), "USD").await.unwrap(),
            dec("0.02")
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("0.02")
        );
    }

    #[tokio::test]
    async fn test_duplicate_user_is_refused() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        assert_eq!(
            engine.create_user("alice").await.unwrap_err(),
            ApiError::UserAlreadyExists
        );
    }

    #[tokio::test]
    async fn test_display_truncates_but_arithmetic_stays_exact() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();

        assert_eq!(
            engine.deposit("alice", dec("10.123"), "USD").await.unwrap(),
            dec("10.12")
        );
        // 10.123 + 10.45678 = 20.57978 internally, shown truncated.
        assert_eq!(
            engine
                .deposit("alice", dec("10.45678"), "USD")
                .await
                .unwrap(),
            dec("20.57")
        );
        assert_eq!(
            engine.deposit("alice", dec("10.001"), "USD").await.unwrap(),
            dec("30.58")
        );
        assert_eq!(
            engine.deposit("alice", dec("10.009"), "USD").await.unwrap(),
            dec("40.58")
        );
    }

    #[tokio::test]
    async fn test_exact_full_withdrawal() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        assert_eq!(
            engine.withdraw("alice", dec("100"), "USD").await.unwrap(),
            dec("0.00")
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("0.00")
        );
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_state_unchanged() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        assert_eq!(
            engine
                .withdraw("alice", dec("100.01"), "USD")
                .await
                .unwrap_err(),
            ApiError::NotEnoughMoney
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
    }

    #[tokio::test]
    async fn test_withdraw_from_untouched_currency_is_short() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        assert_eq!(
            engine.withdraw("alice", dec("1"), "EUR").await.unwrap_err(),
            ApiError::NotEnoughMoney
        );
    }

    #[tokio::test]
    async fn test_currency_case_isolation() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("10"), "USD").await.unwrap();

        assert_eq!(
            engine.get_balance("alice", "usd").await.unwrap(),
            dec("0.00")
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("10.00")
        );
    }

    #[rstest]
    #[case::empty_user("", "10", "USD")]
    #[case::empty_currency("alice", "10", "")]
    #[case::zero_amount("alice", "0", "USD")]
    #[case::negative_amount("alice", "-5", "USD")]
    #[tokio::test]
    async fn test_deposit_argument_validation(
        #[case] user: &str,
        #[case] amount: &str,
        #[case] currency: &str,
    ) {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        assert_eq!(
            engine.deposit(user, dec(amount), currency).await.unwrap_err(),
            ApiError::WrongArguments
        );
    }

    #[tokio::test]
    async fn test_validation_precedes_existence() {
        let engine = BankEngine::new();
        // Malformed amount on an unknown user: wrong_arguments wins.
        assert_eq!(
            engine.deposit("ghost", dec("-1"), "USD").await.unwrap_err(),
            ApiError::WrongArguments
        );
        // Well-formed input on an unknown user: the lookup error.
        assert_eq!(
            engine.deposit("ghost", dec("1"), "USD").await.unwrap_err(),
            ApiError::UserDoesNotExist
        );
    }

    #[tokio::test]
    async fn test_transfer_moves_funds_and_conserves_total() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.create_user("bob").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        let (from_balance, to_balance) =
            engine.send("alice", "bob", dec("25"), "USD").await.unwrap();
        assert_eq!(from_balance, dec("75.00"));
        assert_eq!(to_balance, dec("25.00"));

        let alice = engine.get_balance("alice", "USD").await.unwrap();
        let bob = engine.get_balance("bob", "USD").await.unwrap();
        assert_eq!(alice + bob, dec("100.00"));
    }

    #[tokio::test]
    async fn test_same_user_transfer_rejected_without_side_effect() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        assert_eq!(
            engine
                .send("alice", "alice", dec("10"), "USD")
                .await
                .unwrap_err(),
            ApiError::WrongArguments
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
    }

    #[tokio::test]
    async fn test_transfer_endpoint_existence_errors() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        assert_eq!(
            engine.send("ghost", "alice", dec("1"), "USD").await.unwrap_err(),
            ApiError::SenderDoesNotExist
        );
        assert_eq!(
            engine.send("alice", "ghost", dec("1"), "USD").await.unwrap_err(),
            ApiError::ReceiverDoesNotExist
        );
        // Existence is checked before the withdraw leg: nothing was debited.
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
    }

    #[tokio::test]
    async fn test_transfer_with_insufficient_funds() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.create_user("bob").await.unwrap();
        engine.deposit("alice", dec("10"), "USD").await.unwrap();

        assert_eq!(
            engine
                .send("alice", "bob", dec("10.01"), "USD")
                .await
                .unwrap_err(),
            ApiError::NotEnoughMoney
        );
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("10.00")
        );
        assert_eq!(engine.get_balance("bob", "USD").await.unwrap(), dec("0.00"));
    }

    #[tokio::test]
    async fn test_saturated_gate_refuses_every_operation_kind() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        let account = engine.registry.resolve("alice").unwrap();
        let permits: Vec<_> = (0..DEFAULT_MAX_IN_FLIGHT)
            .map(|_| account.gate().try_admit().unwrap())
            .collect();

        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap_err(),
            ApiError::TooManyRequestsToUser
        );
        assert_eq!(
            engine.deposit("alice", dec("1"), "USD").await.unwrap_err(),
            ApiError::TooManyRequestsToUser
        );
        assert_eq!(
            engine.withdraw("alice", dec("1"), "USD").await.unwrap_err(),
            ApiError::TooManyRequestsToUser
        );

        drop(permits);
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
    }

    #[tokio::test]
    async fn test_transfer_refused_at_saturated_sender() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.create_user("bob").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        let sender = engine.registry.resolve("alice").unwrap();
        let permits: Vec<_> = (0..DEFAULT_MAX_IN_FLIGHT)
            .map(|_| sender.gate().try_admit().unwrap())
            .collect();

        assert_eq!(
            engine.send("alice", "bob", dec("10"), "USD").await.unwrap_err(),
            ApiError::TooManyRequestsToSender
        );

        drop(permits);
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
        assert_eq!(engine.get_balance("bob", "USD").await.unwrap(), dec("0.00"));
    }

    #[tokio::test]
    async fn test_transfer_compensates_when_receiver_gate_is_full() {
        let engine = BankEngine::new();
        engine.create_user("alice").await.unwrap();
        engine.create_user("bob").await.unwrap();
        engine.deposit("alice", dec("100"), "USD").await.unwrap();

        let receiver = engine.registry.resolve("bob").unwrap();
        let permits: Vec<_> = (0..DEFAULT_MAX_IN_FLIGHT)
            .map(|_| receiver.gate().try_admit().unwrap())
            .collect();

        assert_eq!(
            engine.send("alice", "bob", dec("25"), "USD").await.unwrap_err(),
            ApiError::TooManyRequestsToReceiver
        );

        drop(permits);
        // The withdraw leg succeeded, then the compensation re-credited it.
        assert_eq!(
            engine.get_balance("alice", "USD").await.unwrap(),
            dec("100.00")
        );
        assert_eq!(engine.get_balance("bob", "USD").await.unwrap(), dec("0.00"));
    }

    #[tokio::test]
    async fn test_zero_in_flight_config_falls_back_to_default() {
        let config = EngineConfig::new(0);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);

        let config = EngineConfig::new(3);
        assert_eq!(config.max_in_flight, 3);
    }
}
