//! Thin adapter over the SEP-41 token interface.
//!
//! Each call is an independent sub-invocation. A failure is reported as a
//! `ContractError`; returning it from the entry point rolls back the whole
//! invocation, including transfers that already went through.

use common::{TokenConfig, TransferMode};
use soroban_sdk::{token::TokenClient, Address, Env, Error};

use crate::ContractError;

// Stellar asset contract error codes.
const ALLOWANCE_ERROR: u32 = 9;
const BALANCE_ERROR: u32 = 10;

/// Maps a token contract failure onto the pool's error space.
fn debit_error(err: Error) -> ContractError {
    if err == Error::from_contract_error(ALLOWANCE_ERROR) {
        ContractError::NotAuthorizedOperator
    } else if err == Error::from_contract_error(BALANCE_ERROR) {
        ContractError::InsufficientBalance
    } else {
        ContractError::TransferFailed
    }
}

pub struct TokenLedger<'a> {
    env: &'a Env,
}

impl<'a> TokenLedger<'a> {
    pub fn new(env: &'a Env) -> Self {
        TokenLedger { env }
    }

    /// Pulls `amount` of the deposit token from `from` into the pool.
    ///
    /// A missing or short allowance is `NotAuthorizedOperator`, a short
    /// balance is `InsufficientBalance`; any other failure is `TransferFailed`.
    pub fn debit(
        &self,
        token: &TokenConfig,
        from: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let pool = self.env.current_contract_address();
        let client = TokenClient::new(self.env, &token.address);
        let outcome = match token.mode {
            TransferMode::Direct => client.try_transfer(from, &pool, &amount),
            TransferMode::Allowance => client.try_transfer_from(&pool, from, &pool, &amount),
        };
        match outcome {
            Ok(Ok(())) => Ok(()),
            Err(Ok(err)) => Err(debit_error(err)),
            _ => Err(ContractError::TransferFailed),
        }
    }

    /// Sends `amount` of `token` from the pool to `to`. Zero is a no-op.
    pub fn credit(&self, token: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
        if amount == 0 {
            return Ok(());
        }
        let pool = self.env.current_contract_address();
        match TokenClient::new(self.env, token).try_transfer(&pool, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }

    pub fn balance_of(&self, token: &Address, who: &Address) -> i128 {
        TokenClient::new(self.env, token).balance(who)
    }
}
