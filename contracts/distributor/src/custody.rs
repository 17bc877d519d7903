//! Token movements in and out of the distributor's custody.

use soroban_sdk::{log, token, Address, Env};

use crate::errors::DistributorError;
use crate::types::DistributorConfig;

/// Pulls `amount` of `asset` from `from` into custody.
///
/// The native asset is paid directly by the caller as part of the call; any
/// other token is pulled against an allowance granted to this contract.
pub fn pull(
    env: &Env,
    config: &DistributorConfig,
    asset: &Address,
    from: &Address,
    amount: i128,
) -> Result<(), DistributorError> {
    let contract = env.current_contract_address();
    let client = token::Client::new(env, asset);
    let pulled = if *asset == config.native_asset {
        matches!(client.try_transfer(from, &contract, &amount), Ok(Ok(())))
    } else {
        matches!(
            client.try_transfer_from(&contract, from, &contract, &amount),
            Ok(Ok(()))
        )
    };
    if !pulled {
        return Err(DistributorError::InsufficientPayment);
    }
    Ok(())
}

/// Sends `amount` back to `to`. A recipient that cannot take the funds fails
/// the whole operation.
pub fn refund(env: &Env, asset: &Address, to: &Address, amount: i128) -> Result<(), DistributorError> {
    if amount == 0 {
        return Ok(());
    }
    let client = token::Client::new(env, asset);
    match client.try_transfer(&env.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "refund rejected by recipient", to.clone(), amount);
            Err(DistributorError::RefundFailed)
        }
    }
}

/// Pays `amount` out of custody.
pub fn pay(env: &Env, asset: &Address, to: &Address, amount: i128) {
    token::Client::new(env, asset).transfer(&env.current_contract_address(), to, &amount);
}

/// Lets `spender` pull up to `amount` of `asset` from custody during this ledger.
pub fn grant_allowance(env: &Env, asset: &Address, spender: &Address, amount: i128) {
    token::Client::new(env, asset).approve(
        &env.current_contract_address(),
        spender,
        &amount,
        &env.ledger().sequence(),
    );
}

pub fn revoke_allowance(env: &Env, asset: &Address, spender: &Address) {
    grant_allowance(env, asset, spender, 0);
}

pub fn balance(env: &Env, asset: &Address, holder: &Address) -> i128 {
    token::Client::new(env, asset).balance(holder)
}
