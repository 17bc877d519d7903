//! Per-asset bookkeeping of fee revenue and earmarked claim payouts.
//!
//! Both balances live in the same token account (this contract), so every
//! outflow is checked against what the other side has a claim on:
//! `withdrawable_fee + payout_reserve <= balance(contract)`.

use soroban_sdk::{token, Address, Env};

use crate::errors::DistributorError;
use crate::storage;

pub fn credit_fee(env: &Env, asset: &Address, fee: i128) {
    let current = storage::get_withdrawable_fee(env, asset);
    storage::set_withdrawable_fee(env, asset, current + fee);
}

pub fn debit_fee(env: &Env, asset: &Address, amount: i128) -> Result<(), DistributorError> {
    let current = storage::get_withdrawable_fee(env, asset);
    if amount > current {
        return Err(DistributorError::InsufficientFeeBalance);
    }
    storage::set_withdrawable_fee(env, asset, current - amount);
    Ok(())
}

pub fn reserve_payout(env: &Env, asset: &Address, amount: i128) {
    let current = storage::get_payout_reserve(env, asset);
    storage::set_payout_reserve(env, asset, current + amount);
}

pub fn release_payout(env: &Env, asset: &Address, amount: i128) -> Result<(), DistributorError> {
    let current = storage::get_payout_reserve(env, asset);
    if amount > current {
        return Err(DistributorError::InsufficientCustody);
    }
    storage::set_payout_reserve(env, asset, current - amount);
    Ok(())
}

/// Balance of `asset` held by this contract beyond what the ledger already
/// accounts for.
pub fn unaccounted(env: &Env, asset: &Address) -> i128 {
    let held = token::Client::new(env, asset).balance(&env.current_contract_address());
    held - storage::get_withdrawable_fee(env, asset) - storage::get_payout_reserve(env, asset)
}

/// Fails when the contract holds less of `asset` than the ledger owes.
pub fn ensure_covered(env: &Env, asset: &Address) -> Result<(), DistributorError> {
    if unaccounted(env, asset) < 0 {
        return Err(DistributorError::InsufficientCustody);
    }
    Ok(())
}

/// Fails unless `amount` can leave custody without eating into reserved payouts.
pub fn ensure_releasable(env: &Env, asset: &Address, amount: i128) -> Result<(), DistributorError> {
    let held = token::Client::new(env, asset).balance(&env.current_contract_address());
    if held - storage::get_payout_reserve(env, asset) < amount {
        return Err(DistributorError::InsufficientCustody);
    }
    Ok(())
}
