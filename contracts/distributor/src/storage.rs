use soroban_sdk::{Address, Env};

use crate::errors::DistributorError;
use crate::types::{ClaimRecord, Cover, DataKey, DistributorConfig, FeeConfig, TokenMetadata};

// Storage TTLs, in ledgers
const INSTANCE_LIFETIME_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_BUMP_AMOUNT: u32 = 518_400; // ~30 days
const RECORD_LIFETIME_THRESHOLD: u32 = 518_400;
const RECORD_BUMP_AMOUNT: u32 = 3_110_400; // ~180 days

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn extend_record_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

// ───────────── CONFIG ─────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<DistributorConfig, DistributorError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(DistributorError::NotInitialized)
}

pub fn set_config(env: &Env, config: &DistributorConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_fee_config(env: &Env) -> Result<FeeConfig, DistributorError> {
    env.storage()
        .instance()
        .get(&DataKey::FeeConfig)
        .ok_or(DistributorError::NotInitialized)
}

pub fn set_fee_config(env: &Env, fee_config: &FeeConfig) {
    env.storage().instance().set(&DataKey::FeeConfig, fee_config);
}

pub fn get_metadata(env: &Env) -> Result<TokenMetadata, DistributorError> {
    env.storage()
        .instance()
        .get(&DataKey::Metadata)
        .ok_or(DistributorError::NotInitialized)
}

pub fn set_metadata(env: &Env, metadata: &TokenMetadata) {
    env.storage().instance().set(&DataKey::Metadata, metadata);
}

// ───────────── COVERS ─────────────

pub fn next_cover_id(env: &Env) -> u64 {
    let last: u64 = env.storage().instance().get(&DataKey::CoverCounter).unwrap_or(0);
    let id = last + 1;
    env.storage().instance().set(&DataKey::CoverCounter, &id);
    id
}

pub fn get_total_supply(env: &Env) -> u64 {
    env.storage().instance().get(&DataKey::TotalSupply).unwrap_or(0)
}

pub fn set_total_supply(env: &Env, total: u64) {
    env.storage().instance().set(&DataKey::TotalSupply, &total);
}

pub fn get_cover(env: &Env, cover_id: u64) -> Option<Cover> {
    env.storage().persistent().get(&DataKey::Cover(cover_id))
}

pub fn set_cover(env: &Env, cover: &Cover) {
    let key = DataKey::Cover(cover.id);
    env.storage().persistent().set(&key, cover);
    extend_record_ttl(env, &key);
}

pub fn remove_cover(env: &Env, cover_id: u64) {
    env.storage().persistent().remove(&DataKey::Cover(cover_id));
}

pub fn get_approved(env: &Env, cover_id: u64) -> Option<Address> {
    env.storage().persistent().get(&DataKey::Approved(cover_id))
}

pub fn set_approved(env: &Env, cover_id: u64, spender: &Address) {
    env.storage().persistent().set(&DataKey::Approved(cover_id), spender);
}

pub fn clear_approved(env: &Env, cover_id: u64) {
    env.storage().persistent().remove(&DataKey::Approved(cover_id));
}

pub fn get_balance(env: &Env, holder: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(holder.clone()))
        .unwrap_or(0)
}

pub fn set_balance(env: &Env, holder: &Address, balance: u64) {
    let key = DataKey::Balance(holder.clone());
    if balance == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &balance);
        extend_record_ttl(env, &key);
    }
}

// ───────────── CLAIMS ─────────────

pub fn get_claim(env: &Env, claim_id: u64) -> Option<ClaimRecord> {
    env.storage().persistent().get(&DataKey::Claim(claim_id))
}

pub fn set_claim(env: &Env, claim: &ClaimRecord) {
    let key = DataKey::Claim(claim.claim_id);
    env.storage().persistent().set(&key, claim);
    extend_record_ttl(env, &key);
}

// ───────────── ASSET LEDGER ─────────────

pub fn get_withdrawable_fee(env: &Env, asset: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::WithdrawableFee(asset.clone()))
        .unwrap_or(0)
}

pub fn set_withdrawable_fee(env: &Env, asset: &Address, amount: i128) {
    let key = DataKey::WithdrawableFee(asset.clone());
    env.storage().persistent().set(&key, &amount);
    extend_record_ttl(env, &key);
}

pub fn get_payout_reserve(env: &Env, asset: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::PayoutReserve(asset.clone()))
        .unwrap_or(0)
}

pub fn set_payout_reserve(env: &Env, asset: &Address, amount: i128) {
    let key = DataKey::PayoutReserve(asset.clone());
    env.storage().persistent().set(&key, &amount);
    extend_record_ttl(env, &key);
}
