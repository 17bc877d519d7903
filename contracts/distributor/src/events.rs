use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::ClaimStatus;

pub const EVT_COVER_BOUGHT: Symbol = symbol_short!("cvr_buy");
pub const EVT_COVER_ACTION: Symbol = symbol_short!("cvr_act");
pub const EVT_COVER_TRANSFER: Symbol = symbol_short!("cvr_xfer");
pub const EVT_CLAIM_SUBMITTED: Symbol = symbol_short!("clm_sub");
pub const EVT_CLAIM_RESOLVED: Symbol = symbol_short!("clm_res");
pub const EVT_CLAIM_REDEEMED: Symbol = symbol_short!("clm_rdm");
pub const EVT_FEE_WITHDRAWN: Symbol = symbol_short!("fee_wd");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverBought {
    pub cover_id: u64,
    pub buyer: Address,
    pub target: Address,
    pub fee_percentage: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverActionExecuted {
    pub cover_id: u64,
    pub action: u32,
    pub spent: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverTransferred {
    pub cover_id: u64,
    pub from: Address,
    pub to: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimSubmitted {
    pub cover_id: u64,
    pub claim_id: u64,
    pub submitter: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimResolved {
    pub cover_id: u64,
    pub claim_id: u64,
    pub status: ClaimStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRedeemed {
    pub cover_id: u64,
    pub claim_id: u64,
    pub receiver: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeWithdrawn {
    pub asset: Address,
    pub amount: i128,
    pub recipient: Address,
}

pub fn cover_bought(env: &Env, event: CoverBought) {
    env.events()
        .publish((EVT_COVER_BOUGHT, event.buyer.clone()), event);
}

pub fn cover_action_executed(env: &Env, event: CoverActionExecuted) {
    env.events().publish((EVT_COVER_ACTION, event.cover_id), event);
}

pub fn cover_transferred(env: &Env, event: CoverTransferred) {
    env.events().publish((EVT_COVER_TRANSFER, event.cover_id), event);
}

pub fn claim_submitted(env: &Env, event: ClaimSubmitted) {
    env.events().publish((EVT_CLAIM_SUBMITTED, event.cover_id), event);
}

pub fn claim_resolved(env: &Env, event: ClaimResolved) {
    env.events().publish((EVT_CLAIM_RESOLVED, event.cover_id), event);
}

pub fn claim_redeemed(env: &Env, event: ClaimRedeemed) {
    env.events()
        .publish((EVT_CLAIM_REDEEMED, event.receiver.clone()), event);
}

pub fn fee_withdrawn(env: &Env, event: FeeWithdrawn) {
    env.events().publish((EVT_FEE_WITHDRAWN, event.asset.clone()), event);
}
