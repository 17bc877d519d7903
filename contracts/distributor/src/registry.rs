//! Cover tokens. A cover exists exactly as long as its record is stored;
//! burning removes the record, which is what makes redemption one-shot.

use soroban_sdk::{Address, Env};

use crate::errors::DistributorError;
use crate::events::{self, CoverTransferred};
use crate::storage;
use crate::types::Cover;

pub fn load(env: &Env, cover_id: u64) -> Result<Cover, DistributorError> {
    storage::get_cover(env, cover_id).ok_or(DistributorError::NonexistentCover)
}

/// Loads a cover and checks that `holder` currently owns it.
pub fn load_owned(env: &Env, cover_id: u64, holder: &Address) -> Result<Cover, DistributorError> {
    let cover = load(env, cover_id)?;
    if cover.owner != *holder {
        return Err(DistributorError::NotCoverOwner);
    }
    Ok(cover)
}

pub fn mint(env: &Env, cover: &Cover) {
    storage::set_cover(env, cover);
    let balance = storage::get_balance(env, &cover.owner);
    storage::set_balance(env, &cover.owner, balance + 1);
    storage::set_total_supply(env, storage::get_total_supply(env) + 1);
}

pub fn burn(env: &Env, cover: &Cover) {
    storage::remove_cover(env, cover.id);
    storage::clear_approved(env, cover.id);
    let balance = storage::get_balance(env, &cover.owner);
    storage::set_balance(env, &cover.owner, balance.saturating_sub(1));
    storage::set_total_supply(env, storage::get_total_supply(env).saturating_sub(1));
}

/// Hands `cover` to `to`, dropping any outstanding approval.
pub fn reassign(env: &Env, mut cover: Cover, to: &Address) {
    let from = cover.owner.clone();
    if from == *to {
        return;
    }

    storage::clear_approved(env, cover.id);
    let from_balance = storage::get_balance(env, &from);
    storage::set_balance(env, &from, from_balance.saturating_sub(1));
    let to_balance = storage::get_balance(env, to);
    storage::set_balance(env, to, to_balance + 1);

    cover.owner = to.clone();
    storage::set_cover(env, &cover);

    events::cover_transferred(
        env,
        CoverTransferred {
            cover_id: cover.id,
            from,
            to: to.clone(),
        },
    );
}
