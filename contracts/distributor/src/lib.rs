#![no_std]

mod custody;
pub mod errors;
pub mod events;
pub mod fees;
mod ledger;
pub mod protocol;
mod registry;
mod storage;
pub mod types;

use soroban_sdk::{
    contract, contractimpl, contractmeta, log, symbol_short, token, Address, Bytes, Env, String,
};

pub use crate::errors::{DistributorError, ErrorKind, ProtocolError};
pub use crate::protocol::CoverProtocolClient;
pub use crate::types::*;

use crate::events::{
    ClaimRedeemed, ClaimResolved, ClaimSubmitted, CoverActionExecuted, CoverBought, FeeWithdrawn,
};

contractmeta!(
    key = "Description",
    val = "Resells cover from an underlying protocol with a markup and mediates its claims"
);

//
// ──────────────────────────────────────────────────────────
// CONSTANTS
// ──────────────────────────────────────────────────────────
//

const SECONDS_PER_DAY: u64 = 86_400;
const DEFAULT_CLAIM_GRACE_PERIOD: u64 = 35 * SECONDS_PER_DAY;

//
// ──────────────────────────────────────────────────────────
// CONTRACT
// ──────────────────────────────────────────────────────────
//

#[contract]
pub struct Distributor;

#[contractimpl]
impl Distributor {
    // ───────────── INITIALIZATION ─────────────

    /// Initialize the distributor
    ///
    /// # Arguments
    /// * `owner` - Account allowed to run owner controls
    /// * `protocol` - Underlying cover protocol
    /// * `native_asset` - Asset paid as attached value (excess is refunded)
    /// * `reward_token` - Protocol token the distributor may sell
    /// * `treasury` - Recipient of reward token sales
    /// * `fee_percentage` - Markup in basis points (e.g., 500 = 5%)
    /// * `name` / `symbol` - Cover token metadata
    pub fn initialize(
        env: Env,
        owner: Address,
        protocol: Address,
        native_asset: Address,
        reward_token: Address,
        treasury: Address,
        fee_percentage: u32,
        name: String,
        symbol: String,
    ) -> Result<(), DistributorError> {
        if storage::is_initialized(&env) {
            return Err(DistributorError::AlreadyInitialized);
        }
        owner.require_auth();
        fees::validate_fee_percentage(fee_percentage)?;

        let config = DistributorConfig {
            owner,
            treasury,
            protocol,
            native_asset,
            reward_token,
            membership: env.current_contract_address(),
            claim_grace_period: DEFAULT_CLAIM_GRACE_PERIOD,
        };
        storage::set_config(&env, &config);
        storage::set_fee_config(
            &env,
            &FeeConfig {
                fee_percentage,
                purchases_allowed: true,
            },
        );
        storage::set_metadata(&env, &TokenMetadata { name, symbol });
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    // ───────────── PURCHASES ─────────────

    /// Buy cover through the protocol on behalf of `buyer`
    ///
    /// # Arguments
    /// * `buyer` - Receives the cover token
    /// * `request` - What to insure, in which asset, for how long
    /// * `max_price_with_fee` - Ceiling on base price plus markup
    /// * `quote` - Signed quote from the protocol's quote engine
    /// * `payment` - Native asset attached to the call; must be zero for other assets
    ///
    /// # Returns
    /// * Cover ID
    pub fn buy_cover(
        env: Env,
        buyer: Address,
        request: CoverRequest,
        max_price_with_fee: i128,
        quote: CoverQuote,
        payment: i128,
    ) -> Result<u64, DistributorError> {
        buyer.require_auth();

        let config = storage::get_config(&env)?;
        let fee_config = storage::get_fee_config(&env)?;
        if !fee_config.purchases_allowed {
            return Err(DistributorError::BuysDisabled);
        }

        let protocol = CoverProtocolClient::new(&env, &config.protocol);
        if !protocol.is_supported_asset(&request.asset) {
            return Err(DistributorError::UnsupportedAsset);
        }
        let decimals = token::Client::new(&env, &request.asset).decimals();
        fees::validate_whole_units(request.amount, decimals)?;

        let base_price = protocol::settle(
            &env,
            symbol_short!("quote"),
            protocol.try_quote_price(
                &config.membership,
                &request.target,
                &request.asset,
                &request.amount,
                &request.period,
                &request.cover_type,
                &quote,
            ),
            ProtocolError::on_purchase,
        )?;
        if base_price <= 0 {
            return Err(DistributorError::QuoteInvalid);
        }

        let price = fees::price_with_fee(&fee_config, base_price)?;
        if price.total > max_price_with_fee {
            return Err(DistributorError::PriceExceedsMax);
        }

        let excess = if request.asset == config.native_asset {
            if payment < price.total {
                return Err(DistributorError::InsufficientPayment);
            }
            custody::pull(&env, &config, &request.asset, &buyer, payment)?;
            payment - price.total
        } else {
            if payment != 0 {
                return Err(DistributorError::InvalidAmount);
            }
            custody::pull(&env, &config, &request.asset, &buyer, price.total)?;
            0
        };

        custody::grant_allowance(&env, &request.asset, &config.protocol, price.base_price);
        let position = protocol::settle(
            &env,
            symbol_short!("create"),
            protocol.try_create_cover(
                &config.membership,
                &request.target,
                &request.asset,
                &request.amount,
                &request.period,
                &request.cover_type,
                &quote,
            ),
            ProtocolError::on_purchase,
        )?;
        custody::revoke_allowance(&env, &request.asset, &config.protocol);

        let cover = Cover {
            id: storage::next_cover_id(&env),
            owner: buyer.clone(),
            target: request.target.clone(),
            asset: request.asset.clone(),
            sum_assured: request.amount,
            premium: price.base_price,
            premium_in_protocol_token: quote.price_in_protocol_token,
            period: request.period,
            cover_type: request.cover_type,
            expiry: position.expiry,
            protocol_cover_id: position.cover_id,
            active_claim: None,
        };
        registry::mint(&env, &cover);
        ledger::credit_fee(&env, &request.asset, price.fee);

        custody::refund(&env, &request.asset, &buyer, excess)?;
        ledger::ensure_covered(&env, &request.asset)?;

        events::cover_bought(
            &env,
            CoverBought {
                cover_id: cover.id,
                buyer,
                target: request.target,
                fee_percentage: fee_config.fee_percentage,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(cover.id)
    }

    /// Forward funds to the protocol to run an action on an owned cover
    ///
    /// Up to `sent` of the cover's asset is made available to the protocol;
    /// whatever it does not spend goes back to `owner`.
    ///
    /// # Returns
    /// * Amount spent by the protocol
    pub fn execute_cover_action(
        env: Env,
        owner: Address,
        cover_id: u64,
        action: u32,
        data: Bytes,
        sent: i128,
    ) -> Result<i128, DistributorError> {
        owner.require_auth();
        if sent <= 0 {
            return Err(DistributorError::InvalidAmount);
        }

        let config = storage::get_config(&env)?;
        let cover = registry::load_owned(&env, cover_id, &owner)?;
        let protocol = CoverProtocolClient::new(&env, &config.protocol);

        custody::pull(&env, &config, &cover.asset, &owner, sent)?;
        custody::grant_allowance(&env, &cover.asset, &config.protocol, sent);
        let spent = protocol::settle(
            &env,
            symbol_short!("action"),
            protocol.try_execute_cover_action(
                &config.membership,
                &cover.protocol_cover_id,
                &cover.asset,
                &sent,
                &action,
                &data,
            ),
            ProtocolError::on_passthrough,
        )?;
        custody::revoke_allowance(&env, &cover.asset, &config.protocol);

        if spent < 0 || spent > sent {
            log!(&env, "cover action reported impossible spend", spent, sent);
            return Err(DistributorError::UpstreamRejected);
        }

        custody::refund(&env, &cover.asset, &owner, sent - spent)?;
        ledger::ensure_covered(&env, &cover.asset)?;

        events::cover_action_executed(
            &env,
            CoverActionExecuted {
                cover_id,
                action,
                spent,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(spent)
    }

    // ───────────── CLAIMS ─────────────

    /// Open a claim on an owned cover
    ///
    /// # Arguments
    /// * `owner` - Current cover holder
    /// * `cover_id` - Cover to claim on
    /// * `data` - Supporting data passed through to the protocol
    ///
    /// # Returns
    /// * Claim ID assigned by the protocol
    pub fn submit_claim(
        env: Env,
        owner: Address,
        cover_id: u64,
        data: Bytes,
    ) -> Result<u64, DistributorError> {
        owner.require_auth();

        let config = storage::get_config(&env)?;
        let mut cover = registry::load_owned(&env, cover_id, &owner)?;

        if env.ledger().timestamp() > cover.expiry.saturating_add(config.claim_grace_period) {
            return Err(DistributorError::CoverExpired);
        }
        if cover.active_claim.is_some() {
            return Err(DistributorError::ClaimAlreadyInProgress);
        }

        let protocol = CoverProtocolClient::new(&env, &config.protocol);
        let claim_id = protocol::settle(
            &env,
            symbol_short!("claim"),
            protocol.try_open_claim(&config.membership, &cover.protocol_cover_id, &data),
            ProtocolError::on_claim,
        )?;

        storage::set_claim(
            &env,
            &ClaimRecord {
                claim_id,
                cover_id,
                submitter: owner.clone(),
                status: ClaimStatus::InProgress,
                amount_paid: 0,
                payout_asset: None,
            },
        );
        cover.active_claim = Some(claim_id);
        storage::set_cover(&env, &cover);

        events::claim_submitted(
            &env,
            ClaimSubmitted {
                cover_id,
                claim_id,
                submitter: owner,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(claim_id)
    }

    /// Pull the voting outcome of a claim from the protocol
    ///
    /// Anyone may call this. For an accepted claim the payout is collected
    /// from the protocol and the amount that actually arrives is reserved for
    /// the cover holder. A rejected claim frees the cover for a new submission.
    pub fn resolve_claim(env: Env, claim_id: u64) -> Result<ClaimStatus, DistributorError> {
        let config = storage::get_config(&env)?;
        let mut claim = storage::get_claim(&env, claim_id).ok_or(DistributorError::ClaimNotFound)?;
        if claim.status != ClaimStatus::InProgress {
            return Ok(claim.status);
        }

        let protocol = CoverProtocolClient::new(&env, &config.protocol);
        let outcome = protocol::settle(
            &env,
            symbol_short!("outcome"),
            protocol.try_get_claim_outcome(&claim_id),
            ProtocolError::on_claim,
        )?;

        match outcome.status {
            ClaimStatus::InProgress => return Ok(ClaimStatus::InProgress),
            ClaimStatus::Accepted => {
                if outcome.amount_paid < 0 {
                    return Err(DistributorError::UpstreamRejected);
                }
                // Only what arrives for this claim is reserved for it
                let contract = env.current_contract_address();
                let before = custody::balance(&env, &outcome.payout_asset, &contract);
                protocol::settle(
                    &env,
                    symbol_short!("payout"),
                    protocol.try_claim_payout(&config.membership, &claim_id),
                    ProtocolError::on_payout,
                )?;
                let received = custody::balance(&env, &outcome.payout_asset, &contract) - before;
                if received < outcome.amount_paid {
                    log!(&env, "claim payout short", claim_id, outcome.amount_paid, received);
                    return Err(DistributorError::PayoutNotReceived);
                }
                ledger::reserve_payout(&env, &outcome.payout_asset, received);
                claim.amount_paid = received;
                claim.payout_asset = Some(outcome.payout_asset);
            }
            ClaimStatus::Rejected => {
                if let Some(mut cover) = storage::get_cover(&env, claim.cover_id) {
                    if cover.active_claim == Some(claim_id) {
                        cover.active_claim = None;
                        storage::set_cover(&env, &cover);
                    }
                }
            }
        }

        claim.status = outcome.status;
        storage::set_claim(&env, &claim);

        events::claim_resolved(
            &env,
            ClaimResolved {
                cover_id: claim.cover_id,
                claim_id,
                status: claim.status,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(claim.status)
    }

    /// Collect the payout of an accepted claim and burn the cover
    ///
    /// Not idempotent: once the cover is burned any further attempt fails
    /// with `NonexistentCover`.
    ///
    /// # Returns
    /// * Amount paid out
    pub fn redeem_claim(
        env: Env,
        owner: Address,
        cover_id: u64,
        claim_id: u64,
    ) -> Result<i128, DistributorError> {
        owner.require_auth();

        let cover = registry::load_owned(&env, cover_id, &owner)?;
        let claim = storage::get_claim(&env, claim_id)
            .filter(|claim| claim.cover_id == cover_id)
            .ok_or(DistributorError::ClaimNotFound)?;
        if claim.status != ClaimStatus::Accepted {
            return Err(DistributorError::ClaimNotAccepted);
        }
        let asset = claim.payout_asset.ok_or(DistributorError::ClaimNotAccepted)?;

        ledger::release_payout(&env, &asset, claim.amount_paid)?;
        registry::burn(&env, &cover);
        custody::pay(&env, &asset, &owner, claim.amount_paid);

        events::claim_redeemed(
            &env,
            ClaimRedeemed {
                cover_id,
                claim_id,
                receiver: owner,
                amount: claim.amount_paid,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(claim.amount_paid)
    }

    // ───────────── COVER TOKENS ─────────────

    pub fn transfer(env: Env, from: Address, to: Address, cover_id: u64) -> Result<(), DistributorError> {
        from.require_auth();
        let cover = registry::load_owned(&env, cover_id, &from)?;
        registry::reassign(&env, cover, &to);
        Ok(())
    }

    /// Let `spender` move one cover on the owner's behalf
    pub fn approve(env: Env, owner: Address, spender: Address, cover_id: u64) -> Result<(), DistributorError> {
        owner.require_auth();
        registry::load_owned(&env, cover_id, &owner)?;
        storage::set_approved(&env, cover_id, &spender);
        Ok(())
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        cover_id: u64,
    ) -> Result<(), DistributorError> {
        spender.require_auth();
        let cover = registry::load_owned(&env, cover_id, &from)?;
        if spender != from && storage::get_approved(&env, cover_id) != Some(spender) {
            return Err(DistributorError::Unauthorized);
        }
        registry::reassign(&env, cover, &to);
        Ok(())
    }

    pub fn owner_of(env: Env, cover_id: u64) -> Result<Address, DistributorError> {
        Ok(registry::load(&env, cover_id)?.owner)
    }

    pub fn get_approved(env: Env, cover_id: u64) -> Option<Address> {
        storage::get_approved(&env, cover_id)
    }

    pub fn balance_of(env: Env, holder: Address) -> u64 {
        storage::get_balance(&env, &holder)
    }

    pub fn total_supply(env: Env) -> u64 {
        storage::get_total_supply(&env)
    }

    pub fn name(env: Env) -> Result<String, DistributorError> {
        Ok(storage::get_metadata(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, DistributorError> {
        Ok(storage::get_metadata(&env)?.symbol)
    }

    // ───────────── OWNER CONTROLS ─────────────

    /// Withdraw accumulated fee revenue (owner only)
    ///
    /// Only fee revenue is withdrawable; reserved claim payouts held in the
    /// same asset are never touched.
    pub fn withdraw_fee(
        env: Env,
        owner: Address,
        asset: Address,
        amount: i128,
        recipient: Address,
    ) -> Result<(), DistributorError> {
        Self::require_owner(&env, &owner)?;
        if amount <= 0 {
            return Err(DistributorError::InvalidAmount);
        }

        ledger::debit_fee(&env, &asset, amount)?;
        ledger::ensure_releasable(&env, &asset, amount)?;
        custody::pay(&env, &asset, &recipient, amount);

        events::fee_withdrawn(
            &env,
            FeeWithdrawn {
                asset,
                amount,
                recipient,
            },
        );
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    /// Update the markup applied to purchases made from now on (owner only)
    pub fn set_fee_percentage(env: Env, owner: Address, fee_percentage: u32) -> Result<(), DistributorError> {
        Self::require_owner(&env, &owner)?;
        fees::validate_fee_percentage(fee_percentage)?;

        let mut fee_config = storage::get_fee_config(&env)?;
        fee_config.fee_percentage = fee_percentage;
        storage::set_fee_config(&env, &fee_config);
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    /// Open or close purchases (owner only)
    pub fn set_purchases_allowed(env: Env, owner: Address, allowed: bool) -> Result<(), DistributorError> {
        Self::require_owner(&env, &owner)?;

        let mut fee_config = storage::get_fee_config(&env)?;
        fee_config.purchases_allowed = allowed;
        storage::set_fee_config(&env, &fee_config);
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    /// Approve `spender` to move the distributor's reward tokens (owner only)
    pub fn approve_reward_token(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), DistributorError> {
        let config = Self::require_owner(&env, &owner)?;
        token::Client::new(&env, &config.reward_token).approve(
            &env.current_contract_address(),
            &spender,
            &amount,
            &expiration_ledger,
        );
        Ok(())
    }

    /// Sell reward tokens through the protocol (owner only)
    ///
    /// The realized return is what actually arrives in custody, not what the
    /// protocol reports. Proceeds go straight to the treasury.
    ///
    /// # Returns
    /// * Proceeds sent to the treasury
    pub fn sell_reward_token(
        env: Env,
        owner: Address,
        amount: i128,
        min_return: i128,
    ) -> Result<i128, DistributorError> {
        let config = Self::require_owner(&env, &owner)?;
        if amount <= 0 {
            return Err(DistributorError::InvalidAmount);
        }

        let contract = env.current_contract_address();
        let before = custody::balance(&env, &config.native_asset, &contract);

        let protocol = CoverProtocolClient::new(&env, &config.protocol);
        custody::grant_allowance(&env, &config.reward_token, &config.protocol, amount);
        let reported = protocol::settle(
            &env,
            symbol_short!("sell"),
            protocol.try_sell_reward_token(&config.membership, &amount),
            ProtocolError::on_passthrough,
        )?;
        custody::revoke_allowance(&env, &config.reward_token, &config.protocol);

        let realized = custody::balance(&env, &config.native_asset, &contract) - before;
        if realized < min_return {
            log!(&env, "reward token sale below minimum", reported, realized, min_return);
            return Err(DistributorError::SlippageExceeded);
        }

        if realized > 0 {
            custody::pay(&env, &config.native_asset, &config.treasury, realized);
        }
        storage::extend_instance_ttl(&env);
        Ok(realized)
    }

    /// Move the distributor's protocol membership to `new_identity` (owner only)
    ///
    /// The old identity's reward token balance must land at the new identity
    /// within the same call.
    pub fn switch_membership(env: Env, owner: Address, new_identity: Address) -> Result<(), DistributorError> {
        let mut config = Self::require_owner(&env, &owner)?;
        let old_identity = config.membership.clone();
        if old_identity == new_identity {
            return Ok(());
        }

        let reward = token::Client::new(&env, &config.reward_token);
        let carried = reward.balance(&old_identity);
        let new_before = reward.balance(&new_identity);

        let holds_rewards = old_identity == env.current_contract_address() && carried > 0;
        if holds_rewards {
            custody::grant_allowance(&env, &config.reward_token, &config.protocol, carried);
        }

        let protocol = CoverProtocolClient::new(&env, &config.protocol);
        protocol::settle(
            &env,
            symbol_short!("switch"),
            protocol.try_switch_identity(&old_identity, &new_identity),
            ProtocolError::on_passthrough,
        )?;

        if holds_rewards {
            custody::revoke_allowance(&env, &config.reward_token, &config.protocol);
        }

        let left_behind = reward.balance(&old_identity);
        let arrived = reward.balance(&new_identity) - new_before;
        if left_behind != 0 || arrived != carried {
            log!(&env, "membership switch left balances behind", left_behind, arrived, carried);
            return Err(DistributorError::IncompleteSwitch);
        }

        config.membership = new_identity;
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    /// Change where reward token sales are paid (owner only)
    pub fn set_treasury(env: Env, owner: Address, treasury: Address) -> Result<(), DistributorError> {
        let mut config = Self::require_owner(&env, &owner)?;
        config.treasury = treasury;
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    pub fn transfer_ownership(env: Env, owner: Address, new_owner: Address) -> Result<(), DistributorError> {
        let mut config = Self::require_owner(&env, &owner)?;
        config.owner = new_owner;
        storage::set_config(&env, &config);
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    // ───────────── VIEW FUNCTIONS ─────────────

    pub fn withdrawable_fee(env: Env, asset: Address) -> i128 {
        storage::get_withdrawable_fee(&env, &asset)
    }

    /// Accepted payouts held for cover holders that have not redeemed yet
    pub fn payout_reserve(env: Env, asset: Address) -> i128 {
        storage::get_payout_reserve(&env, &asset)
    }

    pub fn get_cover(env: Env, cover_id: u64) -> Result<Cover, DistributorError> {
        registry::load(&env, cover_id)
    }

    pub fn get_claim(env: Env, claim_id: u64) -> Option<ClaimRecord> {
        storage::get_claim(&env, claim_id)
    }

    /// Total a buyer would pay today for a quote with the given base price
    pub fn price_with_fee(env: Env, base_price: i128) -> Result<i128, DistributorError> {
        let fee_config = storage::get_fee_config(&env)?;
        Ok(fees::price_with_fee(&fee_config, base_price)?.total)
    }

    pub fn fee_config(env: Env) -> Result<FeeConfig, DistributorError> {
        storage::get_fee_config(&env)
    }

    pub fn config(env: Env) -> Result<DistributorConfig, DistributorError> {
        storage::get_config(&env)
    }

    // ───────────── INTERNAL HELPERS ─────────────

    fn require_owner(env: &Env, owner: &Address) -> Result<DistributorConfig, DistributorError> {
        owner.require_auth();
        let config = storage::get_config(env)?;
        if config.owner != *owner {
            return Err(DistributorError::Unauthorized);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod testutils;
