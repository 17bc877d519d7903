#![cfg(test)]
extern crate std;

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::xdr::{FromXdr, ToXdr};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype,
    testutils::{Address as _, Ledger},
    token::{self, StellarAssetClient},
    Address, Bytes, BytesN, Env, String,
};

use crate::errors::ProtocolError;
use crate::types::{ClaimOutcome, ClaimStatus, CoverPosition, CoverQuote, CoverRequest};
use crate::{Distributor, DistributorClient};

pub const UNIT: i128 = 10_000_000;
pub const DEFAULT_FEE_PERCENTAGE: u32 = 500;
pub const COVER_PERIOD_DAYS: u32 = 120;
pub const COVER_TYPE: u32 = 0;
pub const PRICE_IN_PROTOCOL_TOKEN: i128 = 744_892_736_679_184;
pub const QUOTE_TTL: u64 = 3_600;
pub const START_TIME: u64 = 1_700_000_000;
pub const ACTION_TOP_UP: u32 = 0;

const SECONDS_PER_DAY: u64 = 86_400;

//
// ──────────────────────────────────────────────────────────
// MOCK COVER PROTOCOL
// ──────────────────────────────────────────────────────────
//

#[contracttype]
#[derive(Clone)]
enum MockKey {
    Signer,
    NativeAsset,
    RewardToken,
    SaleRateBps,
    SaleSkim,
    SwitchShortfall,
    Member(Address),
    Asset(Address),
    UsedQuote(BytesN<64>),
    CoverCount,
    Cover(u64),
    ClaimCount,
    Claim(u64),
    OpenClaim(u64),
}

#[contracttype]
#[derive(Clone)]
struct MockCover {
    member: Address,
    asset: Address,
    expiry: u64,
}

#[contracttype]
#[derive(Clone)]
struct MockClaim {
    cover_id: u64,
    outcome: ClaimOutcome,
    funded: bool,
    paid: bool,
}

/// What the quote engine signs.
#[contracttype]
#[derive(Clone)]
pub struct QuotePayload {
    pub protocol: Address,
    pub target: Address,
    pub asset: Address,
    pub amount: i128,
    pub period: u32,
    pub cover_type: u32,
    pub price: i128,
    pub price_in_protocol_token: i128,
    pub expires_at: u64,
    pub generated_at: u64,
}

#[contract]
pub struct MockCoverProtocol;

#[contractimpl]
impl MockCoverProtocol {
    // ───────────── TEST CONTROLS ─────────────

    pub fn init(
        env: Env,
        quote_signer: BytesN<32>,
        native_asset: Address,
        reward_token: Address,
        sale_rate_bps: u32,
    ) {
        let storage = env.storage().instance();
        storage.set(&MockKey::Signer, &quote_signer);
        storage.set(&MockKey::NativeAsset, &native_asset);
        storage.set(&MockKey::RewardToken, &reward_token);
        storage.set(&MockKey::SaleRateBps, &sale_rate_bps);
    }

    pub fn add_member(env: Env, member: Address) {
        env.storage().instance().set(&MockKey::Member(member), &true);
    }

    pub fn add_asset(env: Env, asset: Address) {
        env.storage().instance().set(&MockKey::Asset(asset), &true);
    }

    /// Withhold `skim` from every reward sale while still reporting the full price.
    pub fn set_sale_skim(env: Env, skim: i128) {
        env.storage().instance().set(&MockKey::SaleSkim, &skim);
    }

    /// Leave `shortfall` reward tokens behind on the next identity switch.
    pub fn set_switch_shortfall(env: Env, shortfall: i128) {
        env.storage().instance().set(&MockKey::SwitchShortfall, &shortfall);
    }

    /// Record a vote result. An accepted claim can only be paid out once `funded` is set.
    pub fn set_claim_outcome(env: Env, claim_id: u64, status: ClaimStatus, amount_paid: i128, funded: bool) {
        let mut claim: MockClaim = env
            .storage()
            .instance()
            .get(&MockKey::Claim(claim_id))
            .expect("unknown claim");

        if status != ClaimStatus::InProgress {
            env.storage().instance().remove(&MockKey::OpenClaim(claim.cover_id));
        }

        claim.outcome.status = status;
        claim.outcome.amount_paid = amount_paid;
        claim.funded = funded;
        env.storage().instance().set(&MockKey::Claim(claim_id), &claim);
    }

    // ───────────── PROTOCOL SURFACE ─────────────

    pub fn is_supported_asset(env: Env, asset: Address) -> bool {
        env.storage().instance().has(&MockKey::Asset(asset))
    }

    pub fn quote_price(
        env: Env,
        member: Address,
        target: Address,
        asset: Address,
        amount: i128,
        period: u32,
        cover_type: u32,
        quote: CoverQuote,
    ) -> Result<i128, ProtocolError> {
        Self::check_member(&env, &member)?;
        Self::check_quote(&env, &target, &asset, amount, period, cover_type, &quote)?;
        Ok(quote.price)
    }

    pub fn create_cover(
        env: Env,
        member: Address,
        target: Address,
        asset: Address,
        amount: i128,
        period: u32,
        cover_type: u32,
        quote: CoverQuote,
    ) -> Result<CoverPosition, ProtocolError> {
        member.require_auth();
        Self::check_member(&env, &member)?;
        Self::check_quote(&env, &target, &asset, amount, period, cover_type, &quote)?;

        let storage = env.storage().instance();
        storage.set(&MockKey::UsedQuote(quote.signature.clone()), &true);

        let protocol = env.current_contract_address();
        token::Client::new(&env, &asset).transfer_from(&protocol, &member, &protocol, &quote.price);

        let cover_id: u64 = storage.get(&MockKey::CoverCount).unwrap_or(0) + 1;
        storage.set(&MockKey::CoverCount, &cover_id);

        let expiry = env.ledger().timestamp() + period as u64 * SECONDS_PER_DAY;
        storage.set(
            &MockKey::Cover(cover_id),
            &MockCover {
                member,
                asset,
                expiry,
            },
        );
        Ok(CoverPosition { cover_id, expiry })
    }

    pub fn open_claim(env: Env, member: Address, cover_id: u64, data: Bytes) -> Result<u64, ProtocolError> {
        member.require_auth();
        Self::check_member(&env, &member)?;
        let cover = Self::owned_cover(&env, &member, cover_id)?;
        let _ = data;

        let storage = env.storage().instance();
        if storage.has(&MockKey::OpenClaim(cover_id)) {
            return Err(ProtocolError::ClaimAlreadyOpen);
        }

        let claim_id: u64 = storage.get(&MockKey::ClaimCount).unwrap_or(0) + 1;
        storage.set(&MockKey::ClaimCount, &claim_id);
        storage.set(
            &MockKey::Claim(claim_id),
            &MockClaim {
                cover_id,
                outcome: ClaimOutcome {
                    status: ClaimStatus::InProgress,
                    amount_paid: 0,
                    payout_asset: cover.asset,
                },
                funded: false,
                paid: false,
            },
        );
        storage.set(&MockKey::OpenClaim(cover_id), &claim_id);
        Ok(claim_id)
    }

    pub fn get_claim_outcome(env: Env, claim_id: u64) -> Result<ClaimOutcome, ProtocolError> {
        let claim: MockClaim = env
            .storage()
            .instance()
            .get(&MockKey::Claim(claim_id))
            .ok_or(ProtocolError::ClaimNotFound)?;
        Ok(claim.outcome)
    }

    pub fn claim_payout(env: Env, member: Address, claim_id: u64) -> Result<i128, ProtocolError> {
        member.require_auth();
        Self::check_member(&env, &member)?;

        let storage = env.storage().instance();
        let mut claim: MockClaim = storage
            .get(&MockKey::Claim(claim_id))
            .ok_or(ProtocolError::ClaimNotFound)?;
        let cover = Self::owned_cover(&env, &member, claim.cover_id)?;
        if claim.outcome.status != ClaimStatus::Accepted || !claim.funded || claim.paid {
            return Err(ProtocolError::PayoutUnavailable);
        }

        token::Client::new(&env, &cover.asset).transfer(
            &env.current_contract_address(),
            &member,
            &claim.outcome.amount_paid,
        );
        claim.paid = true;
        storage.set(&MockKey::Claim(claim_id), &claim);
        Ok(claim.outcome.amount_paid)
    }

    /// Only top-ups are understood: `data` carries the XDR of the i128 to spend.
    pub fn execute_cover_action(
        env: Env,
        member: Address,
        cover_id: u64,
        asset: Address,
        max_amount: i128,
        action: u32,
        data: Bytes,
    ) -> Result<i128, ProtocolError> {
        member.require_auth();
        Self::check_member(&env, &member)?;
        Self::owned_cover(&env, &member, cover_id)?;

        if action != ACTION_TOP_UP {
            return Err(ProtocolError::UnknownAction);
        }
        let requested = i128::from_xdr(&env, &data).map_err(|_| ProtocolError::UnknownAction)?;
        if requested < 0 {
            return Err(ProtocolError::UnknownAction);
        }
        if requested > max_amount {
            return Err(ProtocolError::InsufficientFunds);
        }

        if requested > 0 {
            let protocol = env.current_contract_address();
            token::Client::new(&env, &asset).transfer_from(&protocol, &member, &protocol, &requested);
        }
        Ok(requested)
    }

    pub fn sell_reward_token(env: Env, member: Address, amount: i128) -> Result<i128, ProtocolError> {
        member.require_auth();
        Self::check_member(&env, &member)?;

        let storage = env.storage().instance();
        let reward: Address = storage.get(&MockKey::RewardToken).expect("not initialized");
        let native: Address = storage.get(&MockKey::NativeAsset).expect("not initialized");
        let rate: u32 = storage.get(&MockKey::SaleRateBps).unwrap_or(10_000);
        let skim: i128 = storage.get(&MockKey::SaleSkim).unwrap_or(0);

        let protocol = env.current_contract_address();
        token::Client::new(&env, &reward).transfer_from(&protocol, &member, &protocol, &amount);

        let reported = amount * rate as i128 / 10_000;
        let paid = reported - skim;
        if paid > 0 {
            token::Client::new(&env, &native).transfer(&protocol, &member, &paid);
        }
        Ok(reported)
    }

    pub fn switch_identity(env: Env, old: Address, new: Address) -> Result<(), ProtocolError> {
        old.require_auth();
        Self::check_member(&env, &old)?;

        let storage = env.storage().instance();
        let reward: Address = storage.get(&MockKey::RewardToken).expect("not initialized");
        let shortfall: i128 = storage.get(&MockKey::SwitchShortfall).unwrap_or(0);

        let reward_client = token::Client::new(&env, &reward);
        let moved = reward_client.balance(&old) - shortfall;
        if moved > 0 {
            reward_client.transfer_from(&env.current_contract_address(), &old, &new, &moved);
        }

        storage.remove(&MockKey::Member(old));
        storage.set(&MockKey::Member(new), &true);
        Ok(())
    }

    // ───────────── INTERNAL HELPERS ─────────────

    fn check_member(env: &Env, member: &Address) -> Result<(), ProtocolError> {
        if !env.storage().instance().has(&MockKey::Member(member.clone())) {
            return Err(ProtocolError::NotMember);
        }
        Ok(())
    }

    fn owned_cover(env: &Env, member: &Address, cover_id: u64) -> Result<MockCover, ProtocolError> {
        let cover: MockCover = env
            .storage()
            .instance()
            .get(&MockKey::Cover(cover_id))
            .ok_or(ProtocolError::CoverNotFound)?;
        if cover.member != *member {
            return Err(ProtocolError::CoverNotFound);
        }
        Ok(cover)
    }

    fn check_quote(
        env: &Env,
        target: &Address,
        asset: &Address,
        amount: i128,
        period: u32,
        cover_type: u32,
        quote: &CoverQuote,
    ) -> Result<(), ProtocolError> {
        let storage = env.storage().instance();
        if !storage.has(&MockKey::Asset(asset.clone())) {
            return Err(ProtocolError::UnsupportedAsset);
        }
        if env.ledger().timestamp() > quote.expires_at {
            return Err(ProtocolError::QuoteExpired);
        }
        if storage.has(&MockKey::UsedQuote(quote.signature.clone())) {
            return Err(ProtocolError::QuoteAlreadyUsed);
        }

        let payload = QuotePayload {
            protocol: env.current_contract_address(),
            target: target.clone(),
            asset: asset.clone(),
            amount,
            period,
            cover_type,
            price: quote.price,
            price_in_protocol_token: quote.price_in_protocol_token,
            expires_at: quote.expires_at,
            generated_at: quote.generated_at,
        }
        .to_xdr(env);

        let signer: BytesN<32> = storage.get(&MockKey::Signer).ok_or(ProtocolError::InvalidQuote)?;
        env.crypto().ed25519_verify(&signer, &payload, &quote.signature);
        Ok(())
    }
}

//
// ──────────────────────────────────────────────────────────
// REJECTING TOKEN
// ──────────────────────────────────────────────────────────
//

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    InsufficientBalance = 1,
    InsufficientAllowance = 2,
    Rejected = 3,
}

#[contracttype]
#[derive(Clone)]
enum TokenKey {
    Balance(Address),
    Allowance(Address, Address),
    Rejects(Address),
}

/// SEP-41 token whose holders can refuse incoming transfers.
#[contract]
pub struct RejectingToken;

#[contractimpl]
impl RejectingToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let balance = Self::balance(env.clone(), to.clone());
        env.storage().instance().set(&TokenKey::Balance(to), &(balance + amount));
    }

    pub fn reject_incoming(env: Env, account: Address) {
        env.storage().instance().set(&TokenKey::Rejects(account), &true);
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage().instance().get(&TokenKey::Balance(id)).unwrap_or(0)
    }

    pub fn decimals(_env: Env) -> u32 {
        7
    }

    pub fn name(env: Env) -> String {
        String::from_str(&env, "Rejecting")
    }

    pub fn symbol(env: Env) -> String {
        String::from_str(&env, "REJ")
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        env.storage()
            .instance()
            .get(&TokenKey::Allowance(from, spender))
            .unwrap_or(0)
    }

    pub fn approve(env: Env, from: Address, spender: Address, amount: i128, _expiration_ledger: u32) {
        from.require_auth();
        env.storage()
            .instance()
            .set(&TokenKey::Allowance(from, spender), &amount);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();
        Self::move_balance(&env, &from, &to, amount)
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        spender.require_auth();
        let allowance = Self::allowance(env.clone(), from.clone(), spender.clone());
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance);
        }
        env.storage()
            .instance()
            .set(&TokenKey::Allowance(from.clone(), spender), &(allowance - amount));
        Self::move_balance(&env, &from, &to, amount)
    }

    fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), TokenError> {
        let storage = env.storage().instance();
        if storage.has(&TokenKey::Rejects(to.clone())) {
            return Err(TokenError::Rejected);
        }
        let from_balance: i128 = storage.get(&TokenKey::Balance(from.clone())).unwrap_or(0);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }
        storage.set(&TokenKey::Balance(from.clone()), &(from_balance - amount));
        let to_balance: i128 = storage.get(&TokenKey::Balance(to.clone())).unwrap_or(0);
        storage.set(&TokenKey::Balance(to.clone()), &(to_balance + amount));
        Ok(())
    }
}

//
// ──────────────────────────────────────────────────────────
// FIXTURE
// ──────────────────────────────────────────────────────────
//

pub struct Setup<'a> {
    pub env: Env,
    pub owner: Address,
    pub treasury: Address,
    pub buyer: Address,
    pub target: Address,
    pub signer: SigningKey,
    pub distributor: DistributorClient<'a>,
    pub protocol: MockCoverProtocolClient<'a>,
    pub native: Address,
    pub dai: Address,
    pub reward: Address,
}

impl<'a> Setup<'a> {
    /// Distributor wired to a mock protocol, with Stellar asset contracts for
    /// the native asset, a stablecoin and the reward token.
    pub fn new(env: &Env) -> Self {
        let native = env
            .register_stellar_asset_contract_v2(Address::generate(env))
            .address();
        Self::with_native_asset(env, native)
    }

    pub fn with_native_asset(env: &Env, native: Address) -> Self {
        env.ledger().set_timestamp(START_TIME);

        let owner = Address::generate(env);
        let treasury = Address::generate(env);
        let buyer = Address::generate(env);
        let target = Address::generate(env);
        let signer = SigningKey::from_bytes(&[7u8; 32]);

        let dai = env
            .register_stellar_asset_contract_v2(Address::generate(env))
            .address();
        let reward = env
            .register_stellar_asset_contract_v2(Address::generate(env))
            .address();

        let distributor_id = env.register_contract(None, Distributor);
        let distributor = DistributorClient::new(env, &distributor_id);

        let protocol_id = env.register_contract(None, MockCoverProtocol);
        let protocol = MockCoverProtocolClient::new(env, &protocol_id);
        protocol.init(
            &BytesN::from_array(env, &signer.verifying_key().to_bytes()),
            &native,
            &reward,
            &10_000,
        );
        protocol.add_asset(&native);
        protocol.add_asset(&dai);
        protocol.add_member(&distributor_id);

        distributor.initialize(
            &owner,
            &protocol_id,
            &native,
            &reward,
            &treasury,
            &DEFAULT_FEE_PERCENTAGE,
            &String::from_str(env, "Cover Distributor"),
            &String::from_str(env, "DCVR"),
        );

        Setup {
            env: env.clone(),
            owner,
            treasury,
            buyer,
            target,
            signer,
            distributor,
            protocol,
            native,
            dai,
            reward,
        }
    }

    pub fn mint(&self, asset: &Address, to: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, asset).mint(to, &amount);
    }

    pub fn balance(&self, asset: &Address, holder: &Address) -> i128 {
        token::Client::new(&self.env, asset).balance(holder)
    }

    pub fn request(&self, asset: &Address, amount: i128) -> CoverRequest {
        CoverRequest {
            target: self.target.clone(),
            asset: asset.clone(),
            amount,
            period: COVER_PERIOD_DAYS,
            cover_type: COVER_TYPE,
        }
    }

    /// Quote signed by the protocol's quote engine, valid for `QUOTE_TTL`.
    pub fn quote(&self, request: &CoverRequest, price: i128, generated_at: u64) -> CoverQuote {
        self.quote_signed_by(&self.signer, request, price, generated_at)
    }

    pub fn quote_signed_by(
        &self,
        signer: &SigningKey,
        request: &CoverRequest,
        price: i128,
        generated_at: u64,
    ) -> CoverQuote {
        let expires_at = generated_at + QUOTE_TTL;
        let payload = QuotePayload {
            protocol: self.protocol.address.clone(),
            target: request.target.clone(),
            asset: request.asset.clone(),
            amount: request.amount,
            period: request.period,
            cover_type: request.cover_type,
            price,
            price_in_protocol_token: PRICE_IN_PROTOCOL_TOKEN,
            expires_at,
            generated_at,
        }
        .to_xdr(&self.env);

        let mut message = std::vec![0u8; payload.len() as usize];
        payload.copy_into_slice(&mut message);
        let signature = signer.sign(&message);

        CoverQuote {
            price,
            price_in_protocol_token: PRICE_IN_PROTOCOL_TOKEN,
            expires_at,
            generated_at,
            signature: BytesN::from_array(&self.env, &signature.to_bytes()),
        }
    }

    /// Funds `buyer` with exactly the marked-up price and buys cover for it.
    pub fn buy(&self, buyer: &Address, asset: &Address, base_price: i128) -> u64 {
        let request = self.request(asset, 1_000 * UNIT);
        let quote = self.quote(&request, base_price, self.env.ledger().timestamp());
        let total = self.distributor.price_with_fee(&base_price);
        self.mint(asset, buyer, total);

        if *asset == self.native {
            self.distributor
                .buy_cover(buyer, &request, &total, &quote, &total)
        } else {
            self.approve_distributor(asset, buyer, total);
            self.distributor.buy_cover(buyer, &request, &total, &quote, &0)
        }
    }

    pub fn approve_distributor(&self, asset: &Address, from: &Address, amount: i128) {
        token::Client::new(&self.env, asset).approve(
            from,
            &self.distributor.address,
            &amount,
            &(self.env.ledger().sequence() + 100),
        );
    }

    /// Opens a claim on `cover_id` for the buyer and returns its id.
    pub fn open_claim(&self, cover_id: u64) -> u64 {
        self.distributor
            .submit_claim(&self.buyer, &cover_id, &Bytes::new(&self.env))
    }

    /// Accepts a funded claim upstream and resolves it locally, which collects the payout.
    pub fn accept_claim(&self, claim_id: u64, asset: &Address, amount: i128) {
        self.mint(asset, &self.protocol.address, amount);
        self.protocol
            .set_claim_outcome(&claim_id, &ClaimStatus::Accepted, &amount, &true);
        self.distributor.resolve_claim(&claim_id);
    }

    pub fn top_up_data(&self, amount: i128) -> Bytes {
        amount.to_xdr(&self.env)
    }
}
