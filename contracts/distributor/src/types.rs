use soroban_sdk::{contracttype, Address, BytesN, String};

//
// ──────────────────────────────────────────────────────────
// DATA KEYS
// ──────────────────────────────────────────────────────────
//

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,                    // DistributorConfig
    FeeConfig,                 // FeeConfig
    Metadata,                  // TokenMetadata
    CoverCounter,              // u64, last assigned cover id
    TotalSupply,               // u64, live cover tokens
    Cover(u64),                // Cover, removed when burned
    Approved(u64),             // Address allowed to move a cover
    Balance(Address),          // u64 covers held
    Claim(u64),                // ClaimRecord by protocol claim id
    WithdrawableFee(Address),  // i128 per asset
    PayoutReserve(Address),    // i128 per asset
}

//
// ──────────────────────────────────────────────────────────
// ENUMS
// ──────────────────────────────────────────────────────────
//

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClaimStatus {
    InProgress = 1,
    Accepted = 2,
    Rejected = 3,
}

//
// ──────────────────────────────────────────────────────────
// STRUCTS
// ──────────────────────────────────────────────────────────
//

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributorConfig {
    pub owner: Address,
    pub treasury: Address,             // Receives reward token sale proceeds
    pub protocol: Address,             // Underlying cover protocol
    pub native_asset: Address,         // Asset paid as attached value, refunded on overpayment
    pub reward_token: Address,         // Protocol token earned by the distributor
    pub membership: Address,           // Identity the protocol knows this distributor by
    pub claim_grace_period: u64,       // Seconds after expiry a claim may still be opened
}

/// Markup settings read by every purchase.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeConfig {
    pub fee_percentage: u32,           // Basis points (500 = 5%)
    pub purchases_allowed: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
}

/// What the buyer asks the protocol to insure.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverRequest {
    pub target: Address,               // Insured contract
    pub asset: Address,                // Cover currency
    pub amount: i128,                  // Sum assured, whole units only
    pub period: u32,                   // Days
    pub cover_type: u32,
}

/// Signed price quote issued off-chain by the protocol's quote engine.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverQuote {
    pub price: i128,
    pub price_in_protocol_token: i128,
    pub expires_at: u64,
    pub generated_at: u64,
    pub signature: BytesN<64>,
}

/// A purchased cover. Its presence in storage is the cover token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cover {
    pub id: u64,
    pub owner: Address,
    pub target: Address,
    pub asset: Address,
    pub sum_assured: i128,
    pub premium: i128,
    pub premium_in_protocol_token: i128,
    pub period: u32,
    pub cover_type: u32,
    pub expiry: u64,
    pub protocol_cover_id: u64,
    pub active_claim: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRecord {
    pub claim_id: u64,
    pub cover_id: u64,
    pub submitter: Address,
    pub status: ClaimStatus,
    pub amount_paid: i128,
    pub payout_asset: Option<Address>,
}

/// Returned by the protocol when it accepts a cover purchase.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverPosition {
    pub cover_id: u64,
    pub expiry: u64,
}

/// Voting outcome of a claim as reported by the protocol.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimOutcome {
    pub status: ClaimStatus,
    pub amount_paid: i128,
    pub payout_asset: Address,
}
