use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DistributorError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    // Configuration
    BuysDisabled = 3,
    UnsupportedAsset = 4,
    InvalidFeePercentage = 5,
    InvalidAmountGranularity = 6,
    // Authorization
    Unauthorized = 7,
    NotCoverOwner = 8,
    // Funds
    InvalidAmount = 9,
    InsufficientPayment = 10,
    PriceExceedsMax = 11,
    InsufficientFeeBalance = 12,
    InsufficientCustody = 13,
    RefundFailed = 14,
    SlippageExceeded = 15,
    // State conflicts
    NonexistentCover = 16,
    CoverExpired = 17,
    ClaimAlreadyInProgress = 18,
    ClaimNotAccepted = 19,
    ClaimNotFound = 20,
    PayoutNotReceived = 21,
    IncompleteSwitch = 22,
    // Upstream
    QuoteInvalid = 23,
    UpstreamRejected = 24,
}

/// Coarse grouping of [`DistributorError`] codes for callers that only care
/// about the class of failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Configuration,
    Authorization,
    Funds,
    StateConflict,
    UpstreamRejection,
}

impl DistributorError {
    pub fn kind(&self) -> ErrorKind {
        use DistributorError::*;
        match self {
            NotInitialized | AlreadyInitialized | BuysDisabled | UnsupportedAsset
            | InvalidFeePercentage | InvalidAmountGranularity => ErrorKind::Configuration,
            Unauthorized | NotCoverOwner => ErrorKind::Authorization,
            InvalidAmount | InsufficientPayment | PriceExceedsMax | InsufficientFeeBalance
            | InsufficientCustody | RefundFailed | SlippageExceeded => ErrorKind::Funds,
            NonexistentCover | CoverExpired | ClaimAlreadyInProgress | ClaimNotAccepted
            | ClaimNotFound | PayoutNotReceived | IncompleteSwitch => ErrorKind::StateConflict,
            QuoteInvalid | UpstreamRejected => ErrorKind::UpstreamRejection,
        }
    }
}

/// Rejection codes the cover protocol returns. Codes are part of the
/// protocol's interface and are logged verbatim before being folded into a
/// [`DistributorError`].
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ProtocolError {
    NotMember = 1,
    UnsupportedAsset = 2,
    InvalidQuote = 3,
    QuoteExpired = 4,
    QuoteAlreadyUsed = 5,
    CoverNotFound = 6,
    CoverExpired = 7,
    ClaimAlreadyOpen = 8,
    ClaimNotFound = 9,
    UnknownAction = 10,
    InsufficientFunds = 11,
    PayoutUnavailable = 12,
}

impl ProtocolError {
    /// Category used when a quote or cover purchase is refused.
    pub fn on_purchase(reason: Option<ProtocolError>) -> DistributorError {
        match reason {
            Some(ProtocolError::UnsupportedAsset) => DistributorError::UnsupportedAsset,
            _ => DistributorError::QuoteInvalid,
        }
    }

    /// Category used when a claim operation is refused.
    pub fn on_claim(reason: Option<ProtocolError>) -> DistributorError {
        match reason {
            Some(ProtocolError::CoverExpired) => DistributorError::CoverExpired,
            Some(ProtocolError::ClaimAlreadyOpen) => DistributorError::ClaimAlreadyInProgress,
            Some(ProtocolError::ClaimNotFound) => DistributorError::ClaimNotFound,
            _ => DistributorError::UpstreamRejected,
        }
    }

    /// Category used when an accepted claim's payout cannot be collected.
    pub fn on_payout(_reason: Option<ProtocolError>) -> DistributorError {
        DistributorError::PayoutNotReceived
    }

    /// Category for everything else the distributor forwards.
    pub fn on_passthrough(reason: Option<ProtocolError>) -> DistributorError {
        match reason {
            Some(ProtocolError::InsufficientFunds) => DistributorError::InsufficientPayment,
            _ => DistributorError::UpstreamRejected,
        }
    }
}
