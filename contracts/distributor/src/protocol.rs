use soroban_sdk::{contractclient, log, Address, Bytes, Env, InvokeError, Symbol};

use crate::errors::{DistributorError, ProtocolError};
use crate::types::{ClaimOutcome, CoverPosition, CoverQuote};

/// Interface of the underlying cover protocol.
///
/// `member` is the identity the protocol knows the caller by. Funds owed to
/// the protocol are pulled with `transfer_from` against an allowance the
/// caller grants right before the call.
#[contractclient(name = "CoverProtocolClient")]
pub trait CoverProtocol {
    fn is_supported_asset(env: Env, asset: Address) -> bool;

    /// Validates a signed quote and returns its base price.
    fn quote_price(
        env: Env,
        member: Address,
        target: Address,
        asset: Address,
        amount: i128,
        period: u32,
        cover_type: u32,
        quote: CoverQuote,
    ) -> Result<i128, ProtocolError>;

    /// Consumes the quote and creates cover owned by `member`.
    fn create_cover(
        env: Env,
        member: Address,
        target: Address,
        asset: Address,
        amount: i128,
        period: u32,
        cover_type: u32,
        quote: CoverQuote,
    ) -> Result<CoverPosition, ProtocolError>;

    fn open_claim(env: Env, member: Address, cover_id: u64, data: Bytes)
        -> Result<u64, ProtocolError>;

    fn get_claim_outcome(env: Env, claim_id: u64) -> Result<ClaimOutcome, ProtocolError>;

    /// Sends the payout of an accepted claim to `member`; returns the amount sent.
    fn claim_payout(env: Env, member: Address, claim_id: u64) -> Result<i128, ProtocolError>;

    /// Runs a cover action spending at most `max_amount`; returns the amount spent.
    fn execute_cover_action(
        env: Env,
        member: Address,
        cover_id: u64,
        asset: Address,
        max_amount: i128,
        action: u32,
        data: Bytes,
    ) -> Result<i128, ProtocolError>;

    /// Sells reward tokens held by `member`; returns the reported proceeds.
    fn sell_reward_token(env: Env, member: Address, amount: i128) -> Result<i128, ProtocolError>;

    fn switch_identity(env: Env, old: Address, new: Address) -> Result<(), ProtocolError>;
}

/// Unwraps a `try_` call into the protocol. Rejections are logged with the
/// protocol's own code and folded into a [`DistributorError`] by `categorize`;
/// `None` stands for a failure the protocol did not describe.
pub(crate) fn settle<T, C>(
    env: &Env,
    operation: Symbol,
    result: Result<Result<T, C>, Result<ProtocolError, InvokeError>>,
    categorize: fn(Option<ProtocolError>) -> DistributorError,
) -> Result<T, DistributorError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => {
            log!(env, "cover protocol returned malformed value", operation);
            Err(DistributorError::UpstreamRejected)
        }
        Err(Ok(reason)) => {
            let code = reason as u32;
            log!(env, "cover protocol rejected call", operation, code);
            Err(categorize(Some(reason)))
        }
        Err(Err(InvokeError::Contract(code))) => {
            log!(env, "cover protocol failed", operation, code);
            Err(categorize(None))
        }
        Err(Err(InvokeError::Abort)) => {
            log!(env, "cover protocol aborted", operation);
            Err(categorize(None))
        }
    }
}
