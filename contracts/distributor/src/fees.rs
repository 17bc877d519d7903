use crate::errors::DistributorError;
use crate::types::FeeConfig;

pub const FEE_DENOMINATOR: u32 = 10_000;

/// Price split of a single purchase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PriceBreakdown {
    pub base_price: i128,
    pub fee: i128,
    pub total: i128,
}

/// Marks `base_price` up by the configured fee, rounding the fee down.
pub fn price_with_fee(fee_config: &FeeConfig, base_price: i128) -> Result<PriceBreakdown, DistributorError> {
    if base_price <= 0 {
        return Err(DistributorError::InvalidAmount);
    }
    let fee = base_price
        .checked_mul(fee_config.fee_percentage as i128)
        .ok_or(DistributorError::InvalidAmount)?
        / FEE_DENOMINATOR as i128;
    let total = base_price
        .checked_add(fee)
        .ok_or(DistributorError::InvalidAmount)?;
    Ok(PriceBreakdown {
        base_price,
        fee,
        total,
    })
}

pub fn validate_fee_percentage(fee_percentage: u32) -> Result<(), DistributorError> {
    if fee_percentage > FEE_DENOMINATOR {
        return Err(DistributorError::InvalidFeePercentage);
    }
    Ok(())
}

/// Sums must be a whole number of units of an asset with `decimals` decimals.
pub fn validate_whole_units(amount: i128, decimals: u32) -> Result<(), DistributorError> {
    let unit = 10i128
        .checked_pow(decimals)
        .ok_or(DistributorError::InvalidAmountGranularity)?;
    if amount <= 0 || amount % unit != 0 {
        return Err(DistributorError::InvalidAmountGranularity);
    }
    Ok(())
}
