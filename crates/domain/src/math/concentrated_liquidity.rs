use super::MathError;
use crate::token::TokenAmount;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Where the current price sits relative to a position's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePosition {
    /// Current price at or below the lower bound; the position holds only token0.
    Below,
    InRange,
    /// Current price at or above the upper bound; the position holds only token1.
    Above,
}

pub fn price_position(sqrt_current: Decimal, sqrt_lower: Decimal, sqrt_upper: Decimal) -> PricePosition {
    let (lower, upper) = ordered(sqrt_lower, sqrt_upper);
    if sqrt_current <= lower {
        PricePosition::Below
    } else if sqrt_current >= upper {
        PricePosition::Above
    } else {
        PricePosition::InRange
    }
}

/// Calculates the amount of token0 (x) given liquidity and price range.
/// delta_x = L * (1/sqrt(P_a) - 1/sqrt(P_b))
pub fn get_amount0_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<TokenAmount, MathError> {
    let amount = amount0_delta(Decimal::from(liquidity), sqrt_price_a, sqrt_price_b)?;
    to_token_amount(amount)
}

/// Calculates the amount of token1 (y) given liquidity and price range.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount1_delta(
    liquidity: u128,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<TokenAmount, MathError> {
    let amount = amount1_delta(Decimal::from(liquidity), sqrt_price_a, sqrt_price_b)?;
    to_token_amount(amount)
}

/// Calculates liquidity for a given amount of token0 and price range
/// L = amount0 * (sqrt(P_a) * sqrt(P_b)) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount0(
    amount0: TokenAmount,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<u128, MathError> {
    let liquidity = liquidity0(to_decimal(amount0)?, sqrt_price_a, sqrt_price_b)?;
    liquidity.to_u128().ok_or(MathError::Overflow("liquidity"))
}

/// Calculates liquidity for a given amount of token1 and price range
/// L = amount1 / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount1(
    amount1: TokenAmount,
    sqrt_price_a: Decimal,
    sqrt_price_b: Decimal,
) -> Result<u128, MathError> {
    let liquidity = liquidity1(to_decimal(amount1)?, sqrt_price_a, sqrt_price_b)?;
    liquidity.to_u128().ok_or(MathError::Overflow("liquidity"))
}

/// Liquidity and token1 amount that pair with `amount0` at the current price.
///
/// Returns `None` when the price is at or above the range, where token0 cannot
/// fund the position.
pub fn pair_amount1_for_amount0(
    amount0: TokenAmount,
    sqrt_current: Decimal,
    sqrt_lower: Decimal,
    sqrt_upper: Decimal,
) -> Result<Option<(u128, TokenAmount)>, MathError> {
    let (lower, upper) = ordered(sqrt_lower, sqrt_upper);
    let amount0 = to_decimal(amount0)?;
    match price_position(sqrt_current, lower, upper) {
        PricePosition::Above => Ok(None),
        PricePosition::Below => {
            let l = liquidity0(amount0, lower, upper)?;
            Ok(Some((to_liquidity(l)?, TokenAmount::zero())))
        }
        PricePosition::InRange => {
            let l = liquidity0(amount0, sqrt_current, upper)?;
            let amount1 = amount1_delta(l, lower, sqrt_current)?;
            Ok(Some((to_liquidity(l)?, to_token_amount(amount1)?)))
        }
    }
}

/// Liquidity and token0 amount that pair with `amount1` at the current price.
///
/// Returns `None` when the price is at or below the range.
pub fn pair_amount0_for_amount1(
    amount1: TokenAmount,
    sqrt_current: Decimal,
    sqrt_lower: Decimal,
    sqrt_upper: Decimal,
) -> Result<Option<(u128, TokenAmount)>, MathError> {
    let (lower, upper) = ordered(sqrt_lower, sqrt_upper);
    let amount1 = to_decimal(amount1)?;
    match price_position(sqrt_current, lower, upper) {
        PricePosition::Below => Ok(None),
        PricePosition::Above => {
            let l = liquidity1(amount1, lower, upper)?;
            Ok(Some((to_liquidity(l)?, TokenAmount::zero())))
        }
        PricePosition::InRange => {
            let l = liquidity1(amount1, lower, sqrt_current)?;
            let amount0 = amount0_delta(l, sqrt_current, upper)?;
            Ok(Some((to_liquidity(l)?, to_token_amount(amount0)?)))
        }
    }
}

fn ordered(a: Decimal, b: Decimal) -> (Decimal, Decimal) {
    if a < b { (a, b) } else { (b, a) }
}

fn amount0_delta(liquidity: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal, MathError> {
    if sqrt_a <= Decimal::ZERO || sqrt_b <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    let den = lower.checked_mul(upper).ok_or(MathError::Overflow("amount0"))?;
    let factor = (upper - lower)
        .checked_div(den)
        .ok_or(MathError::Overflow("amount0"))?;
    liquidity.checked_mul(factor).ok_or(MathError::Overflow("amount0"))
}

fn amount1_delta(liquidity: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal, MathError> {
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    liquidity
        .checked_mul(upper - lower)
        .ok_or(MathError::Overflow("amount1"))
}

fn liquidity0(amount0: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal, MathError> {
    if sqrt_a <= Decimal::ZERO || sqrt_b <= Decimal::ZERO {
        return Err(MathError::NonPositiveSqrtPrice);
    }
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    let den = upper - lower;
    if den.is_zero() {
        return Err(MathError::EmptyRange);
    }
    amount0
        .checked_mul(lower)
        .and_then(|n| n.checked_mul(upper))
        .and_then(|n| n.checked_div(den))
        .ok_or(MathError::Overflow("liquidity"))
}

fn liquidity1(amount1: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal, MathError> {
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    let den = upper - lower;
    if den.is_zero() {
        return Err(MathError::EmptyRange);
    }
    amount1.checked_div(den).ok_or(MathError::Overflow("liquidity"))
}

fn to_decimal(amount: TokenAmount) -> Result<Decimal, MathError> {
    Decimal::from_str(&amount.0.to_string()).map_err(|_| MathError::Overflow("amount"))
}

fn to_token_amount(amount: Decimal) -> Result<TokenAmount, MathError> {
    amount
        .to_u128()
        .map(TokenAmount::from)
        .ok_or(MathError::Overflow("amount"))
}

fn to_liquidity(liquidity: Decimal) -> Result<u128, MathError> {
    liquidity.to_u128().ok_or(MathError::Overflow("liquidity"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_deltas() {
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let liquidity = 1000u128;
        let sqrt_p_a = Decimal::from(1);
        let sqrt_p_b = Decimal::from(2);

        let dy = get_amount1_delta(liquidity, sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(dy.as_u256().as_u64(), 1000);

        let dx = get_amount0_delta(liquidity, sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(dx.as_u256().as_u64(), 500);
    }

    #[test]
    fn test_get_liquidity() {
        let sqrt_p_a = Decimal::from(1);
        let sqrt_p_b = Decimal::from(2);

        let l = get_liquidity_for_amount0(TokenAmount::from(500u64), sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(l, 1000);

        let l2 = get_liquidity_for_amount1(TokenAmount::from(1000u64), sqrt_p_a, sqrt_p_b).unwrap();
        assert_eq!(l2, 1000);

        assert_eq!(
            get_liquidity_for_amount1(TokenAmount::from(1u64), sqrt_p_a, sqrt_p_a),
            Err(MathError::EmptyRange)
        );
    }

    #[test]
    fn test_pairing_in_range() {
        // Range sqrt 1..4, current sqrt 2.
        // amount0 = 1000 -> L = 1000 * 2 * 4 / 2 = 4000, amount1 = 4000 * (2 - 1) = 4000
        let (l, amount1) = pair_amount1_for_amount0(
            TokenAmount::from(1000u64),
            Decimal::from(2),
            Decimal::from(1),
            Decimal::from(4),
        )
        .unwrap()
        .unwrap();
        assert_eq!(l, 4000);
        assert_eq!(amount1.as_u256().as_u64(), 4000);

        let (l, amount0) = pair_amount0_for_amount1(
            TokenAmount::from(4000u64),
            Decimal::from(2),
            Decimal::from(1),
            Decimal::from(4),
        )
        .unwrap()
        .unwrap();
        assert_eq!(l, 4000);
        assert_eq!(amount0.as_u256().as_u64(), 1000);
    }

    #[test]
    fn test_pairing_out_of_range() {
        let one = Decimal::from(1);
        let two = Decimal::from(2);
        let amount = TokenAmount::from(500u64);

        // Above range: only token1 fits.
        assert_eq!(pair_amount1_for_amount0(amount, Decimal::from(3), one, two).unwrap(), None);
        let (_, paired) = pair_amount0_for_amount1(amount, Decimal::from(3), one, two)
            .unwrap()
            .unwrap();
        assert_eq!(paired, TokenAmount::zero());

        // Below range: only token0 fits.
        assert_eq!(pair_amount0_for_amount1(amount, Decimal::new(5, 1), one, two).unwrap(), None);
        let (l, paired) = pair_amount1_for_amount0(amount, Decimal::new(5, 1), one, two)
            .unwrap()
            .unwrap();
        assert_eq!(l, 1000);
        assert_eq!(paired, TokenAmount::zero());
    }

    #[test]
    fn test_price_position() {
        let one = Decimal::from(1);
        let two = Decimal::from(2);
        assert_eq!(price_position(one, one, two), PricePosition::Below);
        assert_eq!(price_position(Decimal::new(15, 1), two, one), PricePosition::InRange);
        assert_eq!(price_position(two, one, two), PricePosition::Above);
    }
}
