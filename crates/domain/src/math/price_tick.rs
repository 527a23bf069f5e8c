use super::MathError;
use crate::fees::FeeTier;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

const TICK_BASE: f64 = 1.0001;
const U32_RANGE: i64 = 1 << 32;

/// Ratio applied between human prices and raw tick prices: `10^(decimals_a - decimals_b)`.
pub fn decimals_ratio(decimals_a: u8, decimals_b: u8) -> Decimal {
    let diff = (i32::from(decimals_a) - i32::from(decimals_b)).clamp(-28, 28);
    if diff >= 0 {
        (0..diff).fold(Decimal::ONE, |acc, _| acc * Decimal::TEN)
    } else {
        Decimal::new(1, diff.unsigned_abs())
    }
}

/// Returns the raw tick for a human price, before spacing is applied.
/// tick = round(log_1.0001(price / decimals_ratio))
pub fn raw_price_to_tick(price: Decimal, decimals_ratio: Decimal) -> Result<i32, MathError> {
    if price <= Decimal::ZERO || decimals_ratio <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let adjusted = (price / decimals_ratio)
        .to_f64()
        .ok_or(MathError::Overflow("price"))?;
    let tick = adjusted.log(TICK_BASE).round();
    if !tick.is_finite() || tick.abs() > f64::from(i32::MAX) {
        return Err(MathError::Overflow("tick"));
    }
    Ok(tick as i32)
}

/// Returns the tick for a human price, snapped to the nearest multiple of the
/// fee tier's tick spacing.
pub fn price_to_tick(
    price: Decimal,
    fee_tier: FeeTier,
    decimals_ratio: Decimal,
) -> Result<i32, MathError> {
    let tick = raw_price_to_tick(price, decimals_ratio)?;
    Ok(snap_to_spacing(tick, fee_tier.tick_spacing()))
}

/// Rounds a tick to the nearest multiple of `tick_spacing`.
pub fn snap_to_spacing(tick: i32, tick_spacing: u32) -> i32 {
    let spacing = tick_spacing.max(1) as f64;
    ((f64::from(tick) / spacing).round() * spacing) as i32
}

/// Returns the human price for a tick.
/// P = 1.0001 ^ tick * decimals_ratio
pub fn tick_to_price(tick: i32, decimals_ratio: Decimal) -> Result<Decimal, MathError> {
    let price_f64 = TICK_BASE.powi(tick);
    let price = Decimal::from_f64(price_f64).ok_or(MathError::Overflow("price"))?;
    Ok(price * decimals_ratio)
}

/// Returns sqrt(1.0001 ^ tick) in raw units.
pub fn tick_to_sqrt_price(tick: i32) -> Result<Decimal, MathError> {
    let sqrt_f64 = TICK_BASE.powf(f64::from(tick) / 2.0);
    Decimal::from_f64(sqrt_f64).ok_or(MathError::Overflow("sqrt price"))
}

/// Maps a signed tick to the u32 representation used by the contracts.
/// Already-normalized values pass through.
pub fn normalize_tick(tick: i64) -> i64 {
    if tick < 0 { tick + U32_RANGE } else { tick }
}

/// Inverse of [`normalize_tick`].
pub fn denormalize_tick(value: u32) -> i32 {
    value as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimals_ratio() {
        assert_eq!(decimals_ratio(8, 6), dec!(100));
        assert_eq!(decimals_ratio(6, 8), dec!(0.01));
        assert_eq!(decimals_ratio(6, 6), Decimal::ONE);
    }

    #[test]
    fn test_tick_to_price() {
        let p = tick_to_price(0, Decimal::ONE).unwrap();
        assert_eq!(p, Decimal::ONE);

        let p100 = tick_to_price(100, Decimal::ONE).unwrap();
        let diff = (p100.to_f64().unwrap() - 1.01004966).abs();
        assert!(diff < 0.000001);
    }

    #[test]
    fn test_price_to_tick() {
        let ratio = Decimal::ONE;
        assert_eq!(raw_price_to_tick(Decimal::ONE, ratio).unwrap(), 0);
        assert_eq!(raw_price_to_tick(dec!(1.01004966), ratio).unwrap(), 100);
        assert_eq!(
            raw_price_to_tick(Decimal::ZERO, ratio),
            Err(MathError::NonPositivePrice)
        );
        assert!(raw_price_to_tick(dec!(-3), ratio).is_err());
    }

    #[test]
    fn test_price_to_tick_is_spacing_aligned() {
        let ratio = decimals_ratio(8, 6);
        for index in 0..=5u8 {
            let tier = FeeTier::new(index).unwrap();
            let tick = price_to_tick(dec!(5.37), tier, ratio).unwrap();
            assert_eq!(tick % tier.tick_spacing() as i32, 0);
        }
    }

    #[test]
    fn test_price_tick_round_trip_within_spacing() {
        let ratio = decimals_ratio(8, 6);
        let tier = FeeTier::new(1).unwrap();
        let tick = price_to_tick(dec!(5), tier, ratio).unwrap();
        let price = tick_to_price(tick, ratio).unwrap();
        let back = raw_price_to_tick(price, ratio).unwrap();
        assert!((back - tick).abs() <= tier.tick_spacing() as i32);
    }

    #[test]
    fn test_snap_to_spacing() {
        assert_eq!(snap_to_spacing(-16_090, 60), -16_080);
        assert_eq!(snap_to_spacing(29, 10), 30);
        assert_eq!(snap_to_spacing(7, 1), 7);
    }

    #[test]
    fn test_normalize_tick() {
        assert_eq!(normalize_tick(-1), 4_294_967_295);
        assert_eq!(normalize_tick(120), 120);
        let once = normalize_tick(-16_080);
        assert_eq!(normalize_tick(once), once);
        assert_eq!(denormalize_tick(once as u32), -16_080);
    }

    #[test]
    fn test_sqrt_price() {
        let s = tick_to_sqrt_price(200).unwrap();
        let p = tick_to_price(200, Decimal::ONE).unwrap();
        let diff = (s * s - p).abs();
        assert!(diff < dec!(0.000001));
    }
}
