//! Common arithmetic primitives for tax calculations.
//!
//! Every money value in the engine is a [`rust_decimal::Decimal`]. Addition,
//! subtraction, and multiplication run at full precision; [`round_half_up`]
//! is the only operation that reduces precision, and it is applied only at
//! the designated finalize boundaries of each worksheet.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero), matching
/// tax-form conventions. Banker's rounding is deliberately not used.
///
/// The result always carries a scale of exactly two, so a serialized amount
/// reads `1234.50` rather than `1234.5`. Applying the function twice is the
/// same as applying it once.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use liability_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)).to_string(), "123.45");
/// assert_eq!(round_half_up(dec!(123.455)).to_string(), "123.46");
/// assert_eq!(round_half_up(dec!(1234.5)).to_string(), "1234.50");
/// assert_eq!(round_half_up(dec!(-123.455)).to_string(), "-123.46"); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use liability_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use liability_core::calculations::common::min;
///
/// assert_eq!(min(dec!(100.00), dec!(200.00)), dec!(100.00));
/// assert_eq!(min(dec!(-100.00), dec!(-200.00)), dec!(-200.00));
/// ```
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Divides `numerator` by `denominator` at full internal precision.
///
/// The quotient keeps all fractional digits `Decimal` can carry (well beyond
/// ten); callers round only at their finalize step.
///
/// # Panics
///
/// Panics if `denominator` is zero. Divisors in this engine are always
/// nonzero configuration constants (phase-in ranges, rate thresholds), so a
/// zero divisor is a programming error, not a user-facing condition.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use liability_core::calculations::common::ratio;
///
/// assert_eq!(ratio(dec!(25000), dec!(50000)), dec!(0.5));
/// ```
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    numerator
        .checked_div(denominator)
        .expect("division by zero: divisor must be a nonzero configuration constant")
}

/// Clamps a value to the closed interval [0, 1].
///
/// Used for phase-in weights, which are meaningful only inside the unit
/// interval.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use liability_core::calculations::common::clamp_unit_interval;
///
/// assert_eq!(clamp_unit_interval(dec!(0.35)), dec!(0.35));
/// assert_eq!(clamp_unit_interval(dec!(-0.2)), dec!(0));
/// assert_eq!(clamp_unit_interval(dec!(1.7)), dec!(1));
/// ```
pub fn clamp_unit_interval(value: Decimal) -> Decimal {
    if value < Decimal::ZERO {
        Decimal::ZERO
    } else if value > Decimal::ONE {
        Decimal::ONE
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_rounds_up_above_midpoint() {
        let result = round_half_up(dec!(123.456));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_is_idempotent() {
        let once = round_half_up(dec!(8274.1251));
        let twice = round_half_up(once);

        assert_eq!(once, twice);
        assert_eq!(once.scale(), twice.scale());
    }

    #[test]
    fn round_half_up_pads_to_two_decimal_places() {
        let result = round_half_up(dec!(5914));

        assert_eq!(result.to_string(), "5914.00");
    }

    #[test]
    fn round_half_up_handles_zero() {
        let result = round_half_up(dec!(0));

        assert_eq!(result.to_string(), "0.00");
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // max / min tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        let result = max(dec!(100.00), dec!(200.00));

        assert_eq!(result, dec!(200.00));
    }

    #[test]
    fn max_handles_equal_values() {
        let result = max(dec!(150.00), dec!(150.00));

        assert_eq!(result, dec!(150.00));
    }

    #[test]
    fn max_handles_negative_values() {
        let result = max(dec!(-100.00), dec!(-200.00));

        assert_eq!(result, dec!(-100.00));
    }

    #[test]
    fn min_returns_smaller_value() {
        let result = min(dec!(100.00), dec!(200.00));

        assert_eq!(result, dec!(100.00));
    }

    #[test]
    fn min_handles_negative_and_positive() {
        let result = min(dec!(-50.00), dec!(50.00));

        assert_eq!(result, dec!(-50.00));
    }

    // =========================================================================
    // ratio tests
    // =========================================================================

    #[test]
    fn ratio_divides_exactly() {
        let result = ratio(dec!(25000), dec!(50000));

        assert_eq!(result, dec!(0.5));
    }

    #[test]
    fn ratio_keeps_high_internal_precision() {
        let result = ratio(dec!(1), dec!(3));

        // At least ten fractional digits before any rounding.
        assert!(result.scale() >= 10);
        assert_eq!(round_half_up(result * dec!(3)), dec!(1.00));
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn ratio_panics_on_zero_divisor() {
        ratio(dec!(1), dec!(0));
    }

    // =========================================================================
    // clamp_unit_interval tests
    // =========================================================================

    #[test]
    fn clamp_passes_through_interior_values() {
        let result = clamp_unit_interval(dec!(0.35));

        assert_eq!(result, dec!(0.35));
    }

    #[test]
    fn clamp_floors_at_zero() {
        let result = clamp_unit_interval(dec!(-0.2));

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn clamp_caps_at_one() {
        let result = clamp_unit_interval(dec!(1.7));

        assert_eq!(result, dec!(1));
    }

    #[test]
    fn clamp_keeps_boundaries() {
        assert_eq!(clamp_unit_interval(dec!(0)), dec!(0));
        assert_eq!(clamp_unit_interval(dec!(1)), dec!(1));
    }
}
