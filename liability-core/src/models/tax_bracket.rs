use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single marginal rate bracket.
///
/// `upper` is `None` for the top bracket, which is unbounded. The upper bound
/// is inclusive of the bracket it closes: income exactly at a boundary is
/// taxed in the lower bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// Errors found while validating a [`BracketSchedule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule contains no brackets.
    #[error("schedule has no brackets")]
    Empty,

    /// The first bracket must start at zero.
    #[error("first bracket must start at 0, got {0}")]
    FirstBracketNotZero(Decimal),

    /// A bracket's lower bound does not meet the previous bracket's upper bound.
    #[error("bracket {index} starts at {lower} but the previous bracket ends at {previous_upper}")]
    Discontiguous {
        index: usize,
        lower: Decimal,
        previous_upper: Decimal,
    },

    /// A bounded bracket's upper bound is not above its lower bound.
    #[error("bracket {index} has upper bound {upper} not above lower bound {lower}")]
    NotIncreasing {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    /// Only the final bracket may be unbounded.
    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedNotLast(usize),

    /// The final bracket must be unbounded.
    #[error("last bracket must have no upper bound")]
    LastBracketBounded,

    /// A marginal rate must lie within [0, 1].
    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// An ordered, contiguous sequence of marginal rate brackets covering
/// `[0, infinity)` for one tax year and filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSchedule {
    pub brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    pub fn new(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    /// Validates the schedule invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the schedule is empty, does not start at
    /// zero, has a gap or a non-increasing bracket, carries an unbounded
    /// bracket anywhere but last, ends in a bounded bracket, or has a rate
    /// outside [0, 1].
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let first = &self.brackets[0];
        if first.lower != Decimal::ZERO {
            return Err(ScheduleError::FirstBracketNotZero(first.lower));
        }

        let last_index = self.brackets.len() - 1;
        let mut previous_upper: Option<Decimal> = None;

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(ScheduleError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }

            if let Some(previous_upper) = previous_upper {
                if bracket.lower != previous_upper {
                    return Err(ScheduleError::Discontiguous {
                        index,
                        lower: bracket.lower,
                        previous_upper,
                    });
                }
            }

            match bracket.upper {
                Some(upper) => {
                    if upper <= bracket.lower {
                        return Err(ScheduleError::NotIncreasing {
                            index,
                            lower: bracket.lower,
                            upper,
                        });
                    }
                    if index == last_index {
                        return Err(ScheduleError::LastBracketBounded);
                    }
                    previous_upper = Some(upper);
                }
                None => {
                    if index != last_index {
                        return Err(ScheduleError::UnboundedNotLast(index));
                    }
                }
            }
        }

        Ok(())
    }
}

/// One bracket's share of a computed tax, kept for audit display.
///
/// Decision logic never reads these rows; they exist so a reviewer can see
/// how a tax figure decomposes. Amounts are rounded for display, so summing
/// the rows can differ from the rounded total by a cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    /// The slice of income taxed in this bracket.
    pub taxed_amount: Decimal,
    /// Tax owed on that slice.
    pub tax: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> TaxBracket {
        TaxBracket { lower, upper, rate }
    }

    fn valid_schedule() -> BracketSchedule {
        BracketSchedule::new(vec![
            bracket(dec!(0), Some(dec!(11925)), dec!(0.10)),
            bracket(dec!(11925), Some(dec!(48475)), dec!(0.12)),
            bracket(dec!(48475), None, dec!(0.22)),
        ])
    }

    #[test]
    fn validate_accepts_contiguous_schedule() {
        assert_eq!(valid_schedule().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_schedule() {
        let schedule = BracketSchedule::new(vec![]);

        assert_eq!(schedule.validate(), Err(ScheduleError::Empty));
    }

    #[test]
    fn validate_rejects_nonzero_start() {
        let schedule = BracketSchedule::new(vec![bracket(dec!(100), None, dec!(0.10))]);

        assert_eq!(
            schedule.validate(),
            Err(ScheduleError::FirstBracketNotZero(dec!(100)))
        );
    }

    #[test]
    fn validate_rejects_gap() {
        let schedule = BracketSchedule::new(vec![
            bracket(dec!(0), Some(dec!(11925)), dec!(0.10)),
            bracket(dec!(12000), None, dec!(0.12)),
        ]);

        assert_eq!(
            schedule.validate(),
            Err(ScheduleError::Discontiguous {
                index: 1,
                lower: dec!(12000),
                previous_upper: dec!(11925),
            })
        );
    }

    #[test]
    fn validate_rejects_non_increasing_bracket() {
        let schedule = BracketSchedule::new(vec![
            bracket(dec!(0), Some(dec!(0)), dec!(0.10)),
            bracket(dec!(0), None, dec!(0.12)),
        ]);

        assert_eq!(
            schedule.validate(),
            Err(ScheduleError::NotIncreasing {
                index: 0,
                lower: dec!(0),
                upper: dec!(0),
            })
        );
    }

    #[test]
    fn validate_rejects_unbounded_bracket_in_middle() {
        let schedule = BracketSchedule::new(vec![
            bracket(dec!(0), None, dec!(0.10)),
            bracket(dec!(11925), None, dec!(0.12)),
        ]);

        assert_eq!(schedule.validate(), Err(ScheduleError::UnboundedNotLast(0)));
    }

    #[test]
    fn validate_rejects_bounded_top_bracket() {
        let schedule = BracketSchedule::new(vec![
            bracket(dec!(0), Some(dec!(11925)), dec!(0.10)),
            bracket(dec!(11925), Some(dec!(48475)), dec!(0.12)),
        ]);

        assert_eq!(schedule.validate(), Err(ScheduleError::LastBracketBounded));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let schedule = BracketSchedule::new(vec![bracket(dec!(0), None, dec!(1.5))]);

        assert_eq!(
            schedule.validate(),
            Err(ScheduleError::RateOutOfRange {
                index: 0,
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_rate() {
        let schedule = BracketSchedule::new(vec![bracket(dec!(0), None, dec!(-0.10))]);

        assert_eq!(
            schedule.validate(),
            Err(ScheduleError::RateOutOfRange {
                index: 0,
                rate: dec!(-0.10),
            })
        );
    }
}
