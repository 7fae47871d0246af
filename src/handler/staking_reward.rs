use crate::{
    error::Error,
    model::RewardSample,
    types::{BlockHeader, StakingInfo},
};

pub const SAT_PER_COIN: f64 = 100_000_000.0;

const AVERAGE_DECAY: f64 = 0.99;
const AVERAGE_WEIGHT: f64 = 0.01;

/// Exponential moving average of the actual reward rate.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningAverage {
    value: Option<f64>,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            Some(avg) => AVERAGE_DECAY * avg + AVERAGE_WEIGHT * sample,
            None => sample,
        };
        self.value = Some(next);
        next
    }
}

/// Annualized reward after the treasury donation, independent of stake weight.
pub fn nominal_rate(info: &StakingInfo) -> f64 {
    info.percent_year_reward * (100.0 - info.treasury_donation_percent) / 100.0
}

/// Annualized reward realized by the stake currently competing for blocks.
pub fn actual_rate(info: &StakingInfo) -> Result<f64, Error> {
    if info.net_stake_weight == 0.0 {
        return Err(Error::InvalidInputError(String::from(
            "net stake weight is zero",
        )));
    }

    let mut rate = info.money_supply
        * info.percent_year_reward
        * (100.0 - info.treasury_donation_percent);
    rate /= 100.0 * 100.0;
    rate /= info.net_stake_weight / SAT_PER_COIN;
    rate *= 100.0;

    if !rate.is_finite() {
        return Err(Error::InvalidInputError(format!(
            "actual rate evaluates to {}",
            rate
        )));
    }

    Ok(rate)
}

#[derive(Debug, Default)]
pub struct RewardCalculator {
    average: RunningAverage,
}

impl RewardCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn average(&self) -> Option<f64> {
        self.average.value()
    }

    /// Derives the sample for `header`. The running average only moves
    /// when a sample is produced.
    pub fn compute(
        &mut self,
        info: &StakingInfo,
        header: &BlockHeader,
    ) -> Result<RewardSample, Error> {
        let block_nr = i32::try_from(header.height).map_err(|_| {
            Error::InvalidInputError(format!(
                "block height {} does not fit the block_nr column",
                header.height
            ))
        })?;

        let nominal_rate = nominal_rate(info);
        let actual_rate = actual_rate(info)?;

        if !nominal_rate.is_finite() {
            return Err(Error::InvalidInputError(format!(
                "nominal rate evaluates to {}",
                nominal_rate
            )));
        }

        self.average.update(actual_rate);

        Ok(RewardSample {
            block_nr,
            block_time: header.time,
            nominal_rate,
            actual_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staking_info(net_stake_weight: f64) -> StakingInfo {
        StakingInfo {
            money_supply: 1_000_000.0,
            percent_year_reward: 5.0,
            treasury_donation_percent: 2.0,
            net_stake_weight,
        }
    }

    fn header(height: i64) -> BlockHeader {
        BlockHeader {
            hash: String::from("00ff"),
            height,
            time: 1700000000,
        }
    }

    #[test]
    fn test_compute_reference_block() {
        let mut calculator = RewardCalculator::new();
        let sample = calculator
            .compute(&staking_info(50_000.0 * 1e8), &header(1000))
            .unwrap();

        assert_eq!(
            sample,
            RewardSample {
                block_nr: 1000,
                block_time: 1700000000,
                nominal_rate: 4.9,
                actual_rate: 98.0,
            }
        );
        assert_eq!(calculator.average(), Some(98.0));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let info = StakingInfo {
            money_supply: 8_734_112.456,
            percent_year_reward: 3.3,
            treasury_donation_percent: 11.0,
            net_stake_weight: 312_456_789_012_345.0,
        };
        let mut first = RewardCalculator::new();
        let mut second = RewardCalculator::new();
        second.average.update(55.0);

        let a = first.compute(&info, &header(5)).unwrap();
        let b = first.compute(&info, &header(5)).unwrap();
        let c = second.compute(&info, &header(5)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_zero_stake_weight_is_rejected() {
        let mut calculator = RewardCalculator::new();
        let result = calculator.compute(&staking_info(0.0), &header(1000));

        assert!(matches!(result, Err(Error::InvalidInputError(_))));
        assert_eq!(calculator.average(), None);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let mut info = staking_info(1e8);
        info.money_supply = f64::INFINITY;

        let result = RewardCalculator::new().compute(&info, &header(1));
        assert!(matches!(result, Err(Error::InvalidInputError(_))));
    }

    #[test]
    fn test_height_outside_column_range_is_rejected() {
        let result = RewardCalculator::new()
            .compute(&staking_info(1e8), &header(i64::from(i32::MAX) + 1));
        assert!(matches!(result, Err(Error::InvalidInputError(_))));
    }

    #[test]
    fn test_donation_percent_is_not_clamped() {
        let mut info = staking_info(1e8);
        info.treasury_donation_percent = 120.0;
        assert_eq!(nominal_rate(&info), -1.0);

        info.treasury_donation_percent = -10.0;
        assert_eq!(nominal_rate(&info), 5.5);
    }

    #[test]
    fn test_running_average() {
        let mut average = RunningAverage::new();
        assert_eq!(average.value(), None);

        assert_eq!(average.update(10.0), 10.0);
        let second = average.update(20.0);
        assert!((second - 10.1).abs() < 1e-12, "average was {}", second);
        assert_eq!(average.value(), Some(second));
    }
}
