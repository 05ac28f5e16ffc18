//! Computation of the placement contract's tranche schedule
//!
//! The schedule is derived from a single, explicitly supplied base timestamp so
//! that a plan can be reproduced exactly. Nothing in here reads the clock.

use alloy::primitives::U256;

use crate::{
    constants::{
        DEFAULT_TRANCHE_DURATIONS, DEFAULT_TRANCHE_OFFSETS, DEFAULT_TRANCHE_RATES, NUM_TRANCHES,
    },
    errors::ScriptError,
};

/// A single time-bounded release window of the placement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tranche {
    /// The unix timestamp, in seconds, at which the tranche opens
    pub start: u64,
    /// The length of the tranche, in seconds
    pub duration: u64,
    /// The rate or cap value of the tranche
    pub rate: U256,
}

/// The fixed parameters from which a schedule is materialized
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// The offset of each tranche's start from the base time
    pub offsets: [u64; NUM_TRANCHES],
    /// The duration of each tranche
    pub durations: [u64; NUM_TRANCHES],
    /// The rate or cap of each tranche
    pub rates: [U256; NUM_TRANCHES],
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_TRANCHE_OFFSETS,
            durations: DEFAULT_TRANCHE_DURATIONS,
            rates: DEFAULT_TRANCHE_RATES.map(U256::from),
        }
    }
}

/// The three tranches passed to the placement contract's constructor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrancheSchedule {
    /// The base time the tranche start times are offset from
    base_time: u64,
    /// The tranches, in constructor order
    tranches: [Tranche; NUM_TRANCHES],
}

impl TrancheSchedule {
    /// Materialize the schedule for the given base time
    pub fn from_base(base_time: u64, config: &ScheduleConfig) -> Result<Self, ScriptError> {
        let mut tranches = [Tranche {
            start: 0,
            duration: 0,
            rate: U256::ZERO,
        }; NUM_TRANCHES];

        for (i, tranche) in tranches.iter_mut().enumerate() {
            let start = base_time.checked_add(config.offsets[i]).ok_or_else(|| {
                ScriptError::CalldataConstruction(format!(
                    "tranche {} start overflows: {} + {}",
                    i + 1,
                    base_time,
                    config.offsets[i]
                ))
            })?;

            *tranche = Tranche {
                start,
                duration: config.durations[i],
                rate: config.rates[i],
            };
        }

        Ok(Self {
            base_time,
            tranches,
        })
    }

    /// The base time the schedule was computed from
    pub fn base_time(&self) -> u64 {
        self.base_time
    }

    /// The tranches, in constructor order
    pub fn tranches(&self) -> &[Tranche; NUM_TRANCHES] {
        &self.tranches
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::{ScheduleConfig, TrancheSchedule};

    /// An arbitrary base time for the tests
    const BASE_TIME: u64 = 1_700_000_000;

    #[test]
    fn test_default_schedule() {
        let schedule = TrancheSchedule::from_base(BASE_TIME, &ScheduleConfig::default()).unwrap();
        let [t1, t2, t3] = schedule.tranches();

        assert_eq!(t1.start, BASE_TIME);
        assert_eq!(t2.start, BASE_TIME + 240);
        assert_eq!(t3.start, BASE_TIME + 480);

        for tranche in schedule.tranches() {
            assert_eq!(tranche.duration, 180);
            assert_eq!(tranche.rate, U256::from(180u64));
        }
    }

    #[test]
    fn test_start_times_strictly_increase() {
        let config = ScheduleConfig::default();
        for base_time in [0, 1, BASE_TIME, u64::MAX - 480] {
            let schedule = TrancheSchedule::from_base(base_time, &config).unwrap();
            let [t1, t2, t3] = schedule.tranches();
            assert!(t1.start < t2.start && t2.start < t3.start);
        }
    }

    #[test]
    fn test_schedule_is_reproducible() {
        let config = ScheduleConfig::default();
        let a = TrancheSchedule::from_base(BASE_TIME, &config).unwrap();
        let b = TrancheSchedule::from_base(BASE_TIME, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.base_time(), BASE_TIME);
    }

    #[test]
    fn test_start_overflow() {
        let res = TrancheSchedule::from_base(u64::MAX - 100, &ScheduleConfig::default());
        assert!(res.is_err());
    }
}
