//! Period generator.

use crate::generator::Generator;
use crate::random::Random;
use specimen_core::{ensure_range, ConfigError, Period};

/// Generates [`Period`] values with independently bounded components.
///
/// Defaults: days `1..=365`, months `0..=0`, years `0..=0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodGenerator {
    min_days: i32,
    max_days: i32,
    min_months: i32,
    max_months: i32,
    min_years: i32,
    max_years: i32,
}

impl PeriodGenerator {
    pub fn new() -> Self {
        Self {
            min_days: 1,
            max_days: 365,
            min_months: 0,
            max_months: 0,
            min_years: 0,
            max_years: 0,
        }
    }

    pub fn days(mut self, min: i32, max: i32) -> Result<Self, ConfigError> {
        ensure_range("Period days", min, max)?;
        self.min_days = min;
        self.max_days = max;
        Ok(self)
    }

    pub fn months(mut self, min: i32, max: i32) -> Result<Self, ConfigError> {
        ensure_range("Period months", min, max)?;
        self.min_months = min;
        self.max_months = max;
        Ok(self)
    }

    pub fn years(mut self, min: i32, max: i32) -> Result<Self, ConfigError> {
        ensure_range("Period years", min, max)?;
        self.min_years = min;
        self.max_years = max;
        Ok(self)
    }
}

impl Default for PeriodGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for PeriodGenerator {
    type Output = Period;

    fn generate(&self, random: &mut Random) -> Period {
        Period::of(
            random.int_range(self.min_years, self.max_years),
            random.int_range(self.min_months, self.max_months),
            random.int_range(self.min_days, self.max_days),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let generator = PeriodGenerator::new();
        let mut random = Random::new(42);

        for _ in 0..100 {
            let period = generator.generate(&mut random);
            assert!((1..=365).contains(&period.days));
            assert_eq!(period.months, 0);
            assert_eq!(period.years, 0);
        }
    }

    #[test]
    fn test_configured_bounds() {
        let generator = PeriodGenerator::new()
            .days(5, 6)
            .unwrap()
            .months(1, 2)
            .unwrap()
            .years(10, 10)
            .unwrap();
        let mut random = Random::new(42);

        for _ in 0..100 {
            let period = generator.generate(&mut random);
            assert!((5..=6).contains(&period.days));
            assert!((1..=2).contains(&period.months));
            assert_eq!(period.years, 10);
        }
    }

    #[test]
    fn test_invalid_days() {
        let err = PeriodGenerator::new().days(5, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Period days 'min' must be less than or equal 'max': Period days(5, 1)"
        );
    }

    #[test]
    fn test_invalid_months_and_years() {
        assert!(matches!(
            PeriodGenerator::new().months(3, 2),
            Err(ConfigError::InvalidRange { .. })
        ));
        assert!(matches!(
            PeriodGenerator::new().years(1, 0),
            Err(ConfigError::InvalidRange { .. })
        ));
    }
}
