//! Integer generator.

use crate::generator::Generator;
use crate::random::Random;
use specimen_core::{ensure_range, ConfigError, ScalarKind, Value};

/// Generates integers of one width within an inclusive range.
///
/// The output variant always matches the kind the generator was created for,
/// so it can target `i8`, `i16`, `i32` and `i64` nodes alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntGenerator {
    kind: ScalarKind,
    min: i64,
    max: i64,
}

impl IntGenerator {
    /// Generator for a 32-bit integer in `1..=10000`.
    pub fn new() -> Self {
        Self::of(ScalarKind::Int32)
    }

    /// Generator for the given integer kind in `1..=10000`.
    ///
    /// Non-integer kinds fall back to `i64`.
    pub fn of(kind: ScalarKind) -> Self {
        let kind = match kind {
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 => kind,
            _ => ScalarKind::Int64,
        };
        Self {
            kind,
            min: 1,
            max: 10_000,
        }
        .clamped(1, 10_000)
    }

    /// Set the inclusive range; both bounds must fit the integer kind.
    pub fn range(mut self, min: i64, max: i64) -> Result<Self, ConfigError> {
        ensure_range("int", min, max)?;
        let (lo, hi) = self.bounds();
        if min < lo || max > hi {
            return Err(ConfigError::invalid_range(self.kind.name(), min, max));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    /// Set the range, clamping both bounds into the integer kind.
    pub fn clamped(mut self, min: i64, max: i64) -> Self {
        let (lo, hi) = self.bounds();
        self.min = min.clamp(lo, hi);
        self.max = max.clamp(lo, hi).max(self.min);
        self
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    fn bounds(&self) -> (i64, i64) {
        match self.kind {
            ScalarKind::Int8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
            ScalarKind::Int16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
            ScalarKind::Int32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
            _ => (i64::MIN, i64::MAX),
        }
    }
}

impl Default for IntGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for IntGenerator {
    type Output = Value;

    fn generate(&self, random: &mut Random) -> Value {
        let n = random.long_range(self.min, self.max);
        // Bounds are clamped to the kind, so the narrowing casts are lossless.
        match self.kind {
            ScalarKind::Int8 => Value::Int8(n as i8),
            ScalarKind::Int16 => Value::Int16(n as i16),
            ScalarKind::Int32 => Value::Int32(n as i32),
            _ => Value::Int64(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_respected() {
        let generator = IntGenerator::new().range(-3, 3).unwrap();
        let mut random = Random::new(42);

        for _ in 0..200 {
            let value = generator.generate(&mut random);
            let Value::Int32(n) = value else {
                panic!("Expected Int32, got {value:?}");
            };
            assert!((-3..=3).contains(&n));
        }
    }

    #[test]
    fn test_single_value_range() {
        let generator = IntGenerator::of(ScalarKind::Int64).range(9, 9).unwrap();
        assert_eq!(generator.generate(&mut Random::new(1)), Value::Int64(9));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = IntGenerator::new().range(5, 1).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn test_out_of_kind_range_rejected() {
        assert!(IntGenerator::of(ScalarKind::Int8).range(0, 300).is_err());
        assert!(IntGenerator::of(ScalarKind::Int8).range(-128, 127).is_ok());
    }

    #[test]
    fn test_clamped() {
        let generator = IntGenerator::of(ScalarKind::Int16).clamped(-100_000, 100_000);
        assert_eq!(generator.min(), i64::from(i16::MIN));
        assert_eq!(generator.max(), i64::from(i16::MAX));
    }
}
