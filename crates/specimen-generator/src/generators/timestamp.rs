//! Date and timestamp generators.

use crate::random::Random;
use chrono::DateTime;
use specimen_core::Value;

/// Upper bound of generated instants: 2070-01-01T00:00:00Z.
const MAX_EPOCH_SECONDS: i64 = 3_155_760_000;

/// Generate an instant between the Unix epoch and 2070, second precision.
pub fn generate_datetime(random: &mut Random) -> Value {
    let secs = random.long_range(0, MAX_EPOCH_SECONDS);
    Value::DateTime(DateTime::from_timestamp(secs, 0).unwrap_or_default())
}

/// Generate a calendar date between the Unix epoch and 2070.
pub fn generate_date(random: &mut Random) -> Value {
    let secs = random.long_range(0, MAX_EPOCH_SECONDS);
    let instant = DateTime::from_timestamp(secs, 0).unwrap_or_default();
    Value::Date(instant.date_naive())
}
