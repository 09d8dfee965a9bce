//! UUID value generator.

use crate::random::Random;
use specimen_core::Value;
use uuid::Uuid;

/// Generate a version 4 UUID from the session random source.
pub fn generate_uuid_v4(random: &mut Random) -> Value {
    let mut bytes = [0u8; 16];
    random.fill_bytes(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Value::Uuid(Uuid::from_bytes(bytes))
}
