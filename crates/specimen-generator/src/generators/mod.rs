//! Individual value generators.
//!
//! Every scalar kind has a default generator driven by [`Settings`]; the
//! configurable generators in the submodules can replace it for selected
//! nodes.

pub mod container;
pub mod emit;
pub mod numeric;
pub mod period;
pub mod string;
pub mod timestamp;
pub mod uuid;

use crate::generator::Generator;
use crate::random::Random;
use specimen_core::{ScalarKind, Settings, Value};

/// Generate the default value for a scalar kind.
pub fn generate_scalar(kind: ScalarKind, settings: &Settings, random: &mut Random) -> Value {
    match kind {
        ScalarKind::Bool => Value::Bool(random.true_or_false()),

        ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64 => {
            numeric::IntGenerator::of(kind)
                .clamped(settings.int_min, settings.int_max)
                .generate(random)
        }

        ScalarKind::Float32 => {
            Value::Float32(random.double_range(settings.float_min, settings.float_max) as f32)
        }

        ScalarKind::Float64 => {
            Value::Float64(random.double_range(settings.float_min, settings.float_max))
        }

        ScalarKind::Char => Value::Char(random.upper_char()),

        ScalarKind::String => string::StringGenerator::new()
            .min(settings.string_min_length)
            .max(settings.string_max_length)
            .generate(random)
            .into(),

        ScalarKind::Uuid => uuid::generate_uuid_v4(random),

        ScalarKind::Date => timestamp::generate_date(random),

        ScalarKind::DateTime => timestamp::generate_datetime(random),

        ScalarKind::Period => period::PeriodGenerator::new().generate(random).into(),
    }
}
