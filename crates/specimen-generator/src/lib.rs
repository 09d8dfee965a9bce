//! Value generation for the specimen fixture generator.
//!
//! This crate provides the pieces that actually produce values: a seeded
//! [`Random`] source, the [`Generator`] capability with a handful of
//! representative leaf generators, [`ContainerSpec`] for sizing arrays,
//! collections and maps, and the [`EmitGenerator`] / [`EmitQueue`] pair that
//! hands out pre-supplied values.
//!
//! # Architecture
//!
//! ```text
//!   Settings + Random (StdRng, seeded)
//!          │
//!          ▼
//! ┌────────────────────────┐      ┌──────────────────────┐
//! │ generate_scalar()      │      │ EmitGenerator        │
//! │ PeriodGenerator        │      │  items / item(v, n)  │
//! │ StringGenerator        │      │  shuffle / flags     │
//! │ IntGenerator           │      └──────────┬───────────┘
//! │ user Generator impls   │                 │ per session
//! └───────────┬────────────┘                 ▼
//!             │                        EmitQueue::poll()
//!             ▼                              │
//!           Value  ◄─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use specimen_generator::{Generator, PeriodGenerator, Random};
//!
//! let generator = PeriodGenerator::new()
//!     .days(1, 10).unwrap()
//!     .years(2, 3).unwrap();
//!
//! let mut random = Random::new(42);
//! let period = generator.generate(&mut random);
//! assert!((1..=10).contains(&period.days));
//! assert!((2..=3).contains(&period.years));
//! ```

pub mod generator;
pub mod generators;
pub mod random;

// Re-exports for convenience
pub use generator::{from_fn, FnGenerator, Generator, ValueGenerator};
pub use generators::container::ContainerSpec;
pub use generators::emit::{EmitGenerator, EmitQueue, Emitted};
pub use generators::numeric::IntGenerator;
pub use generators::period::PeriodGenerator;
pub use generators::string::StringGenerator;
pub use generators::generate_scalar;
pub use random::Random;
