//! RandomSource adapters.

mod sequence;
mod std_random;

pub use sequence::SequenceRandomSource;
pub use std_random::{SeededRandomSource, ThreadRandomSource};
