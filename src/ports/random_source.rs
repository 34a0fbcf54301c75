//! RandomSource port - Injectable source of uniform floats.
//!
//! Coherence calibration adds a small jitter to its baseline. Drawing it
//! through this port lets tests substitute a fixed sequence.

/// Port for drawing uniform random floats.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `[min, max]`.
    fn next_float(&self, min: f64, max: f64) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Midpoint;

    impl RandomSource for Midpoint {
        fn next_float(&self, min: f64, max: f64) -> f64 {
            (min + max) / 2.0
        }
    }

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn RandomSource) {}

    #[test]
    fn trait_object_draws_through_dyn() {
        let source: Box<dyn RandomSource> = Box::new(Midpoint);
        assert_eq!(source.next_float(0.0, 1.0), 0.5);
    }
}
