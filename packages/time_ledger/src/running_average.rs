/// Running mean and variance of the values recorded for one named metric.
///
/// Only the sum, the sum of squares and the sample count are stored, so summaries
/// from different actors merge exactly by adding the fields together.
///
/// # Precision
///
/// The sums are plain `f64` accumulators. Very large values, or very many values,
/// lose precision or overflow to infinity. This is an accepted limitation: the
/// accumulator is meant for diagnostics, not for exact arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningAverage {
    total: f64,
    total_squares: f64,
    count: u64,
}

impl RunningAverage {
    /// Sum of all recorded values.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Sum of the squares of all recorded values.
    #[must_use]
    pub fn total_squares(&self) -> f64 {
        self.total_squares
    }

    /// Number of recorded values.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean of the recorded values, if any value has been recorded.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count_as_f64())
    }

    /// Sample variance of the recorded values.
    ///
    /// `None` with fewer than two values, where the sample variance is undefined.
    #[must_use]
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }

        let count = self.count_as_f64();
        let mean = self.total / count;

        // Cancellation in the subtraction can go slightly negative for near-constant data.
        Some(((self.total_squares - count * mean * mean) / (count - 1.0)).max(0.0))
    }

    /// Sample standard deviation of the recorded values.
    ///
    /// `None` with fewer than two values.
    #[must_use]
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    pub(crate) fn record(&mut self, value: f64) {
        self.total += value;
        self.total_squares += value * value;
        self.count = self.count.saturating_add(1);
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        self.total += other.total;
        self.total_squares += other.total_squares;
        self.count = self.count.saturating_add(other.count);
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts beyond 2^53 are far outside realistic use"
    )]
    fn count_as_f64(&self) -> f64 {
        self.count as f64
    }
}
