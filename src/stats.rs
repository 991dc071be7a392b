/// Running sums over the per-iteration times of one run, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStatistics {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, millis: f64) {
        self.count += 1;
        self.sum += millis;
        self.sum_sq += millis * millis;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `None` if no iterations were recorded.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Sample variance computed from the running sums as `(Σx² − mean²·n) / (n − 1)`.
    ///
    /// `None` for fewer than two iterations.
    /// Rounding can push the difference slightly below zero when all readings are equal,
    /// so the result is clamped at zero.
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        Some(((self.sum_sq - mean * mean * n) / (n - 1.0)).max(0.0))
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

impl Extend<f64> for RunStatistics {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for RunStatistics {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunStatistics::new();
        stats.extend(iter);
        stats
    }
}

#[test]
fn test_mean_matches_arithmetic_mean() {
    let samples = [0.25, 1.5, 3.75, 0.125, 9.0];
    let stats: RunStatistics = samples.iter().copied().collect();
    let expected = samples.iter().sum::<f64>() / samples.len() as f64;
    assert_eq!(stats.count(), 5);
    assert!((stats.mean().unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_std_dev_matches_two_pass() {
    let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let stats: RunStatistics = samples.iter().copied().collect();
    let mean = samples.iter().sum::<f64>() / 8.0;
    let two_pass = (samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 7.0).sqrt();
    assert!((stats.std_dev().unwrap() - two_pass).abs() < 1e-12);
}

#[test]
fn test_identical_samples_have_zero_std_dev() {
    for v in [0.25, 0.5, 2.0, 1536.0] {
        let stats: RunStatistics = std::iter::repeat_n(v, 7).collect();
        assert_eq!(stats.std_dev(), Some(0.0), "v = {v}");
    }
}

#[test]
fn test_degenerate_counts() {
    let empty = RunStatistics::new();
    assert_eq!(empty.mean(), None);
    assert_eq!(empty.std_dev(), None);

    let one: RunStatistics = [4.0].into_iter().collect();
    assert_eq!(one.mean(), Some(4.0));
    assert_eq!(one.variance(), None);
}
