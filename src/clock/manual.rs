use super::TimeSource;
use std::{cell::Cell, rc::Rc, time::Duration};

/// A time source that only moves when [`advance`](Self::advance) is called.
///
/// Clones share the same timeline, so a benchmarked closure can hold one clone
/// and advance it to simulate work while the [`Bench`](crate::Bench) reads another.
/// This gives exact, reproducible per-iteration readings.
///
/// ```
/// use rough_bench::{Bench, FormatOptions, ManualTime};
/// use std::time::Duration;
///
/// let time = ManualTime::new();
/// let mut bench = Bench::new().with_time_source(time.clone()).with_console(Vec::new());
/// let stats = bench
///     .run("simulated", 4, FormatOptions::new(), || {
///         time.advance(Duration::from_millis(2))
///     })
///     .unwrap();
/// assert_eq!(stats.mean(), Some(2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[test]
fn test_clones_share_timeline() {
    let a = ManualTime::new();
    let b = a.clone();
    a.advance(Duration::from_millis(3));
    b.advance(Duration::from_millis(4));
    assert_eq!(a.now(), Duration::from_millis(7));
    assert_eq!(b.now(), a.now());
}
