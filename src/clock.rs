mod manual;
mod monotonic;

pub use manual::ManualTime;
pub use monotonic::MonotonicTime;

use crate::error::{Error, Result};
use std::time::Duration;

/// A source of monotonic timestamps used by a [`Clock`].
///
/// Timestamps are offsets from an arbitrary origin fixed for the lifetime of the source.
/// Consecutive calls to [`now`](Self::now) must never decrease.
///
/// This crate comes with two implementations.
/// [`MonotonicTime`] is backed by [`std::time::Instant`] and is what a default [`Bench`](crate::Bench) uses.
/// [`ManualTime`] only moves when told to, which makes readings exact and reproducible.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Time since `since` counts towards the reading.
    Running { since: Duration },
    Paused,
}

/// A stopwatch reporting fractional milliseconds.
///
/// A clock is either running or paused.
/// While running, the reading is the time since the last reference point plus all time banked by earlier pauses.
/// While paused, the reading is the banked time alone and does not advance.
///
/// | method               | running                      | paused                        |
/// |----------------------|------------------------------|-------------------------------|
/// | [`restart`]          | reference := now             | reference := now, run         |
/// | [`pause`]            | bank elapsed, pause          | [`Error::ClockAlreadyPaused`] |
/// | [`resume`]           | [`Error::ClockNotPaused`]    | reference := now, run         |
/// | [`reset`]            | discard banked, restart      | discard banked, restart       |
///
/// [`restart`]: Self::restart
/// [`pause`]: Self::pause
/// [`resume`]: Self::resume
/// [`reset`]: Self::reset
#[derive(Debug)]
pub struct Clock<T: TimeSource = MonotonicTime> {
    source: T,
    state: State,
    banked: Duration,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Starts a clock on the system monotonic clock.
    pub fn new() -> Self {
        Self::with_source(MonotonicTime::new())
    }
}

impl<T: TimeSource> Clock<T> {
    /// Starts a clock reading from `source`.
    pub fn with_source(source: T) -> Self {
        let since = source.now();
        Clock {
            source,
            state: State::Running { since },
            banked: Duration::ZERO,
        }
    }

    /// Moves the reference point to now, keeping banked time.
    pub fn restart(&mut self) {
        self.state = State::Running {
            since: self.source.now(),
        };
    }

    pub fn pause(&mut self) -> Result<()> {
        let State::Running { since } = self.state else {
            return Err(Error::ClockAlreadyPaused);
        };
        self.banked += self.source.now().saturating_sub(since);
        self.state = State::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != State::Paused {
            return Err(Error::ClockNotPaused);
        }
        self.restart();
        Ok(())
    }

    /// Discards banked time and starts timing from now.
    pub fn reset(&mut self) {
        self.banked = Duration::ZERO;
        self.restart();
    }

    pub fn is_paused(&self) -> bool {
        self.state == State::Paused
    }

    pub fn elapsed(&self) -> Duration {
        match self.state {
            State::Running { since } => self.source.now().saturating_sub(since) + self.banked,
            State::Paused => self.banked,
        }
    }

    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_nanos() as f64 / 1e6
    }
}

#[test]
fn test_running_clock_reads_since_reference() {
    let time = ManualTime::new();
    let mut clock = Clock::with_source(time.clone());
    time.advance(Duration::from_micros(1500));
    assert_eq!(clock.elapsed_millis(), 1.5);
    assert_eq!(clock.elapsed_millis(), 1.5, "reading has no side effects");

    clock.restart();
    assert_eq!(clock.elapsed_millis(), 0.0);
    time.advance(Duration::from_millis(2));
    assert_eq!(clock.elapsed_millis(), 2.0);
}

#[test]
fn test_pause_banks_time() {
    let time = ManualTime::new();
    let mut clock = Clock::with_source(time.clone());
    time.advance(Duration::from_millis(3));
    clock.pause().unwrap();
    assert!(clock.is_paused());

    time.advance(Duration::from_millis(100));
    assert_eq!(clock.elapsed_millis(), 3.0, "paused time is excluded");

    clock.resume().unwrap();
    time.advance(Duration::from_millis(4));
    assert_eq!(clock.elapsed_millis(), 7.0);

    clock.restart();
    time.advance(Duration::from_millis(1));
    assert_eq!(clock.elapsed_millis(), 4.0, "restart keeps banked time");

    clock.reset();
    assert_eq!(clock.elapsed_millis(), 0.0);
}

#[test]
fn test_invalid_transitions_leave_state_unchanged() {
    let time = ManualTime::new();
    let mut clock = Clock::with_source(&time);
    assert!(matches!(clock.resume(), Err(Error::ClockNotPaused)));

    time.advance(Duration::from_millis(2));
    clock.pause().unwrap();
    time.advance(Duration::from_millis(2));
    assert!(matches!(clock.pause(), Err(Error::ClockAlreadyPaused)));
    assert_eq!(clock.elapsed_millis(), 2.0, "double pause does not double count");
}

#[test]
fn test_restart_while_paused_runs_again() {
    let time = ManualTime::new();
    let mut clock = Clock::with_source(&time);
    time.advance(Duration::from_millis(1));
    clock.pause().unwrap();
    clock.restart();
    assert!(!clock.is_paused());
    time.advance(Duration::from_millis(1));
    assert_eq!(clock.elapsed_millis(), 2.0);
}

#[test]
fn test_monotonic_clock_advances() {
    let clock = Clock::new();
    std::thread::sleep(Duration::from_millis(5));
    let first = clock.elapsed_millis();
    assert!(first >= 4.0, "elapsed {first} ms");
    assert!(clock.elapsed_millis() >= first);
}
