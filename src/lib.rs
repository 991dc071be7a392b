//! Rough and dirty wall-clock benchmarking.
//!
//! A [`Bench`] runs a closure a fixed number of times, timing each iteration on a monotonic clock,
//! and prints the times and their mean and standard deviation as text to stdout or a `.dat` file.
//! What is printed is controlled by [`FormatOptions`].
//!
//! There are no warm-up iterations and no outlier rejection.
//! For serious measurements use a statistics-driven harness.
//!
//! ```
#![doc = include_str!("../demos/short.rs")]
//! ```

mod clock;
mod error;
mod options;
mod sink;
mod stats;
mod suite;

pub use clock::{Clock, ManualTime, MonotonicTime, TimeSource};
pub use error::{Error, Result};
pub use options::{FileOutput, FormatOptions, Output, RunConfig, flags};
pub use sink::file_name;
pub use stats::RunStatistics;
pub use suite::{Report, Suite};

use crate::sink::Sink;
use std::{
    env,
    io::{Stdout, Write, stdout},
    path::{Path, PathBuf},
};

/// Runs benchmarks and writes their results.
///
/// `T` is the time source iterations are timed with.
/// `W` is the console: the destination of [`Output::Stdout`] runs and of the progress lines printed by [`run_many`](Self::run_many).
#[derive(Debug)]
pub struct Bench<T = MonotonicTime, W = Stdout> {
    time: T,
    console: W,
    output_dir: PathBuf,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

impl Bench {
    /// Times with [`MonotonicTime`], prints to stdout and creates files in the working directory.
    pub fn new() -> Self {
        Bench {
            time: MonotonicTime::new(),
            console: stdout(),
            output_dir: PathBuf::new(),
        }
    }

    /// Like [`new`](Self::new), but creates files in `RB_OUTPUT_DIR` if it is set.
    pub fn from_env() -> Self {
        let bench = Self::new();
        match env::var_os("RB_OUTPUT_DIR") {
            Some(dir) if !dir.is_empty() => bench.with_output_dir(dir),
            _ => bench,
        }
    }
}

impl<T: TimeSource, W: Write> Bench<T, W> {
    pub fn with_time_source<U: TimeSource>(self, time: U) -> Bench<U, W> {
        Bench {
            time,
            console: self.console,
            output_dir: self.output_dir,
        }
    }

    pub fn with_console<V: Write>(self, console: V) -> Bench<T, V> {
        Bench {
            time: self.time,
            console,
            output_dir: self.output_dir,
        }
    }

    /// Sets the directory [`Output::File`] runs create their files in.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn into_console(self) -> W {
        self.console
    }

    /// Runs `op` `repetitions` times and writes the results as configured by `options`.
    ///
    /// Fails before running anything if the options cannot be satisfied, see [`RunConfig::new`].
    pub fn run(
        &mut self,
        name: &str,
        repetitions: usize,
        options: FormatOptions,
        op: impl FnMut(),
    ) -> Result<RunStatistics> {
        let config = RunConfig::new(name, repetitions, options)?;
        self.run_config(&config, op)
    }

    pub fn run_config(&mut self, config: &RunConfig, mut op: impl FnMut()) -> Result<RunStatistics> {
        let name = config.name();
        let n = config.repetitions();
        let options = config.options();
        tracing::debug!(name, repetitions = n, "starting benchmark run");

        let mut out = Sink::open(name, options.output, &self.output_dir, &mut self.console)?;
        if options.header {
            write!(out, "Running '{name}' {n} times\n")?;
        }

        let mut stats = RunStatistics::new();
        let mut clock = Clock::with_source(&self.time);
        for i in 0..n {
            op();
            let time = clock.elapsed_millis();
            stats.push(time);
            tracing::trace!(name, iteration = i, millis = time, "iteration finished");
            if options.every_run {
                write_iteration(&mut out, options, time, i + 1 == n)?;
            }
            clock.restart();
        }

        if !options.one_line_per_result {
            write!(out, "\n")?;
        }
        if options.mean_and_std_dev {
            if let (Some(mean), Some(std_dev)) = (stats.mean(), stats.std_dev()) {
                write!(out, "Mean run time: {mean:5.6} ms ± {std_dev:5.6} ms\n")?;
            }
        }
        out.flush()?;
        tracing::debug!(name, mean = ?stats.mean(), "finished benchmark run");
        Ok(stats)
    }

    /// Runs every operation of `suite` in name order, each preceded by a `Running <name>` line on the console.
    ///
    /// All runs are validated up front, so an invalid configuration fails before anything is run or printed.
    pub fn run_many(
        &mut self,
        suite: &mut Suite<'_>,
        repetitions: usize,
        options: FormatOptions,
    ) -> Result<Report> {
        let configs = suite
            .names()
            .map(|name| RunConfig::new(name, repetitions, options))
            .collect::<Result<Vec<_>>>()?;
        let mut report = Report::default();
        for (config, (name, op)) in configs.iter().zip(suite.iter_mut()) {
            write!(self.console, "Running {name}\n")?;
            let stats = self.run_config(config, op)?;
            report.push(name, stats);
        }
        Ok(report)
    }
}

fn write_iteration(
    out: &mut impl Write,
    options: &FormatOptions,
    millis: f64,
    last: bool,
) -> Result<()> {
    let unit = if options.unit { " ms" } else { "" };
    let separator = if options.comma_between_runs && !last {
        ","
    } else {
        " "
    };
    let newline = if options.one_line_per_result { "\n" } else { "" };
    write!(out, "{millis:5.6}{unit}{separator}{newline}")?;
    Ok(())
}

#[cfg(test)]
fn manual_bench() -> (ManualTime, Bench<ManualTime, Vec<u8>>) {
    let time = ManualTime::new();
    let bench = Bench::new()
        .with_time_source(time.clone())
        .with_console(Vec::new());
    (time, bench)
}

#[cfg(test)]
fn console_text(bench: Bench<ManualTime, Vec<u8>>) -> String {
    String::from_utf8(bench.into_console()).unwrap()
}

#[test]
fn test_invokes_operation_exactly_n_times() {
    for n in [1, 2, 17] {
        let (_, mut bench) = manual_bench();
        let mut calls = 0;
        let stats = bench.run("count", n, FormatOptions::new(), || calls += 1).unwrap();
        assert_eq!(calls, n);
        assert_eq!(stats.count(), n);
    }
}

#[test]
fn test_header_and_one_line_per_result() {
    let (time, mut bench) = manual_bench();
    let options = FormatOptions::from_bits(
        flags::HEADER | flags::RESULT_FOR_EVERY_RUN | flags::ONE_LINE_PER_RESULT | flags::UNIT,
    );
    bench
        .run("test", 3, options, || time.advance(std::time::Duration::from_micros(1250)))
        .unwrap();
    assert_eq!(
        console_text(bench),
        "Running 'test' 3 times\n1.250000 ms \n1.250000 ms \n1.250000 ms \n"
    );
}

#[test]
fn test_single_line_with_commas() {
    let (time, mut bench) = manual_bench();
    let mut step = 0;
    let options = FormatOptions::new().every_run(true).comma_between_runs(true);
    bench
        .run("commas", 3, options, || {
            step += 1;
            time.advance(std::time::Duration::from_millis(step));
        })
        .unwrap();
    assert_eq!(console_text(bench), "1.000000,2.000000,3.000000 \n");
}

#[test]
fn test_mean_and_std_dev_line() {
    let (time, mut bench) = manual_bench();
    let mut step = 0;
    let stats = bench
        .run("mean", 3, FormatOptions::new().mean_and_std_dev(true), || {
            step += 1;
            time.advance(std::time::Duration::from_millis(step));
        })
        .unwrap();
    assert_eq!(stats.mean(), Some(2.0));
    assert_eq!(console_text(bench), "\nMean run time: 2.000000 ms ± 1.000000 ms\n");
}

#[test]
fn test_identical_iterations_have_zero_std_dev() {
    let (time, mut bench) = manual_bench();
    let options = FormatOptions::new().one_line_per_result(true).mean_and_std_dev(true);
    let stats = bench
        .run("flat", 5, options, || time.advance(std::time::Duration::from_micros(500)))
        .unwrap();
    assert_eq!(stats.std_dev(), Some(0.0));
    assert_eq!(console_text(bench), "Mean run time: 0.500000 ms ± 0.000000 ms\n");
}

#[test]
fn test_every_run_space_separated() {
    let (time, mut bench) = manual_bench();
    let mut seen = Vec::new();
    bench
        .run("untimed", 4, FormatOptions::new().every_run(true), || {
            seen.push(time.now());
            time.advance(std::time::Duration::from_millis(1));
        })
        .unwrap();
    assert_eq!(seen.len(), 4);
    assert!(console_text(bench).starts_with("1.000000 1.000000 "));
}

#[test]
fn test_zero_repetitions() {
    let (_, mut bench) = manual_bench();
    let mut calls = 0;
    let stats = bench
        .run("none", 0, FormatOptions::new().header(true), || calls += 1)
        .unwrap();
    assert_eq!(calls, 0);
    assert_eq!(stats.mean(), None);
    assert_eq!(stats.std_dev(), None);
    assert_eq!(console_text(bench), "Running 'none' 0 times\n\n");

    let (_, mut bench) = manual_bench();
    let err = bench
        .run("none", 0, FormatOptions::new().mean_and_std_dev(true), || calls += 1)
        .unwrap_err();
    assert!(matches!(err, Error::TooFewRepetitions { repetitions: 0, .. }));
    assert_eq!(calls, 0);
    assert!(bench.console().is_empty(), "nothing is printed for rejected runs");
}

#[test]
fn test_run_many_sorted_progress() {
    let (_, mut bench) = manual_bench();
    let order = &std::cell::RefCell::new(Vec::new());
    let mut suite = Suite::new()
        .add("b-test", || order.borrow_mut().push("b"))
        .add("a-test", || order.borrow_mut().push("a"));
    let report = bench.run_many(&mut suite, 2, FormatOptions::new()).unwrap();
    drop(suite);
    assert_eq!(*order.borrow(), ["a", "a", "b", "b"]);
    assert_eq!(console_text(bench), "Running a-test\n\nRunning b-test\n\n");
    let names: Vec<&str> = report.runs().iter().map(|x| x.0.as_str()).collect();
    assert_eq!(names, ["a-test", "b-test"]);
}

#[test]
fn test_run_many_validates_before_running() {
    let (_, mut bench) = manual_bench();
    let mut calls = 0;
    let mut suite = Suite::new().add("only", || calls += 1);
    let options = FormatOptions::new().mean_and_std_dev(true);
    assert!(bench.run_many(&mut suite, 1, options).is_err());
    drop(suite);
    assert_eq!(calls, 0);
    assert!(bench.console().is_empty());
}

#[test]
fn test_write_to_file_truncates_or_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a-b__c__d_e.dat");
    std::fs::write(&path, "previous\n").unwrap();

    let (_, bench) = manual_bench();
    let mut bench = bench.with_output_dir(dir.path());
    let name = r#"a/b "c",d'e"#;
    let file = FormatOptions::new().header(true);

    let append = file.output(Output::File(FileOutput {
        append: true,
        random_suffix: false,
    }));
    bench.run(name, 2, append, || {}).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!("previous\nRunning '{name}' 2 times\n\n"));

    let truncate = file.output(Output::File(FileOutput::default()));
    bench.run(name, 2, truncate, || {}).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!("Running '{name}' 2 times\n\n"));

    assert!(bench.console().is_empty(), "file runs do not print to the console");
}

#[test]
fn test_file_closed_when_operation_panics() {
    let dir = tempfile::tempdir().unwrap();
    let (_, bench) = manual_bench();
    let mut bench = bench.with_output_dir(dir.path());
    let options = FormatOptions::new()
        .header(true)
        .output(Output::File(FileOutput::default()));
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        bench.run("panics", 3, options, || panic!("operation failed"))
    }));
    assert!(result.is_err());
    let content = std::fs::read_to_string(dir.path().join("panics.dat")).unwrap();
    assert_eq!(content, "Running 'panics' 3 times\n");
}

#[test]
fn test_write_failure_propagates() {
    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("broken pipe"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let mut bench = Bench::new()
        .with_time_source(ManualTime::new())
        .with_console(Broken);
    let mut calls = 0;
    let err = bench
        .run("broken", 3, FormatOptions::new().header(true), || calls += 1)
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    assert_eq!(calls, 0);
}
