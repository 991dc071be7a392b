use crate::error::{Error, Result};
use std::env;

/// Bit values of the legacy integer format options, accepted by [`FormatOptions::from_bits`].
pub mod flags {
    pub const DONT_PRINT: u32 = 0;
    pub const RESULT_FOR_EVERY_RUN: u32 = 1;
    pub const ONE_LINE_PER_RESULT: u32 = 1 << 1;
    pub const HEADER: u32 = 1 << 2;
    pub const MEAN_AND_STANDARD_DEVIATION: u32 = 1 << 3;
    pub const COMMA_BETWEEN_RUNS: u32 = 1 << 4;
    pub const UNIT: u32 = 1 << 5;
    pub const WRITE_TO_FILE: u32 = 1 << 6;
    pub const APPEND_TO_FILE: u32 = 1 << 7;
    pub const RANDOM_FILE_NAME: u32 = 1 << 8;
}

/// Where the output of a run goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Output {
    /// The bench's console, standard output by default.
    #[default]
    Stdout,
    /// A `.dat` file named after the benchmark.
    File(FileOutput),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutput {
    /// Append to an existing file instead of truncating it.
    pub append: bool,
    /// Add a random 5-digit suffix to the file name.
    pub random_suffix: bool,
}

/// Controls what a run prints and where.
///
/// All options are independent and off by default, in which case a run prints a single empty line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Print the time of every iteration.
    pub every_run: bool,
    /// End each iteration's time with a newline instead of printing one newline after the loop.
    pub one_line_per_result: bool,
    /// Print `Running '<name>' <n> times` before the loop.
    pub header: bool,
    /// Print mean and standard deviation after the loop.
    pub mean_and_std_dev: bool,
    /// Separate iteration times with commas instead of spaces.
    pub comma_between_runs: bool,
    /// Print ` ms` after every iteration time.
    pub unit: bool,
    pub output: Output,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the legacy bitset from [`flags`].
    ///
    /// Unknown bits are ignored, as are the append and random name bits when the write to file bit is absent.
    pub fn from_bits(bits: u32) -> Self {
        let set = |flag: u32| bits & flag != 0;
        FormatOptions {
            every_run: set(flags::RESULT_FOR_EVERY_RUN),
            one_line_per_result: set(flags::ONE_LINE_PER_RESULT),
            header: set(flags::HEADER),
            mean_and_std_dev: set(flags::MEAN_AND_STANDARD_DEVIATION),
            comma_between_runs: set(flags::COMMA_BETWEEN_RUNS),
            unit: set(flags::UNIT),
            output: if set(flags::WRITE_TO_FILE) {
                Output::File(FileOutput {
                    append: set(flags::APPEND_TO_FILE),
                    random_suffix: set(flags::RANDOM_FILE_NAME),
                })
            } else {
                Output::Stdout
            },
        }
    }

    /// Reads options from `RB_FORMAT`, a comma separated list of option names.
    ///
    /// Recognized names are
    /// `every-run`, `one-line`, `header`, `mean`, `comma`, `unit`, `file`, `append`, and `random-name`.
    /// Unknown names are skipped with a warning.
    /// Returns `None` if the variable is not set.
    pub fn from_env() -> Option<Self> {
        let list = env::var("RB_FORMAT").ok()?;
        Some(Self::parse_names(&list))
    }

    fn parse_names(list: &str) -> Self {
        let mut bits = 0;
        for name in list.split(',').map(str::trim).filter(|x| !x.is_empty()) {
            bits |= match name {
                "every-run" => flags::RESULT_FOR_EVERY_RUN,
                "one-line" => flags::ONE_LINE_PER_RESULT,
                "header" => flags::HEADER,
                "mean" => flags::MEAN_AND_STANDARD_DEVIATION,
                "comma" => flags::COMMA_BETWEEN_RUNS,
                "unit" => flags::UNIT,
                "file" => flags::WRITE_TO_FILE,
                "append" => flags::APPEND_TO_FILE,
                "random-name" => flags::RANDOM_FILE_NAME,
                _ => {
                    tracing::warn!(
                        "unrecognized format option in RB_FORMAT: {name:?}.\nSupported values: every-run, one-line, header, mean, comma, unit, file, append, random-name"
                    );
                    continue;
                }
            };
        }
        Self::from_bits(bits)
    }

    pub fn every_run(mut self, yes: bool) -> Self {
        self.every_run = yes;
        self
    }

    pub fn one_line_per_result(mut self, yes: bool) -> Self {
        self.one_line_per_result = yes;
        self
    }

    pub fn header(mut self, yes: bool) -> Self {
        self.header = yes;
        self
    }

    pub fn mean_and_std_dev(mut self, yes: bool) -> Self {
        self.mean_and_std_dev = yes;
        self
    }

    pub fn comma_between_runs(mut self, yes: bool) -> Self {
        self.comma_between_runs = yes;
        self
    }

    pub fn unit(mut self, yes: bool) -> Self {
        self.unit = yes;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }
}

/// A validated description of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    name: String,
    repetitions: usize,
    options: FormatOptions,
}

impl RunConfig {
    /// Fails with [`Error::TooFewRepetitions`] if mean and standard deviation
    /// are requested for fewer than two repetitions.
    pub fn new(name: impl Into<String>, repetitions: usize, options: FormatOptions) -> Result<Self> {
        let name = name.into();
        if options.mean_and_std_dev && repetitions < 2 {
            return Err(Error::TooFewRepetitions { name, repetitions });
        }
        Ok(RunConfig {
            name,
            repetitions,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }
}

#[test]
fn test_from_bits() {
    use flags::*;
    assert_eq!(FormatOptions::from_bits(DONT_PRINT), FormatOptions::new());
    assert_eq!(
        FormatOptions::from_bits(HEADER | RESULT_FOR_EVERY_RUN | ONE_LINE_PER_RESULT | UNIT),
        FormatOptions::new()
            .header(true)
            .every_run(true)
            .one_line_per_result(true)
            .unit(true)
    );
    assert_eq!(
        FormatOptions::from_bits(WRITE_TO_FILE | APPEND_TO_FILE).output,
        Output::File(FileOutput {
            append: true,
            random_suffix: false,
        })
    );
    assert_eq!(
        FormatOptions::from_bits(APPEND_TO_FILE | RANDOM_FILE_NAME).output,
        Output::Stdout
    );
}

#[test]
fn test_parse_names() {
    assert_eq!(
        FormatOptions::parse_names("header, mean,,bogus,file,random-name"),
        FormatOptions::new()
            .header(true)
            .mean_and_std_dev(true)
            .output(Output::File(FileOutput {
                append: false,
                random_suffix: true,
            }))
    );
    assert_eq!(FormatOptions::parse_names(""), FormatOptions::new());
}

#[test]
fn test_run_config_validation() {
    let mean = FormatOptions::new().mean_and_std_dev(true);
    for repetitions in [0, 1] {
        assert!(matches!(
            RunConfig::new("x", repetitions, mean),
            Err(Error::TooFewRepetitions { repetitions: r, .. }) if r == repetitions
        ));
    }
    assert_eq!(RunConfig::new("x", 2, mean).unwrap().repetitions(), 2);
    assert_eq!(RunConfig::new("x", 0, FormatOptions::new()).unwrap().name(), "x");
}
