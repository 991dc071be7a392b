use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors produced while configuring or executing a benchmark run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The output file could not be created or opened.
    #[error("failed to open output file {}: {source}", path.display())]
    OpenOutput {
        /// Full path of the file that was being opened.
        path: PathBuf,
        source: io::Error,
    },

    /// Writing or flushing benchmark output failed.
    #[error("failed to write benchmark output: {0}")]
    Write(#[from] io::Error),

    /// Mean and standard deviation were requested for a run that cannot produce them.
    #[error(
        "benchmark '{name}' needs at least 2 repetitions for mean and standard deviation, got {repetitions}"
    )]
    TooFewRepetitions { name: String, repetitions: usize },

    #[error("clock is already paused")]
    ClockAlreadyPaused,

    #[error("clock is not paused")]
    ClockNotPaused,
}

/// A `Result` with this crate's [`Error`] as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn test_error_messages() {
    let err = Error::TooFewRepetitions {
        name: "sort".to_string(),
        repetitions: 1,
    };
    assert_eq!(
        err.to_string(),
        "benchmark 'sort' needs at least 2 repetitions for mean and standard deviation, got 1"
    );

    let err = Error::OpenOutput {
        path: PathBuf::from("out/sort.dat"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(err.to_string(), "failed to open output file out/sort.dat: denied");
}

#[test]
fn test_io_error_converts() {
    fn fails() -> Result<()> {
        Err(io::Error::other("disk full"))?;
        Ok(())
    }
    assert!(matches!(fails(), Err(Error::Write(_))));
}
