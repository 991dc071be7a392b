use crate::{
    error::{Error, Result},
    options::{FileOutput, Output},
};
use rand::Rng;
use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Derives the output file name for a benchmark.
///
/// Characters that are awkward in file names are replaced:
/// space, `"`, `,` and `'` become `_`, `%` becomes `p`, and both slashes become `-`.
/// If given, `suffix` is appended as `_NNNNN` before the `.dat` extension.
///
/// ```
/// assert_eq!(rough_bench::file_name(r#"a/b "c",d'e"#, None), "a-b__c__d_e.dat");
/// assert_eq!(rough_bench::file_name("100% sort", Some(42)), "100p_sort_00042.dat");
/// ```
pub fn file_name(name: &str, suffix: Option<u32>) -> String {
    let mut file_name: String = name
        .chars()
        .map(|c| match c {
            ' ' | '"' | ',' | '\'' => '_',
            '%' => 'p',
            '/' | '\\' => '-',
            c => c,
        })
        .collect();
    if let Some(suffix) = suffix {
        file_name.push_str(&format!("_{suffix:05}"));
    }
    file_name.push_str(".dat");
    file_name
}

/// The destination of one run's output.
///
/// A file sink is closed when dropped, whether the run completed or not.
/// The console is only ever flushed.
pub(crate) enum Sink<'a, W: Write> {
    Console(&'a mut W),
    File(BufWriter<File>),
}

impl<'a, W: Write> Sink<'a, W> {
    pub(crate) fn open(name: &str, output: Output, dir: &Path, console: &'a mut W) -> Result<Self> {
        let FileOutput {
            append,
            random_suffix,
        } = match output {
            Output::Stdout => return Ok(Sink::Console(console)),
            Output::File(file) => file,
        };
        let suffix = random_suffix.then(|| rand::rng().random_range(0..99_999));
        let path = dir.join(file_name(name, suffix));
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        tracing::debug!(path = %path.display(), append, "opening benchmark output file");
        match options.open(&path) {
            Ok(file) => Ok(Sink::File(BufWriter::new(file))),
            Err(source) => Err(Error::OpenOutput { path, source }),
        }
    }
}

impl<W: Write> Write for Sink<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Console(w) => w.write(buf),
            Sink::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Console(w) => w.flush(),
            Sink::File(w) => w.flush(),
        }
    }
}

#[test]
fn test_file_name_replacements() {
    assert_eq!(file_name(r#"a/b "c",d'e"#, None), "a-b__c__d_e.dat");
    assert_eq!(file_name(r"50% C:\tmp", None), "50p_C:-tmp.dat");
    assert_eq!(file_name("plain", Some(7)), "plain_00007.dat");
    assert_eq!(file_name("", None), ".dat");
}

#[test]
fn test_console_sink_writes_through() {
    let mut console = Vec::new();
    let mut sink = Sink::open("x", Output::Stdout, Path::new("."), &mut console).unwrap();
    write!(sink, "hello").unwrap();
    drop(sink);
    assert_eq!(console, b"hello");
}

#[test]
fn test_random_suffix_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = Output::File(FileOutput {
        append: false,
        random_suffix: true,
    });
    let mut console = Vec::new();
    drop(Sink::open("rand name", output, dir.path(), &mut console).unwrap());
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names.len(), 1);
    let name = &names[0];
    let digits = name
        .strip_prefix("rand_name_")
        .and_then(|x| x.strip_suffix(".dat"))
        .unwrap_or_else(|| panic!("unexpected file name {name:?}"));
    assert_eq!(digits.len(), 5);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_open_failure_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let mut console = Vec::new();
    let err = Sink::open(
        "x",
        Output::File(FileOutput::default()),
        &missing,
        &mut console,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::OpenOutput { ref path, .. } if *path == missing.join("x.dat")));
}
