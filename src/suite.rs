use crate::stats::RunStatistics;
use std::{collections::BTreeMap, fmt};
use tabled::settings::Style;

/// A set of named operations for [`Bench::run_many`](crate::Bench::run_many).
///
/// Operations are executed in lexicographic order of their names,
/// independent of the order they were added in.
/// Adding an operation under an existing name replaces the earlier one.
#[derive(Default)]
pub struct Suite<'a> {
    operations: BTreeMap<String, Box<dyn FnMut() + 'a>>,
}

impl<'a> Suite<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: impl Into<String>, op: impl FnMut() + 'a) -> Self {
        self.insert(name, op);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, op: impl FnMut() + 'a) {
        let name = name.into();
        if self.operations.insert(name.clone(), Box::new(op)).is_some() {
            tracing::warn!(name, "replacing benchmark operation with the same name");
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut (dyn FnMut() + 'a))> {
        self.operations
            .iter_mut()
            .map(|(name, op)| (name.as_str(), &mut **op))
    }
}

impl fmt::Debug for Suite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<'a, K: Into<String>, F: FnMut() + 'a> FromIterator<(K, F)> for Suite<'a> {
    fn from_iter<T: IntoIterator<Item = (K, F)>>(iter: T) -> Self {
        let mut suite = Suite::new();
        for (name, op) in iter {
            suite.insert(name, op);
        }
        suite
    }
}

/// Statistics of every run performed by one [`run_many`](crate::Bench::run_many) call, in execution order.
///
/// Displays as a markdown table with one row per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    runs: Vec<(String, RunStatistics)>,
}

impl Report {
    pub(crate) fn push(&mut self, name: &str, stats: RunStatistics) {
        self.runs.push((name.to_string(), stats));
    }

    pub fn runs(&self) -> &[(String, RunStatistics)] {
        &self.runs
    }

    pub fn get(&self, name: &str) -> Option<&RunStatistics> {
        self.runs.iter().find(|x| x.0 == name).map(|x| &x.1)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = |x: Option<f64>| x.map(|x| format!("{x:.6} ms")).unwrap_or_else(|| "-".into());
        let mut table = tabled::builder::Builder::new();
        table.push_record(["name", "iterations", "mean", "std dev"]);
        for (name, stats) in &self.runs {
            table.push_record([
                name.clone(),
                stats.count().to_string(),
                millis(stats.mean()),
                millis(stats.std_dev()),
            ]);
        }
        let mut table = table.build();
        table.with(Style::markdown());
        write!(f, "{table}")
    }
}

#[test]
fn test_names_are_sorted() {
    let suite = Suite::new()
        .add("b-test", || {})
        .add("c", || {})
        .add("a-test", || {});
    assert_eq!(suite.names().collect::<Vec<_>>(), ["a-test", "b-test", "c"]);
    assert_eq!(suite.len(), 3);
}

#[test]
fn test_duplicate_name_replaces() {
    let hits = &std::cell::RefCell::new(Vec::new());
    let mut suite: Suite = [("x", 1), ("x", 2)]
        .into_iter()
        .map(|(name, id)| (name, move || hits.borrow_mut().push(id)))
        .collect();
    assert_eq!(suite.len(), 1);
    for (_, op) in suite.iter_mut() {
        op();
    }
    drop(suite);
    assert_eq!(*hits.borrow(), [2]);
}

#[test]
fn test_report_table() {
    let mut report = Report::default();
    report.push("fast", [1.0, 3.0].into_iter().collect());
    report.push("empty", RunStatistics::new());
    let table = report.to_string();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4, "{table}");
    assert!(lines[0].contains("name") && lines[0].contains("std dev"));
    assert!(lines[2].contains("fast") && lines[2].contains("2.000000 ms"));
    assert!(lines[2].contains("1.414214 ms"));
    assert!(lines[3].contains("empty") && lines[3].contains('-'));
    assert_eq!(report.get("fast").unwrap().count(), 2);
}
