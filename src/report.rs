//! # Report Module
//!
//! Per-extension change tally and the end-of-run summary.
//!
//! Each worker accumulates its own tally; the dispatcher merges them once
//! all files are processed and prints the summary. Nothing is persisted:
//! the tally exists only for the final console report.

use std::collections::BTreeMap;

use owo_colors::{OwoColorize, Stream};

use crate::logging::is_quiet;

/// Count of changed files per extension for one run.
///
/// Write-once per run: workers record into their own instance and the
/// results are merged at the end. The `BTreeMap` keeps the summary ordering
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTally {
  counts: BTreeMap<String, usize>,
}

impl ChangeTally {
  /// Creates an empty tally.
  pub fn new() -> Self {
    Self::default()
  }

  /// Records one changed file for the given extension.
  pub fn record(&mut self, ext: &str) {
    *self.counts.entry(ext.to_string()).or_insert(0) += 1;
  }

  /// Merges another tally into this one.
  pub fn merge(&mut self, other: ChangeTally) {
    for (ext, count) in other.counts {
      *self.counts.entry(ext).or_insert(0) += count;
    }
  }

  /// Number of changed files for one extension.
  pub fn count(&self, ext: &str) -> usize {
    self.counts.get(ext).copied().unwrap_or(0)
  }

  /// Total number of changed files.
  pub fn total(&self) -> usize {
    self.counts.values().sum()
  }

  /// `true` when no file was changed this run.
  pub fn is_empty(&self) -> bool {
    self.counts.is_empty()
  }

  /// Iterates over `(extension, count)` pairs in stable order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
    self.counts.iter().map(|(ext, count)| (ext.as_str(), *count))
  }
}

/// Prints the end-of-run summary mapping each extension to its change
/// count (respects quiet mode).
pub fn print_summary(tally: &ChangeTally) {
  if is_quiet() {
    return;
  }

  println!("{}", "Summary:".if_supports_color(Stream::Stdout, |s| s.green()));
  if tally.is_empty() {
    println!("  No files were updated.");
    return;
  }

  for (ext, count) in tally.iter() {
    println!(
      "  {} file(s) updated with extension '{}'",
      count.if_supports_color(Stream::Stdout, |c| c.yellow()),
      ext
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_record_and_count() {
    let mut tally = ChangeTally::new();
    tally.record(".py");
    tally.record(".py");
    tally.record(".c");

    assert_eq!(tally.count(".py"), 2);
    assert_eq!(tally.count(".c"), 1);
    assert_eq!(tally.count(".h"), 0);
    assert_eq!(tally.total(), 3);
  }

  #[test]
  fn test_merge() {
    let mut left = ChangeTally::new();
    left.record(".py");

    let mut right = ChangeTally::new();
    right.record(".py");
    right.record(".c");

    left.merge(right);
    assert_eq!(left.count(".py"), 2);
    assert_eq!(left.count(".c"), 1);
  }

  #[test]
  fn test_iter_is_stable() {
    let mut tally = ChangeTally::new();
    tally.record(".py");
    tally.record(".c");
    tally.record(".h");

    let exts: Vec<&str> = tally.iter().map(|(ext, _)| ext).collect();
    assert_eq!(exts, vec![".c", ".h", ".py"]);
  }

  #[test]
  fn test_empty_tally() {
    let tally = ChangeTally::new();
    assert!(tally.is_empty());
    assert_eq!(tally.total(), 0);
  }
}
