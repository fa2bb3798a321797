//! # Field Updater
//!
//! In-place patching of the `Last Modified:` and `Version:` bookkeeping
//! fields inside the bounded header window, gated by a file-age freshness
//! check.
//!
//! The freshness gate protects untouched legacy files: a routine re-run must
//! not perturb files nobody edited recently, which is why the Last-Modified
//! field is a best-effort courtesy rather than authoritative.

use std::path::Path;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;

use crate::header::HEADER_WINDOW;
use crate::source_file::SourceFile;

/// Label introducing the timestamp field.
const LAST_MODIFIED_LABEL: &str = "Last Modified:";

/// Timestamp format written into the field.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Matches a `Version:` label followed by a dotted numeric value.
static VERSION_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(Version:\s*)(\d+(?:\.\d+)*)").expect("version regex must compile"));

/// Outcome of a field refresh, one flag per sub-operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOutcome {
  /// The `Last Modified:` line was rewritten.
  pub timestamp_updated: bool,
  /// The `Version:` value was rewritten.
  pub version_updated: bool,
}

impl FieldOutcome {
  /// `true` if either sub-operation wrote a change.
  pub const fn any(self) -> bool {
    self.timestamp_updated || self.version_updated
  }
}

/// Checks whether a file's modification time falls inside the freshness
/// window.
///
/// Files older than `max_age_minutes` are left alone entirely.
///
/// # Errors
///
/// Returns an error if the file's metadata cannot be read.
pub fn is_fresh(path: &Path, max_age_minutes: u64) -> Result<bool> {
  let metadata =
    std::fs::metadata(path).with_context(|| format!("Failed to stat file: {}", path.display()))?;
  let mtime = metadata
    .modified()
    .with_context(|| format!("Failed to read modification time: {}", path.display()))?;

  let age = SystemTime::now().duration_since(mtime).unwrap_or(Duration::ZERO);
  Ok(age <= Duration::from_secs(max_age_minutes * 60))
}

/// Refreshes the bookkeeping fields in the first [`HEADER_WINDOW`] lines.
///
/// Two independent sub-operations, each stopping at its first matching line
/// regardless of outcome:
/// - `Last Modified:` gets its value rewritten to `now`, preserving the
///   line's prefix up to and including the label.
/// - `Version:` is touched only when the captured dotted numeric value differs from
///   `new_version`, only that numeric token is rewritten; everything else on
///   the line stays byte-identical.
///
/// The caller persists the file once if either flag is set.
pub fn refresh_fields(file: &mut SourceFile, new_version: &str, now: DateTime<Local>) -> FieldOutcome {
  let mut outcome = FieldOutcome::default();

  let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
  for line in file.lines.iter_mut().take(HEADER_WINDOW) {
    if let Some(idx) = line.find(LAST_MODIFIED_LABEL) {
      let ending = if line.ends_with('\n') { "\n" } else { "" };
      let new_line = format!("{}{} {}{}", &line[..idx], LAST_MODIFIED_LABEL, timestamp, ending);
      if *line != new_line {
        *line = new_line;
        outcome.timestamp_updated = true;
      }
      break;
    }
  }

  for line in file.lines.iter_mut().take(HEADER_WINDOW) {
    if let Some(caps) = VERSION_REGEX.captures(line) {
      if &caps[2] != new_version {
        let rebuilt = VERSION_REGEX
          .replace(line, |c: &regex::Captures| format!("{}{}", &c[1], new_version))
          .into_owned();
        *line = rebuilt;
        outcome.version_updated = true;
      }
      break;
    }
  }

  outcome
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use chrono::TimeZone;

  use super::*;

  fn file(content: &str) -> SourceFile {
    SourceFile::from_content(Path::new("sample.py"), content)
  }

  fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 7, 22, 23, 23, 44).single().expect("valid timestamp")
  }

  #[test]
  fn test_timestamp_rewrite_preserves_prefix() {
    let mut f = file("#  Author: someone\n#  Last Modified: 2024-01-01 00:00:00\ncode = 1\n");
    let outcome = refresh_fields(&mut f, "1.0", fixed_now());
    assert!(outcome.timestamp_updated);
    assert!(!outcome.version_updated);
    assert_eq!(f.lines[1], "#  Last Modified: 2025-07-22 23:23:44\n");
  }

  #[test]
  fn test_timestamp_already_current_is_no_change() {
    let mut f = file("# Last Modified: 2025-07-22 23:23:44\n");
    let outcome = refresh_fields(&mut f, "1.0", fixed_now());
    assert!(!outcome.any());
  }

  #[test]
  fn test_version_rewrites_only_numeric_token() {
    let mut f = file("//   Version:       1.2.3   (stable)\nfn main() {}\n");
    let outcome = refresh_fields(&mut f, "1.3.0", fixed_now());
    assert!(outcome.version_updated);
    assert_eq!(f.lines[0], "//   Version:       1.3.0   (stable)\n");
  }

  #[test]
  fn test_version_unchanged_when_equal() {
    let mut f = file("// Version: 1.3.0\n");
    let outcome = refresh_fields(&mut f, "1.3.0", fixed_now());
    assert!(!outcome.version_updated);
    assert_eq!(f.lines[0], "// Version: 1.3.0\n");
  }

  #[test]
  fn test_first_match_wins_even_when_unchanged() {
    // The first Version line already matches, so the second one two lines
    // down must not be touched.
    let mut f = file("// Version: 2.0\n// mirror of Version: 1.0\n");
    let outcome = refresh_fields(&mut f, "2.0", fixed_now());
    assert!(!outcome.version_updated);
    assert_eq!(f.lines[1], "// mirror of Version: 1.0\n");
  }

  #[test]
  fn test_fields_outside_window_are_ignored() {
    let mut content = String::new();
    for i in 0..HEADER_WINDOW {
      content.push_str(&format!("line {i}\n"));
    }
    content.push_str("# Last Modified: 2024-01-01 00:00:00\n# Version: 0.1\n");

    let mut f = file(&content);
    let outcome = refresh_fields(&mut f, "9.9", fixed_now());
    assert!(!outcome.any());
    assert_eq!(f.content(), content);
  }

  #[test]
  fn test_is_fresh_for_new_and_old_files() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.py");
    std::fs::write(&path, "code = 1\n").expect("write sample");

    assert!(is_fresh(&path, 30).expect("fresh check"));

    // Push the mtime an hour into the past.
    let old = SystemTime::now() - Duration::from_secs(3600);
    let handle = std::fs::OpenOptions::new().append(true).open(&path).expect("open");
    handle
      .set_times(std::fs::FileTimes::new().set_modified(old))
      .expect("set mtime");
    drop(handle);

    assert!(!is_fresh(&path, 30).expect("stale check"));
  }
}
