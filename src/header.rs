//! # Header Block Engine
//!
//! Detects, replaces, and inserts the leading license comment block of a
//! file.
//!
//! Detection is deliberately bounded: a license header is assumed to live
//! within the first [`HEADER_WINDOW`] physical lines. The scanner is a small
//! two-state machine (inside the leading comment prefix / inside code) that
//! returns an immutable scan record instead of toggling flags while
//! iterating.

use crate::source_file::{SourceFile, has_license_marker, is_blank_line, is_comment_line};

/// Number of leading lines inspected when looking for a license header.
pub const HEADER_WINDOW: usize = 20;

/// Scanner state for the leading comment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
  /// Still inside the run of leading comment lines.
  InCommentPrefix,
  /// Reached the first non-comment line.
  InCode,
}

/// Result of scanning the leading comment run.
///
/// `len` is the number of lines in the run (the run spans `lines[..len]`);
/// the line at index `len`, if any, is the first non-comment line and is
/// always retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LeadingRun {
  len: usize,
  has_marker: bool,
}

/// Checks whether the bounded leading window already carries a license.
///
/// Comment lines are inspected for a marker; blank lines are skipped; the
/// scan stops at the first non-comment, non-blank line or after
/// [`HEADER_WINDOW`] lines, whichever comes first.
fn window_has_license(lines: &[String]) -> bool {
  for line in lines.iter().take(HEADER_WINDOW) {
    if is_comment_line(line) {
      if has_license_marker(line) {
        return true;
      }
    } else if !is_blank_line(line) {
      break;
    }
  }
  false
}

/// Scans the leading comment run.
///
/// The run ends at the first line that is not a comment; a blank line ends
/// the run too. Marker detection covers only lines inside the run.
fn scan_leading_run(lines: &[String]) -> LeadingRun {
  let mut state = ScanState::InCommentPrefix;
  let mut len = 0;
  let mut has_marker = false;

  for line in lines {
    match state {
      ScanState::InCommentPrefix => {
        if is_comment_line(line) {
          if has_license_marker(line) {
            has_marker = true;
          }
          len += 1;
        } else {
          state = ScanState::InCode;
        }
      }
      ScanState::InCode => break,
    }
  }

  LeadingRun { len, has_marker }
}

/// Ensures the file starts with the given rendered header text.
///
/// Behavior per the detection policy:
/// - No license in the leading window: the header is inserted before the
///   entire existing content (existing marker-free comments are kept, not
///   merged with).
/// - License present and `update_existing` requested: the leading comment
///   run is removed when it carries a marker, then the new header is
///   written in its place.
/// - License present otherwise: no-op.
///
/// The header is written with its surrounding whitespace trimmed, followed
/// by exactly one blank line; leading blank lines of the retained remainder
/// are dropped so the separation is normalized. Content from the first
/// non-comment line onward is never touched.
///
/// Returns `true` only when the final content differs from the original, so
/// re-running with identical inputs reports no change.
pub fn ensure_header(file: &mut SourceFile, header_text: &str, update_existing: bool) -> bool {
  let original = file.lines.clone();

  let mut remainder: &[String] = &file.lines;
  let mut removed = false;

  if window_has_license(&file.lines) {
    if update_existing {
      let run = scan_leading_run(&file.lines);
      if run.has_marker {
        remainder = &file.lines[run.len..];
        removed = true;
      }
    }
    if !removed {
      // Header present and nothing earmarked for replacement.
      return false;
    }
  }

  // Drop leading blank lines of the remainder; exactly one blank line is
  // re-inserted below the header.
  let first_content = remainder.iter().position(|l| !is_blank_line(l)).unwrap_or(remainder.len());
  let remainder = &remainder[first_content..];

  let mut new_lines: Vec<String> = header_text.trim().lines().map(|l| format!("{l}\n")).collect();
  new_lines.push("\n".to_string());
  new_lines.extend(remainder.iter().cloned());

  if new_lines == original {
    return false;
  }

  file.lines = new_lines;
  true
}
