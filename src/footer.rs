//! # Footer Block Engine
//!
//! Detects, replaces, and appends the trailing license comment block of a
//! file.
//!
//! The scanner walks backward from the end of the file through three states:
//! trailing blank lines, then the trailing comment run, then the boundary
//! line that ends the run. It returns an immutable scan record (block start +
//! marker flag). Unlike the header engine there is no line window here; the
//! footer is whatever comment run closes the file.

use crate::source_file::{SourceFile, has_license_marker, is_blank_line, is_comment_line};

/// Backward scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
  /// Skipping blank lines at the very end of the file.
  TrailingBlank,
  /// Inside the trailing comment run of contiguous comment lines.
  TrailingComment,
}

/// Result of the backward scan.
///
/// The candidate footer block spans `lines[start..]`. It is only treated as
/// a footer when `has_marker` is set; a trailing comment run without a
/// marker is somebody's code comment and is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrailingRun {
  start: usize,
  has_marker: bool,
}

/// Scans backward for a trailing comment run.
///
/// The run is the contiguous block of comment lines closing the file; a
/// blank line ends it, so a footer sitting below its separating blank is
/// recognized independently of any comments above. Returns `None` when the
/// last non-blank line is not a comment (no footer candidate at all), or
/// when the run reaches the top of the file: a comment run spanning the
/// whole file is the header's territory, never a footer.
fn scan_trailing_run(lines: &[String]) -> Option<TrailingRun> {
  let mut state = ScanState::TrailingBlank;
  let mut has_marker = false;

  for (idx, line) in lines.iter().enumerate().rev() {
    match state {
      ScanState::TrailingBlank => {
        if is_blank_line(line) {
          continue;
        }
        if !is_comment_line(line) {
          return None;
        }
        state = ScanState::TrailingComment;
        if has_license_marker(line) {
          has_marker = true;
        }
      }
      ScanState::TrailingComment => {
        if is_comment_line(line) {
          if has_license_marker(line) {
            has_marker = true;
          }
        } else {
          // Boundary reached, whether code or a blank separator; the
          // block begins one line after it. Ending the run at a blank
          // keeps the footer recognizable on its own below the header
          // in a file that holds nothing else.
          return Some(TrailingRun { start: idx + 1, has_marker });
        }
      }
    }
  }

  // Either the file was all blanks, or the run reached line 0.
  None
}

/// Ensures the file ends with the given rendered footer text.
///
/// - A recognized footer (trailing comment run carrying a marker) is
///   deleted first when `update_existing` is set, then the new footer is
///   appended; without `update_existing` a recognized footer is left
///   untouched entirely.
/// - A trailing comment run without a marker is never deleted; the footer
///   is appended below it.
/// - An empty or whitespace-only `footer_text` appends nothing, which
///   clears a stale footer without installing a new one.
///
/// The appended block is the trimmed footer text preceded by exactly one
/// blank line (none when the file would otherwise be empty) and followed by
/// a trailing newline. Returns `true` only when the final content differs
/// from the original.
pub fn ensure_footer(file: &mut SourceFile, footer_text: &str, update_existing: bool) -> bool {
  let original = file.lines.clone();

  let scan = scan_trailing_run(&file.lines);
  let recognized = scan.is_some_and(|run| run.has_marker);

  if recognized && !update_existing {
    return false;
  }

  let mut new_lines = file.lines.clone();

  if recognized {
    // Checked above: recognized implies the scan produced a run.
    if let Some(run) = scan {
      new_lines.truncate(run.start);
    }
  }

  // Drop trailing blank lines so the appended block sits after exactly one.
  while new_lines.last().is_some_and(|l| is_blank_line(l)) {
    new_lines.pop();
  }

  let trimmed = footer_text.trim();
  if !trimmed.is_empty() {
    if let Some(last) = new_lines.last_mut() {
      if !last.ends_with('\n') {
        last.push('\n');
      }
      new_lines.push("\n".to_string());
    }
    for line in trimmed.lines() {
      new_lines.push(format!("{line}\n"));
    }
  }

  if new_lines == original {
    return false;
  }

  file.lines = new_lines;
  true
}
