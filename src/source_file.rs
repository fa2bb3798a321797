//! # Source File Module
//!
//! This module owns the in-memory representation of a file being processed:
//! an ordered sequence of physical lines with their trailing newlines
//! preserved, plus the line-classification helpers shared by the header,
//! footer, and field engines.
//!
//! A [`SourceFile`] is mutated in place by the engines and persisted back to
//! disk only when a mutation occurred. Persistence is atomic: content is
//! written to a sibling temporary file and renamed into place, so an
//! interrupted run never leaves a truncated file behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Single-line comment prefixes recognized when classifying lines.
///
/// Matching is case-sensitive and applied after trimming surrounding
/// whitespace. Block comments, nested comments, and shebang lines get no
/// special handling beyond this fixed set.
pub const COMMENT_PREFIXES: [&str; 4] = ["#", "//", "--", ";"];

/// Returns `true` if the line reads as a single-line comment.
pub fn is_comment_line(line: &str) -> bool {
  let stripped = line.trim();
  COMMENT_PREFIXES.iter().any(|prefix| stripped.starts_with(prefix))
}

/// Returns `true` if the line is empty or whitespace-only.
pub fn is_blank_line(line: &str) -> bool {
  line.trim().is_empty()
}

/// Returns `true` if the line carries a license marker.
///
/// A marker is the substring `LICENSE` or `COPYRIGHT`, matched on the
/// upper-cased line text.
pub fn has_license_marker(line: &str) -> bool {
  let upper = line.to_uppercase();
  upper.contains("LICENSE") || upper.contains("COPYRIGHT")
}

/// A file's content as an ordered sequence of physical lines.
///
/// Each line keeps its trailing `\n` if it had one, so joining the lines
/// reproduces the original bytes exactly. The engines splice whole lines in
/// and out of `lines`; nothing outside a detected block is ever rewritten.
#[derive(Debug, Clone)]
pub struct SourceFile {
  /// Path the content was loaded from (and will be saved back to).
  path: PathBuf,

  /// Physical lines, trailing newline preserved per line.
  pub lines: Vec<String>,
}

impl SourceFile {
  /// Loads a file into memory, splitting it into physical lines.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid UTF-8.
  pub fn load(path: &Path) -> Result<Self> {
    let content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(Self::from_content(path, &content))
  }

  /// Builds a `SourceFile` from already-read content.
  pub fn from_content(path: &Path, content: &str) -> Self {
    let lines = content.split_inclusive('\n').map(str::to_string).collect();
    Self {
      path: path.to_path_buf(),
      lines,
    }
  }

  /// The path this file was loaded from.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Joins the line sequence back into the file's full content.
  pub fn content(&self) -> String {
    self.lines.concat()
  }

  /// Persists the current line sequence back to disk atomically.
  ///
  /// The content is written to a temporary file in the same directory and
  /// renamed over the original, so a crash mid-write cannot truncate the
  /// file.
  ///
  /// # Errors
  ///
  /// Returns an error if the temporary file cannot be created, written, or
  /// renamed into place.
  pub fn save(&self) -> Result<()> {
    let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir)
      .with_context(|| format!("Failed to create temporary file next to {}", self.path.display()))?;

    std::fs::write(tmp.path(), self.content())
      .with_context(|| format!("Failed to write temporary file for {}", self.path.display()))?;

    tmp
      .persist(&self.path)
      .with_context(|| format!("Failed to replace file: {}", self.path.display()))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_comment_line_prefixes() {
    assert!(is_comment_line("# python comment"));
    assert!(is_comment_line("  // indented c comment"));
    assert!(is_comment_line("-- sql comment"));
    assert!(is_comment_line("; lisp comment"));
    assert!(!is_comment_line("let x = 1; // trailing comment"));
    assert!(!is_comment_line(""));
    assert!(!is_comment_line("   "));
  }

  #[test]
  fn test_has_license_marker_case_insensitive() {
    assert!(has_license_marker("# MIT License"));
    assert!(has_license_marker("// Copyright (c) 2024"));
    assert!(has_license_marker("-- COPYRIGHT HOLDER"));
    assert!(!has_license_marker("# just a comment"));
  }

  #[test]
  fn test_lines_roundtrip_preserves_bytes() {
    let content = "line one\n\nline three";
    let file = SourceFile::from_content(Path::new("x.py"), content);
    assert_eq!(file.lines.len(), 3);
    assert_eq!(file.lines[0], "line one\n");
    assert_eq!(file.lines[1], "\n");
    assert_eq!(file.lines[2], "line three");
    assert_eq!(file.content(), content);
  }

  #[test]
  fn test_save_roundtrip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.py");
    std::fs::write(&path, "a\nb\n").expect("write sample");

    let mut file = SourceFile::load(&path).expect("load");
    file.lines.insert(0, "# header\n".to_string());
    file.save().expect("save");

    let reread = std::fs::read_to_string(&path).expect("reread");
    assert_eq!(reread, "# header\na\nb\n");
  }
}
