//! # Templates Module
//!
//! This module provides template resolution and placeholder substitution for
//! license headers and footers.
//!
//! The module includes:
//! - [`TemplateProvider`] for resolving head/tail template files through the
//!   fallback chain
//! - [`SubstitutionContext`] for filling `$name` placeholders at render time
//! - Marker rewriting for generic-text templates used with comment styles
//!   other than `//`
//!
//! ## Example
//!
//! ```rust,no_run
//! use licensetag::templates::{SubstitutionContext, TemplateProvider, render_for_file};
//!
//! # fn main() -> anyhow::Result<()> {
//! let provider = TemplateProvider::new("templates/mit");
//!
//! let mut context = SubstitutionContext::new();
//! context.set("author", "Jane Doe");
//! context.set("year", "2025");
//!
//! if let Some(head) = provider.resolve_head(".py")? {
//!   let rendered = render_for_file(&head, &context, "main.py", ".py", chrono::Local::now());
//!   println!("{rendered}");
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::{Captures, Regex};

use crate::verbose_log;

/// Timestamp format injected as the `last_modified` placeholder.
const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Matches `$$`, `$name`, and `${name}` placeholders.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
    .expect("placeholder regex must compile")
});

/// Matches the leading `//` marker of a line, capturing its indentation.
///
/// Only the marker position is matched, so a `http://` later in the line
/// body is untouched by the rewrite.
static LEADING_MARKER_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)//").expect("marker regex must compile"));

/// A resolved template: its text plus whether it came from the generic
/// `.txt` fallback.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
  /// The raw template text with placeholders.
  pub text: String,
  /// Set when the template was resolved via the `.txt` fallback and may
  /// need its comment markers rewritten for the target language.
  pub generic: bool,
}

/// Resolves head and tail template files for a template base path.
///
/// Given a base like `templates/mit` and an extension like `.py`, the head
/// template is searched as `templates/mit.py`, then `templates/mit..py`,
/// then the generic `templates/mit.txt`. Tail templates use the same chain
/// with a `_tail` suffix on the base. Absence of a head template means the
/// file is skipped; absence of a tail template means no footer management.
#[derive(Debug, Clone)]
pub struct TemplateProvider {
  /// Base path prefix the candidate file names are appended to.
  base: String,
}

impl TemplateProvider {
  /// Creates a provider for the given template base path.
  pub fn new(base: impl Into<String>) -> Self {
    Self { base: base.into() }
  }

  /// Resolves the head template for an extension.
  ///
  /// Returns `Ok(None)` when no candidate exists; the caller skips the
  /// file in that case.
  ///
  /// # Errors
  ///
  /// Returns an error if a candidate file exists but cannot be read.
  pub fn resolve_head(&self, ext: &str) -> Result<Option<ResolvedTemplate>> {
    self.resolve("", ext)
  }

  /// Resolves the tail template for an extension.
  ///
  /// Returns `Ok(None)` when no candidate exists; footer management is
  /// disabled for the extension in that case.
  ///
  /// # Errors
  ///
  /// Returns an error if a candidate file exists but cannot be read.
  pub fn resolve_tail(&self, ext: &str) -> Result<Option<ResolvedTemplate>> {
    self.resolve("_tail", ext)
  }

  fn resolve(&self, suffix: &str, ext: &str) -> Result<Option<ResolvedTemplate>> {
    let candidates = [
      (format!("{}{}{}", self.base, suffix, ext), false),
      (format!("{}{}.{}", self.base, suffix, ext), false),
      (format!("{}{}.txt", self.base, suffix), true),
    ];

    for (candidate, generic) in candidates {
      let path = Path::new(&candidate);
      if path.is_file() {
        verbose_log!("Resolved template: {}", path.display());
        let text = std::fs::read_to_string(path)
          .with_context(|| format!("Failed to read template file: {}", path.display()))?;
        return Ok(Some(ResolvedTemplate { text, generic }));
      }
    }

    Ok(None)
  }
}

/// Placeholder values shared across a run.
///
/// `filename` and `last_modified` are overwritten per file at render time;
/// everything else (`author`, `authoremail`, `project`, `projecturl`,
/// `year`, `version`, `creationdate`) is set once from configuration.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
  values: HashMap<String, String>,
}

impl SubstitutionContext {
  /// Creates an empty context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets a placeholder value.
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.values.insert(name.into(), value.into());
  }

  /// Renders a template, injecting `filename` and `last_modified`.
  ///
  /// Substitution is best-effort: placeholders with no value in the
  /// context are left verbatim in the output, never an error. `$$` renders
  /// a literal `$`.
  pub fn render(&self, template: &str, file_name: &str, now: DateTime<Local>) -> String {
    let last_modified = now.format(LAST_MODIFIED_FORMAT).to_string();

    PLACEHOLDER_REGEX
      .replace_all(template, |caps: &Captures| {
        if caps.get(1).is_some() {
          return "$".to_string();
        }
        let name = caps
          .get(2)
          .or_else(|| caps.get(3))
          .map(|m| m.as_str())
          .unwrap_or_default();
        match name {
          "filename" => file_name.to_string(),
          "last_modified" => last_modified.clone(),
          _ => match self.values.get(name) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
          },
        }
      })
      .into_owned()
  }
}

/// Returns the single-line comment prefix for a file extension.
///
/// Used when a generic `.txt` template must be rewritten for a target
/// language. Unknown extensions keep the C-style `//` marker.
pub fn line_comment_prefix(ext: &str) -> &'static str {
  let ext = ext.trim_start_matches('.');
  match ext {
    "py" | "sh" | "rb" | "pl" | "yaml" | "yml" | "toml" | "tcl" | "cmake" => "#",
    "sql" | "hs" | "lua" | "ada" => "--",
    "el" | "lisp" | "scm" | "asm" => ";",
    _ => "//",
  }
}

/// Rewrites the leading `//` marker of every line to the given prefix.
///
/// This is applied when a generic fallback template is used for a target
/// whose comment style is not `//`. Only the marker position after the
/// line's indentation is rewritten, which is why a literal `http://` in the
/// line body survives the rewrite unscathed.
pub fn rewrite_comment_markers(text: &str, prefix: &str) -> String {
  LEADING_MARKER_REGEX
    .replace_all(text, |caps: &Captures| format!("{}{}", &caps[1], prefix))
    .into_owned()
}

/// Renders a resolved template for one concrete file.
///
/// Runs placeholder substitution and, for generic fallback templates whose
/// target comment style is not `//`, rewrites the comment markers.
pub fn render_for_file(
  template: &ResolvedTemplate,
  context: &SubstitutionContext,
  file_name: &str,
  ext: &str,
  now: DateTime<Local>,
) -> String {
  let rendered = context.render(&template.text, file_name, now);

  if template.generic {
    let prefix = line_comment_prefix(ext);
    if prefix != "//" {
      return rewrite_comment_markers(&rendered, prefix);
    }
  }

  rendered
}
