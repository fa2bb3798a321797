//! # Processor Module
//!
//! The tree dispatcher: walks the target folder, matches files by suffix,
//! and drives the header, footer, and field engines over each match in a
//! fixed order:
//!
//! 1. resolve head/tail templates for the extension (no head template means
//!    the file is skipped entirely)
//! 2. render the templates for the concrete file
//! 3. `ensure_header`
//! 4. `ensure_footer` (only when a tail template exists)
//! 5. `refresh_fields` (only when neither block changed)
//! 6. tally the change
//!
//! Files are processed in parallel batches with rayon; every file's
//! read-decide-write sequence stays within one worker, and per-file
//! failures are logged and skipped without aborting the walk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::fields::{self, FieldOutcome};
use crate::footer::ensure_footer;
use crate::header::ensure_header;
use crate::report::ChangeTally;
use crate::source_file::SourceFile;
use crate::templates::{ResolvedTemplate, SubstitutionContext, TemplateProvider, render_for_file};
use crate::verbose_log;

/// Default file suffixes considered when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 5] = [".c", ".h", ".cc", ".cpp", ".py"];

/// Default directory names excluded from recursion.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 3] = ["templates", "build", ".git"];

/// Default freshness window for the field updater, in minutes.
pub const DEFAULT_MAX_AGE_MINUTES: u64 = 30;

/// Batch size for parallel file processing.
const BATCH_SIZE: usize = 8;

/// Options for one processing run.
///
/// The exclusion set is an explicit value here, threaded in from the CLI or
/// config file; there is no process-global state.
#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Root folder to walk.
  pub folder: PathBuf,
  /// File suffixes to consider; the first matching suffix wins.
  pub extensions: Vec<String>,
  /// Directory names pruned from recursion.
  pub exclude_dirs: HashSet<String>,
  /// Whether already-licensed files get their header/footer replaced.
  pub update_existing: bool,
  /// Freshness window for the bookkeeping-field updater.
  pub max_age_minutes: u64,
  /// Version value written into the `Version:` bookkeeping field.
  pub version: String,
}

/// Processor for tagging license blocks across a directory tree.
pub struct Processor {
  options: RunOptions,
  provider: TemplateProvider,
  context: SubstitutionContext,

  /// Cache of resolved (head, tail) templates per extension, shared across
  /// workers.
  template_cache: Mutex<HashMap<String, (Option<ResolvedTemplate>, Option<ResolvedTemplate>)>>,
}

impl Processor {
  /// Creates a processor with the given options, template provider, and
  /// substitution context.
  pub fn new(options: RunOptions, provider: TemplateProvider, context: SubstitutionContext) -> Self {
    Self {
      options,
      provider,
      context,
      template_cache: Mutex::new(HashMap::new()),
    }
  }

  /// Walks the target folder and processes every matching file.
  ///
  /// Returns the per-extension tally of changed files. Failures are local
  /// to one file: they are logged and the walk continues.
  ///
  /// # Errors
  ///
  /// Returns an error only if the target folder itself is not a directory.
  pub fn process(&self) -> Result<ChangeTally> {
    let files = self.collect_files()?;
    debug!("Matched {} files under {}", files.len(), self.options.folder.display());

    let batches: Vec<Vec<(PathBuf, String)>> = files.chunks(BATCH_SIZE).map(<[_]>::to_vec).collect();

    let batch_tallies: Vec<ChangeTally> = batches.into_par_iter().map(|batch| self.process_batch(batch)).collect();

    let mut tally = ChangeTally::new();
    for batch_tally in batch_tallies {
      tally.merge(batch_tally);
    }

    Ok(tally)
  }

  /// Collects `(path, matched extension)` pairs under the target folder.
  fn collect_files(&self) -> Result<Vec<(PathBuf, String)>> {
    if !self.options.folder.is_dir() {
      anyhow::bail!("Not a directory: {}", self.options.folder.display());
    }

    let mut files = Vec::new();

    let walker = WalkDir::new(&self.options.folder)
      .into_iter()
      .filter_entry(|entry| !self.is_excluded_dir(entry));

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          // A vanished or unreadable path must not abort the walk.
          warn!("Skipping unreadable path: {e}");
          continue;
        }
      };

      if !entry.file_type().is_file() {
        continue;
      }

      let file_name = entry.file_name().to_string_lossy();
      if let Some(ext) = self.match_extension(&file_name) {
        files.push((entry.into_path(), ext.to_string()));
      }
    }

    Ok(files)
  }

  fn is_excluded_dir(&self, entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
      && entry.file_type().is_dir()
      && entry
        .file_name()
        .to_str()
        .is_some_and(|name| self.options.exclude_dirs.contains(name))
  }

  /// Matches a file name against the configured suffix list.
  ///
  /// Matching is suffix-based, not strict extension parsing: a name ending
  /// in the literal substring counts. The extension list is tried in order
  /// and the first match wins.
  fn match_extension(&self, file_name: &str) -> Option<&str> {
    self
      .options
      .extensions
      .iter()
      .find(|ext| file_name.ends_with(ext.as_str()))
      .map(String::as_str)
  }

  fn process_batch(&self, batch: Vec<(PathBuf, String)>) -> ChangeTally {
    let mut tally = ChangeTally::new();

    for (path, ext) in batch {
      match self.process_file(&path, &ext) {
        Ok(true) => tally.record(&ext),
        Ok(false) => {}
        Err(e) => {
          eprintln!("Error processing {}: {:#}", path.display(), e);
        }
      }
    }

    tally
  }

  /// Processes a single file, returning whether anything changed.
  fn process_file(&self, path: &Path, ext: &str) -> Result<bool> {
    let (head, tail) = self.templates_for(ext)?;

    let Some(head) = head else {
      verbose_log!("Skipping: {} (no head template for '{}')", path.display(), ext);
      return Ok(false);
    };

    let mut file = SourceFile::load(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let now = Local::now();

    let header_text = render_for_file(&head, &self.context, file_name, ext, now);
    let changed_head = ensure_header(&mut file, &header_text, self.options.update_existing);

    let changed_tail = match &tail {
      Some(tail) => {
        let footer_text = render_for_file(tail, &self.context, file_name, ext, now);
        ensure_footer(&mut file, &footer_text, self.options.update_existing)
      }
      None => false,
    };

    let mut field_outcome = FieldOutcome::default();
    if !changed_head && !changed_tail && fields::is_fresh(path, self.options.max_age_minutes)? {
      field_outcome = fields::refresh_fields(&mut file, &self.options.version, now);
    }

    let changed = changed_head || changed_tail || field_outcome.any();
    if changed {
      file
        .save()
        .with_context(|| format!("Failed to save file: {}", path.display()))?;
      verbose_log!("Updated: {}", path.display());
    }

    Ok(changed)
  }

  /// Resolves (and caches) the head/tail templates for an extension.
  fn templates_for(&self, ext: &str) -> Result<(Option<ResolvedTemplate>, Option<ResolvedTemplate>)> {
    {
      let cache = self.template_cache.lock().expect("mutex poisoned");
      if let Some(cached) = cache.get(ext) {
        return Ok(cached.clone());
      }
    }

    let head = self.provider.resolve_head(ext)?;
    let tail = self.provider.resolve_tail(ext)?;

    let mut cache = self.template_cache.lock().expect("mutex poisoned");
    let entry = cache.entry(ext.to_string()).or_insert((head, tail));
    Ok(entry.clone())
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn options(folder: &Path, update_existing: bool) -> RunOptions {
    RunOptions {
      folder: folder.to_path_buf(),
      extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
      exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
      update_existing,
      max_age_minutes: DEFAULT_MAX_AGE_MINUTES,
      version: "1.0".to_string(),
    }
  }

  fn context() -> SubstitutionContext {
    let mut ctx = SubstitutionContext::new();
    ctx.set("author", "Jane Doe");
    ctx.set("year", "2025");
    ctx
  }

  fn setup_tree() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).expect("create templates dir");

    fs::write(
      templates.join("mit.py"),
      "# $filename - MIT License\n# Copyright (c) $year $author\n",
    )
    .expect("write py template");

    let src = dir.path().join("src");
    fs::create_dir_all(&src).expect("create src dir");
    fs::write(src.join("app.py"), "print('hello')\n").expect("write app.py");
    fs::write(src.join("notes.md"), "# not a source file\n").expect("write notes.md");

    dir
  }

  fn processor_for(dir: &TempDir, update_existing: bool) -> Processor {
    let base = dir.path().join("templates").join("mit");
    Processor::new(
      options(dir.path(), update_existing),
      TemplateProvider::new(base.to_string_lossy().to_string()),
      context(),
    )
  }

  #[test]
  fn test_process_adds_header_and_tallies() {
    let dir = setup_tree();
    let tally = processor_for(&dir, false).process().expect("process");

    assert_eq!(tally.count(".py"), 1);

    let content = fs::read_to_string(dir.path().join("src/app.py")).expect("read");
    assert!(content.starts_with("# app.py - MIT License\n# Copyright (c) 2025 Jane Doe\n\n"));
    assert!(content.ends_with("print('hello')\n"));

    // Unmatched suffixes are untouched.
    let notes = fs::read_to_string(dir.path().join("src/notes.md")).expect("read notes");
    assert_eq!(notes, "# not a source file\n");
  }

  #[test]
  fn test_second_run_changes_nothing() {
    let dir = setup_tree();
    let processor = processor_for(&dir, false);
    processor.process().expect("first run");

    let before = fs::read_to_string(dir.path().join("src/app.py")).expect("read");
    let tally = processor_for(&dir, false).process().expect("second run");
    let after = fs::read_to_string(dir.path().join("src/app.py")).expect("reread");

    assert_eq!(before, after);
    assert_eq!(tally.count(".py"), 0);
  }

  #[test]
  fn test_excluded_dirs_are_pruned() {
    let dir = setup_tree();
    let build = dir.path().join("build");
    fs::create_dir_all(&build).expect("create build dir");
    fs::write(build.join("generated.py"), "x = 1\n").expect("write generated");

    processor_for(&dir, false).process().expect("process");

    let generated = fs::read_to_string(build.join("generated.py")).expect("read generated");
    assert_eq!(generated, "x = 1\n");
  }

  #[test]
  fn test_file_without_head_template_is_skipped() {
    let dir = setup_tree();
    let src = dir.path().join("src");
    fs::write(src.join("util.c"), "int main(void) { return 0; }\n").expect("write util.c");

    let tally = processor_for(&dir, false).process().expect("process");

    // Only .py has a template (and no generic fallback exists).
    assert_eq!(tally.count(".c"), 0);
    let c_content = fs::read_to_string(src.join("util.c")).expect("read util.c");
    assert_eq!(c_content, "int main(void) { return 0; }\n");
  }

  #[test]
  fn test_tail_template_appends_footer() {
    let dir = setup_tree();
    fs::write(dir.path().join("templates").join("mit_tail.py"), "# End of $filename, MIT License\n")
      .expect("write tail template");

    processor_for(&dir, false).process().expect("process");

    let content = fs::read_to_string(dir.path().join("src/app.py")).expect("read");
    assert!(content.ends_with("print('hello')\n\n# End of app.py, MIT License\n"));
  }

  #[test]
  fn test_update_existing_replaces_stale_header() {
    let dir = setup_tree();
    let app = dir.path().join("src/app.py");
    fs::write(&app, "# Copyright (c) 2019 Old Corp\n\nprint('hello')\n").expect("seed stale header");

    let tally = processor_for(&dir, true).process().expect("process");

    assert_eq!(tally.count(".py"), 1);
    let content = fs::read_to_string(&app).expect("read");
    assert!(content.starts_with("# app.py - MIT License\n# Copyright (c) 2025 Jane Doe\n\n"));
    assert!(!content.contains("Old Corp"));
    assert!(content.ends_with("print('hello')\n"));
  }

  #[test]
  fn test_fields_refresh_when_blocks_unchanged() {
    let dir = setup_tree();
    let app = dir.path().join("src/app.py");
    fs::write(
      &app,
      "# app.py - MIT License\n# Copyright (c) 2025 Jane Doe\n# Last Modified: 2020-01-01 00:00:00\n# Version: 0.9\n\nprint('hello')\n",
    )
    .expect("seed fielded header");

    let tally = processor_for(&dir, false).process().expect("process");

    // Header present, no update requested: only the fields fire.
    assert_eq!(tally.count(".py"), 1);
    let content = fs::read_to_string(&app).expect("read");
    assert!(!content.contains("2020-01-01 00:00:00"));
    assert!(content.contains("# Version: 1.0\n"));
  }

  #[test]
  fn test_first_matching_extension_wins() {
    let dir = TempDir::new().expect("create temp dir");
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).expect("create templates dir");
    fs::write(templates.join("mit.cc"), "// $filename, MIT License\n").expect("write cc template");
    fs::write(dir.path().join("widget.cc"), "int x;\n").expect("write widget.cc");

    let mut opts = options(dir.path(), false);
    // ".cc" listed before ".c"; a name ending in ".cc" must tally as ".cc".
    opts.extensions = vec![".cc".to_string(), ".c".to_string()];

    let base = templates.join("mit");
    let processor = Processor::new(opts, TemplateProvider::new(base.to_string_lossy().to_string()), context());
    let tally = processor.process().expect("process");

    assert_eq!(tally.count(".cc"), 1);
    assert_eq!(tally.count(".c"), 0);
  }
}
