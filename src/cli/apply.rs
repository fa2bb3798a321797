//! Implementation of the `apply` operation, the tool's default mode.
//!
//! Settings are merged from three layers before a run starts, with
//! command-line flags winning over the config file, and the config file
//! winning over built-in defaults.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;

use crate::config::{self, Config};
use crate::logging::{self, ColorMode};
use crate::processor::{
  DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS, DEFAULT_MAX_AGE_MINUTES, Processor, RunOptions,
};
use crate::report;
use crate::templates::{SubstitutionContext, TemplateProvider};

/// Arguments for the apply operation
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
  /// Root folder to process
  #[arg(short, long)]
  pub folder: Option<PathBuf>,

  /// Template base path; per-extension files are looked up as
  /// {base}{ext}, {base}.{ext}, then {base}.txt
  #[arg(short, long)]
  pub template: Option<String>,

  /// Value for the $author placeholder
  #[arg(long)]
  pub author: Option<String>,

  /// Value for the $authoremail placeholder
  #[arg(long)]
  pub author_email: Option<String>,

  /// Value for the $project placeholder
  #[arg(long)]
  pub project: Option<String>,

  /// Value for the $projecturl placeholder
  #[arg(long)]
  pub project_url: Option<String>,

  /// Value for the $year placeholder [default: current year]
  #[arg(long)]
  pub year: Option<String>,

  /// Value for the $creationdate placeholder [default: current year-month]
  #[arg(long)]
  pub creation_date: Option<String>,

  /// Value for the $version placeholder, also written into the
  /// Version: bookkeeping field [default: 1.0]
  #[arg(long)]
  pub header_version: Option<String>,

  /// File suffix to process; repeat for more [default: .c .h .cc .cpp .py]
  #[arg(short = 'x', long = "extensions", value_name = "EXT")]
  pub extensions: Vec<String>,

  /// Directory name to skip; repeat for more [default: templates build .git]
  #[arg(short = 'd', long = "exclude-dirs", value_name = "DIR")]
  pub exclude_dirs: Vec<String>,

  /// Replace existing license headers and footers instead of keeping them
  #[arg(long)]
  pub update: bool,

  /// Only refresh bookkeeping fields in files modified within this window
  #[arg(long, value_name = "MINUTES")]
  pub max_age_minutes: Option<u64>,

  /// Increase output verbosity (can be repeated)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all non-error output
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// When to use colored output
  #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
  pub colors: ColorMode,

  /// Path to a config file (overrides LICENSETAG_CONFIG and discovery)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config files entirely
  #[arg(long, conflicts_with = "config")]
  pub no_config: bool,
}

/// Effective settings after merging CLI flags, config file, and defaults.
struct EffectiveSettings {
  extensions: Vec<String>,
  exclude_dirs: HashSet<String>,
  max_age_minutes: u64,
  placeholders: HashMap<String, String>,
}

/// Merges the three settings layers. CLI beats config beats defaults;
/// list-valued settings replace wholesale rather than appending.
fn merge_settings(args: &ApplyArgs, config: Option<&Config>) -> EffectiveSettings {
  let extensions = if args.extensions.is_empty() {
    config
      .and_then(|c| c.extensions.clone())
      .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect())
  } else {
    args.extensions.clone()
  };

  let exclude_dirs: HashSet<String> = if args.exclude_dirs.is_empty() {
    config
      .and_then(|c| c.exclude_dirs.clone())
      .unwrap_or_else(|| DEFAULT_EXCLUDED_DIRS.iter().map(|d| (*d).to_string()).collect())
  } else {
    args.exclude_dirs.iter().cloned().collect()
  }
  .into_iter()
  .collect();

  let max_age_minutes = args
    .max_age_minutes
    .or_else(|| config.and_then(|c| c.max_age_minutes))
    .unwrap_or(DEFAULT_MAX_AGE_MINUTES);

  let mut placeholders: HashMap<String, String> =
    config.map(|c| c.placeholders.clone()).unwrap_or_default();

  let cli_values = [
    ("author", args.author.as_ref()),
    ("authoremail", args.author_email.as_ref()),
    ("project", args.project.as_ref()),
    ("projecturl", args.project_url.as_ref()),
    ("year", args.year.as_ref()),
    ("creationdate", args.creation_date.as_ref()),
    ("version", args.header_version.as_ref()),
  ];
  for (name, value) in cli_values {
    if let Some(value) = value {
      placeholders.insert(name.to_string(), value.clone());
    }
  }

  let now = Local::now();
  placeholders
    .entry("year".to_string())
    .or_insert_with(|| now.year().to_string());
  placeholders
    .entry("creationdate".to_string())
    .or_insert_with(|| format!("{}-{:02}", now.year(), now.month()));
  placeholders
    .entry("version".to_string())
    .or_insert_with(|| "1.0".to_string());

  EffectiveSettings {
    extensions,
    exclude_dirs,
    max_age_minutes,
    placeholders,
  }
}

/// Runs the apply operation with the given arguments.
///
/// # Errors
///
/// Returns an error if the config file is malformed or the target folder
/// is not a directory. Per-file failures are reported and skipped.
pub fn run_apply(args: ApplyArgs) -> Result<()> {
  let Some(folder) = args.folder.clone() else {
    anyhow::bail!("No target folder given (use --folder)");
  };
  let Some(template) = args.template.clone() else {
    anyhow::bail!("No template base given (use --template)");
  };

  logging::init_tracing(args.quiet, args.verbose);
  if args.quiet {
    logging::set_quiet();
  } else if args.verbose > 0 {
    logging::set_verbose();
  }
  args.colors.apply();

  let config = config::load_config(args.config.as_deref(), &folder, args.no_config)?;
  let settings = merge_settings(&args, config.as_ref());

  let mut context = SubstitutionContext::new();
  for (name, value) in &settings.placeholders {
    context.set(name.clone(), value.clone());
  }

  // The field updater writes the same version the templates render.
  let version = settings.placeholders["version"].clone();

  let options = RunOptions {
    folder,
    extensions: settings.extensions,
    exclude_dirs: settings.exclude_dirs,
    update_existing: args.update,
    max_age_minutes: settings.max_age_minutes,
    version,
  };

  let processor = Processor::new(options, TemplateProvider::new(template), context);
  let tally = processor.process()?;

  report::print_summary(&tally);

  Ok(())
}
