//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing and supports subcommands for
//! extensibility.

mod apply;

pub use apply::{ApplyArgs, run_apply};
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Tag every default-extension file under src/ using templates/mit.<ext>
  licensetag -f src -t templates/mit --author \"Jane Doe\"

  # Replace existing license headers instead of leaving them alone
  licensetag -f src -t templates/mit --author \"Jane Doe\" --update

  # Restrict to Python and shell files
  licensetag -f . -t templates/mit -x .py -x .sh

  # Skip vendored trees in addition to the defaults
  licensetag -f . -t templates/mit -d vendor -d third_party

  # Show each touched file while processing
  licensetag -f src -t templates/mit -v
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  #[command(flatten)]
  pub apply_args: ApplyArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Add or refresh license blocks in source files (default)
  Apply(ApplyArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Get the effective apply arguments, whether from a subcommand or top-level
  pub fn get_apply_args(self) -> ApplyArgs {
    match self.command {
      Some(Command::Apply(args)) => args,
      None => self.apply_args,
    }
  }
}
