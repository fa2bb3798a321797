//! # licensetag
//!
//! A tool that stamps license headers and footers onto source trees.

use anyhow::Result;
use licensetag::cli::{Cli, run_apply};

fn main() -> Result<()> {
  let cli = Cli::parse_args();

  run_apply(cli.get_apply_args())
}
