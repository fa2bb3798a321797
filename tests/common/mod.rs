use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

/// Creates a project tree with a template directory and a couple of
/// source files, rooted in a fresh temp dir.
///
/// Layout:
///
/// ```text
/// templates/mit.py       head template for .py
/// templates/mit.c        head template for .c
/// src/app.py             plain source file
/// src/licensed.py        already carries a copyright header
/// src/util.c             plain source file
/// build/generated.py     lives in a default-excluded dir
/// ```
pub fn setup_project() -> Result<TempDir> {
  let temp_dir = TempDir::new()?;

  let templates = temp_dir.path().join("templates");
  fs::create_dir_all(&templates)?;
  fs::write(
    templates.join("mit.py"),
    "# $filename - MIT License\n# Copyright (c) $year $author\n",
  )?;
  fs::write(
    templates.join("mit.c"),
    "// $filename - MIT License\n// Copyright (c) $year $author\n",
  )?;

  let src = temp_dir.path().join("src");
  fs::create_dir_all(&src)?;
  fs::write(src.join("app.py"), "print('hello')\n")?;
  fs::write(
    src.join("licensed.py"),
    "# Copyright (c) 2019 Old Corp\n\nprint('licensed')\n",
  )?;
  fs::write(src.join("util.c"), "int main(void) { return 0; }\n")?;

  let build = temp_dir.path().join("build");
  fs::create_dir_all(&build)?;
  fs::write(build.join("generated.py"), "x = 1\n")?;

  Ok(temp_dir)
}

/// Runs the binary in `dir` with the given arguments.
pub fn licensetag(dir: &Path, args: &[&str]) -> assert_cmd::Command {
  let mut cmd = assert_cmd::Command::cargo_bin("licensetag").expect("binary builds");
  cmd.current_dir(dir).env_remove("LICENSETAG_CONFIG").args(args);
  cmd
}
