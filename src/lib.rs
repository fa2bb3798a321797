//! # licensetag
//!
//! A tool for stamping license headers and footers onto source trees.
//!
//! It walks a folder, matches files by suffix, and ensures each one starts
//! with the license block rendered from a per-extension template. Optional
//! tail templates maintain a matching footer, and `Last Modified:` /
//! `Version:` bookkeeping fields inside recently touched headers are kept
//! current. Existing license blocks are recognized by scanning the leading
//! comment run for the words LICENSE or COPYRIGHT and are left alone unless
//! an update is requested.
//!
//! Runs are idempotent: a file already carrying the rendered block is not
//! rewritten and does not count as changed.

pub mod cli;
pub mod config;
pub mod fields;
pub mod footer;
pub mod header;
pub mod logging;
pub mod processor;
pub mod report;
pub mod source_file;
pub mod templates;
