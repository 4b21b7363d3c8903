//! Typed fault conditions a caller might want to match on (see spec §7).
//!
//! Everything else (I/O, parse failures) propagates as a plain `anyhow::Error`
//! with `.context(...)` breadcrumbs instead of a variant here.

use crate::impl_prelude::*;

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PackError {
  /// `nedb` was requested but the target/source path doesn't have a `.db`
  /// extension.
  BadTarget { path: PathBuf },
  /// Log-store extraction couldn't resolve a collection from `documentType`.
  MissingType,
  /// Two source entries share the same `_key` during compile.
  DuplicateKey { key: String },
}

impl fmt::Display for PackError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadTarget { path } => {
        write!(f, "expected a path with a '.db' extension for the log store, got '{}'", path.display())
      }
      Self::MissingType => {
        write!(f, "could not resolve a collection for this log-store pack, pass --collection or --document-type")
      }
      Self::DuplicateKey { key } => write!(f, "duplicate _key '{}' found while compiling", key),
    }
  }
}

impl StdError for PackError {}
