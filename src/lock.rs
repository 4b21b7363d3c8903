//! The file-lock probe and store-repair entry point (spec §4.13).

use crate::impl_prelude::*;
use crate::store;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
  Locked,
  Unlocked,
}

/// Unix `EBUSY`/`ETXTBSY`, the only "someone else has this open" codes this
/// probe treats as locked rather than propagating.
fn is_busy(err: &io::Error) -> bool {
  matches!(err.raw_os_error(), Some(16) | Some(26))
}

/// Attempts to open `path` for writing as an advisory busy check: success
/// (file is immediately closed) or "not found" both mean unlocked; a busy
/// error means locked; anything else propagates.
pub fn probe(path: &Path) -> AnyResult<LockState> {
  match OpenOptions::new().write(true).open(path) {
    Ok(_file) => Ok(LockState::Unlocked),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LockState::Unlocked),
    Err(err) if is_busy(&err) => Ok(LockState::Locked),
    Err(err) => Err(err).with_context(|| format!("failed to probe lock on '{}'", path.display())),
  }
}

/// Options for [`repair_pack`] (spec §6: `repairPack(src, { log? })`).
#[derive(Debug, Default, Clone, Copy)]
pub struct RepairOptions {
  /// Emits an `info!` line before running recovery, for progress visibility;
  /// see [`crate::compile::CompileOptions::log`].
  pub log: bool,
}

/// Runs the sorted store's recovery routine against `path`. Never invoked by
/// the compile/extract paths themselves.
pub fn repair_pack(path: &Path, options: &RepairOptions) -> AnyResult<()> {
  if options.log {
    info!("repairing sorted store '{}'", path.display());
  }
  store::sorted::repair(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn missing_path_is_unlocked() {
    let dir = tempdir().unwrap();
    assert_eq!(probe(&dir.path().join("nope")).unwrap(), LockState::Unlocked);
  }

  #[test]
  fn writable_path_is_unlocked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("LOCK");
    fs::write(&path, "").unwrap();
    assert_eq!(probe(&path).unwrap(), LockState::Unlocked);
  }
}
