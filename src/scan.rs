//! The source scanner (spec §4.6): enumerates JSON or YAML files under a
//! root directory.

use crate::filename::{classify, FileKind};
use crate::impl_prelude::*;

use std::path::{Path, PathBuf};

/// Enumerates files under `root` matching the scan mode. When `yaml` is set,
/// only files classifying as [`FileKind::Yaml`] are returned; otherwise only
/// [`FileKind::Json`] ones are. When `recursive` is set, subdirectories are
/// descended into; otherwise only `root`'s direct children are considered.
/// Order follows the platform's directory-listing order — the compile
/// operation this feeds is order-independent by contract (spec §4.6).
pub fn find_source_files(root: &Path, yaml: bool, recursive: bool) -> AnyResult<Vec<PathBuf>> {
  let wanted = if yaml { FileKind::Yaml } else { FileKind::Json };
  let mut found = Vec::new();

  if recursive {
    for entry in walkdir::WalkDir::new(root) {
      let entry = entry.with_context(|| format!("failed to list files under '{}'", root.display()))?;
      if entry.file_type().is_file() && classify(entry.path()) == wanted {
        found.push(entry.into_path());
      }
    }
  } else {
    let read_dir = root
      .read_dir()
      .with_context(|| format!("failed to list directory '{}'", root.display()))?;
    for entry in read_dir {
      let entry = entry.with_context(|| format!("failed to list directory '{}'", root.display()))?;
      let path = entry.path();
      let file_type = entry
        .file_type()
        .with_context(|| format!("failed to get file type of '{}'", path.display()))?;
      if file_type.is_file() && classify(&path) == wanted {
        found.push(path);
      }
    }
  }

  Ok(found)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::write(dir.path().join("b.yml"), "{}").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.json"), "{}").unwrap();

    let found = find_source_files(dir.path(), false, false).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name().unwrap(), "a.json");
  }

  #[test]
  fn recursive_descends_into_subdirectories() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.json"), "{}").unwrap();
    fs::write(dir.path().join("sub/d.txt"), "nope").unwrap();

    let mut found = find_source_files(dir.path(), false, true).unwrap();
    found.sort();
    assert_eq!(found.len(), 2);
  }

  #[test]
  fn yaml_mode_only_finds_yaml() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::write(dir.path().join("b.yaml"), "{}").unwrap();
    let found = find_source_files(dir.path(), true, false).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name().unwrap(), "b.yaml");
  }
}
