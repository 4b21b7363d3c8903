//! The log-store driver (spec §4.5): a single-file, append-only document
//! store keyed by `_id`, round-tripping with the NeDB datafile convention —
//! one JSON record per line, deletions recorded as `{"_id": ..., "$$deleted":
//! true}` tombstones that a compaction pass collapses away.

use crate::document;
use crate::impl_prelude::*;

use indexmap::IndexMap;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};

const DELETED_MARKER: &str = "$$deleted";

#[derive(Debug)]
pub struct LogStore {
  path: PathBuf,
  records: IndexMap<String, Value>,
}

impl LogStore {
  /// Removes any existing file at `path` (ignoring "not found") and returns
  /// an empty in-memory store bound to it. Nothing is written to disk until
  /// [`compact_and_flush`](Self::compact_and_flush) is called — see spec §9
  /// Open Question 1.
  pub fn create_fresh(path: &Path) -> AnyResult<Self> {
    match fs::remove_file(path) {
      Ok(()) => {}
      Err(err) if err.kind() == io::ErrorKind::NotFound => {}
      Err(err) => return Err(err).with_context(|| format!("failed to remove '{}'", path.display())),
    }
    Ok(Self { path: path.to_owned(), records: IndexMap::new() })
  }

  /// Reads the existing datafile at `path`, replaying inserts and
  /// `$$deleted` tombstones in file order to reconstruct the live record
  /// set. An absent file is treated as an empty store.
  pub fn open_existing(path: &Path) -> AnyResult<Self> {
    let mut records = IndexMap::new();
    if path.exists() {
      let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read log store '{}'", path.display()))?;
      for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
          continue;
        }
        let value: Value = serde_json::from_str(line)
          .with_context(|| format!("failed to parse line {} of log store '{}'", line_no + 1, path.display()))?;
        let id = document::id(&value)
          .ok_or_else(|| format_err!("log store '{}' line {} is missing _id", path.display(), line_no + 1))?
          .to_owned();
        if value.get(DELETED_MARKER).and_then(Value::as_bool).unwrap_or(false) {
          records.shift_remove(&id);
        } else {
          records.insert(id, value);
        }
      }
    }
    Ok(Self { path: path.to_owned(), records })
  }

  /// All live documents, in their current (first-insert-preserving) order.
  pub fn find_all(&self) -> Vec<Value> {
    self.records.values().cloned().collect()
  }

  /// Buffers `doc` (keyed by its `_id`) in memory. Does not touch disk; call
  /// [`compact_and_flush`](Self::compact_and_flush) once the whole batch is
  /// ready.
  pub fn insert(&mut self, doc: Value) -> AnyResult<()> {
    let id = document::id(&doc).ok_or_else(|| format_err!("log store record is missing _id"))?.to_owned();
    self.records.insert(id, doc);
    Ok(())
  }

  /// Removes every in-memory record matching `predicate`, returning how many
  /// were removed.
  pub fn remove_where(&mut self, mut predicate: impl FnMut(&Value) -> bool) -> usize {
    let doomed: Vec<String> =
      self.records.iter().filter(|(_, doc)| predicate(doc)).map(|(id, _)| id.clone()).collect();
    for id in &doomed {
      self.records.shift_remove(id);
    }
    doomed.len()
  }

  /// Rewrites the datafile so it contains exactly the current in-memory
  /// records, one JSON line each, with no tombstones — background
  /// autocompaction is trivially "disabled" in this driver (there is no
  /// background timer), so this single synchronous pass at the end of a
  /// batch of writes is both the requested disabling and the required final
  /// compaction (spec §4.5).
  pub fn compact_and_flush(&mut self) -> AnyResult<()> {
    let mut writer = BufWriter::new(
      File::create(&self.path).with_context(|| format!("failed to create log store '{}'", self.path.display()))?,
    );
    for doc in self.records.values() {
      serde_json::to_writer(&mut writer, doc).context("failed to serialize log store record")?;
      writer.write_all(b"\n")?;
    }
    writer.flush().with_context(|| format!("failed to flush log store '{}'", self.path.display()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  #[test]
  fn fresh_store_compacts_inserted_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pack.db");
    let mut store = LogStore::create_fresh(&path).unwrap();
    store.insert(json!({ "_id": "a", "name": "Hero" })).unwrap();
    store.insert(json!({ "_id": "b", "name": "Villain" })).unwrap();
    store.compact_and_flush().unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 2);

    let reopened = LogStore::open_existing(&path).unwrap();
    assert_eq!(reopened.find_all().len(), 2);
  }

  #[test]
  fn tombstones_are_replayed_and_collapsed_on_compaction() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pack.db");
    fs::write(
      &path,
      format!(
        "{}\n{}\n",
        json!({ "_id": "a", "name": "Hero" }),
        json!({ "_id": "a", "$$deleted": true }),
      ),
    )
    .unwrap();

    let mut store = LogStore::open_existing(&path).unwrap();
    assert!(store.find_all().is_empty());
    store.insert(json!({ "_id": "b", "name": "Villain" })).unwrap();
    store.compact_and_flush().unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 1);
  }

  #[test]
  fn remove_where_matches_predicate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pack.db");
    let mut store = LogStore::create_fresh(&path).unwrap();
    store.insert(json!({ "_id": "a", "type": "npc" })).unwrap();
    store.insert(json!({ "_id": "b", "type": "pc" })).unwrap();
    let removed = store.remove_where(|doc| doc["type"] == "npc");
    assert_eq!(removed, 1);
    assert_eq!(store.find_all().len(), 1);
  }
}
