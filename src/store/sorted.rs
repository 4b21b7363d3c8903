//! The sorted-store driver (spec §4.4): an ordered key/value backend, wire
//! compatible with the LevelDB table/log/manifest format the host
//! application reads directly, via the pure-Rust `rusty-leveldb` engine.

use crate::impl_prelude::*;

use rusty_leveldb::{LdbIterator, Options, DB};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct SortedStore {
  db: DB,
  path: PathBuf,
}

impl std::fmt::Debug for SortedStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SortedStore").field("path", &self.path).finish()
  }
}

fn encode_value(value: &Value) -> AnyResult<Vec<u8>> {
  serde_json::to_vec(value).context("failed to serialize pack entry to JSON")
}

fn decode_value(bytes: &[u8]) -> AnyResult<Value> {
  serde_json::from_slice(bytes).context("failed to parse pack entry as JSON")
}

impl SortedStore {
  /// Opens `path` as a sorted store. When `create_if_missing` is false (used
  /// by extract, which must never implicitly create a pack) a missing store
  /// surfaces as an error instead of an empty store being created.
  pub fn open(path: &Path, create_if_missing: bool) -> AnyResult<Self> {
    let opts = Options { create_if_missing, ..Options::default() };
    let path_str = path
      .to_str()
      .ok_or_else(|| format_err!("non-UTF-8 pack path: '{}'", path.display()))?;
    let db = DB::open(path_str, opts)
      .with_context(|| format!("failed to open sorted store '{}'", path.display()))?;
    Ok(Self { db, path: path.to_owned() })
  }

  pub fn get(&mut self, key: &str) -> AnyResult<Option<Value>> {
    match self.db.get(key.as_bytes()) {
      Some(bytes) => Ok(Some(decode_value(&bytes)?)),
      None => Ok(None),
    }
  }

  pub fn get_many(&mut self, keys: &[String]) -> AnyResult<Vec<Option<Value>>> {
    keys.iter().map(|key| self.get(key)).collect()
  }

  /// Ordered `(key, value)` pairs across the whole store.
  pub fn iter_all(&mut self) -> AnyResult<Vec<(String, Value)>> {
    let mut iter =
      self.db.new_iter().with_context(|| format!("failed to iterate sorted store '{}'", self.path.display()))?;
    let mut entries = Vec::new();
    while let Some((key_bytes, value_bytes)) = iter.next() {
      let key = String::from_utf8(key_bytes).context("non-UTF-8 key in sorted store")?;
      let value = decode_value(&value_bytes)?;
      entries.push((key, value));
    }
    Ok(entries)
  }

  /// The smallest key in the store (a forward scan of limit 1).
  pub fn smallest_key(&mut self) -> AnyResult<Option<String>> {
    let mut iter = self.db.new_iter().context("failed to seek sorted store for compaction bounds")?;
    iter.seek_to_first();
    match iter.next() {
      Some((key_bytes, _)) => Ok(Some(String::from_utf8(key_bytes)?)),
      None => Ok(None),
    }
  }

  /// The largest key in the store (a backward scan of limit 1).
  pub fn largest_key(&mut self) -> AnyResult<Option<String>> {
    let mut iter = self.db.new_iter().context("failed to seek sorted store for compaction bounds")?;
    iter.seek_to_last();
    if !iter.valid() {
      return Ok(None);
    }
    let mut key_bytes = Vec::new();
    let mut value_bytes = Vec::new();
    if iter.current(&mut key_bytes, &mut value_bytes) {
      Ok(Some(String::from_utf8(key_bytes)?))
    } else {
      Ok(None)
    }
  }

  /// Applies `puts` and `deletes` as a single atomic batch.
  pub fn write_batch(&mut self, puts: &[(String, Value)], deletes: &[String]) -> AnyResult<()> {
    let mut batch = rusty_leveldb::WriteBatch::new();
    for (key, value) in puts {
      batch.put(key.as_bytes(), &encode_value(value)?);
    }
    for key in deletes {
      batch.delete(key.as_bytes());
    }
    self.db.write(batch, true).context("failed to write batch to sorted store")
  }

  /// Forces the store to compact into binary tables after a pack rewrite
  /// (spec §4.4): find the smallest and largest keys via single-key scans,
  /// and if both exist, compact that inclusive interval.
  pub fn compact_after_rewrite(&mut self) -> AnyResult<()> {
    let smallest = self.smallest_key()?;
    let largest = self.largest_key()?;
    if let (Some(smallest), Some(largest)) = (smallest, largest) {
      self
        .db
        .compact_range(smallest.as_bytes(), largest.as_bytes())
        .context("failed to compact sorted store")?;
    }
    Ok(())
  }

  pub fn close(mut self) -> AnyResult<()> {
    self.db.flush().context("failed to flush sorted store on close")
  }
}

impl Drop for SortedStore {
  fn drop(&mut self) {
    if let Err(err) = self.db.flush() {
      warn!("failed to flush sorted store '{}' on drop: {}", self.path.display(), err);
    }
  }
}

/// Runs the underlying store's recovery routine (spec §4.4). Not invoked by
/// the compile/extract paths themselves.
pub fn repair(path: &Path) -> AnyResult<()> {
  let path_str = path.to_str().ok_or_else(|| format_err!("non-UTF-8 pack path: '{}'", path.display()))?;
  rusty_leveldb::DB::repair(path_str, Options::default())
    .with_context(|| format!("failed to repair sorted store '{}'", path.display()))
}
