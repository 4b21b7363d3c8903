//! The compile orchestrator (spec §4.11): builds a pack from a directory of
//! source files, against either backend.

use crate::adventure;
use crate::document;
use crate::error::PackError;
use crate::impl_prelude::*;
use crate::key;
use crate::scan;
use crate::serializer;
use crate::store::log::LogStore;
use crate::store::sorted::SortedStore;
use crate::walker;

use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Options accepted by [`compile_pack`] (spec §6).
#[derive(Default)]
pub struct CompileOptions {
  pub nedb: bool,
  pub yaml: bool,
  pub recursive: bool,
  /// Emits an `info!` line per processed source file, for progress
  /// visibility on large compiles; unrelated to the `nedb` backend choice.
  pub log: bool,
  /// Runs once per source entry, after adventure reconstruction and before
  /// the hierarchy walk; returning `false` skips the entry entirely.
  pub transform_entry: Option<Box<dyn Fn(&mut Value) -> AnyResult<bool>>>,
}

impl std::fmt::Debug for CompileOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompileOptions")
      .field("nedb", &self.nedb)
      .field("yaml", &self.yaml)
      .field("recursive", &self.recursive)
      .field("log", &self.log)
      .field("transform_entry", &self.transform_entry.as_ref().map(|_| "<fn>"))
      .finish()
  }
}

fn has_db_extension(path: &Path) -> bool {
  path.extension().and_then(|ext| ext.to_str()) == Some("db")
}

pub fn compile_pack(src: &Path, dest: &Path, options: &CompileOptions) -> AnyResult<()> {
  if options.nedb && !has_db_extension(dest) {
    return Err(PackError::BadTarget { path: dest.to_owned() }.into());
  }

  let files = scan::find_source_files(src, options.yaml, options.recursive)
    .with_context(|| format!("failed to scan source directory '{}'", src.display()))?;
  info!("found {} source file(s) under '{}'", files.len(), src.display());

  if options.nedb {
    compile_log_store(dest, &files, options)
  } else {
    compile_sorted_store(dest, &files, options)
  }
}

/// Reads and prepares one source file. `skip_folders` skips `!folders` keys
/// before `transform_entry` runs rather than after (spec §4.11's documented
/// log-store sequence: "...skip if `_key` begins with `!folders` ... then
/// call the entry transformer"); the sorted store supports folders and never
/// sets it.
fn load_entry(path: &Path, options: &CompileOptions, skip_folders: bool) -> AnyResult<Option<(String, Value)>> {
  let mut doc =
    serializer::read_file(path).with_context(|| format!("failed to read source file '{}'", path.display()))?;

  let key = match document::key(&doc) {
    Some(key) => key.to_owned(),
    None => {
      debug!("skipping '{}': missing _key", path.display());
      return Ok(None);
    }
  };

  if key.starts_with("!adventures") {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    adventure::reconstruct(&mut doc, base_dir)
      .with_context(|| format!("failed to reconstruct adventure '{}'", path.display()))?;
  }

  if skip_folders && key.starts_with("!folders") {
    debug!("skipping '{}': the log store does not support folders", path.display());
    return Ok(None);
  }

  if let Some(transform) = &options.transform_entry {
    if !transform(&mut doc).with_context(|| format!("transform_entry failed on '{}'", path.display()))? {
      debug!("skipping '{}': rejected by transform_entry", path.display());
      return Ok(None);
    }
  }

  Ok(Some((key, doc)))
}

fn compile_log_store(dest: &Path, files: &[PathBuf], options: &CompileOptions) -> AnyResult<()> {
  let mut store = LogStore::create_fresh(dest)
    .with_context(|| format!("failed to prepare log store '{}'", dest.display()))?;
  let mut seen_keys: HashSet<String> = HashSet::new();

  for path in files {
    let (key, mut doc) = match load_entry(path, options, true)? {
      Some(entry) => entry,
      None => continue,
    };
    if options.log {
      info!("compiling '{}' -> '{}'", path.display(), key);
    }

    let collection = key::sublevel_of(&key).to_owned();
    walker::apply(&mut doc, &collection, None, (), &mut |node, _collection, _index, _inherited| {
      document::take_key(node);
      Ok(())
    })?;

    if !seen_keys.insert(key.clone()) {
      return Err(PackError::DuplicateKey { key }.into());
    }

    store.insert(doc)?;
  }

  store.compact_and_flush().with_context(|| format!("failed to compact log store '{}'", dest.display()))
}

type PathState = (Vec<String>, Vec<String>);

fn compile_sorted_store(dest: &Path, files: &[PathBuf], options: &CompileOptions) -> AnyResult<()> {
  fs::create_dir_all(dest).with_context(|| format!("failed to create pack directory '{}'", dest.display()))?;
  let mut store = SortedStore::open(dest, true)?;

  let mut puts: Vec<(String, Value)> = Vec::new();
  let mut seen_keys: HashSet<String> = HashSet::new();

  for path in files {
    let (key, mut doc) = match load_entry(path, options, false)? {
      Some(entry) => entry,
      None => continue,
    };
    if options.log {
      info!("compiling '{}' -> '{}'", path.display(), key);
    }

    let collection = key::sublevel_of(&key).to_owned();
    walker::apply(
      &mut doc,
      &collection,
      None,
      (Vec::<String>::new(), Vec::<String>::new()),
      &mut |node, node_collection, _index, (parent_sublevel, parent_id): PathState| -> AnyResult<PathState> {
        let node_id = document::id(node).unwrap_or("").to_owned();

        let mut sublevel_parts = parent_sublevel;
        sublevel_parts.push(node_collection.to_owned());
        let mut id_parts = parent_id;
        id_parts.push(node_id);

        document::take_key(node);

        let node_key =
          key::encode(sublevel_parts.iter().map(String::as_str), id_parts.iter().map(String::as_str));
        if !seen_keys.insert(node_key.clone()) {
          return Err(PackError::DuplicateKey { key: node_key }.into());
        }

        let mut stored = node.clone();
        walker::map_embedded(&mut stored, node_collection, |_name, item| {
          Ok(Value::String(document::id(&item).unwrap_or("").to_owned()))
        })?;
        puts.push((node_key, stored));

        Ok((sublevel_parts, id_parts))
      },
    )?;
  }

  let stale_keys: Vec<String> = store
    .iter_all()?
    .into_iter()
    .map(|(key, _value)| key)
    .filter(|key| !seen_keys.contains(key))
    .collect();

  info!("writing {} entries, removing {} stale entries from '{}'", puts.len(), stale_keys.len(), dest.display());
  store.write_batch(&puts, &stale_keys)?;
  store.compact_after_rewrite()?;
  store.close()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::fs;
  use tempfile::tempdir;

  fn write_source(dir: &Path, filename: &str, doc: &Value) {
    fs::write(dir.join(filename), serde_json::to_string(doc).unwrap()).unwrap();
  }

  #[test]
  fn nedb_target_without_db_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let options = CompileOptions { nedb: true, ..CompileOptions::default() };
    let err = compile_pack(dir.path(), &dir.path().join("pack"), &options).unwrap_err();
    assert!(err.downcast_ref::<PackError>().is_some());
  }

  #[test]
  fn log_store_compile_strips_keys_and_skips_folders() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(&src, "hero.json", &json!({ "_key": "!actors!aaa", "_id": "aaa", "name": "Hero" }));
    write_source(&src, "no_key.json", &json!({ "name": "Ignored" }));
    write_source(&src, "folder.json", &json!({ "_key": "!folders!f1", "_id": "f1" }));

    let dest = dir.path().join("pack.db");
    let options = CompileOptions { nedb: true, ..CompileOptions::default() };
    compile_pack(&src, &dest, &options).unwrap();

    let store = LogStore::open_existing(&dest).unwrap();
    let all = store.find_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["_id"], "aaa");
    assert!(all[0].get("_key").is_none());
  }

  #[test]
  fn log_store_compile_skips_folders_before_running_the_transformer() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(&src, "hero.json", &json!({ "_key": "!actors!aaa", "_id": "aaa", "name": "Hero" }));
    write_source(&src, "folder.json", &json!({ "_key": "!folders!f1", "_id": "f1" }));

    let seen_keys: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let seen_keys_in_transform = Rc::clone(&seen_keys);
    let dest = dir.path().join("pack.db");
    let options = CompileOptions {
      nedb: true,
      transform_entry: Some(Box::new(move |doc: &mut Value| {
        seen_keys_in_transform.borrow_mut().push(document::key(doc).unwrap_or("").to_owned());
        Ok(true)
      })),
      ..CompileOptions::default()
    };
    compile_pack(&src, &dest, &options).unwrap();

    // The folder entry must never reach the transformer, only the actor's.
    assert_eq!(*seen_keys.borrow(), vec!["!actors!aaa".to_owned()]);
  }

  #[test]
  fn sorted_store_compile_replaces_embeddeds_with_bare_ids() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(
      &src,
      "hero.json",
      &json!({
        "_key": "!actors!aaa",
        "_id": "aaa",
        "name": "Hero",
        "items": [{ "_id": "i1", "name": "Sword" }],
        "effects": [],
      }),
    );

    let dest = dir.path().join("pack");
    let options = CompileOptions::default();
    compile_pack(&src, &dest, &options).unwrap();

    let mut store = SortedStore::open(&dest, false).unwrap();
    let actor = store.get("!actors!aaa").unwrap().unwrap();
    assert_eq!(actor["items"], json!(["i1"]));
    let item = store.get("!actors.items!aaa.i1").unwrap().unwrap();
    assert_eq!(item["name"], "Sword");
  }

  #[test]
  fn duplicate_key_aborts_compile_without_partial_writes() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    write_source(&src, "a.json", &json!({ "_key": "!actors!aaa", "_id": "aaa" }));
    write_source(&src, "b.json", &json!({ "_key": "!actors!aaa", "_id": "aaa" }));

    let dest = dir.path().join("pack");
    let err = compile_pack(&src, &dest, &CompileOptions::default()).unwrap_err();
    assert!(err.downcast_ref::<PackError>().is_some());
  }
}
