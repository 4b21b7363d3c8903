//! Ambient CLI configuration (spec §4.16): an optional `compendium-pack.toml`
//! read from the current directory, merged under explicit CLI flags. This
//! module is consumed only by the `cli` front-end — the library surface
//! (`compile_pack`/`extract_pack`/`repair_pack`) never reads files behind the
//! caller's back.

use crate::catalog;
use crate::impl_prelude::*;
use crate::resolver::DocumentTypeResolver;

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "compendium-pack.toml";

/// Parsed contents of `compendium-pack.toml`. Every field is optional; a
/// missing file (or a missing field within it) falls back to built-in
/// defaults, so `Config::default()` is itself a valid, fully-usable config.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  /// Extra document-type -> collection hints, consulted before the built-in
  /// bijection (spec §3). Lets a game system register document types the
  /// core catalog doesn't know about, without the core validating schemas.
  #[serde(default)]
  pub document_types: HashMap<String, String>,
}

impl Config {
  /// Reads `compendium-pack.toml` from `dir`, if present. A missing file is
  /// not an error; any other read or parse failure is.
  pub fn load(dir: &Path) -> AnyResult<Self> {
    let path = dir.join(CONFIG_FILE_NAME);
    let contents = match fs::read_to_string(&path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        debug!("no '{}' in '{}', using defaults", CONFIG_FILE_NAME, dir.display());
        return Ok(Self::default());
      }
      Err(err) => return Err(err).with_context(|| format!("failed to read '{}'", path.display())),
    };
    let config: Self =
      toml::from_str(&contents).with_context(|| format!("failed to parse '{}'", path.display()))?;
    info!("loaded configuration from '{}'", path.display());
    Ok(config)
  }
}

/// A [`DocumentTypeResolver`] backed by a loaded [`Config`], falling back to
/// the built-in [`catalog`] bijection for document types the config doesn't
/// mention. This is the resolver the CLI wires up by default; library callers
/// that have no config file at all can keep using
/// [`crate::resolver::StaticResolver`] instead.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
  document_types: HashMap<String, String>,
}

impl ConfigResolver {
  pub fn new(config: &Config) -> Self {
    Self { document_types: config.document_types.clone() }
  }
}

impl DocumentTypeResolver for ConfigResolver {
  fn resolve(&self, document_type: &str) -> Option<String> {
    if let Some(collection) = self.document_types.get(document_type) {
      return Some(collection.clone());
    }
    catalog::collection_for_document_type(document_type).map(str::to_owned)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn missing_file_yields_default_config() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert!(config.document_types.is_empty());
  }

  #[test]
  fn loads_document_type_hints_from_toml() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(CONFIG_FILE_NAME),
      "[document_types]\nCustomSpell = \"spells\"\n",
    )
    .unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.document_types.get("CustomSpell"), Some(&"spells".to_owned()));
  }

  #[test]
  fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "not valid toml {{{").unwrap();
    assert!(Config::load(dir.path()).is_err());
  }

  #[test]
  fn resolver_prefers_config_hints_over_the_builtin_catalog() {
    let mut config = Config::default();
    config.document_types.insert("Actor".to_owned(), "custom_actors".to_owned());
    let resolver = ConfigResolver::new(&config);
    assert_eq!(resolver.resolve("Actor"), Some("custom_actors".to_owned()));
    assert_eq!(resolver.resolve("Item"), Some("items".to_owned()));
    assert_eq!(resolver.resolve("Nonexistent"), None);
  }
}
