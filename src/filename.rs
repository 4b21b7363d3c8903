//! Filename policy (spec §4.2): derive safe, stable filenames from document
//! names/ids, and classify source files by extension.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
  Json,
  Yaml,
  Skip,
}

impl FileKind {
  pub fn extension(self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Yaml => "yml",
      Self::Skip => "",
    }
  }
}

/// Replaces every character outside `[A-Za-z0-9А-я]` with `_` (spec invariant
/// 6). Cyrillic range is U+0410–U+044F inclusive.
pub fn safe_name(name: &str) -> String {
  name
    .chars()
    .map(|c| {
      let is_safe = c.is_ascii_alphanumeric() || c == '_' || ('\u{0410}'..='\u{044F}').contains(&c);
      if is_safe {
        c
      } else {
        '_'
      }
    })
    .collect()
}

/// `safe_name(name) + "_" + id + "." + ext` when `name` is non-empty,
/// otherwise `id_hint + "." + ext`.
pub fn derive_filename(name: Option<&str>, id: &str, id_hint: &str, ext: &str) -> String {
  match name {
    Some(name) if !name.is_empty() => format!("{}_{}.{}", safe_name(name), id, ext),
    _ => format!("{}.{}", id_hint, ext),
  }
}

/// Classifies a path by its extension.
pub fn classify(path: &Path) -> FileKind {
  match path.extension().and_then(|ext| ext.to_str()) {
    Some("yml") | Some("yaml") => FileKind::Yaml,
    Some("json") => FileKind::Json,
    _ => FileKind::Skip,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn safe_name_keeps_ascii_alnum_and_cyrillic() {
    assert_eq!(safe_name("Hero"), "Hero");
    assert_eq!(safe_name("Герой"), "Герой");
  }

  #[test]
  fn safe_name_replaces_everything_else() {
    assert_eq!(safe_name("Bob's Sword!"), "Bob_s_Sword_");
    assert_eq!(safe_name("火"), "_");
  }

  #[test]
  fn derive_filename_prefers_name() {
    assert_eq!(derive_filename(Some("Hero"), "aaa", "aaa", "json"), "Hero_aaa.json");
  }

  #[test]
  fn derive_filename_falls_back_to_id_hint() {
    assert_eq!(derive_filename(None, "aaa", "aaa", "json"), "aaa.json");
    assert_eq!(derive_filename(Some(""), "aaa", "idhint", "json"), "idhint.json");
  }

  #[test]
  fn classify_by_extension() {
    assert_eq!(classify(Path::new("a.json")), FileKind::Json);
    assert_eq!(classify(Path::new("a.yml")), FileKind::Yaml);
    assert_eq!(classify(Path::new("a.yaml")), FileKind::Yaml);
    assert_eq!(classify(Path::new("a.txt")), FileKind::Skip);
  }
}
