//! The composite-key codec (spec §4.1): `!<sublevel>!<id>`, with sublevel and
//! id being dot-joined lists of non-empty parts.

pub const KEY_SEPARATOR: char = '!';
pub const PART_SEPARATOR: char = '.';

fn join_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
  let mut out = String::new();
  for part in parts {
    if part.is_empty() {
      continue;
    }
    if !out.is_empty() {
      out.push(PART_SEPARATOR);
    }
    out.push_str(part);
  }
  out
}

/// Encodes a composite key from ordered sublevel parts and id parts.
pub fn encode<'a>(
  sublevel_parts: impl IntoIterator<Item = &'a str>,
  id_parts: impl IntoIterator<Item = &'a str>,
) -> String {
  let mut key = String::new();
  key.push(KEY_SEPARATOR);
  key.push_str(&join_parts(sublevel_parts));
  key.push(KEY_SEPARATOR);
  key.push_str(&join_parts(id_parts));
  key
}

/// Decodes a composite key into its (sublevel, id) string halves.
///
/// Returns `None` if `key` doesn't start with [`KEY_SEPARATOR`] or doesn't
/// contain a second one.
pub fn decode(key: &str) -> Option<(&str, &str)> {
  let rest = key.strip_prefix(KEY_SEPARATOR)?;
  let sep_index = rest.find(KEY_SEPARATOR)?;
  Some((&rest[..sep_index], &rest[sep_index + 1..]))
}

/// Splits a sublevel or id half of a decoded key back into its dot-joined
/// parts.
pub fn split_parts(half: &str) -> impl Iterator<Item = &str> {
  half.split(PART_SEPARATOR).filter(|part| !part.is_empty())
}

/// The sublevel half of a decoded key, or `""` if the key can't be decoded.
pub fn sublevel_of(key: &str) -> &str {
  decode(key).map(|(sublevel, _)| sublevel).unwrap_or("")
}

/// Whether `key`'s sublevel contains more than one part, i.e. it names an
/// embedded-document entry rather than a primary-document entry.
pub fn is_embedded_key(key: &str) -> bool {
  sublevel_of(key).contains(PART_SEPARATOR)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn primary_key_shape() {
    let key = encode(["actors"], ["aaa"]);
    assert_eq!(key, "!actors!aaa");
    assert!(!is_embedded_key(&key));
  }

  #[test]
  fn embedded_key_shape() {
    let key = encode(["actors", "items"], ["aaa", "i1"]);
    assert_eq!(key, "!actors.items!aaa.i1");
    assert!(is_embedded_key(&key));
  }

  #[test]
  fn round_trip() {
    let sublevels = ["actors", "items", "effects"];
    let ids = ["aaa", "i1", "e1"];
    let key = encode(sublevels, ids);
    let (sublevel, id) = decode(&key).unwrap();
    assert_eq!(split_parts(sublevel).collect::<Vec<_>>(), sublevels.to_vec());
    assert_eq!(split_parts(id).collect::<Vec<_>>(), ids.to_vec());
  }

  #[test]
  fn empty_parts_are_filtered() {
    let key = encode(["actors", ""], ["aaa"]);
    assert_eq!(key, "!actors!aaa");
  }

  #[test]
  fn primary_keys_sort_before_embedded_keys() {
    let primary = encode(["actors"], ["aaa"]);
    let embedded = encode(["actors", "items"], ["aaa", "i1"]);
    assert!(primary < embedded);
  }

  #[test]
  fn decode_rejects_malformed_keys() {
    assert_eq!(decode("actors!aaa"), None);
    assert_eq!(decode("!actors"), None);
  }
}
