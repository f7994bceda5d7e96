//! Slug derivation — URL-safe unique identifiers computed from display names.
//!
//! Derivation here is pure string work; uniqueness is enforced by the storage
//! layer's UNIQUE constraint together with a retry loop that appends `-2`,
//! `-3`, … until an insert is accepted. A pre-check alone would race against
//! concurrent creations of the same name.

/// Normalise a display name into a lowercase, hyphenated slug.
///
/// Unicode letters and digits are kept (lowercased); every other run of
/// characters collapses into a single hyphen. Leading and trailing hyphens
/// are trimmed, so the result may be empty for names with no alphanumerics.
pub fn slugify(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut pending_hyphen = false;

  for ch in name.chars() {
    if ch.is_alphanumeric() {
      if pending_hyphen && !out.is_empty() {
        out.push('-');
      }
      pending_hyphen = false;
      out.extend(ch.to_lowercase());
    } else {
      pending_hyphen = true;
    }
  }

  out
}

/// The candidate slug for the nth insert attempt (1-based).
///
/// Attempt 1 is the bare base; collisions then get `-2`, `-3`, … — the first
/// suffix is 2, matching the convention that the second "Jane Doe" becomes
/// `jane-doe-2`.
pub fn numbered(base: &str, attempt: u32) -> String {
  if attempt <= 1 {
    base.to_owned()
  } else {
    format!("{base}-{attempt}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_basic() {
    assert_eq!(slugify("Jane Doe"), "jane-doe");
    assert_eq!(slugify("  Ada   Lovelace  "), "ada-lovelace");
    assert_eq!(slugify("O'Brien, Conan"), "o-brien-conan");
  }

  #[test]
  fn slugify_keeps_unicode_letters() {
    assert_eq!(slugify("세종대왕"), "세종대왕");
    assert_eq!(slugify("Łukasz Żółty"), "łukasz-żółty");
  }

  #[test]
  fn slugify_collapses_punctuation_runs() {
    assert_eq!(slugify("a -- b ?! c"), "a-b-c");
  }

  #[test]
  fn slugify_empty_for_symbol_only_names() {
    assert_eq!(slugify("!!!"), "");
    assert_eq!(slugify(""), "");
  }

  #[test]
  fn numbered_suffixes_start_at_two() {
    assert_eq!(numbered("jane-doe", 1), "jane-doe");
    assert_eq!(numbered("jane-doe", 2), "jane-doe-2");
    assert_eq!(numbered("jane-doe", 3), "jane-doe-3");
  }
}
