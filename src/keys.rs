//! Key derivation for schedule records.
//!
//! The remote source supplies no stable identifier, so each record's
//! storage key is derived from an identity-bearing field by stripping
//! everything that is not a letter or digit. The transform is
//! Unicode-aware: the source data mixes Latin and Cyrillic names.

/// Derive a stable storage key from an identity field.
///
/// Keeps letters and digits of any script, drops everything else. The
/// result is deterministic for a given input; an input with no letters or
/// digits yields an empty key, which the store accepts as a degenerate
/// case.
pub fn normalize_key(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_whitespace() {
        assert_eq!(normalize_key("DJ Kolya (live)"), "DJKolyalive");
        assert_eq!(normalize_key("a - b_c"), "abc");
    }

    #[test]
    fn test_keeps_cyrillic() {
        assert_eq!(normalize_key("Группа «Крылья»"), "ГруппаКрылья");
    }

    #[test]
    fn test_digits_survive() {
        assert_eq!(normalize_key("Stage 2, 10:30"), "Stage21030");
    }

    #[test]
    fn test_degenerate_input_yields_empty_key() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("!!! ---"), "");
    }

    #[test]
    fn test_urls_normalize_distinctly() {
        let a = normalize_key("https://fest.example/announce/101");
        let b = normalize_key("https://fest.example/announce/102");
        assert_ne!(a, b);
    }
}
