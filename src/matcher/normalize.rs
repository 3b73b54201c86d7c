//! Text normalization for person-name matching
//!
//! Provides normalization for claimed and fetched individual names:
//! - Unicode NFKC normalization
//! - Lowercase conversion
//! - Punctuation stripping
//! - Whitespace collapsing
//! - Generational suffix removal

use smallvec::SmallVec;
use unicode_normalization::UnicodeNormalization;

/// Generational suffixes stripped during normalization; they carry no
/// identity-matching signal and registries are inconsistent about them.
const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Normalize a person name for matching.
///
/// Performs:
/// - Unicode NFKC fold
/// - Lowercase conversion
/// - Strip punctuation (replace with space)
/// - Collapse whitespace
/// - Strip generational suffixes
///
/// # Examples
///
/// ```
/// use crd_verify::matcher::normalize::normalize_name;
///
/// assert_eq!(normalize_name("Douglas  R. Couden, Jr."), "douglas r couden");
/// assert_eq!(normalize_name("O'BRIEN"), "o brien");
/// ```
pub fn normalize_name(s: &str) -> String {
    let folded: String = s.nfkc().collect();

    let stripped: String = folded
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();

    stripped
        .split_whitespace()
        .filter(|t| !is_generational_suffix(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_generational_suffix(token: &str) -> bool {
    GENERATIONAL_SUFFIXES.contains(&token)
}

/// Normalized tokens of a name. Names have a small bounded part count, so
/// the token list stays inline.
pub fn name_tokens(s: &str) -> SmallVec<[String; 4]> {
    normalize_name(s)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// A name decomposed into positional parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: Option<String>,
    pub middle: SmallVec<[String; 2]>,
    pub last: Option<String>,
}

/// Split a name into first / middle tokens / last.
///
/// A single-token name yields only a first part; two tokens yield first and
/// last; anything longer puts the interior tokens in `middle`.
pub fn split_name_parts(s: &str) -> NameParts {
    let tokens = name_tokens(s);
    match tokens.len() {
        0 => NameParts::default(),
        1 => NameParts {
            first: Some(tokens[0].clone()),
            ..NameParts::default()
        },
        n => NameParts {
            first: Some(tokens[0].clone()),
            middle: tokens[1..n - 1].iter().cloned().collect(),
            last: Some(tokens[n - 1].clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_normalize_case_and_punctuation() {
        assert_eq!(normalize_name("DOUG SCOTT"), "doug scott");
        assert_eq!(normalize_name("O'Brien, Patrick"), "o brien patrick");
        assert_eq!(normalize_name("  John   Doe  "), "john doe");
    }

    #[test]
    fn test_normalize_strips_generational_suffix() {
        assert_eq!(normalize_name("Robert Smith Jr."), "robert smith");
        assert_eq!(normalize_name("Henry Ford III"), "henry ford");
        // suffix tokens embedded mid-name are still stripped only as tokens
        assert_eq!(normalize_name("Virgil Smith"), "virgil smith");
    }

    #[test]
    fn test_normalize_unicode_fold() {
        // Full-width characters are converted to ASCII by NFKC
        assert_eq!(normalize_name("Ｄｏｕｇ"), "doug");
        // Diacritics are preserved; "rené" and "rene" are different names
        assert_eq!(normalize_name("René"), "rené");
    }

    #[test]
    fn test_name_tokens() {
        let tokens = name_tokens("Douglas R. Couden Jr.");
        assert_eq!(tokens.as_slice(), ["douglas", "r", "couden"]);
    }

    #[test]
    fn test_split_name_parts() {
        assert_eq!(
            split_name_parts("Douglas Scott Couden"),
            NameParts {
                first: Some("douglas".to_string()),
                middle: smallvec!["scott".to_string()],
                last: Some("couden".to_string()),
            }
        );

        assert_eq!(
            split_name_parts("Doug Couden"),
            NameParts {
                first: Some("doug".to_string()),
                middle: smallvec![],
                last: Some("couden".to_string()),
            }
        );

        assert_eq!(
            split_name_parts("Doug"),
            NameParts {
                first: Some("doug".to_string()),
                middle: smallvec![],
                last: None,
            }
        );

        assert_eq!(split_name_parts(""), NameParts::default());
    }
}
