//! Fuzzy validation of extracted names against a canonical registry.
//!
//! Auditor names come out of the layout pipeline with legal suffixes,
//! stray line fragments and inconsistent casing. They are scored against a
//! caller-supplied registry with a token-set ratio, so word order and
//! repeated words do not matter and a name that is a subset of a registry
//! entry still scores 100.

use crate::options::ExtractOptions;
use regex::Regex;
use std::collections::BTreeSet;

/// What to return when no registry entry is similar enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Return this label, upper-cased
    CatchAll(String),
    /// Return the cleaned raw name
    PassThrough,
}

/// Registry matcher with its thresholds.
#[derive(Debug, Clone)]
pub struct EntityValidator {
    registry: Vec<String>,
    min_similarity: u8,
    short_name_similarity: u8,
    short_name_len: usize,
    suffix_regex: Regex,
}

impl EntityValidator {
    /// Create a validator with the default thresholds (90, or 80 for names
    /// of at most 4 characters).
    pub fn new(registry: Vec<String>) -> Self {
        Self {
            registry,
            min_similarity: 90,
            short_name_similarity: 80,
            short_name_len: 4,
            suffix_regex: Regex::new(r"(?i)\s*\b(limited|touche\s+tohmatsu)\b").unwrap(),
        }
    }

    /// Create a validator using the thresholds of `options`.
    pub fn from_options(registry: Vec<String>, options: &ExtractOptions) -> Self {
        Self::new(registry)
            .with_min_similarity(options.min_similarity)
            .with_short_names(options.short_name_len, options.short_name_similarity)
    }

    /// Set the acceptance threshold (0-100).
    pub fn with_min_similarity(mut self, similarity: u8) -> Self {
        self.min_similarity = similarity.min(100);
        self
    }

    /// Set the relaxed threshold for names up to `max_len` characters.
    pub fn with_short_names(mut self, max_len: usize, similarity: u8) -> Self {
        self.short_name_len = max_len;
        self.short_name_similarity = similarity.min(100);
        self
    }

    /// The registry entries.
    pub fn registry(&self) -> &[String] {
        &self.registry
    }

    /// Strip corporate suffixes and surrounding whitespace.
    pub fn clean(&self, raw: &str) -> String {
        self.suffix_regex.replace_all(raw, "").trim().to_string()
    }

    /// Best registry entry for `raw` and its score; first entry on ties.
    pub fn best_match(&self, raw: &str) -> Option<(&str, u8)> {
        let cleaned = self.clean(raw);
        self.registry
            .iter()
            .map(|entry| (entry.as_str(), token_set_ratio(&cleaned, entry)))
            .fold(None, |best, (entry, score)| match best {
                Some((_, s)) if s >= score => best,
                _ => Some((entry, score)),
            })
    }

    /// Canonical (upper-cased) registry name for `raw`, or the fallback.
    pub fn validate(&self, raw: &str, fallback: &Fallback) -> String {
        let cleaned = self.clean(raw);
        let threshold = if cleaned.chars().count() <= self.short_name_len {
            self.short_name_similarity
        } else {
            self.min_similarity
        };

        match self.best_match(raw) {
            Some((entry, score)) if score >= threshold => {
                log::debug!("Validated {:?} as {:?} (score {})", raw, entry, score);
                entry.to_uppercase()
            }
            best => {
                log::debug!("No registry match for {:?} (best {:?})", raw, best);
                match fallback {
                    Fallback::CatchAll(label) => label.to_uppercase(),
                    Fallback::PassThrough => cleaned,
                }
            }
        }
    }
}

/// Validate `raw` against `registry` with `min_similarity` (short names
/// use the relaxed threshold of 80).
pub fn validate_entity(
    raw: &str,
    registry: &[String],
    min_similarity: u8,
    fallback: Fallback,
) -> String {
    EntityValidator::new(registry.to_vec())
        .with_min_similarity(min_similarity)
        .validate(raw, &fallback)
}

/// Lower-case, replace non-alphanumerics by spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Token-set similarity (0-100) between two strings.
///
/// The shared tokens and each side's remaining tokens are sorted and
/// joined; the score is the best pairwise ratio among `shared`,
/// `shared + rest_a` and `shared + rest_b`.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split(' ').collect();
    let tokens_b: BTreeSet<&str> = b.split(' ').collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let shared = join(tokens_a.intersection(&tokens_b).copied().collect());
    let rest_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let rest_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combine = |rest: &str| format!("{} {}", shared, rest).trim().to_string();
    let combined_a = combine(&rest_a);
    let combined_b = combine(&rest_b);

    let mut scores = vec![ratio(&combined_a, &combined_b)];
    if !shared.is_empty() {
        scores.push(ratio(&shared, &combined_a));
        scores.push(ratio(&shared, &combined_b));
    }
    scores.into_iter().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Vec<String> {
        vec![
            "Deloitte".to_string(),
            "KPMG".to_string(),
            "PricewaterhouseCoopers".to_string(),
            "Ernst & Young".to_string(),
        ]
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("Ernst & Young", "young ernst"), 100);
        assert_eq!(token_set_ratio("KPMG", "KPMG Certified Public"), 100);
        assert_eq!(token_set_ratio("", "KPMG"), 0);
        assert!(token_set_ratio("BDO", "Deloitte") < 50);
    }

    #[test]
    fn test_clean() {
        let validator = EntityValidator::new(registry());
        assert_eq!(validator.clean("Deloitte Touche Tohmatsu Limited"), "Deloitte");
        assert_eq!(validator.clean("  SHINEWING (HK) CPA LIMITED "), "SHINEWING (HK) CPA");
    }

    #[test]
    fn test_clean_keeps_suffix_inside_words() {
        let validator = EntityValidator::new(registry());
        assert_eq!(validator.clean("Unlimited Partners"), "Unlimited Partners");
        assert_eq!(validator.clean("Limitedness Audit Limited"), "Limitedness Audit");
    }

    #[test]
    fn test_validate_known_firm() {
        let result = validate_entity(
            "Deloitte Touche Tohmatsu Limited",
            &["DELOITTE".to_string()],
            90,
            Fallback::PassThrough,
        );
        assert_eq!(result, "DELOITTE");
    }

    #[test]
    fn test_validate_falls_back() {
        let catch_all = validate_entity(
            "XYZ",
            &["DELOITTE".to_string()],
            90,
            Fallback::CatchAll("Others".to_string()),
        );
        assert_eq!(catch_all, "OTHERS");

        let pass_through = validate_entity("XYZ Limited", &["DELOITTE".to_string()], 90, Fallback::PassThrough);
        assert_eq!(pass_through, "XYZ");
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let result = validate_entity("KPMG", &[], 90, Fallback::PassThrough);
        assert_eq!(result, "KPMG");
    }

    #[test]
    fn test_best_match_prefers_first_on_tie() {
        let validator = EntityValidator::new(vec!["KPMG".to_string(), "kpmg".to_string()]);
        assert_eq!(validator.best_match("KPMG"), Some(("KPMG", 100)));
        assert_eq!(
            EntityValidator::new(registry()).validate("Ernst & Young", &Fallback::PassThrough),
            "ERNST & YOUNG"
        );
    }
}
