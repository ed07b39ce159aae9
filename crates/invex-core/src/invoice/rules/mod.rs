//! Rule-based field extractors and the primitive normalizers they share.
//!
//! Each field is found by an ordered [`RuleSet`] of independent
//! [`LabelRule`]s: a label pattern, the captured token, and a canonicalizer
//! for that token. Rules are pure and can be exercised on their own.

pub mod amounts;
pub mod coerce;
pub mod dates;
pub mod patterns;

pub use amounts::{parse_amount, parse_currency, parse_decimal};
pub use coerce::{non_blank, safe_date_value, safe_number_or_zero, safe_string};
pub use dates::{normalize_date, safe_date};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A canonicalized value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Canonical value.
    pub value: T,
    /// Name of the rule that produced it.
    pub rule: &'static str,
    /// Full source text that was matched, label included.
    pub source: String,
    /// Byte span of the captured token.
    pub position: (usize, usize),
}

/// One label pattern with its token canonicalizer.
///
/// The pattern must define a `value` group. Matches where a `skip` group
/// participates are ignored, as are tokens the canonicalizer rejects.
pub struct LabelRule<T> {
    name: &'static str,
    pattern: &'static Regex,
    canonicalize: fn(&str) -> Option<T>,
}

impl<T> LabelRule<T> {
    pub fn new(name: &'static str, pattern: &'static Regex, canonicalize: fn(&str) -> Option<T>) -> Self {
        Self {
            name,
            pattern,
            canonicalize,
        }
    }

    fn matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = ExtractionMatch<T>> + 't {
        self.pattern.captures_iter(text).filter_map(move |caps| {
            if caps.name("skip").is_some() {
                return None;
            }
            let token = caps.name("value")?;
            let value = (self.canonicalize)(token.as_str())?;
            Some(ExtractionMatch {
                value,
                rule: self.name,
                source: caps[0].to_string(),
                position: (token.start(), token.end()),
            })
        })
    }
}

impl<T> FieldExtractor for LabelRule<T> {
    type Output = ExtractionMatch<T>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.matches(text).next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.matches(text).collect()
    }
}

/// Rules tried in priority order; the first rule with a match wins even if a
/// later rule would match earlier in the text.
pub struct RuleSet<T> {
    rules: Vec<LabelRule<T>>,
}

impl<T> RuleSet<T> {
    pub fn new(rules: Vec<LabelRule<T>>) -> Self {
        Self { rules }
    }
}

impl<T> FieldExtractor for RuleSet<T> {
    type Output = ExtractionMatch<T>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.iter().find_map(|rule| rule.extract(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.iter().flat_map(|rule| rule.extract_all(text)).collect()
    }
}
