//! Protected-term tables.

use serde::{Deserialize, Serialize};

/// Vocabulary of commercially or contractually sensitive topics.
///
/// All entries are stored lowercase; matching is case-insensitive substring.
/// Built once per process (or per test) and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitiveTerms {
    /// Terms that mark a query sensitive on any hit
    pub keywords: Vec<String>,

    /// Terms with a generic meaning that need co-occurrence rules
    pub ambiguous: Vec<String>,

    /// Phrases that make an ambiguous term sensitive
    pub purchase_intent: Vec<String>,

    /// Color/variant vocabulary that makes an ambiguous term generic
    pub variant_terms: Vec<String>,
}

const DEFAULT_KEYWORDS: &[&str] = &[
    "price",
    "pricing",
    "cost",
    "warranty",
    "guarantee",
    "in stock",
    "purchase",
    "buy",
    "deal",
    "discount",
    "offer",
    "aed",
    "$",
    "usd",
    "delivery",
    "shipping",
    "insurance",
    "financing",
    "loan",
];

const DEFAULT_AMBIGUOUS: &[&str] = &["available", "availability"];

const DEFAULT_PURCHASE_INTENT: &[&str] = &[
    "is it available",
    "available for purchase",
    "available to buy",
    "available to order",
    "available for order",
    "available for sale",
    "available in stock",
    "when will it be available",
    "where is it available",
    "available at dealer",
    "available near me",
];

const DEFAULT_VARIANT_TERMS: &[&str] = &[
    "color", "colour", "shade", "paint", "variant", "trim", "finish", "option",
];

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

impl Default for SensitiveTerms {
    fn default() -> Self {
        Self {
            keywords: owned(DEFAULT_KEYWORDS),
            ambiguous: owned(DEFAULT_AMBIGUOUS),
            purchase_intent: owned(DEFAULT_PURCHASE_INTENT),
            variant_terms: owned(DEFAULT_VARIANT_TERMS),
        }
    }
}

impl SensitiveTerms {
    /// Normalize user-supplied tables to lowercase, dropping blanks.
    pub fn normalized(self) -> Self {
        fn clean(terms: Vec<String>) -> Vec<String> {
            terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        }

        Self {
            keywords: clean(self.keywords),
            ambiguous: clean(self.ambiguous),
            purchase_intent: clean(self.purchase_intent),
            variant_terms: clean(self.variant_terms),
        }
    }

    /// Every protected term, ambiguous ones included.
    pub fn all_protected(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .chain(self.ambiguous.iter())
            .map(String::as_str)
    }
}

/// Whether `haystack` (already lowercase) contains any of `terms`.
pub(crate) fn contains_any<'a, I>(haystack: &str, terms: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    terms.into_iter().any(|term| haystack.contains(term.as_str()))
}
