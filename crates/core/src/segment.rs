//! Splits one raw user input into the spans routed to the FAQ responder and
//! the recommendation resolver.
//!
//! Keyword matching is deliberately substring based, not word-boundary based:
//! "investment" inside a longer compound still signals a recommendation. The
//! imprecision is part of the documented contract.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keywords that signal a recommendation request. Longer variants precede
/// their prefixes so removal consumes the longest form first.
pub const RECOMMENDATION_KEYWORDS: [&str; 9] = [
    "suggest",
    "recommend",
    "loan",
    "investment",
    "invest",
    "credit",
    "customer id",
    "savings",
    "saving",
];

/// The two optional spans derived from one input. At least one is present
/// unless the input itself is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSegments {
    pub faq: Option<String>,
    pub recommendation: Option<String>,
}

impl IntentSegments {
    pub fn is_empty(&self) -> bool {
        self.faq.is_none() && self.recommendation.is_none()
    }
}

/// Segment `text` into FAQ and recommendation spans.
///
/// When any recommendation keyword occurs in the lowercased input, the full
/// trimmed original becomes the recommendation span, verbatim. The FAQ span
/// is then the residual after stripping recommendation language; when no
/// keyword occurs, the whole trimmed input is the FAQ span.
pub fn segment(text: &str) -> IntentSegments {
    let original = text.trim();
    if original.is_empty() {
        return IntentSegments::default();
    }

    let lowered = original.to_lowercase();
    let wants_recommendation =
        RECOMMENDATION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword));

    if !wants_recommendation {
        return IntentSegments { faq: Some(original.to_string()), recommendation: None };
    }

    let residual = strip_recommendation_language(original);
    IntentSegments {
        faq: (!residual.is_empty()).then_some(residual),
        recommendation: Some(original.to_string()),
    }
}

/// Remove every keyword occurrence, customer-id tokens (`c` + digits), and
/// the standalone word "and", then collapse the gaps left behind.
fn strip_recommendation_language(text: &str) -> String {
    let stripped = keyword_pattern().replace_all(text, "");
    let stripped = and_word_pattern().replace_all(&stripped, "");
    collapse_whitespace(&stripped)
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternatives = RECOMMENDATION_KEYWORDS.map(regex::escape).join("|");
        Regex::new(&format!("(?i){alternatives}|c[0-9]+")).expect("keyword pattern is valid")
    })
}

fn and_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\band\b").expect("and pattern is valid"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
