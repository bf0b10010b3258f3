//! Place-name extraction rules
//!
//! An ordered table of regular-expression rules; the first rule whose
//! capture survives stop-word removal wins. When no rule produces a
//! phrase, a proper-noun scan over the raw tokens is the last resort.
//! Multi-word places only fit within the two extra tokens each capture
//! allows, and capitalized sentence-starters can masquerade as proper
//! nouns; both are accepted limitations of the heuristic.

use std::sync::LazyLock;

use regex::Regex;

/// 1-3 whitespace-separated alphabetic tokens
const WORDS: &str = r"([a-zA-Z]+(?:\s+[a-zA-Z]+){0,2})";

/// Tokens dropped from captured phrases
const STOP_WORDS: &[&str] = &[
    "the", "what", "is", "are", "a", "an", "my", "your", "let", "me", "i", "you",
];

/// Lowercased tokens never treated as proper nouns
const FALLBACK_SKIP: &[&str] = &["what", "the", "and", "or"];

struct ExtractionRule {
    pattern: Regex,
    group: usize,
}

static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    [
        // "in <place>", "to <place>", "at <place>"
        format!(r"(?i)\b(?:in|to|at)\s+{WORDS}"),
        // "weather in <place>", "temperature for <place>"
        format!(r"(?i)\b(?:weather|temperature|temp|climate)\s+(?:in|at|for)\s+{WORDS}\b"),
        // "going to <place>", "visiting <place>"
        format!(r"(?i)\b(?:go|going|visit|visiting)\s+(?:to\s+)?{WORDS}\b"),
        // "<place> trip", "<place> weather" at the start of the utterance
        format!(r"(?i)^{WORDS}\s+(?:trip|weather|temperature|places|attractions|visit)\b"),
    ]
    .into_iter()
    .map(|pattern| ExtractionRule {
        pattern: Regex::new(&pattern).expect("extraction rule must compile"),
        group: 1,
    })
    .collect()
});

/// Candidate place name for an utterance, title-cased, or `None` when the
/// text gives nothing to go on.
#[must_use]
pub fn extract_place(text: &str) -> Option<String> {
    for rule in RULES.iter() {
        let Some(captures) = rule.pattern.captures(text) else {
            continue;
        };
        if let Some(phrase) = captures.get(rule.group).and_then(|m| clean_phrase(m.as_str())) {
            return Some(phrase);
        }
    }

    proper_noun_fallback(text)
}

/// Drops stop words and title-cases what remains.
fn clean_phrase(raw: &str) -> Option<String> {
    let kept: Vec<String> = raw
        .split_whitespace()
        .filter(|word| {
            let lower = word.to_lowercase();
            !STOP_WORDS.contains(&lower.as_str())
        })
        .map(title_case)
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}

/// Collects capitalized tokens longer than two characters.
fn proper_noun_fallback(text: &str) -> Option<String> {
    let candidates: Vec<&str> = text
        .split_whitespace()
        .filter(|word| {
            word.chars().count() > 2
                && word.chars().next().is_some_and(char::is_uppercase)
                && !FALLBACK_SKIP.contains(&word.to_lowercase().as_str())
        })
        .collect();

    if candidates.is_empty() {
        None
    } else {
        Some(candidates.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
