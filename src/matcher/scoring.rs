use std::collections::BTreeSet;

use crate::keywords::MONTHS;
use crate::types::MarketRecord;

/// Shared tokens that earn the +2 institution bonus.
const INSTITUTION_TAGS: &[&str] = &["fed", "ecb", "boj"];

/// Shared tokens that earn the +1 direction bonus.
const DIRECTION_TAGS: &[&str] = &["decrease", "increase", "nochange"];

const EXACT_TITLE_BONUS: u32 = 5;
const CONTAINED_TITLE_BONUS: u32 = 2;

/// Central bank an event refers to. Mixing families is never a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstitutionFamily {
    Fed,
    Ecb,
    Boj,
}

impl InstitutionFamily {
    fn tags(self) -> &'static [&'static str] {
        match self {
            InstitutionFamily::Fed => &["fed", "fomc"],
            InstitutionFamily::Ecb => &["ecb"],
            InstitutionFamily::Boj => &["boj"],
        }
    }

    const ALL: [InstitutionFamily; 3] =
        [InstitutionFamily::Fed, InstitutionFamily::Ecb, InstitutionFamily::Boj];
}

/// Families tagged in a keyword set.
pub fn institution_families(keywords: &BTreeSet<String>) -> BTreeSet<InstitutionFamily> {
    InstitutionFamily::ALL
        .into_iter()
        .filter(|family| family.tags().iter().any(|t| keywords.contains(*t)))
        .collect()
}

fn months(keywords: &BTreeSet<String>) -> BTreeSet<&'static str> {
    MONTHS
        .iter()
        .copied()
        .filter(|m| keywords.contains(*m))
        .collect()
}

fn is_magnitude_tag(token: &str) -> bool {
    token
        .strip_suffix("bps")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn token_weight(token: &str) -> u32 {
    let mut weight = 1;
    if INSTITUTION_TAGS.contains(&token) {
        weight += 2;
    }
    if is_magnitude_tag(token) {
        weight += 2;
    }
    if DIRECTION_TAGS.contains(&token) {
        weight += 1;
    }
    weight
}

/// Keyword-overlap score between two records plus the title bonus.
pub fn match_score(a: &MarketRecord, b: &MarketRecord) -> u32 {
    let keyword_score: u32 = a
        .keywords
        .intersection(&b.keywords)
        .map(|kw| token_weight(kw))
        .sum();

    let title_a = a.title.trim().to_lowercase();
    let title_b = b.title.trim().to_lowercase();
    let title_score = if title_a.is_empty() || title_b.is_empty() {
        0
    } else if title_a == title_b {
        EXACT_TITLE_BONUS
    } else if title_a.contains(&title_b) || title_b.contains(&title_a) {
        CONTAINED_TITLE_BONUS
    } else {
        0
    };

    keyword_score + title_score
}

/// Hard gates applied regardless of score: identical institution families
/// (or none on both sides), and at least one shared month when both sides
/// carry one. Stray words like "may" can add a second month to a title.
pub fn passes_gates(a: &MarketRecord, b: &MarketRecord) -> bool {
    if institution_families(&a.keywords) != institution_families(&b.keywords) {
        return false;
    }

    let months_a = months(&a.keywords);
    let months_b = months(&b.keywords);
    if !months_a.is_empty() && !months_b.is_empty() && months_a.is_disjoint(&months_b) {
        return false;
    }

    true
}

/// Shared keywords, comma-separated, for logs and alerts.
pub fn match_reason(a: &MarketRecord, b: &MarketRecord) -> String {
    a.keywords
        .intersection(&b.keywords)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
