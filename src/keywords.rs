//! Deterministic keyword derivation for market records.
//!
//! Both venue normalizers funnel titles through here so the matcher compares
//! tokens produced by the same rules. Tokens fall into four families:
//! institution (`fed`, `ecb`, `boj` and aliases), direction (`decrease`,
//! `increase`, `nochange` and aliases), magnitude (`<N>bps`) and time
//! (3-letter month names, Opinion period codes, country codes).

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static RE_ECB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ecb|european central").unwrap());
static RE_FED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)fed|fomc|federal").unwrap());
static RE_BOJ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)boj|bank of japan").unwrap());
static RE_BOJ_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)boj|bank of japan|japan").unwrap());
static RE_DECREASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)decrease|cut").unwrap());
static RE_INCREASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)increase|hike").unwrap());
static RE_NO_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no\s*change|unchanged").unwrap());
static RE_BPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\+?\s*bps").unwrap());
// Whole words only: "dec" must not fire on "decrease".
static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
    )
    .unwrap()
});

/// How strictly institution names are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionScan {
    /// "japan" alone is not enough to tag BoJ.
    Strict,
    /// Any mention of "japan" tags BoJ.
    Loose,
}

/// Structural traits of an outcome option title, e.g. "50+ bps decrease".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTraits {
    /// Basis-point magnitude digits, e.g. "50".
    pub bps: Option<String>,
    pub decrease: bool,
    pub increase: bool,
    pub no_change: bool,
}

impl OptionTraits {
    pub fn of(title: &str) -> Self {
        Self {
            bps: bps_magnitude(title),
            decrease: RE_DECREASE.is_match(title),
            increase: RE_INCREASE.is_match(title),
            no_change: RE_NO_CHANGE.is_match(title),
        }
    }
}

/// Basis-point digits cited in a title, if any.
pub fn bps_magnitude(title: &str) -> Option<String> {
    RE_BPS
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Keywords for an Opinion option: institution from the event title,
/// direction and magnitude from the option title, period and country as-is.
pub fn opinion_keywords(
    parent_title: &str,
    option_title: &str,
    period: Option<&str>,
    country_code: Option<&str>,
) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    push_institution_tags(&mut keywords, parent_title, InstitutionScan::Strict);
    push_option_tags(&mut keywords, option_title);

    if let Some(period) = period.filter(|p| !p.trim().is_empty()) {
        keywords.insert(period.trim().to_lowercase());
    }
    if let Some(code) = country_code.filter(|c| !c.trim().is_empty()) {
        keywords.insert(code.trim().to_lowercase());
    }
    keywords
}

/// Keywords for a Polymarket option: institution and months from the event
/// and option text combined, direction and magnitude from the option title.
pub fn polymarket_keywords(event_title: &str, option_title: &str) -> BTreeSet<String> {
    let combined = format!("{event_title} {option_title}");
    let mut keywords = BTreeSet::new();
    push_institution_tags(&mut keywords, &combined, InstitutionScan::Loose);
    push_option_tags(&mut keywords, option_title);
    for month in months_in(&combined) {
        keywords.insert(month.to_string());
    }
    keywords
}

/// Normalized 3-letter months mentioned as whole words in `text`.
pub fn months_in(text: &str) -> BTreeSet<&'static str> {
    RE_MONTH
        .find_iter(text)
        .filter_map(|m| {
            let prefix = m.as_str().get(..3)?.to_lowercase();
            MONTHS.iter().copied().find(|month| *month == prefix)
        })
        .collect()
}

fn push_institution_tags(keywords: &mut BTreeSet<String>, text: &str, scan: InstitutionScan) {
    if RE_ECB.is_match(text) {
        extend(keywords, &["ecb", "european", "euro"]);
    }
    if RE_FED.is_match(text) {
        extend(keywords, &["fed", "fomc", "federal", "us"]);
    }
    let boj = match scan {
        InstitutionScan::Strict => RE_BOJ.is_match(text),
        InstitutionScan::Loose => RE_BOJ_LOOSE.is_match(text),
    };
    if boj {
        extend(keywords, &["boj", "japan", "japanese"]);
    }
}

fn push_option_tags(keywords: &mut BTreeSet<String>, option_title: &str) {
    let traits = OptionTraits::of(option_title);
    if traits.decrease {
        extend(keywords, &["decrease", "cut"]);
    }
    if traits.increase {
        extend(keywords, &["increase", "hike"]);
    }
    if traits.no_change {
        extend(keywords, &["nochange", "unchanged"]);
    }
    if let Some(bps) = traits.bps {
        keywords.insert(format!("{bps}bps"));
    }
}

fn extend(keywords: &mut BTreeSet<String>, tags: &[&str]) {
    keywords.extend(tags.iter().map(|t| t.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn opinion_fomc_option() {
        let kw = opinion_keywords("US FOMC Interest Rate", "25 bps decrease", Some("MAR"), Some("US"));
        assert_eq!(
            kw,
            set(&["fed", "fomc", "federal", "us", "decrease", "cut", "25bps", "mar"])
        );
    }

    #[test]
    fn opinion_strict_scan_ignores_bare_japan() {
        let kw = opinion_keywords("Japan CPI", "Above 3%", None, Some("JP"));
        assert!(!kw.contains("boj"));
        assert!(kw.contains("jp"));
    }

    #[test]
    fn polymarket_months_are_whole_words() {
        let kw = polymarket_keywords("Fed decision in March?", "25 bps decrease");
        assert!(kw.contains("mar"));
        // "decrease" must not smuggle in December.
        assert!(!kw.contains("dec"));
    }

    #[test]
    fn polymarket_loose_scan_tags_japan_as_boj() {
        let kw = polymarket_keywords("Japan rate decision", "No change");
        assert!(kw.contains("boj"));
        assert!(kw.contains("nochange"));
        assert!(kw.contains("unchanged"));
    }

    #[test]
    fn plus_suffix_bps_is_captured() {
        assert_eq!(bps_magnitude("50+ bps decrease").as_deref(), Some("50"));
        assert_eq!(bps_magnitude("25bps hike").as_deref(), Some("25"));
        assert_eq!(bps_magnitude("No change"), None);
    }

    #[test]
    fn option_traits_flags() {
        let t = OptionTraits::of("Rates unchanged");
        assert!(t.no_change);
        assert!(!t.decrease && !t.increase);
        let t = OptionTraits::of("75 bps hike");
        assert!(t.increase);
        assert_eq!(t.bps.as_deref(), Some("75"));
    }

    #[test]
    fn months_normalize_long_and_short_forms() {
        let months = months_in("September or Sept or sep, and June");
        assert_eq!(months.into_iter().collect::<Vec<_>>(), vec!["jun", "sep"]);
    }
}
