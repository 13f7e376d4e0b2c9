use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Locale tables driving keyword filtering. The default is the Korean policy;
/// other locales can supply their own through a TOML file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct KeywordPolicy {
    /// Keywords with this many characters or fewer are dropped unless allowlisted.
    pub short_max_chars: usize,
    /// Short locative suffixes that survive the length rule.
    pub short_allowlist: HashSet<String>,
    pub stopwords: HashSet<String>,
    pub filler_prefixes: HashSet<String>,
    pub filler_suffixes: HashSet<String>,
    /// Appended when no keyword mentions it, so every query stays in the restaurant domain.
    pub category_term: String,
}

const KO_SHORT_ALLOWLIST: &[&str] = &["구", "동", "로", "길", "역", "시", "읍", "면", "리"];

const KO_STOPWORDS: &[&str] = &[
    "그리고", "그런데", "근데", "그냥", "정말", "진짜", "너무", "아주", "완전", "약간",
    "추천", "추천해줘", "추천해주세요", "추천좀", "알려줘", "알려주세요", "찾아줘",
    "찾아주세요", "보여줘", "어디", "어디야", "어디가", "어디서", "있어", "있나요",
    "있을까", "있는", "없는", "좋은", "좋아", "좋은곳", "괜찮은", "하기", "하기좋은",
    "할만한", "가고싶어", "먹고싶어", "먹을만한", "먹을", "먹고", "같이", "함께",
    "장소", "위치", "근처", "주변", "요즘", "오늘", "내일", "지금", "여기", "거기",
    "그곳", "이곳", "something", "place", "please", "near", "nearby", "good",
];

const KO_FILLER_PREFIXES: &[&str] = &[
    "그", "저", "이", "좀", "막", "그냥", "정말", "진짜", "너무", "아주", "완전",
];

const KO_FILLER_SUFFIXES: &[&str] = &[
    "좋은", "있는", "하는", "같은", "곳", "데", "추천", "해줘", "알려줘", "주세요", "좀",
];

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|word| word.to_string()).collect()
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self {
            short_max_chars: 2,
            short_allowlist: to_set(KO_SHORT_ALLOWLIST),
            stopwords: to_set(KO_STOPWORDS),
            filler_prefixes: to_set(KO_FILLER_PREFIXES),
            filler_suffixes: to_set(KO_FILLER_SUFFIXES),
            category_term: "맛집".to_string(),
        }
    }
}

impl KeywordPolicy {
    /// Loads a policy from TOML. Tables missing from the file fall back to the Korean defaults.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword policy at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse keyword policy at {}", path.display()))
    }

    /// Whether a trimmed, non-empty keyword survives the filter rules.
    pub fn accepts(&self, keyword: &str) -> bool {
        let lowered = keyword.to_lowercase();

        if keyword.chars().count() <= self.short_max_chars
            && !self.short_allowlist.contains(&lowered)
        {
            return false;
        }
        if keyword.chars().all(char::is_numeric) {
            return false;
        }
        if !keyword.chars().any(|c| c.is_alphanumeric() || is_hangul(c)) {
            return false;
        }
        if self.stopwords.contains(&lowered) {
            return false;
        }

        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        if tokens.len() > 1 {
            let leads_with_filler = tokens
                .first()
                .is_some_and(|token| self.filler_prefixes.contains(*token));
            let trails_with_filler = tokens
                .last()
                .is_some_and(|token| self.filler_suffixes.contains(*token));
            if leads_with_filler || trails_with_filler {
                return false;
            }
        }

        true
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

/// Filters, deduplicates and augments keywords before they reach the place-search provider.
#[derive(Clone, Debug, Default)]
pub struct KeywordRefiner {
    policy: KeywordPolicy,
}

impl KeywordRefiner {
    pub fn new(policy: KeywordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &KeywordPolicy {
        &self.policy
    }

    pub fn refine(&self, keywords: &[String], location_name: Option<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut refined: Vec<String> = keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .filter(|keyword| self.policy.accepts(keyword))
            .filter(|keyword| seen.insert(keyword.to_string()))
            .map(str::to_string)
            .collect();

        if let Some(name) = location_name.map(str::trim) {
            if !name.is_empty()
                && self.policy.accepts(name)
                && !refined.iter().any(|keyword| keyword == name)
            {
                refined.insert(0, name.to_string());
            }
        }

        let category = self.policy.category_term.as_str();
        if !category.is_empty() && !refined.iter().any(|keyword| keyword.contains(category)) {
            refined.push(category.to_string());
        }

        refined
    }
}
