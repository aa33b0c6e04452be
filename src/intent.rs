//! Keyword-based question intent analysis.
//!
//! Runs on the normalized query, so Vietnamese phrasings that the term
//! mapping rewrites (`thời tiết` → `weather`, `hà nội` → `hanoi`) are
//! recognized by the same English vocabulary. Language is detected on the
//! raw question.

use std::fmt;

use faq_harness_core::normalize::TermMapping;
use serde::Serialize;

use crate::functions::{City, Cuisine, FunctionCall, FunctionName, Language, Load};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Weather,
    Traffic,
    Restaurant,
    Cost,
    Faq,
    General,
}

impl Intent {
    /// The side function that answers this intent.
    pub fn function(&self) -> Option<FunctionName> {
        match self {
            Intent::Weather => Some(FunctionName::GetWeatherInfo),
            Intent::Traffic => Some(FunctionName::GetTrafficInfo),
            Intent::Restaurant => Some(FunctionName::RecommendRestaurants),
            Intent::Cost => Some(FunctionName::AnalyzeAwsCosts),
            Intent::Faq => Some(FunctionName::SearchFaqDatabase),
            Intent::General => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Weather => "weather",
            Intent::Traffic => "traffic",
            Intent::Restaurant => "restaurant",
            Intent::Cost => "cost",
            Intent::Faq => "faq",
            Intent::General => "general",
        };
        f.write_str(s)
    }
}

/// Vocabulary per intent, checked in this order. On equal hit counts the
/// earlier intent wins, so "cost of auto scaling" is a cost question.
const VOCABULARY: &[(Intent, &[&str])] = &[
    (
        Intent::Weather,
        &["weather", "temperature", "forecast", "rain", "humidity", "nhiệt độ"],
    ),
    (
        Intent::Traffic,
        &["traffic", "congestion", "rush hour", "commute"],
    ),
    (
        Intent::Restaurant,
        &["restaurant", "food", "dining", "cuisine", "pho", "seafood", "eat", "món ăn"],
    ),
    (
        Intent::Cost,
        &["cost", "price", "pricing", "saving", "billing", "budget", "tiết kiệm"],
    ),
    (
        Intent::Faq,
        &[
            "aws",
            "ec2",
            "auto scaling",
            "target tracking",
            "scaling policy",
            "predictive scaling",
            "instance",
            "fleet",
        ],
    ),
];

const VIETNAMESE_CHARS: &str = "àáảãạăằắẳẵặâầấẩẫậèéẻẽẹêềếểễệìíỉĩịòóỏõọôồốổỗộơờớởỡợùúủũụưừứửữựỳýỷỹỵđ";

/// Outcome of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentAnalysis {
    pub language: Language,
    pub intent: Intent,
    /// Heuristic confidence in `[0, 1]`.
    pub confidence: f64,
    pub recommended_function: Option<FunctionName>,
    pub reasoning: String,
}

/// Vietnamese if the question carries any Vietnamese-specific letter.
pub fn detect_language(question: &str) -> Language {
    let vietnamese = question
        .to_lowercase()
        .chars()
        .any(|c| VIETNAMESE_CHARS.contains(c));
    if vietnamese {
        Language::Vietnamese
    } else {
        Language::English
    }
}

fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Multi-word terms match as substrings; single words match a whole token,
/// optionally with a plural `s`.
fn has_term(normalized: &str, toks: &[&str], term: &str) -> bool {
    if term.contains(' ') {
        return normalized.contains(term);
    }
    toks.iter()
        .any(|t| *t == term || t.strip_suffix('s') == Some(term))
}

/// Classify `question` and pick the function that should answer it.
pub fn analyze(question: &str, terms: &TermMapping) -> IntentAnalysis {
    let language = detect_language(question);
    let normalized = terms.normalize(question);
    let toks = tokens(&normalized);

    let mut best: Option<(Intent, Vec<&str>)> = None;
    for (intent, vocabulary) in VOCABULARY {
        let hits: Vec<&str> = vocabulary
            .iter()
            .copied()
            .filter(|term| has_term(&normalized, &toks, term))
            .collect();
        let better = match &best {
            Some((_, b)) => hits.len() > b.len(),
            None => !hits.is_empty(),
        };
        if better {
            best = Some((*intent, hits));
        }
    }

    match best {
        Some((intent, hits)) => IntentAnalysis {
            language,
            intent,
            confidence: (0.5 + 0.15 * hits.len() as f64).min(0.95),
            recommended_function: intent.function(),
            reasoning: format!("{} question: matched {}", intent, hits.join(", ")),
        },
        None => IntentAnalysis {
            language,
            intent: Intent::General,
            confidence: 0.3,
            recommended_function: None,
            reasoning: "no domain vocabulary matched; answering from context".to_string(),
        },
    }
}

/// Build the function call for an analysis, extracting arguments from the
/// question. Returns `None` when no function is recommended.
pub fn suggest_call(
    question: &str,
    analysis: &IntentAnalysis,
    terms: &TermMapping,
) -> Option<FunctionCall> {
    let normalized = terms.normalize(question);
    let toks = tokens(&normalized);

    let call = match analysis.recommended_function? {
        FunctionName::SearchFaqDatabase => FunctionCall::SearchFaqDatabase {
            query: question.trim().to_string(),
            language: analysis.language,
        },
        FunctionName::GetWeatherInfo => FunctionCall::GetWeatherInfo {
            city: extract_city(&normalized),
        },
        FunctionName::GetTrafficInfo => FunctionCall::GetTrafficInfo {
            city: extract_city(&normalized),
        },
        FunctionName::RecommendRestaurants => FunctionCall::RecommendRestaurants {
            city: extract_city(&normalized),
            cuisine_type: extract_cuisine(&normalized, &toks),
        },
        FunctionName::AnalyzeAwsCosts => FunctionCall::AnalyzeAwsCosts {
            instance_type: extract_instance_type(&toks).unwrap_or_else(|| "t3.micro".to_string()),
            expected_load: extract_load(&normalized, &toks),
        },
    };
    Some(call)
}

fn extract_city(normalized: &str) -> City {
    if normalized.contains("ho chi minh") || normalized.contains("hcm") {
        City::HoChiMinh
    } else if normalized.contains("da nang") {
        City::DaNang
    } else {
        City::Hanoi
    }
}

fn extract_cuisine(normalized: &str, toks: &[&str]) -> Cuisine {
    if has_term(normalized, toks, "pho") || has_term(normalized, toks, "phở") {
        Cuisine::Pho
    } else if has_term(normalized, toks, "seafood") || normalized.contains("hải sản") {
        Cuisine::Seafood
    } else if has_term(normalized, toks, "vietnamese") || normalized.contains("món việt") {
        Cuisine::Vietnamese
    } else {
        Cuisine::Any
    }
}

fn extract_load(normalized: &str, toks: &[&str]) -> Load {
    let any = |words: &[&str]| words.iter().any(|w| has_term(normalized, toks, w));
    if any(&["variable", "unpredictable", "spike", "seasonal", "fluctuating", "thay đổi"]) {
        Load::Variable
    } else if any(&["high", "heavy", "peak"]) {
        Load::High
    } else if any(&["low", "light", "idle", "thấp"]) {
        Load::Low
    } else {
        Load::Medium
    }
}

/// An EC2 instance type such as `t3.micro` or `m5.2xlarge`.
fn extract_instance_type(toks: &[&str]) -> Option<String> {
    toks.iter().find_map(|t| {
        let (family, size) = t.split_once('.')?;
        let family_ok = family.chars().next()?.is_ascii_alphabetic()
            && family.chars().any(|c| c.is_ascii_digit())
            && family.chars().all(|c| c.is_ascii_alphanumeric());
        let size_ok = !size.is_empty() && size.chars().all(|c| c.is_ascii_alphanumeric());
        (family_ok && size_ok).then(|| t.to_string())
    })
}
