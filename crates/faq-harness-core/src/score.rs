//! Additive relevance scoring.
//!
//! Each signal contributes a fixed weight, and the per-signal contributions
//! are kept in a [`ScoreBreakdown`] so a caller can see which signals fired.
//!
//! | Signal | Fires when | Weight |
//! |--------|-----------|--------|
//! | raw keyword | an entry keyword is a substring of the lowercased raw query | +2 |
//! | normalized keyword | an entry keyword is a substring of the normalized query | +3 |
//! | answer overlap | a query token (> 2 chars) occurs in the lowercased answer | +1 |
//! | what-is | query asks "what is" / "là gì" and the entry question is a "what is" | +4 |
//! | domain | query and entry question both mention an AWS/EC2/Auto Scaling term | +2 |
//!
//! Topic snippets only score keyword hits: +1 for every keyword found in the
//! raw or normalized query.

use crate::corpus::trim_token;
use crate::models::{CorpusEntry, ScoreBreakdown, TopicSnippet};

pub const RAW_KEYWORD_WEIGHT: i64 = 2;
pub const NORMALIZED_KEYWORD_WEIGHT: i64 = 3;
pub const ANSWER_OVERLAP_WEIGHT: i64 = 1;
pub const WHAT_IS_WEIGHT: i64 = 4;
pub const DOMAIN_WEIGHT: i64 = 2;
pub const TOPIC_KEYWORD_WEIGHT: i64 = 1;

/// "What is" markers in the normalized (English) and raw (Vietnamese) query.
const WHAT_IS_CANONICAL: &str = "what is";
const WHAT_IS_VIETNAMESE: &str = "là gì";

const DOMAIN_TERMS: &[&str] = &["aws", "ec2", "auto scaling", "autoscaling"];

/// A query prepared once for scoring against many candidates.
#[derive(Debug, Clone)]
pub struct ScoringQuery {
    raw: String,
    normalized: String,
    tokens: Vec<String>,
}

impl ScoringQuery {
    /// `raw` is lowercased here; `normalized` is expected to be the output of
    /// [`TermMapping::normalize`](crate::normalize::TermMapping::normalize).
    pub fn new(raw: &str, normalized: &str) -> Self {
        let raw = raw.to_lowercase();
        let mut tokens: Vec<String> = Vec::new();
        for tok in raw.split_whitespace().chain(normalized.split_whitespace()) {
            let tok = trim_token(tok);
            if tok.chars().count() > 2 && !tokens.iter().any(|t| t == tok) {
                tokens.push(tok.to_string());
            }
        }
        Self {
            raw,
            normalized: normalized.to_string(),
            tokens,
        }
    }

    fn asks_what_is(&self) -> bool {
        self.normalized.contains(WHAT_IS_CANONICAL) || self.raw.contains(WHAT_IS_VIETNAMESE)
    }

    fn mentions_domain(&self) -> bool {
        contains_domain_term(&self.raw) || contains_domain_term(&self.normalized)
    }
}

fn contains_domain_term(text: &str) -> bool {
    DOMAIN_TERMS.iter().any(|t| text.contains(t))
}

/// Score a corpus entry.
pub fn score_entry(query: &ScoringQuery, entry: &CorpusEntry) -> ScoreBreakdown {
    let mut b = ScoreBreakdown::default();

    if entry.keywords.iter().any(|k| query.raw.contains(k.as_str())) {
        b.raw_keyword = RAW_KEYWORD_WEIGHT;
    }
    if entry
        .keywords
        .iter()
        .any(|k| query.normalized.contains(k.as_str()))
    {
        b.normalized_keyword = NORMALIZED_KEYWORD_WEIGHT;
    }

    let answer = entry.answer.to_lowercase();
    if query.tokens.iter().any(|t| answer.contains(t.as_str())) {
        b.answer_overlap = ANSWER_OVERLAP_WEIGHT;
    }

    let question = entry.question.to_lowercase();
    if query.asks_what_is() && question.contains(WHAT_IS_CANONICAL) {
        b.what_is = WHAT_IS_WEIGHT;
    }
    if query.mentions_domain() && contains_domain_term(&question) {
        b.domain = DOMAIN_WEIGHT;
    }

    b
}

/// Score a topic snippet: one point per keyword present in either form of
/// the query.
pub fn score_topic(query: &ScoringQuery, topic: &TopicSnippet) -> ScoreBreakdown {
    let hits = topic
        .keywords
        .iter()
        .filter(|k| query.raw.contains(k.as_str()) || query.normalized.contains(k.as_str()))
        .count() as i64;
    ScoreBreakdown {
        topic_keywords: hits * TOPIC_KEYWORD_WEIGHT,
        ..ScoreBreakdown::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::parse_corpus;
    use crate::normalize::normalize;
    use crate::topics::builtin_topics;

    fn q(raw: &str) -> ScoringQuery {
        ScoringQuery::new(raw, &normalize(raw))
    }

    fn ec2_entry() -> CorpusEntry {
        parse_corpus(
            "Q: What is Amazon EC2 Auto Scaling?\n\
             Amazon EC2 Auto Scaling is a fully managed service designed to launch or terminate Amazon EC2 instances automatically.",
        )
        .remove(0)
    }

    #[test]
    fn test_english_exact_question_fires_every_signal() {
        let b = score_entry(&q("What is Amazon EC2 Auto Scaling?"), &ec2_entry());
        assert_eq!(b.raw_keyword, 2);
        assert_eq!(b.normalized_keyword, 3);
        assert_eq!(b.answer_overlap, 1);
        assert_eq!(b.what_is, 4);
        assert_eq!(b.domain, 2);
        assert_eq!(b.total(), 12);
    }

    #[test]
    fn test_vietnamese_what_is_boost() {
        let b = score_entry(&q("Amazon EC2 Auto Scaling là gì?"), &ec2_entry());
        assert_eq!(b.what_is, WHAT_IS_WEIGHT);
        assert_eq!(b.domain, DOMAIN_WEIGHT);
        assert!(b.total() >= 10);
    }

    #[test]
    fn test_unrelated_query_scores_zero() {
        let b = score_entry(&q("hello there"), &ec2_entry());
        assert_eq!(b.total(), 0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(score_entry(&q(""), &ec2_entry()).total(), 0);
        for topic in builtin_topics() {
            assert_eq!(score_topic(&q(""), &topic).total(), 0);
        }
    }

    #[test]
    fn test_what_is_requires_entry_what_is() {
        let entry = parse_corpus("Q: When should I use EC2 Auto Scaling?\nWhenever load varies.")
            .remove(0);
        let b = score_entry(&q("EC2 Auto Scaling là gì?"), &entry);
        assert_eq!(b.what_is, 0);
        assert_eq!(b.domain, DOMAIN_WEIGHT);
    }

    #[test]
    fn test_domain_requires_both_sides() {
        let entry = parse_corpus("Q: What is target tracking?\nA scaling policy.").remove(0);
        let b = score_entry(&q("EC2 target tracking"), &entry);
        assert_eq!(b.domain, 0);
    }

    #[test]
    fn test_normalized_signal_from_translation() {
        let entry = parse_corpus("Q: Weather service?\nWe report the weather daily.").remove(0);
        let b = score_entry(&q("thời tiết"), &entry);
        assert_eq!(b.raw_keyword, 0);
        assert_eq!(b.normalized_keyword, NORMALIZED_KEYWORD_WEIGHT);
    }

    #[test]
    fn test_topic_counts_each_keyword() {
        let weather = builtin_topics().remove(0);
        let b = score_topic(&q("weather forecast: rain or sunny?"), &weather);
        assert_eq!(b.topic_keywords, 4);
        assert_eq!(b.raw_keyword, 0);
    }

    #[test]
    fn test_topic_matches_normalized_query() {
        let weather = builtin_topics().remove(0);
        let b = score_topic(&q("Thời tiết hôm nay ở Hà Nội như thế nào?"), &weather);
        assert_eq!(b.topic_keywords, 1);
    }

    #[test]
    fn test_adding_keyword_token_is_monotonic() {
        let entry = ec2_entry();
        let base = [
            "",
            "hello",
            "what",
            "là gì",
            "tell me about fleets",
            "Amazon là gì?",
        ];
        for kw in &entry.keywords {
            for b in base {
                let without = score_entry(&q(b), &entry).total();
                let with = score_entry(&q(&format!("{} {}", b, kw)), &entry).total();
                assert!(
                    with >= without,
                    "adding {:?} to {:?} lowered score {} -> {}",
                    kw,
                    b,
                    without,
                    with
                );
            }
        }
    }
}
