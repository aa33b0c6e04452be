//! Context assembly: score, rank, truncate, and concatenate.
//!
//! # Algorithm
//!
//! 1. Normalize the query once.
//! 2. Score every corpus entry, then every topic snippet.
//! 3. Drop zero-score candidates.
//! 4. Stable sort by score (desc). Ties keep declaration order, so corpus
//!    entries precede topics and each keeps its own order.
//! 5. Truncate to `top_k`.
//! 6. Context = raw corpus text, then a numbered list of the matches.
//!
//! A loaded corpus always yields [`ContextStatus::Found`], even with no
//! matches, so the answer generator sees the whole FAQ bank. `NotFound` is
//! returned only when there is no corpus at all.

use crate::models::{
    ContextResult, ContextStatus, Corpus, MatchResult, SourceKind, TopicSnippet,
};
use crate::normalize::TermMapping;
use crate::score::{score_entry, score_topic, ScoringQuery};

/// Default number of matches kept in a context.
pub const DEFAULT_TOP_K: usize = 3;

/// Heading placed between the raw corpus and the ranked matches.
pub const MATCHES_HEADING: &str = "Relevant matches:";

/// Build the context for `query`.
pub fn assemble(
    query: &str,
    corpus: Option<&Corpus>,
    topics: &[TopicSnippet],
    terms: &TermMapping,
    top_k: usize,
) -> ContextResult {
    let corpus = match corpus {
        Some(c) => c,
        None => return ContextResult::not_found(),
    };

    let matches = rank(score_candidates(query, corpus, topics, terms), top_k);
    let context = format_context(&corpus.raw, &matches);

    ContextResult {
        status: ContextStatus::Found,
        context,
        matches,
    }
}

/// Score every entry and topic, dropping zero scores. Output is in
/// declaration order (entries first).
pub fn score_candidates(
    query: &str,
    corpus: &Corpus,
    topics: &[TopicSnippet],
    terms: &TermMapping,
) -> Vec<MatchResult> {
    let prepared = ScoringQuery::new(query, &terms.normalize(query));
    let mut out = Vec::new();

    for entry in &corpus.entries {
        let breakdown = score_entry(&prepared, entry);
        if breakdown.total() > 0 {
            out.push(MatchResult {
                content: format!("{}\n{}", entry.question.trim(), entry.answer),
                score: breakdown.total(),
                source_kind: SourceKind::Faq,
                label: entry.question.trim().to_string(),
                breakdown,
            });
        }
    }

    for topic in topics {
        let breakdown = score_topic(&prepared, topic);
        if breakdown.total() > 0 {
            out.push(MatchResult {
                content: topic.content.clone(),
                score: breakdown.total(),
                source_kind: SourceKind::General,
                label: topic.id.clone(),
                breakdown,
            });
        }
    }

    out
}

/// Sort descending by score, first-declared wins ties, keep `top_k`.
pub fn rank(mut candidates: Vec<MatchResult>, top_k: usize) -> Vec<MatchResult> {
    candidates.retain(|c| c.score > 0);
    // `sort_by` is stable
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(top_k);
    candidates
}

/// Raw corpus text followed by the numbered matches.
pub fn format_context(raw: &str, matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 256);
    out.push_str(raw);
    if !raw.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(MATCHES_HEADING);
    out.push('\n');
    for (i, m) in matches.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] (score {}) {}\n",
            i + 1,
            m.source_kind,
            m.score,
            m.content
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreBreakdown;
    use crate::topics::builtin_topics;

    const FAQ: &str = "\
Q: What is Amazon EC2 Auto Scaling?
Amazon EC2 Auto Scaling is a fully managed service designed to launch or terminate Amazon EC2 instances automatically to help ensure you have the correct number of Amazon EC2 instances available to handle the load for your application.

Q: When should I use Amazon EC2 Auto Scaling vs. AWS Auto Scaling?
You should use AWS Auto Scaling to manage scaling for multiple resources across multiple services.

Q: What is target tracking?
Target tracking is a new type of scaling policy that you can use to set up dynamic scaling for your application in just a few simple steps.

Q: What are the benefits of using Amazon EC2 Auto Scaling?
Amazon EC2 Auto Scaling helps to maintain your application availability through fleet management for EC2 instances.
";

    fn corpus() -> Corpus {
        Corpus::from_raw(FAQ)
    }

    fn run(query: &str) -> ContextResult {
        assemble(
            query,
            Some(&corpus()),
            &builtin_topics(),
            &TermMapping::builtin(),
            DEFAULT_TOP_K,
        )
    }

    fn candidate(label: &str, score: i64) -> MatchResult {
        MatchResult {
            content: label.to_string(),
            score,
            source_kind: SourceKind::Faq,
            label: label.to_string(),
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn test_vietnamese_question_surfaces_english_entry() {
        let result = run("Amazon EC2 Auto Scaling là gì?");
        assert_eq!(result.status, ContextStatus::Found);
        assert!(result.context.contains(
            "Amazon EC2 Auto Scaling is a fully managed service designed to launch or terminate"
        ));
        let best = result.best_faq().expect("faq match");
        assert_eq!(best.label, "Q: What is Amazon EC2 Auto Scaling?");
        assert_eq!(best.breakdown.what_is, 4);
        assert!(result.matches.len() <= DEFAULT_TOP_K);
    }

    #[test]
    fn test_context_starts_with_raw_corpus() {
        let result = run("What is target tracking?");
        assert!(result.context.starts_with(FAQ));
        assert!(result.context.contains(MATCHES_HEADING));
        assert!(result.context.contains("1. [FAQ]"));
    }

    #[test]
    fn test_no_match_still_found_with_raw_text() {
        let result = run("xyzzy");
        assert_eq!(result.status, ContextStatus::Found);
        assert!(result.matches.is_empty());
        assert_eq!(result.context, FAQ);
    }

    #[test]
    fn test_empty_query_found_with_raw_text() {
        let result = run("");
        assert_eq!(result.status, ContextStatus::Found);
        assert_eq!(result.context, FAQ);
    }

    #[test]
    fn test_missing_corpus_is_not_found() {
        let result = assemble(
            "What is Amazon EC2 Auto Scaling?",
            None,
            &builtin_topics(),
            &TermMapping::builtin(),
            DEFAULT_TOP_K,
        );
        assert_eq!(result.status, ContextStatus::NotFound);
        assert!(result.context.is_empty());
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_malformed_corpus_found_with_raw_text() {
        let raw = "no markers here\njust prose about weather\n";
        let c = Corpus::from_raw(raw);
        assert!(c.entries.is_empty());
        let result = assemble("ec2", Some(&c), &[], &TermMapping::builtin(), 3);
        assert_eq!(result.status, ContextStatus::Found);
        assert_eq!(result.context, raw);
    }

    #[test]
    fn test_topic_snippet_annotated_general() {
        let result = run("What's the weather like in Hanoi?");
        let topic = result
            .matches
            .iter()
            .find(|m| m.source_kind == SourceKind::General)
            .expect("weather topic");
        assert_eq!(topic.label, "weather");
        assert!(result.context.contains("[GENERAL]"));
    }

    #[test]
    fn test_rank_ties_keep_declaration_order() {
        let ranked = rank(
            vec![
                candidate("c", 3),
                candidate("a", 5),
                candidate("e", 1),
                candidate("b", 5),
                candidate("d", 2),
            ],
            3,
        );
        let labels: Vec<&str> = ranked.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_drops_zero_and_handles_small_k() {
        let ranked = rank(vec![candidate("z", 0), candidate("a", 1)], 3);
        assert_eq!(ranked.len(), 1);
        assert!(rank(vec![candidate("a", 1)], 0).is_empty());
    }

    #[test]
    fn test_strong_entry_outranks_topic() {
        let c = Corpus::from_raw("Q: Weather report?\nDaily weather notes.\n");
        let result = assemble("weather", Some(&c), &builtin_topics(), &TermMapping::new(), 3);
        assert_eq!(result.matches[0].source_kind, SourceKind::Faq);
    }

    #[test]
    fn test_format_context_numbering() {
        let ctx = format_context("RAW", &[candidate("one", 2), candidate("two", 1)]);
        assert_eq!(
            ctx,
            "RAW\n\nRelevant matches:\n1. [FAQ] (score 2) one\n2. [FAQ] (score 1) two\n"
        );
    }
}
