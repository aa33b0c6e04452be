//! Question/answer corpus parser and keyword extraction.
//!
//! The corpus is a flat text file of `Q:`/`Q.`-prefixed question lines, each
//! followed by one or more answer lines:
//!
//! ```text
//! Q: What is Amazon EC2 Auto Scaling?
//! Amazon EC2 Auto Scaling is a fully managed service ...
//!
//! Q: When should I use Amazon EC2 Auto Scaling vs. AWS Auto Scaling?
//! ...
//! ```
//!
//! A question with no answer lines before the next marker is dropped.

use std::collections::BTreeSet;

use crate::models::CorpusEntry;

/// Characters stripped from both ends of every keyword token.
const TRIM_PUNCTUATION: &[char] = &['.', ',', '?', '!', ':', ';'];

/// Function words in English and Vietnamese that never become keywords.
///
/// Only words longer than two characters are listed; shorter tokens are
/// discarded before the stop-word check.
const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "was", "one", "our",
    "out", "has", "have", "had", "this", "that", "with", "from", "they", "them", "their",
    "there", "these", "those", "what", "when", "where", "which", "who", "whom", "how",
    "why", "will", "would", "should", "could", "your", "yours", "into", "its", "also",
    "than", "then", "been", "being", "does", "did", "doing", "such", "any", "each",
    "some", "more", "most", "other", "about", "over", "only", "own", "same", "very",
    "just", "use", "using", "used", "may", "might", "must", "let", "get", "via",
    // Vietnamese
    "của", "và", "là", "các", "những", "được", "cho", "với", "trong", "một", "này",
    "khi", "thì", "để", "không", "có", "gì", "nào", "như", "thế", "bạn", "tôi",
    "làm", "sao", "về", "từ", "đến", "hay", "hoặc", "nếu", "vì", "tại", "nhưng",
    "cũng", "đã", "đang", "sẽ", "rất", "hơn", "nhiều", "mình", "chúng", "họ", "nên",
    "thể", "bằng", "theo", "hôm", "nay",
];

/// Returns true if a trimmed line opens a new question.
pub fn is_question_marker(line: &str) -> bool {
    let t = line.trim();
    t.starts_with("Q:") || t.starts_with("Q.")
}

/// Parse raw corpus text into entries, preserving corpus order.
pub fn parse_corpus(raw: &str) -> Vec<CorpusEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<&str> = None;
    let mut answer = String::new();

    for line in raw.lines() {
        if is_question_marker(line) {
            if let Some(question) = pending {
                push_entry(&mut entries, question, &answer);
            }
            pending = Some(line);
            answer.clear();
        } else if pending.is_some() && !line.trim().is_empty() {
            answer.push_str(line);
            answer.push(' ');
        }
    }

    if let Some(question) = pending {
        push_entry(&mut entries, question, &answer);
    }

    entries
}

fn push_entry(entries: &mut Vec<CorpusEntry>, question: &str, answer: &str) {
    let answer = answer.trim();
    if answer.is_empty() {
        return;
    }
    let keywords = extract_keywords(&format!("{} {}", question, answer));
    entries.push(CorpusEntry {
        question: question.to_string(),
        answer: answer.to_string(),
        keywords,
    });
}

/// Lowercase, tokenize on whitespace, strip edge punctuation, and drop short
/// tokens and stop words.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|tok| tok.trim_matches(TRIM_PUNCTUATION))
        .filter(|tok| tok.chars().count() > 2)
        .filter(|tok| !is_stop_word(tok))
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Strip edge punctuation from a query token. Shared with the scorer so
/// query tokens and keywords are cut the same way.
pub(crate) fn trim_token(token: &str) -> &str {
    token.trim_matches(TRIM_PUNCTUATION)
}
