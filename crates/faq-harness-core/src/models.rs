//! Core data models shared by the parser, scorer, and assembler.
//!
//! Corpus entries and topic snippets are built once and never mutated.
//! Match and context results are produced per query and not persisted.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One question/answer pair parsed from the raw corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusEntry {
    /// The marker line that opened this entry, verbatim (e.g. `Q: What is ...?`).
    pub question: String,
    /// Subsequent non-blank lines joined by single spaces.
    pub answer: String,
    /// Lowercased, punctuation-stripped, stop-word-filtered terms.
    pub keywords: BTreeSet<String>,
}

/// The raw corpus text together with its parsed entries.
///
/// The raw text is kept alongside the parse because every FOUND context
/// starts with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub raw: String,
    pub entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Parse `raw` and keep both the text and the entries.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let entries = crate::corpus::parse_corpus(&raw);
        Self { raw, entries }
    }
}

/// A small, statically defined non-FAQ context fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSnippet {
    pub id: String,
    pub content: String,
    pub keywords: BTreeSet<String>,
}

/// Where a match came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Faq,
    General,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Faq => f.write_str("FAQ"),
            SourceKind::General => f.write_str("GENERAL"),
        }
    }
}

/// Per-signal contribution to a match score.
///
/// Every field holds the weight the signal contributed (zero when the
/// signal did not fire). [`ScoreBreakdown::total`] is the match score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub raw_keyword: i64,
    pub normalized_keyword: i64,
    pub answer_overlap: i64,
    pub what_is: i64,
    pub domain: i64,
    /// Topic snippets only: one point per matching keyword.
    pub topic_keywords: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.raw_keyword
            + self.normalized_keyword
            + self.answer_overlap
            + self.what_is
            + self.domain
            + self.topic_keywords
    }
}

/// A scored candidate for a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Text included in the context blob.
    pub content: String,
    pub score: i64,
    pub source_kind: SourceKind,
    /// Entry question or topic id, for display.
    pub label: String,
    pub breakdown: ScoreBreakdown,
}

/// Whether a context could be produced at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextStatus {
    Found,
    NotFound,
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextStatus::Found => f.write_str("FOUND"),
            ContextStatus::NotFound => f.write_str("NOT_FOUND"),
        }
    }
}

/// Result handed to the answer generator.
///
/// When `status` is [`ContextStatus::Found`], `context` begins with the full
/// raw corpus text, followed by the ranked matches (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextResult {
    pub status: ContextStatus,
    pub context: String,
    pub matches: Vec<MatchResult>,
}

impl ContextResult {
    pub fn not_found() -> Self {
        Self {
            status: ContextStatus::NotFound,
            context: String::new(),
            matches: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == ContextStatus::Found
    }

    /// The highest ranked FAQ match, if any.
    pub fn best_faq(&self) -> Option<&MatchResult> {
        self.matches
            .iter()
            .find(|m| m.source_kind == SourceKind::Faq)
    }
}
