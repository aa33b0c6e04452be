//! Startup loading of the FAQ corpus, topic snippets, and term mapping.
//!
//! The [`KnowledgeBase`] is built once and then shared read-only (behind
//! `Arc`) by every request. Loading never fails: a missing, unreadable, or
//! empty corpus file is logged and replaced by a single embedded entry,
//! unless `[corpus].fallback` is disabled, in which case the knowledge base
//! has no corpus and every context comes back `NOT_FOUND`.

use std::fmt;
use std::path::{Path, PathBuf};

use faq_harness_core::assemble::assemble;
use faq_harness_core::models::{ContextResult, Corpus, TopicSnippet};
use faq_harness_core::normalize::TermMapping;
use faq_harness_core::topics::builtin_topics;
use tracing::{debug, info, warn};

use crate::config::Config;

/// Embedded corpus used when the configured file cannot be used.
pub const DEFAULT_CORPUS: &str = "Q: What is Amazon EC2 Auto Scaling?\n\
Amazon EC2 Auto Scaling is a fully managed service designed to launch or terminate Amazon EC2 instances automatically to help ensure you have the correct number of Amazon EC2 instances available to handle the load for your application.\n";

/// Where the loaded corpus came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    File(PathBuf),
    Fallback { reason: String },
    Embedded,
    Unavailable { reason: String },
}

impl fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusSource::File(p) => write!(f, "file {}", p.display()),
            CorpusSource::Fallback { reason } => write!(f, "embedded fallback ({})", reason),
            CorpusSource::Embedded => f.write_str("embedded"),
            CorpusSource::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Immutable retrieval tables shared across requests.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    corpus: Option<Corpus>,
    topics: Vec<TopicSnippet>,
    terms: TermMapping,
    source: CorpusSource,
}

impl KnowledgeBase {
    /// Load the corpus named in `config` and build the tables.
    pub fn load(config: &Config) -> Self {
        let terms = build_terms(config);
        let (corpus, source) = load_corpus(&config.corpus.path, config.corpus.fallback);
        if let Some(c) = &corpus {
            info!(entries = c.entries.len(), source = %source, "corpus loaded");
        }
        Self {
            corpus,
            topics: builtin_topics(),
            terms,
            source,
        }
    }

    /// Build from in-memory corpus text with the built-in tables.
    pub fn from_text(raw: &str) -> Self {
        Self {
            corpus: Some(Corpus::from_raw(raw)),
            topics: builtin_topics(),
            terms: TermMapping::builtin(),
            source: CorpusSource::Embedded,
        }
    }

    /// A knowledge base with no corpus at all.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            corpus: None,
            topics: builtin_topics(),
            terms: TermMapping::builtin(),
            source: CorpusSource::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    pub fn corpus(&self) -> Option<&Corpus> {
        self.corpus.as_ref()
    }

    pub fn topics(&self) -> &[TopicSnippet] {
        &self.topics
    }

    pub fn terms(&self) -> &TermMapping {
        &self.terms
    }

    pub fn source(&self) -> &CorpusSource {
        &self.source
    }

    pub fn normalize(&self, query: &str) -> String {
        self.terms.normalize(query)
    }

    /// Retrieve the context for `query`, keeping at most `top_k` matches.
    pub fn context(&self, query: &str, top_k: usize) -> ContextResult {
        let result = assemble(
            query,
            self.corpus.as_ref(),
            &self.topics,
            &self.terms,
            top_k,
        );
        debug!(
            status = %result.status,
            matches = result.matches.len(),
            "assembled context"
        );
        result
    }
}

fn build_terms(config: &Config) -> TermMapping {
    let mut terms = TermMapping::builtin();
    for t in &config.terms {
        terms.insert(&t.canonical, t.alternates.iter().map(String::as_str));
    }
    for (alt, canonical) in terms.conflicts() {
        warn!(
            alternate = %alt,
            canonical = %canonical,
            "term alternate overlaps a canonical term; normalization may not be idempotent"
        );
    }
    terms
}

fn load_corpus(path: &Path, fallback: bool) -> (Option<Corpus>, CorpusSource) {
    let failure = match std::fs::read_to_string(path) {
        Ok(raw) if !raw.trim().is_empty() => {
            return (
                Some(Corpus::from_raw(raw)),
                CorpusSource::File(path.to_path_buf()),
            );
        }
        Ok(_) => format!("{} is empty", path.display()),
        Err(e) => format!("cannot read {}: {}", path.display(), e),
    };

    if fallback {
        warn!("{}; using embedded default corpus", failure);
        (
            Some(Corpus::from_raw(DEFAULT_CORPUS)),
            CorpusSource::Fallback { reason: failure },
        )
    } else {
        warn!("{}; no corpus available", failure);
        (None, CorpusSource::Unavailable { reason: failure })
    }
}
