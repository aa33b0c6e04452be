//! The question-answering pipeline.
//!
//! One [`Assistant::ask`] runs, in order: load the user's history, assemble
//! the retrieval context, generate an answer, and save the exchange.

use std::sync::Arc;

use anyhow::{bail, Result};
use faq_harness_core::models::{ContextStatus, MatchResult};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::generator::{create_generator, AnswerGenerator, FunctionInvocation, GenerationRequest};
use crate::intent::IntentAnalysis;
use crate::knowledge::KnowledgeBase;
use crate::store::{create_store, LoadStatus, UserStore};

/// Questions the `demo` command walks through.
pub const DEMO_QUESTIONS: &[&str] = &[
    "What is Amazon EC2 Auto Scaling?",
    "Amazon EC2 Auto Scaling là gì?",
    "Lợi ích của Auto Scaling là gì?",
    "How does target tracking work?",
    "Thời tiết hôm nay ở Hà Nội như thế nào?",
    "Traffic situation in Ho Chi Minh City?",
    "Best restaurants in Da Nang?",
    "Cost analysis for t3.micro instances?",
    "Hello, how are you?",
];

/// Outcome of one question.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub history_status: LoadStatus,
    pub context_status: ContextStatus,
    pub matches: Vec<MatchResult>,
    pub intent: IntentAnalysis,
    pub function_calls: Vec<FunctionInvocation>,
}

pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    store: Arc<dyn UserStore>,
    generator: Arc<dyn AnswerGenerator>,
    top_k: usize,
}

impl Assistant {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        store: Arc<dyn UserStore>,
        generator: Arc<dyn AnswerGenerator>,
        top_k: usize,
    ) -> Self {
        Self {
            kb,
            store,
            generator,
            top_k,
        }
    }

    /// Load the knowledge base and build the configured store and generator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let kb = Arc::new(KnowledgeBase::load(config));
        let store = create_store(&config.storage)?;
        let generator = create_generator(&config.generator, kb.clone(), config.retrieval.top_k)?;
        Ok(Self::new(kb, store, generator, config.retrieval.top_k))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn generator(&self) -> &dyn AnswerGenerator {
        self.generator.as_ref()
    }

    /// Answer one question for `user_id` and record the exchange.
    pub async fn ask(&self, user_id: &str, question: &str) -> Result<Turn> {
        let user_id = user_id.trim();
        let question = question.trim();
        if user_id.is_empty() {
            bail!("User id must not be empty");
        }
        if question.is_empty() {
            bail!("Question must not be empty");
        }

        let history = self.store.load(user_id).await?;
        let context = self.kb.context(question, self.top_k);
        let answer = self
            .generator
            .generate(&GenerationRequest {
                user_id,
                history: &history.history,
                context: &context,
                question,
            })
            .await?;
        self.store.save(user_id, question, &answer.text).await?;

        info!(
            user = user_id,
            context = %context.status,
            matches = context.matches.len(),
            functions = answer.function_calls.len(),
            "answered question"
        );

        Ok(Turn {
            user_id: user_id.to_string(),
            question: question.to_string(),
            answer: answer.text,
            history_status: history.status,
            context_status: context.status,
            matches: context.matches,
            intent: answer.intent,
            function_calls: answer.function_calls,
        })
    }

    /// Answer several questions in order. Blank lines are skipped; each
    /// question sees the history saved by the ones before it.
    pub async fn ask_batch<S: AsRef<str>>(&self, user_id: &str, questions: &[S]) -> Result<Vec<Turn>> {
        let mut turns = Vec::with_capacity(questions.len());
        for q in questions {
            let q = q.as_ref();
            if q.trim().is_empty() {
                continue;
            }
            turns.push(self.ask(user_id, q).await?);
        }
        Ok(turns)
    }
}
