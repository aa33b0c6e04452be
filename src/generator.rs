//! Answer generation.
//!
//! Defines the [`AnswerGenerator`] trait and the built-in
//! [`ExtractiveGenerator`], which answers without any model call:
//!
//! 1. Analyze the question's intent ([`crate::intent`]).
//! 2. If function calling is enabled and a function is recommended, run it.
//!    Side functions (weather, traffic, restaurants, cost) answer directly.
//! 3. Otherwise answer with the top-ranked match: the answer part of an FAQ
//!    entry, or a topic snippet verbatim.
//! 4. With no usable context, apologize in the question's language.
//!
//! Use [`create_generator`] to build the provider named in `[generator]`.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use faq_harness_core::models::{ContextResult, MatchResult, SourceKind};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::functions::{self, FunctionName, Language};
use crate::intent::{self, IntentAnalysis};
use crate::knowledge::KnowledgeBase;

/// Everything a generator sees for one question.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub user_id: &'a str,
    /// Formatted prior exchanges; empty for a new user.
    pub history: &'a str,
    pub context: &'a ContextResult,
    pub question: &'a str,
}

/// A function the generator ran while answering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionInvocation {
    pub name: FunctionName,
    pub arguments: Value,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub intent: IntentAnalysis,
    pub function_calls: Vec<FunctionInvocation>,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Answer>;
}

/// Build the generator named in `config.provider`.
pub fn create_generator(
    config: &GeneratorConfig,
    kb: Arc<KnowledgeBase>,
    top_k: usize,
) -> Result<Arc<dyn AnswerGenerator>> {
    match config.provider.as_str() {
        "extractive" => Ok(Arc::new(ExtractiveGenerator::new(kb, config, top_k))),
        other => bail!("Unknown generator provider: '{}'. Must be extractive.", other),
    }
}

pub struct ExtractiveGenerator {
    kb: Arc<KnowledgeBase>,
    function_calling: bool,
    max_answer_chars: usize,
    top_k: usize,
}

impl ExtractiveGenerator {
    pub fn new(kb: Arc<KnowledgeBase>, config: &GeneratorConfig, top_k: usize) -> Self {
        Self {
            kb,
            function_calling: config.function_calling,
            max_answer_chars: config.max_answer_chars,
            top_k,
        }
    }

    fn compose(
        &self,
        request: &GenerationRequest<'_>,
        analysis: &IntentAnalysis,
        calls: &[FunctionInvocation],
    ) -> String {
        let language = analysis.language;

        if let Some(call) = calls
            .iter()
            .find(|c| c.name != FunctionName::SearchFaqDatabase)
        {
            return match language {
                Language::English => call.result.clone(),
                Language::Vietnamese => format!("Thông tin hiện có: {}", call.result),
            };
        }

        if !request.context.is_found() {
            return match language {
                Language::English => {
                    "I'm sorry, the FAQ knowledge base is not available right now.".to_string()
                }
                Language::Vietnamese => {
                    "Xin lỗi, cơ sở dữ liệu FAQ hiện không khả dụng.".to_string()
                }
            };
        }

        if let Some(top) = request.context.matches.first() {
            return match top.source_kind {
                SourceKind::Faq => answer_text(top).to_string(),
                SourceKind::General => top.content.clone(),
            };
        }

        match language {
            Language::English => {
                "I'm sorry, I couldn't find an answer to that in the FAQ. Could you rephrase the question?"
                    .to_string()
            }
            Language::Vietnamese => {
                "Xin lỗi, tôi không tìm thấy câu trả lời trong FAQ. Bạn có thể diễn đạt lại câu hỏi không?"
                    .to_string()
            }
        }
    }
}

#[async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Answer> {
        let terms = self.kb.terms();
        let analysis = intent::analyze(request.question, terms);
        debug!(
            user = request.user_id,
            intent = %analysis.intent,
            history_chars = request.history.len(),
            "analyzed question"
        );

        let mut calls = Vec::new();
        if self.function_calling {
            if let Some(call) = intent::suggest_call(request.question, &analysis, terms) {
                let result = functions::execute(&call, &self.kb, self.top_k);
                debug!(function = %call.name(), "executed function");
                calls.push(FunctionInvocation {
                    name: call.name(),
                    arguments: call.arguments(),
                    result,
                });
            }
        }

        let text = self.compose(request, &analysis, &calls);
        Ok(Answer {
            text: truncate_chars(&text, self.max_answer_chars),
            intent: analysis,
            function_calls: calls,
        })
    }
}

/// The answer part of an FAQ match (everything after the question line).
fn answer_text(m: &MatchResult) -> &str {
    match m.content.split_once('\n') {
        Some((_, answer)) => answer.trim(),
        None => m.content.trim(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
