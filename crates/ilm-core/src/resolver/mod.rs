//! Answer resolution: START → LEXICAL → KEYWORD → GENERATIVE → DONE.
//!
//! Tiers run strictly in order and the first hit is terminal. The knowledge base is
//! immutable, so one resolver can serve any number of concurrent requests without locking.

use crate::knowledge::KnowledgeBase;
use crate::matcher::{KeywordMatcher, LexicalMatcher};
use crate::shared::{CoreConfig, DEFAULT_MAX_QUESTION_CHARS};
use serde::Serialize;
use std::sync::Arc;

/// Returned for every question when the knowledge base holds no records.
pub const NO_DATA_ANSWER: &str = "I'm sorry, no data available.";

/// Client-facing message for an empty or missing question.
pub const NO_QUESTION_MESSAGE: &str = "No question provided";

/// Final tier of the pipeline. Implementations are a fail-soft boundary: they never return an
/// error, converting every internal failure into a user-facing answer string.
#[async_trait::async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Generates an answer for the (already normalized) question.
    async fn generate(&self, question: &str) -> String;
}

/// Client errors: the question is rejected before any tier runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("No question provided")]
    EmptyQuestion,
    #[error("Question too long ({len} characters, max {max})")]
    QuestionTooLong { len: usize, max: usize },
}

/// Which tier produced an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum AnswerSource {
    /// Knowledge base was empty; no tier ran.
    NoData,
    Lexical { index: usize, score: f64 },
    Keyword { index: usize },
    Generative,
}

impl AnswerSource {
    pub fn label(&self) -> &'static str {
        match self {
            AnswerSource::NoData => "no_data",
            AnswerSource::Lexical { .. } => "lexical",
            AnswerSource::Keyword { .. } => "keyword",
            AnswerSource::Generative => "generative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Orchestrates the three tiers over a shared, read-only knowledge base.
pub struct AnswerResolver {
    knowledge: Arc<KnowledgeBase>,
    lexical: LexicalMatcher,
    keyword: KeywordMatcher,
    max_question_chars: usize,
    generator: Arc<dyn AnswerGenerator>,
}

impl AnswerResolver {
    /// Resolver with default thresholds (fuzzy cutoff 60, keyword overlap 2).
    pub fn new(knowledge: Arc<KnowledgeBase>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            knowledge,
            lexical: LexicalMatcher::default(),
            keyword: KeywordMatcher::default(),
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
            generator,
        }
    }

    /// Resolver with thresholds taken from config.
    pub fn from_config(
        config: &CoreConfig,
        knowledge: Arc<KnowledgeBase>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self::new(knowledge, generator)
            .with_lexical(LexicalMatcher::new(config.fuzzy_cutoff))
            .with_keyword(KeywordMatcher::new(config.keyword_min_overlap))
            .with_max_question_chars(config.max_question_chars)
    }

    pub fn with_lexical(mut self, lexical: LexicalMatcher) -> Self {
        self.lexical = lexical;
        self
    }

    pub fn with_keyword(mut self, keyword: KeywordMatcher) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn with_max_question_chars(mut self, max: usize) -> Self {
        self.max_question_chars = max;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Resolves a free-text question to a single answer.
    ///
    /// Errors only when the question is empty after trimming or longer than the configured
    /// maximum; every other outcome (empty knowledge base, no local match, fallback failure)
    /// is a regular [`Answer`].
    pub async fn resolve(&self, question: &str) -> Result<Answer, QueryError> {
        // START
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        // bounds the fuzzy scan, which is quadratic in question length
        let len = trimmed.chars().count();
        if len > self.max_question_chars {
            tracing::warn!(target: "ilm::resolver", len, max = self.max_question_chars, "Rejecting oversized question");
            return Err(QueryError::QuestionTooLong {
                len,
                max: self.max_question_chars,
            });
        }
        let query = trimmed.to_lowercase();
        if self.knowledge.is_empty() {
            tracing::warn!(target: "ilm::resolver", "Knowledge base is empty; returning no-data answer");
            return Ok(Answer {
                text: NO_DATA_ANSWER.to_string(),
                source: AnswerSource::NoData,
            });
        }
        tracing::debug!(
            target: "ilm::resolver",
            query = %query,
            records = self.knowledge.len(),
            "Resolving question"
        );

        // LEXICAL
        if let Some(hit) = self.lexical.search(&query, &self.knowledge) {
            if let Some(record) = self.knowledge.get(hit.index) {
                tracing::info!(target: "ilm::resolver", tier = "lexical", score = hit.score, "Returning knowledge base answer");
                return Ok(Answer {
                    text: record.answer.clone(),
                    source: AnswerSource::Lexical {
                        index: hit.index,
                        score: hit.score,
                    },
                });
            }
        }

        // KEYWORD
        if let Some(hit) = self.keyword.search(&query, &self.knowledge) {
            tracing::info!(target: "ilm::resolver", tier = "keyword", index = hit.index, "Returning knowledge base answer");
            return Ok(Answer {
                text: hit.answer,
                source: AnswerSource::Keyword { index: hit.index },
            });
        }

        // GENERATIVE
        tracing::info!(
            target: "ilm::resolver",
            tier = "generative",
            generator = self.generator.name(),
            "No local match; calling generator"
        );
        let text = self.generator.generate(&query).await;
        Ok(Answer {
            text,
            source: AnswerSource::Generative,
        })
    }
}
