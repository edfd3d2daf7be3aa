//! ilm-core: Q&A core library (shared config, curated knowledge base, matchers, resolver).
//!
//! The knowledge base is loaded once at startup and shared read-only; the resolver escalates
//! each question through lexical matching, keyword matching, and finally an [`AnswerGenerator`].

mod knowledge;
mod matcher;
mod resolver;
mod shared;

// Shared
pub use shared::{
    CoreConfig, LlmMode, DEFAULT_FUZZY_CUTOFF, DEFAULT_KEYWORD_MIN_OVERLAP, DEFAULT_MAX_QUESTION_CHARS,
    DEFAULT_PROMPT_PREAMBLE,
};

// Knowledge
pub use knowledge::{KnowledgeBase, LoadError, LoadReport, Record, RecordSource, SourceReport, SourceStatus};

// Matchers
pub use matcher::{partial_ratio, KeywordMatch, KeywordMatcher, LexicalMatch, LexicalMatcher};

// Resolver
pub use resolver::{
    Answer, AnswerGenerator, AnswerResolver, AnswerSource, QueryError, NO_DATA_ANSWER, NO_QUESTION_MESSAGE,
};
