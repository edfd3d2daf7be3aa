//! Keyword-overlap matching: first record sharing enough lowercase words with the query.

use crate::knowledge::KnowledgeBase;
use crate::shared::DEFAULT_KEYWORD_MIN_OVERLAP;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub index: usize,
    pub answer: String,
    /// Shared words, sorted for stable logging.
    pub common_words: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordMatcher {
    min_overlap: usize,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_MIN_OVERLAP)
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

impl KeywordMatcher {
    pub fn new(min_overlap: usize) -> Self {
        Self { min_overlap }
    }

    pub fn min_overlap(&self) -> usize {
        self.min_overlap
    }

    /// Walks the corpus in order and returns the first record whose question shares at least
    /// `min_overlap` distinct lowercase whitespace-delimited words with `query`. No scoring:
    /// the first qualifying record wins.
    pub fn search(&self, query: &str, corpus: &KnowledgeBase) -> Option<KeywordMatch> {
        let words = tokens(query);
        for (index, question) in corpus.folded_questions().iter().enumerate() {
            let question_words = tokens(question);
            let common: Vec<&String> = words.intersection(&question_words).collect();
            if !common.is_empty() && common.len() >= self.min_overlap {
                let mut common_words: Vec<String> = common.into_iter().cloned().collect();
                common_words.sort();
                tracing::debug!(
                    target: "ilm::keyword",
                    index,
                    common_words = ?common_words,
                    "Found match with words"
                );
                let answer = corpus.get(index)?.answer.clone();
                return Some(KeywordMatch {
                    index,
                    answer,
                    common_words,
                });
            }
        }
        None
    }
}
