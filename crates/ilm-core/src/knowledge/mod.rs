//! Curated question/answer knowledge base.
//!
//! Built once at startup from one or more JSON record sources and shared read-only
//! (`Arc<KnowledgeBase>`) for the lifetime of the process. There is no mutation API.

mod loader;

pub use loader::{LoadError, LoadReport, RecordSource, SourceReport, SourceStatus};

use serde::{Deserialize, Serialize};

/// One stored question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub question: String,
    pub answer: String,
}

impl Record {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// True when both fields carry non-whitespace text.
    pub fn is_complete(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Ordered, immutable collection of [`Record`]s.
///
/// Each question's lowercase form is computed once here so the matchers can compare
/// against it directly.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Vec<Record>,
    folded_questions: Vec<String>,
}

impl KnowledgeBase {
    /// Empty knowledge base; the resolver answers every query with the no-data sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds from records in order, dropping any record with an empty question or answer.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().filter(Record::is_complete).collect();
        let folded_questions = records.iter().map(|r| r.question.to_lowercase()).collect();
        Self {
            records,
            folded_questions,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Lowercase question texts, index-aligned with [`KnowledgeBase::records`].
    pub fn folded_questions(&self) -> &[String] {
        &self.folded_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_records_drops_incomplete_and_keeps_order() {
        let kb = KnowledgeBase::from_records(vec![
            Record::new("What is Salah?", "Salah is the ritual prayer."),
            Record::new("", "orphan answer"),
            Record::new("What is Sawm?", "   "),
            Record::new("What is Hajj?", "Hajj is the pilgrimage to Mecca."),
        ]);
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.records()[0].question, "What is Salah?");
        assert_eq!(kb.records()[1].question, "What is Hajj?");
    }

    #[test]
    fn test_folded_questions_aligned_with_records() {
        let kb = KnowledgeBase::from_records(vec![
            Record::new("What is ZAKAT?", "a"),
            Record::new("Who was Bilal?", "b"),
        ]);
        assert_eq!(kb.folded_questions(), &["what is zakat?".to_string(), "who was bilal?".to_string()]);
        assert_eq!(kb.get(1).map(|r| r.answer.as_str()), Some("b"));
        assert!(kb.get(2).is_none());
    }

    #[test]
    fn test_empty_knowledge_base() {
        let kb = KnowledgeBase::empty();
        assert!(kb.is_empty());
        assert_eq!(kb.len(), 0);
        assert!(kb.folded_questions().is_empty());
    }
}
