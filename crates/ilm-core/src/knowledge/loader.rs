//! Best-effort loading of record sources (JSON documents) into a [`KnowledgeBase`].
//!
//! A bad document never aborts loading: it is logged, recorded in the [`LoadReport`],
//! and skipped. Partial success is the normal case.

use super::{KnowledgeBase, Record};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One external record document: a name for reporting plus its raw JSON text.
#[derive(Debug, Clone)]
pub struct RecordSource {
    pub name: String,
    pub contents: String,
}

impl RecordSource {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Why a source document was excluded from the knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid format: expected a list of Q&A objects, found {found}")]
    NotAList { found: &'static str },
}

#[derive(Debug)]
pub enum SourceStatus {
    /// `records` were accepted; `dropped` entries failed the non-empty question/answer check.
    Loaded { records: usize, dropped: usize },
    Skipped { reason: LoadError },
}

#[derive(Debug)]
pub struct SourceReport {
    pub name: String,
    pub status: SourceStatus,
}

/// Per-source outcome of a load, in load order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
}

impl LoadReport {
    pub fn total_records(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s.status {
                SourceStatus::Loaded { records, .. } => records,
                SourceStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s.status {
                SourceStatus::Loaded { dropped, .. } => dropped,
                SourceStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Skipped { .. }))
    }
}

/// Lenient entry shape: missing or non-string fields become `None` and the entry is dropped.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parses one document into complete records, returning `(records, dropped)`.
fn parse_document(contents: &str) -> Result<(Vec<Record>, usize), LoadError> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => {
            return Err(LoadError::NotAList {
                found: json_kind(&other),
            })
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for entry in entries {
        let raw = serde_json::from_value::<RawEntry>(entry).ok();
        let record = raw.and_then(|r| match (r.question, r.answer) {
            (Some(q), Some(a)) => Some(Record::new(q, a)),
            _ => None,
        });
        match record {
            Some(r) if r.is_complete() => records.push(r),
            _ => dropped += 1,
        }
    }
    Ok((records, dropped))
}

impl KnowledgeBase {
    /// Loads and concatenates all sources in order (source order, then in-source order).
    /// Malformed sources are skipped and reported, never returned as errors.
    pub fn load<I>(sources: I) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = RecordSource>,
    {
        let mut all = Vec::new();
        let mut report = LoadReport::default();

        for source in sources {
            let status = match parse_document(&source.contents) {
                Ok((records, dropped)) => {
                    tracing::info!(
                        target: "ilm::knowledge",
                        source = %source.name,
                        records = records.len(),
                        dropped,
                        "Loaded questions from source"
                    );
                    if dropped > 0 {
                        tracing::warn!(
                            target: "ilm::knowledge",
                            source = %source.name,
                            dropped,
                            "Dropped entries without a non-empty question and answer"
                        );
                    }
                    let n = records.len();
                    all.extend(records);
                    SourceStatus::Loaded { records: n, dropped }
                }
                Err(reason) => {
                    tracing::warn!(
                        target: "ilm::knowledge",
                        source = %source.name,
                        error = %reason,
                        "Skipping record source"
                    );
                    SourceStatus::Skipped { reason }
                }
            };
            report.sources.push(SourceReport {
                name: source.name,
                status,
            });
        }

        let kb = KnowledgeBase::from_records(all);
        tracing::info!(target: "ilm::knowledge", total = kb.len(), "Total questions loaded");
        (kb, report)
    }

    /// Loads every `*.json` file in `dir`, ordered by file name. A missing directory
    /// yields an empty knowledge base; unreadable files are skipped and reported.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> (Self, LoadReport) {
        let dir = dir.as_ref();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    target: "ilm::knowledge",
                    dir = %dir.display(),
                    error = %e,
                    "Data folder not readable; starting with an empty knowledge base"
                );
                return (KnowledgeBase::empty(), LoadReport::default());
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match std::fs::read_to_string(&path) {
                Ok(contents) => sources.push(RecordSource::new(name, contents)),
                Err(source) => {
                    let reason = LoadError::Io { path, source };
                    tracing::warn!(
                        target: "ilm::knowledge",
                        source = %name,
                        error = %reason,
                        "Skipping record source"
                    );
                    unreadable.push(SourceReport {
                        name,
                        status: SourceStatus::Skipped { reason },
                    });
                }
            }
        }

        let (kb, mut report) = Self::load(sources);
        report.sources.extend(unreadable);
        (kb, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZAKAT: &str = r#"[{"question": "What is Zakat?", "answer": "Zakat is obligatory almsgiving."}]"#;

    #[test]
    fn test_load_concatenates_sources_in_order() {
        let (kb, report) = KnowledgeBase::load(vec![
            RecordSource::new("pillars.json", ZAKAT),
            RecordSource::new(
                "prophets.json",
                r#"[
                    {"question": "Who was Nuh?", "answer": "Nuh was a prophet."},
                    {"question": "Who was Musa?", "answer": "Musa was a prophet."}
                ]"#,
            ),
        ]);
        assert_eq!(kb.len(), 3);
        let questions: Vec<&str> = kb.records().iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["What is Zakat?", "Who was Nuh?", "Who was Musa?"]);
        assert_eq!(report.total_records(), 3);
        assert_eq!(report.skipped().count(), 0);
    }

    #[test]
    fn test_malformed_sources_are_skipped_not_fatal() {
        let (kb, report) = KnowledgeBase::load(vec![
            RecordSource::new("broken.json", "[{\"question\": "),
            RecordSource::new("object.json", r#"{"question": "q", "answer": "a"}"#),
            RecordSource::new("good.json", ZAKAT),
        ]);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.records()[0].answer, "Zakat is obligatory almsgiving.");

        assert_eq!(report.sources.len(), 3);
        assert!(matches!(
            report.sources[0].status,
            SourceStatus::Skipped { reason: LoadError::Parse(_) }
        ));
        assert!(matches!(
            report.sources[1].status,
            SourceStatus::Skipped {
                reason: LoadError::NotAList { found: "an object" }
            }
        ));
        assert!(matches!(
            report.sources[2].status,
            SourceStatus::Loaded { records: 1, dropped: 0 }
        ));
    }

    #[test]
    fn test_incomplete_entries_are_dropped_and_counted() {
        let (kb, report) = KnowledgeBase::load(vec![RecordSource::new(
            "mixed.json",
            r#"[
                {"question": "What is Sawm?", "answer": "Sawm is fasting."},
                {"question": "", "answer": "no question"},
                {"question": "No answer?"},
                {"question": 7, "answer": "numeric question"},
                "not an object",
                {"question": "What is Hajj?", "answer": "Hajj is the pilgrimage."}
            ]"#,
        )]);
        assert_eq!(kb.len(), 2);
        assert_eq!(report.total_records(), 2);
        assert_eq!(report.total_dropped(), 4);
    }

    #[test]
    fn test_empty_list_is_valid() {
        let (kb, report) = KnowledgeBase::load(vec![RecordSource::new("empty.json", "[]")]);
        assert!(kb.is_empty());
        assert!(matches!(
            report.sources[0].status,
            SourceStatus::Loaded { records: 0, dropped: 0 }
        ));
    }

    #[test]
    fn test_load_dir_reads_json_files_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_second.json"),
            r#"[{"question": "What is Hajj?", "answer": "Pilgrimage."}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("a_first.json"), ZAKAT).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("c_bad.json"), "not json").unwrap();

        let (kb, report) = KnowledgeBase::load_dir(dir.path());
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.records()[0].question, "What is Zakat?");
        assert_eq!(kb.records()[1].question, "What is Hajj?");
        let names: Vec<&str> = report.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_first.json", "b_second.json", "c_bad.json"]);
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn test_load_dir_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (kb, report) = KnowledgeBase::load_dir(dir.path().join("does-not-exist"));
        assert!(kb.is_empty());
        assert!(report.sources.is_empty());
    }
}
