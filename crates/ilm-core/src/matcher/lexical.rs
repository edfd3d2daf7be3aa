//! Fuzzy lexical matching: case-insensitive partial-ratio similarity against every question.

use crate::knowledge::KnowledgeBase;
use crate::shared::DEFAULT_FUZZY_CUTOFF;

/// Best lexical candidate. `index` identifies the record in the knowledge base, so callers
/// never need to re-search by question text.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalMatch {
    pub index: usize,
    /// Case-folded question text that matched.
    pub question: String,
    /// Partial-ratio score on the 0–100 scale.
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct LexicalMatcher {
    cutoff: f64,
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_CUTOFF)
    }
}

impl LexicalMatcher {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Returns the highest-scoring question with score ≥ cutoff. Ties keep the first
    /// candidate in corpus order. An empty corpus is a miss without any scoring.
    pub fn search(&self, query: &str, corpus: &KnowledgeBase) -> Option<LexicalMatch> {
        if corpus.is_empty() {
            return None;
        }
        let query: Vec<char> = query.to_lowercase().chars().collect();
        let mut best: Option<(usize, f64)> = None;
        for (index, question) in corpus.folded_questions().iter().enumerate() {
            let question: Vec<char> = question.chars().collect();
            let score = folded_partial_ratio(&query, &question);
            if score < self.cutoff {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
                if score >= 100.0 {
                    break;
                }
            }
        }

        let (index, score) = best?;
        let question = corpus.folded_questions()[index].clone();
        tracing::debug!(target: "ilm::lexical", index, score, question = %question, "Best fuzzy match found");
        Some(LexicalMatch { index, question, score })
    }
}

/// Partial-ratio similarity (0–100) between two strings, compared case-insensitively.
///
/// The shorter string is aligned against every window of the longer one (full-length windows
/// plus the partial windows overhanging either end) and each alignment is scored with the
/// normalized indel similarity `2·LCS / (|a|+|b|)`. Equal-length inputs are tried both ways.
/// Either side empty scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    folded_partial_ratio(&a, &b)
}

/// [`partial_ratio`] over inputs that are already case-folded.
fn folded_partial_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.len() == b.len() {
        return best_window_ratio(a, b).max(best_window_ratio(b, a));
    }
    if a.len() < b.len() {
        best_window_ratio(a, b)
    } else {
        best_window_ratio(b, a)
    }
}

fn best_window_ratio(short: &[char], long: &[char]) -> f64 {
    let m = short.len();
    let n = long.len();
    let mut best = 0.0_f64;

    // leading partial windows
    for len in 1..m.min(n + 1) {
        best = best.max(ratio(short, &long[..len]));
    }
    if m <= n {
        for start in 0..=(n - m) {
            best = best.max(ratio(short, &long[start..start + m]));
            if best >= 100.0 {
                return 100.0;
            }
        }
    }
    // trailing partial windows
    for len in 1..m.min(n + 1) {
        best = best.max(ratio(short, &long[n - len..]));
    }
    best
}

/// Normalized indel similarity: `100 · 2·LCS(a, b) / (|a| + |b|)`.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Record;

    fn kb(pairs: &[(&str, &str)]) -> KnowledgeBase {
        KnowledgeBase::from_records(pairs.iter().map(|(q, a)| Record::new(*q, *a)))
    }

    #[test]
    fn test_partial_ratio_substring_is_perfect() {
        assert_eq!(partial_ratio("what is zakat", "What is Zakat?"), 100.0);
        assert_eq!(partial_ratio("ZAKAT", "what is zakat?"), 100.0);
        assert_eq!(partial_ratio("abc", "abc"), 100.0);
    }

    #[test]
    fn test_partial_ratio_empty_is_zero() {
        assert_eq!(partial_ratio("", "what is zakat?"), 0.0);
        assert_eq!(partial_ratio("zakat", ""), 0.0);
    }

    #[test]
    fn test_partial_ratio_is_symmetric_in_argument_order() {
        let x = partial_ratio("define zakat please", "what is zakat?");
        let y = partial_ratio("what is zakat?", "define zakat please");
        assert!((x - y).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_unrelated_is_low() {
        // best window shares only " zakat" plus a stray letter: ~53.8
        let score = partial_ratio("define zakat please", "What is Zakat?");
        assert!(score < 60.0, "score was {score}");
        assert!(score > 40.0, "score was {score}");
        assert!(partial_ratio("xyz", "what is zakat?") < 60.0);
    }

    #[test]
    fn test_exact_question_scores_100() {
        let corpus = kb(&[("What is Zakat?", "Zakat is obligatory almsgiving.")]);
        let hit = LexicalMatcher::default().search("WHAT IS ZAKAT?", &corpus).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.question, "what is zakat?");
        assert_eq!(hit.score, 100.0);
    }

    #[test]
    fn test_duplicates_resolve_to_first_record() {
        let corpus = kb(&[
            ("Who was Bilal?", "first answer"),
            ("Who was Umar?", "other"),
            ("who was bilal?", "second answer"),
        ]);
        let hit = LexicalMatcher::default().search("who was bilal?", &corpus).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(corpus.get(hit.index).unwrap().answer, "first answer");
    }

    #[test]
    fn test_picks_highest_score_not_first_above_cutoff() {
        let corpus = kb(&[
            ("What is Sawm during travel?", "a"),
            ("What is Sawm?", "b"),
        ]);
        let hit = LexicalMatcher::default().search("what is sawm?", &corpus).unwrap();
        // both contain "what is sawm", only the second contains the trailing '?'
        assert_eq!(hit.index, 1);
        assert_eq!(hit.score, 100.0);
    }

    #[test]
    fn test_below_cutoff_is_miss() {
        let corpus = kb(&[("What is Zakat?", "Zakat is obligatory almsgiving.")]);
        assert!(LexicalMatcher::default().search("define zakat please", &corpus).is_none());
        assert!(LexicalMatcher::new(101.0).search("what is zakat?", &corpus).is_none());
    }

    #[test]
    fn test_search_folds_query_once_and_matches_partial_ratio() {
        let corpus = kb(&[("What is Zakat?", "a"), ("How many daily prayers are obligatory?", "b")]);
        let matcher = LexicalMatcher::new(0.0);
        let mixed = matcher.search("Daily PRAYERS", &corpus).unwrap();
        let folded = matcher.search("daily prayers", &corpus).unwrap();
        assert_eq!(mixed, folded);
        assert_eq!(mixed.index, 1);
        assert_eq!(mixed.score, partial_ratio("Daily PRAYERS", "How many daily prayers are obligatory?"));
    }

    #[test]
    fn test_empty_corpus_is_miss() {
        assert!(LexicalMatcher::default()
            .search("what is zakat", &KnowledgeBase::empty())
            .is_none());
    }
}
