//! Local matching tiers over the knowledge base.
//!
//! | Tier | Matcher          | Hit condition                                         |
//! |------|------------------|-------------------------------------------------------|
//! | 1    | LexicalMatcher   | best partial-ratio score ≥ cutoff (default 60)        |
//! | 2    | KeywordMatcher   | first record sharing ≥ N lowercase words (default 2)  |

mod keyword;
mod lexical;

pub use keyword::{KeywordMatch, KeywordMatcher};
pub use lexical::{partial_ratio, LexicalMatch, LexicalMatcher};
