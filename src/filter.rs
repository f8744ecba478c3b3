//! Candidate eligibility filtering
//!
//! Rejects tokens that must never be bound to a pattern role: whitespace
//! and unclassified tokens (by coarse tag) and a stoplist of lemmas
//! (relative pronouns, by default). A rejected candidate is skipped; the
//! search continues over the remaining candidates.

use crate::graph::Token;
use rustc_hash::FxHashSet;

/// Default lemma stoplist: relative pronouns plus the blank lemma
pub const DEFAULT_EXCLUDED_LEMMAS: &[&str] = &["which", "what", "who", "that", "", " "];

/// Default excluded coarse tags: whitespace, unclassified, and the
/// malformed subordinator tag emitted by some parser versions
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["SPACE", "X", "SCON"];

/// Predicate deciding whether a token may participate in a match
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    excluded_lemmas: FxHashSet<String>,
    excluded_tags: FxHashSet<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_LEMMAS, DEFAULT_EXCLUDED_TAGS)
    }
}

impl ExclusionFilter {
    pub fn new(excluded_lemmas: &[&str], excluded_tags: &[&str]) -> Self {
        Self {
            excluded_lemmas: excluded_lemmas.iter().map(|s| s.to_string()).collect(),
            excluded_tags: excluded_tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True if the token may be bound to a role
    pub fn is_eligible(&self, token: &Token) -> bool {
        !self.excluded_tags.contains(&token.pos) && !self.excluded_lemmas.contains(&token.lemma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Token;

    #[test]
    fn rejects_stoplist_lemmas() {
        let filter = ExclusionFilter::default();
        let that = Token::new(0, "that", "that", "PRON", "WDT", "nsubj");
        let dog = Token::new(1, "dog", "dog", "NOUN", "NN", "nsubj");
        assert!(!filter.is_eligible(&that));
        assert!(filter.is_eligible(&dog));
    }

    #[test]
    fn rejects_blank_lemma() {
        let filter = ExclusionFilter::default();
        let blank = Token::new(0, " ", "", "NOUN", "NN", "nsubj");
        assert!(!filter.is_eligible(&blank));
    }

    #[test]
    fn rejects_excluded_tags() {
        let filter = ExclusionFilter::default();
        let space = Token::new(0, " ", " ", "SPACE", "_SP", "dep");
        let unk = Token::new(1, "xx", "xx", "X", "XX", "dep");
        assert!(!filter.is_eligible(&space));
        assert!(!filter.is_eligible(&unk));
    }

    #[test]
    fn custom_stoplist() {
        let filter = ExclusionFilter::new(&["dog"], &[]);
        let dog = Token::new(0, "dogs", "dog", "NOUN", "NNS", "nsubj");
        let cat = Token::new(1, "cats", "cat", "NOUN", "NNS", "nsubj");
        assert!(!filter.is_eligible(&dog));
        assert!(filter.is_eligible(&cat));
    }
}
