//! Token graph data structures
//!
//! Per-sentence dependency graphs as produced by an external parser:
//! tokens with surface text, trailing whitespace, lemma, coarse and fine
//! tags, a dependency label, and head/child links. The graph is read-only
//! once built; the matcher never sees parser-internal state.

/// Sentence-local token index, in surface order
pub type TokenId = usize;

/// A single token in a dependency graph
#[derive(Debug, Clone)]
pub struct Token {
    pub idx: TokenId,
    /// Surface form
    pub text: String,
    /// Trailing whitespace, preserved so sentence text can be rebuilt exactly
    pub ws: String,
    pub lemma: String,
    /// Coarse part-of-speech tag (UPOS-style: VERB, NOUN, ADP, ...)
    pub pos: String,
    /// Fine-grained tag (PTB-style: MD, VB, VBG, VBN, ...)
    pub tag: String,
    /// Dependency label relative to the head
    pub dep: String,
    /// Head token index; None only for the sentence root
    pub head: Option<TokenId>,
    /// Child token indices, in surface order
    pub children: Vec<TokenId>,
}

impl Token {
    /// Create a token with no attachment; heads are wired up by the sentence
    pub fn new(idx: TokenId, text: &str, lemma: &str, pos: &str, tag: &str, dep: &str) -> Self {
        Self {
            idx,
            text: text.to_string(),
            ws: " ".to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            tag: tag.to_string(),
            dep: dep.to_string(),
            head: None,
            children: Vec::new(),
        }
    }

    /// Surface form plus trailing whitespace
    pub fn text_with_ws(&self) -> String {
        format!("{}{}", self.text, self.ws)
    }
}

/// A contiguous noun-phrase span with a designated head token
///
/// Supplied by the external parser; consumed as an opaque range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NounChunk {
    /// First token index (inclusive)
    pub start: TokenId,
    /// Last token index (inclusive)
    pub end: TokenId,
    /// Head noun of the span
    pub head: TokenId,
}

impl NounChunk {
    pub fn contains(&self, idx: TokenId) -> bool {
        idx >= self.start && idx <= self.end
    }
}

/// A dependency-parsed sentence
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub root: Option<TokenId>,
    pub chunks: Vec<NounChunk>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token; its idx must equal its position
    pub fn add_token(&mut self, token: Token) -> TokenId {
        let id = token.idx;
        self.tokens.push(token);
        id
    }

    /// Attach `child` under `head`, recording the child edge in index order
    pub fn set_head(&mut self, child: TokenId, head: TokenId) {
        if let Some(token) = self.tokens.get_mut(child) {
            token.head = Some(head);
        }
        if let Some(token) = self.tokens.get_mut(head) {
            token.children.push(child);
        }
    }

    pub fn get(&self, idx: TokenId) -> Option<&Token> {
        self.tokens.get(idx)
    }

    /// Head token of `idx`, or None for the root
    pub fn head(&self, idx: TokenId) -> Option<&Token> {
        self.tokens
            .get(idx)
            .and_then(|t| t.head)
            .and_then(|h| self.tokens.get(h))
    }

    /// Children of `idx` in surface order
    pub fn children(&self, idx: TokenId) -> impl Iterator<Item = &Token> {
        self.tokens
            .get(idx)
            .map(|t| t.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&c| self.tokens.get(c))
    }

    /// All token indices in the subtree rooted at `idx`, in surface order
    pub fn subtree(&self, idx: TokenId) -> Vec<TokenId> {
        let mut ids = Vec::new();
        let mut stack = vec![idx];
        while let Some(id) = stack.pop() {
            ids.push(id);
            if let Some(token) = self.tokens.get(id) {
                stack.extend(token.children.iter().copied());
            }
        }
        ids.sort_unstable();
        ids
    }

    /// Rebuild the surface text of the subtree rooted at `idx`
    ///
    /// Concatenates each token's form plus its original trailing whitespace
    /// in surface order, then trims the ends. Applied to the sentence root
    /// this round-trips the original sentence string.
    pub fn subtree_text(&self, idx: TokenId) -> String {
        let mut out = String::new();
        for id in self.subtree(idx) {
            if let Some(token) = self.tokens.get(id) {
                out.push_str(&token.text);
                out.push_str(&token.ws);
            }
        }
        out.trim().to_string()
    }

    /// Tokens coordinated with `idx` via `conj` edges, transitively
    ///
    /// Walks to the start of the coordination chain, then collects every
    /// token reachable over `conj` edges, excluding `idx` itself. Result is
    /// in surface order.
    pub fn conjuncts(&self, idx: TokenId) -> Vec<TokenId> {
        // Ascend to the first conjunct in the chain
        let mut start = idx;
        while let Some(token) = self.tokens.get(start) {
            match token.head {
                Some(h) if token.dep == "conj" => start = h,
                _ => break,
            }
        }
        // Collect the whole chain from the start
        let mut chain = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            chain.push(id);
            if let Some(token) = self.tokens.get(id) {
                for &c in &token.children {
                    if self.tokens[c].dep == "conj" {
                        stack.push(c);
                    }
                }
            }
        }
        chain.retain(|&id| id != idx);
        chain.sort_unstable();
        chain
    }

    /// Full sentence surface text, rebuilt from token forms and whitespace
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.text);
            out.push_str(&token.ws);
        }
        out.trim().to_string()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Per-document metadata attached to every sentence of a document
///
/// Fields missing upstream default to the literal "unknown" rather than
/// failing; downstream models treat "unknown" as an explicit level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub doc_id: String,
    pub native_language: String,
    pub cefr: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            doc_id: "unknown".to_string(),
            native_language: "unknown".to_string(),
            cefr: "unknown".to_string(),
        }
    }
}

impl Context {
    pub fn new(doc_id: &str, native_language: &str, cefr: &str) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            native_language: native_language.to_string(),
            cefr: cefr.to_string(),
        }
    }
}

/// A parsed document: its sentences plus the shared metadata context
#[derive(Debug, Clone, Default)]
pub struct Doc {
    pub sentences: Vec<Sentence>,
    pub context: Context,
}

impl Doc {
    pub fn new(sentences: Vec<Sentence>, context: Context) -> Self {
        Self { sentences, context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// she gave him a book .
    /// gave is root; she=nsubj, him=dative, book=dobj, a=det(book), .=punct
    fn dative_sentence() -> Sentence {
        let mut s = Sentence::new();
        s.add_token(Token::new(0, "She", "she", "PRON", "PRP", "nsubj"));
        s.add_token(Token::new(1, "gave", "give", "VERB", "VBD", "ROOT"));
        s.add_token(Token::new(2, "him", "he", "PRON", "PRP", "dative"));
        s.add_token(Token::new(3, "a", "a", "DET", "DT", "det"));
        s.add_token(Token::new(4, "book", "book", "NOUN", "NN", "dobj"));
        let mut dot = Token::new(5, ".", ".", "PUNCT", ".", "punct");
        dot.ws = String::new();
        s.tokens.get_mut(4).unwrap().ws = String::new();
        s.add_token(dot);
        s.set_head(0, 1);
        s.set_head(2, 1);
        s.set_head(3, 4);
        s.set_head(4, 1);
        s.set_head(5, 1);
        s.root = Some(1);
        s
    }

    #[test]
    fn head_and_children() {
        let s = dative_sentence();
        assert_eq!(s.head(0).unwrap().idx, 1);
        assert!(s.head(1).is_none());
        let kids: Vec<_> = s.children(1).map(|t| t.idx).collect();
        assert_eq!(kids, vec![0, 2, 4, 5]);
    }

    #[test]
    fn sentence_text_round_trip() {
        let s = dative_sentence();
        assert_eq!(s.text(), "She gave him a book.");
    }

    #[test]
    fn subtree_of_root_is_whole_sentence() {
        let s = dative_sentence();
        assert_eq!(s.subtree_text(1), "She gave him a book.");
    }

    #[test]
    fn subtree_of_object_includes_determiner() {
        let s = dative_sentence();
        assert_eq!(s.subtree(4), vec![3, 4]);
        assert_eq!(s.subtree_text(4), "a book");
    }

    #[test]
    fn conjuncts_walk_the_chain_both_ways() {
        // big and beautiful and cheap: beautiful, cheap conj under big
        let mut s = Sentence::new();
        s.add_token(Token::new(0, "big", "big", "ADJ", "JJ", "amod"));
        s.add_token(Token::new(1, "and", "and", "CCONJ", "CC", "cc"));
        s.add_token(Token::new(2, "beautiful", "beautiful", "ADJ", "JJ", "conj"));
        s.add_token(Token::new(3, "and", "and", "CCONJ", "CC", "cc"));
        s.add_token(Token::new(4, "cheap", "cheap", "ADJ", "JJ", "conj"));
        s.set_head(1, 0);
        s.set_head(2, 0);
        s.set_head(3, 2);
        s.set_head(4, 2);
        s.root = Some(0);

        assert_eq!(s.conjuncts(0), vec![2, 4]);
        assert_eq!(s.conjuncts(2), vec![0, 4]);
        assert_eq!(s.conjuncts(4), vec![0, 2]);
    }

    #[test]
    fn chunk_containment() {
        let chunk = NounChunk {
            start: 3,
            end: 4,
            head: 4,
        };
        assert!(chunk.contains(3));
        assert!(chunk.contains(4));
        assert!(!chunk.contains(5));
    }

    #[test]
    fn context_defaults_to_unknown() {
        let ctx = Context::default();
        assert_eq!(ctx.doc_id, "unknown");
        assert_eq!(ctx.native_language, "unknown");
        assert_eq!(ctx.cefr, "unknown");
    }
}
