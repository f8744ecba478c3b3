//! Construe: syntactic construction extraction from dependency parses
//!
//! A toolkit for mining dative alternations, modal-verb patterns, and
//! noun-phrase modifications from parsed learner-English corpora.

pub mod conllu; // CoNLL-U document reader
pub mod config; // Run configuration and stoplists
pub mod corpus; // Corpus file/glob collections
pub mod filter; // Token eligibility filter
pub mod graph; // Token graph data structures
pub mod patterns; // Construction matchers
pub mod pipeline; // Extraction driver
pub mod record; // Match records and result table

// Re-exports for convenience
pub use conllu::{DocReader, ParseError};
pub use config::{ConfigError, ContextField, ExtractorConfig};
pub use corpus::Corpus;
pub use filter::ExclusionFilter;
pub use graph::{Context, Doc, NounChunk, Sentence, Token, TokenId};
pub use patterns::Construction;
pub use pipeline::Extractor;
pub use record::{COLUMNS, ExportError, MatchRecord, ResultTable, Row};
