//! Extractor configuration
//!
//! Selects the active construction set, the exclusion stoplists, and the
//! context fields copied into output rows. An unknown construction name is
//! a caller error reported before any processing starts.

use crate::filter::ExclusionFilter;
use crate::patterns::Construction;

/// Error in extractor configuration, fatal at startup
#[derive(Debug)]
pub enum ConfigError {
    UnknownConstruction(String),
    DuplicateConstruction(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownConstruction(name) => {
                write!(f, "Unknown construction: {:?}", name)
            }
            ConfigError::DuplicateConstruction(name) => {
                write!(f, "Construction requested twice: {:?}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A context field that can be copied into output rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    DocId,
    NativeLanguage,
    Cefr,
}

impl ContextField {
    pub const ALL: [ContextField; 3] = [
        ContextField::NativeLanguage,
        ContextField::DocId,
        ContextField::Cefr,
    ];
}

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Active constructions, in table grouping order
    pub constructions: Vec<Construction>,
    pub filter: ExclusionFilter,
    /// Context fields copied into every row
    pub context_fields: Vec<ContextField>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            constructions: Construction::ALL.to_vec(),
            filter: ExclusionFilter::default(),
            context_fields: ContextField::ALL.to_vec(),
        }
    }
}

impl ExtractorConfig {
    /// All constructions, default stoplists, all context fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the named constructions, in the given order
    ///
    /// Each name may appear at most once; a repeat would make the table's
    /// grouping order ambiguous.
    pub fn for_constructions(names: &[&str]) -> Result<Self, ConfigError> {
        let mut constructions = Vec::with_capacity(names.len());
        for name in names {
            match Construction::from_name(name) {
                Some(c) if constructions.contains(&c) => {
                    return Err(ConfigError::DuplicateConstruction(name.to_string()));
                }
                Some(c) => constructions.push(c),
                None => return Err(ConfigError::UnknownConstruction(name.to_string())),
            }
        }
        Ok(Self {
            constructions,
            ..Self::default()
        })
    }

    pub fn with_filter(mut self, filter: ExclusionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_context_fields(mut self, fields: &[ContextField]) -> Self {
        self.context_fields = fields.to_vec();
        self
    }
}
