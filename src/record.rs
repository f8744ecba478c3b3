//! Match records and the result table
//!
//! A successful match is converted into a `MatchRecord` immediately: all
//! token text and tags are copied out at build time, so the token graph can
//! be dropped afterwards. Records of every construction normalize into a
//! shared `Row` schema (absent fields are None) tagged by a
//! `construction_type` discriminator, collected into a `ResultTable`.

use crate::config::ContextField;
use crate::graph::{Context, Sentence, Token};
use crate::patterns::Construction;
use serde::Serialize;
use std::io::Write;

/// log10 of the character count of a matched span
///
/// A similarity-flattening transform for downstream regression models.
/// Counts characters of the raw text, not bytes and not trimmed text.
pub fn log10_len(text: &str) -> f64 {
    (text.chars().count() as f64).log10()
}

/// A matched dative construction (double-object or prepositional)
#[derive(Debug, Clone, PartialEq)]
pub struct DativeRecord {
    pub construction: Construction,
    pub sentence: String,
    pub subject: String,
    pub subject_pos: String,
    /// Lemma of the governing verb
    pub root: String,
    pub dative: String,
    pub dative_pos: String,
    pub direct_obj: String,
    pub direct_obj_pos: String,
    pub pre_obj: Option<String>,
    pub pre_obj_pos: Option<String>,
    pub length_dative: f64,
    pub length_direct_obj: f64,
    pub context: Context,
}

impl DativeRecord {
    /// Build a double-object record: "gave him a book"
    pub fn double_object(
        sent: &Sentence,
        dative: &Token,
        verb: &Token,
        subject: &Token,
        direct_obj: &Token,
        context: &Context,
    ) -> Self {
        Self {
            construction: Construction::DoubleObject,
            sentence: sent.text(),
            subject: subject.text.clone(),
            subject_pos: subject.pos.clone(),
            root: verb.lemma.clone(),
            dative: dative.text.clone(),
            dative_pos: dative.pos.clone(),
            direct_obj: direct_obj.text.clone(),
            direct_obj_pos: direct_obj.pos.clone(),
            pre_obj: None,
            pre_obj_pos: None,
            length_dative: log10_len(&dative.text),
            length_direct_obj: log10_len(&direct_obj.text),
            context: context.clone(),
        }
    }

    /// Build a prepositional-dative record: "gave a book to him"
    ///
    /// The length_dative column carries the prepositional object's length,
    /// mirroring the column layout the downstream models were fit on.
    pub fn prepositional(
        sent: &Sentence,
        dative: &Token,
        verb: &Token,
        subject: &Token,
        direct_obj: &Token,
        pre_obj: &Token,
        context: &Context,
    ) -> Self {
        Self {
            construction: Construction::Prepositional,
            sentence: sent.text(),
            subject: subject.text.clone(),
            subject_pos: subject.pos.clone(),
            root: verb.lemma.clone(),
            dative: dative.text.clone(),
            dative_pos: dative.pos.clone(),
            direct_obj: direct_obj.text.clone(),
            direct_obj_pos: direct_obj.pos.clone(),
            pre_obj: Some(pre_obj.text.clone()),
            pre_obj_pos: Some(pre_obj.pos.clone()),
            length_dative: log10_len(&pre_obj.text),
            length_direct_obj: log10_len(&direct_obj.text),
            context: context.clone(),
        }
    }
}

/// A matched modal-verb pattern
#[derive(Debug, Clone, PartialEq)]
pub struct ModalRecord {
    pub construction: Construction,
    pub sentence: String,
    pub subject: String,
    pub subject_pos: String,
    pub modal: String,
    /// Surface form of the governed verb
    pub verb: String,
    pub context: Context,
}

impl ModalRecord {
    pub fn new(
        construction: Construction,
        sent: &Sentence,
        subject: &Token,
        modal: &Token,
        verb: &Token,
        context: &Context,
    ) -> Self {
        Self {
            construction,
            sentence: sent.text(),
            subject: subject.text.clone(),
            subject_pos: subject.pos.clone(),
            modal: modal.text.clone(),
            verb: verb.text.clone(),
            context: context.clone(),
        }
    }
}

/// A matched noun-phrase modification
#[derive(Debug, Clone, PartialEq)]
pub struct NounPhraseRecord {
    pub construction: Construction,
    pub sentence: String,
    pub modifier_text: String,
    pub noun_text: String,
    pub context: Context,
}

impl NounPhraseRecord {
    pub fn new(
        construction: Construction,
        sent: &Sentence,
        modifier_text: String,
        noun_text: &str,
        context: &Context,
    ) -> Self {
        Self {
            construction,
            sentence: sent.text(),
            modifier_text,
            noun_text: noun_text.to_string(),
            context: context.clone(),
        }
    }
}

/// One extracted construction instance, immutable after construction
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRecord {
    Dative(DativeRecord),
    Modal(ModalRecord),
    NounPhrase(NounPhraseRecord),
}

impl MatchRecord {
    pub fn construction(&self) -> Construction {
        match self {
            MatchRecord::Dative(r) => r.construction,
            MatchRecord::Modal(r) => r.construction,
            MatchRecord::NounPhrase(r) => r.construction,
        }
    }

    pub fn context(&self) -> &Context {
        match self {
            MatchRecord::Dative(r) => &r.context,
            MatchRecord::Modal(r) => &r.context,
            MatchRecord::NounPhrase(r) => &r.context,
        }
    }

    pub fn sentence(&self) -> &str {
        match self {
            MatchRecord::Dative(r) => &r.sentence,
            MatchRecord::Modal(r) => &r.sentence,
            MatchRecord::NounPhrase(r) => &r.sentence,
        }
    }
}

/// Schema-union row: every construction's fields, absent ones None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub construction_type: &'static str,
    pub sentence: String,
    pub doc_id: Option<String>,
    pub native_language: Option<String>,
    pub cefr: Option<String>,
    pub subject: Option<String>,
    pub subject_pos: Option<String>,
    pub root: Option<String>,
    pub dative: Option<String>,
    pub dative_pos: Option<String>,
    pub direct_obj: Option<String>,
    pub direct_obj_pos: Option<String>,
    pub pre_obj: Option<String>,
    pub pre_obj_pos: Option<String>,
    pub length_dative: Option<f64>,
    pub length_direct_obj: Option<f64>,
    pub modal: Option<String>,
    pub verb: Option<String>,
    pub modifier_text: Option<String>,
    pub noun_text: Option<String>,
    pub modifier_position: Option<&'static str>,
    pub modifier_type: Option<&'static str>,
}

impl Row {
    fn empty(construction: Construction, sentence: String) -> Self {
        Self {
            construction_type: construction.name(),
            sentence,
            doc_id: None,
            native_language: None,
            cefr: None,
            subject: None,
            subject_pos: None,
            root: None,
            dative: None,
            dative_pos: None,
            direct_obj: None,
            direct_obj_pos: None,
            pre_obj: None,
            pre_obj_pos: None,
            length_dative: None,
            length_direct_obj: None,
            modal: None,
            verb: None,
            modifier_text: None,
            noun_text: None,
            modifier_position: None,
            modifier_type: None,
        }
    }

    /// Normalize a record into the shared schema, copying only the
    /// requested context fields
    pub fn from_record(record: &MatchRecord, context_fields: &[ContextField]) -> Self {
        let construction = record.construction();
        let mut row = Row::empty(construction, record.sentence().to_string());

        let context = record.context();
        for field in context_fields {
            match field {
                ContextField::DocId => row.doc_id = Some(context.doc_id.clone()),
                ContextField::NativeLanguage => {
                    row.native_language = Some(context.native_language.clone())
                }
                ContextField::Cefr => row.cefr = Some(context.cefr.clone()),
            }
        }

        match record {
            MatchRecord::Dative(r) => {
                row.subject = Some(r.subject.clone());
                row.subject_pos = Some(r.subject_pos.clone());
                row.root = Some(r.root.clone());
                row.dative = Some(r.dative.clone());
                row.dative_pos = Some(r.dative_pos.clone());
                row.direct_obj = Some(r.direct_obj.clone());
                row.direct_obj_pos = Some(r.direct_obj_pos.clone());
                row.pre_obj = r.pre_obj.clone();
                row.pre_obj_pos = r.pre_obj_pos.clone();
                row.length_dative = Some(r.length_dative);
                row.length_direct_obj = Some(r.length_direct_obj);
            }
            MatchRecord::Modal(r) => {
                row.subject = Some(r.subject.clone());
                row.subject_pos = Some(r.subject_pos.clone());
                row.modal = Some(r.modal.clone());
                row.verb = Some(r.verb.clone());
            }
            MatchRecord::NounPhrase(r) => {
                row.modifier_text = Some(r.modifier_text.clone());
                row.noun_text = Some(r.noun_text.clone());
                row.modifier_position = construction.modifier_position();
                row.modifier_type = construction.modifier_type();
            }
        }

        row
    }
}

/// Column order of the exported table
pub const COLUMNS: &[&str] = &[
    "construction_type",
    "sentence",
    "doc_id",
    "native_language",
    "cefr",
    "subject",
    "subject_pos",
    "root",
    "dative",
    "dative_pos",
    "direct_obj",
    "direct_obj_pos",
    "pre_obj",
    "pre_obj_pos",
    "length_dative",
    "length_direct_obj",
    "modal",
    "verb",
    "modifier_text",
    "noun_text",
    "modifier_position",
    "modifier_type",
];

/// Error during table export
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

/// Ordered collection of normalized rows from one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<Row>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Write the table as tab-separated values with a header line
    pub fn write_tsv<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "{}", COLUMNS.join("\t"))?;
        for row in &self.rows {
            let cells = [
                row.construction_type.to_string(),
                row.sentence.clone(),
                opt(&row.doc_id),
                opt(&row.native_language),
                opt(&row.cefr),
                opt(&row.subject),
                opt(&row.subject_pos),
                opt(&row.root),
                opt(&row.dative),
                opt(&row.dative_pos),
                opt(&row.direct_obj),
                opt(&row.direct_obj_pos),
                opt(&row.pre_obj),
                opt(&row.pre_obj_pos),
                num(row.length_dative),
                num(row.length_direct_obj),
                opt(&row.modal),
                opt(&row.verb),
                opt(&row.modifier_text),
                opt(&row.noun_text),
                row.modifier_position.unwrap_or("").to_string(),
                row.modifier_type.unwrap_or("").to_string(),
            ];
            writeln!(w, "{}", cells.join("\t"))?;
        }
        Ok(())
    }

    /// Write the table as JSON Lines, one object per row
    pub fn write_jsonl<W: Write>(&self, mut w: W) -> Result<(), ExportError> {
        for row in &self.rows {
            serde_json::to_writer(&mut w, row)?;
            writeln!(w)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
