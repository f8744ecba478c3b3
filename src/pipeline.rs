//! Extraction pipeline
//!
//! Drives the configured construction matchers over a stream of documents
//! and collects the results into a normalized table. Each document is
//! processed independently, so the parallel runner is a drop-in for the
//! sequential one and produces the identical table.

use crate::config::ExtractorConfig;
use crate::graph::Doc;
use crate::patterns::{self, Construction};
use crate::record::{MatchRecord, ResultTable, Row};
use pariter::IteratorExt as _;
use rustc_hash::FxHashMap;

/// Runs configured construction matchers over documents
///
/// # Examples
///
/// ```
/// use construe::{Corpus, Extractor};
///
/// let corpus = Corpus::from_string(
///     "# newdoc id = d1\n1\tShe\tshe\tPRON\tPRP\t_\t2\tnsubj\t_\t_\n2\tgave\tgive\tVERB\tVBD\t_\t0\tROOT\t_\t_\n3\thim\the\tPRON\tPRP\t_\t2\tdative\t_\t_\n4\tbooks\tbook\tNOUN\tNNS\t_\t2\tdobj\t_\t_\n",
/// );
/// let table = Extractor::with_defaults().run(corpus);
/// assert_eq!(table.rows[0].construction_type, "double_object");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// All constructions with default stoplists and context fields
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Match every active construction against every sentence of one document
    ///
    /// Records come out grouped by construction in configuration order, in
    /// document order within each construction.
    pub fn extract_doc(&self, doc: &Doc) -> Vec<MatchRecord> {
        let mut records = Vec::new();
        for construction in &self.config.constructions {
            for sent in &doc.sentences {
                patterns::extract(
                    *construction,
                    sent,
                    &self.config.filter,
                    &doc.context,
                    &mut records,
                );
            }
        }
        log::debug!(
            "{}: {} matches in {} sentences",
            doc.context.doc_id,
            records.len(),
            doc.sentences.len()
        );
        records
    }

    /// Process documents sequentially
    pub fn run<I>(&self, docs: I) -> ResultTable
    where
        I: IntoIterator<Item = Doc>,
    {
        self.collect(docs.into_iter().map(|doc| self.extract_doc(&doc)))
    }

    /// Process documents across worker threads
    ///
    /// Output order matches `run` exactly: results are re-assembled in
    /// input document order regardless of which worker finished first.
    pub fn run_par<I>(&self, docs: I) -> ResultTable
    where
        I: IntoIterator<Item = Doc>,
        I::IntoIter: Send + 'static,
    {
        let extractor = self.clone();
        self.collect(
            docs.into_iter()
                .parallel_map(move |doc| extractor.extract_doc(&doc)),
        )
    }

    /// Bucket per-document record batches by construction, then flatten
    /// into rows in configuration order
    fn collect<I>(&self, batches: I) -> ResultTable
    where
        I: IntoIterator<Item = Vec<MatchRecord>>,
    {
        // First occurrence wins if a construction is listed twice; buckets
        // are sized by the full list so every stored index stays in range
        let mut positions: FxHashMap<Construction, usize> = FxHashMap::default();
        for (i, c) in self.config.constructions.iter().enumerate() {
            positions.entry(*c).or_insert(i);
        }
        let mut buckets: Vec<Vec<MatchRecord>> = vec![Vec::new(); self.config.constructions.len()];

        for batch in batches {
            for record in batch {
                if let Some(&i) = positions.get(&record.construction()) {
                    buckets[i].push(record);
                }
            }
        }

        let rows: Vec<Row> = buckets
            .iter()
            .flatten()
            .map(|record| Row::from_record(record, &self.config.context_fields))
            .collect();
        ResultTable { rows }
    }
}
