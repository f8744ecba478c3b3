//! Corpus collections
//!
//! Iterator-based access to parsed documents from a string, a file, or a
//! set of files. Unreadable files and malformed documents are logged and
//! skipped; one bad input never truncates results from the rest of the
//! corpus.

use crate::conllu::DocReader;
use crate::graph::Doc;
use std::path::{Path, PathBuf};

/// Source of documents for a corpus
#[derive(Debug, Clone)]
enum DocSource {
    /// In-memory CoNLL-U text
    String(String),
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

/// Collection of parsed documents from a string, file, or glob pattern
///
/// # Examples
///
/// ```no_run
/// use construe::Corpus;
///
/// let corpus = Corpus::from_glob("data/*.conllu.gz").unwrap();
/// for doc in corpus {
///     println!("{}: {} sentences", doc.context.doc_id, doc.sentences.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Corpus {
    source: DocSource,
}

impl Corpus {
    /// Create from an in-memory CoNLL-U string
    pub fn from_string(text: &str) -> Self {
        Self {
            source: DocSource::String(text.to_string()),
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: DocSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, glob::PatternError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        paths.sort();
        Ok(Self::from_paths(paths))
    }

    /// Create from explicit file paths
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            source: DocSource::Files(paths),
        }
    }
}

impl IntoIterator for Corpus {
    type Item = Doc;
    type IntoIter = Box<dyn Iterator<Item = Doc>>;

    fn into_iter(self) -> Self::IntoIter {
        match self.source {
            DocSource::String(text) => Box::new(skip_errors(DocReader::from_string(&text))),
            DocSource::File(path) => Box::new(open_file_docs(path)),
            DocSource::Files(paths) => Box::new(paths.into_iter().flat_map(open_file_docs)),
        }
    }
}

/// Drop malformed documents from a reader, logging each one
fn skip_errors<I>(reader: I) -> impl Iterator<Item = Doc>
where
    I: Iterator<Item = Result<Doc, crate::conllu::ParseError>>,
{
    reader.filter_map(|result| match result {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Skipping malformed document: {}", e);
            None
        }
    })
}

/// Open a file and iterate its documents, logging open failures
fn open_file_docs(path: PathBuf) -> Box<dyn Iterator<Item = Doc>> {
    match DocReader::from_file(&path) {
        Ok(reader) => Box::new(skip_errors(reader)),
        Err(e) => {
            log::warn!("Failed to open {:?}: {}", path, e);
            Box::new(std::iter::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DOCS: &str = "\
# newdoc id = a
1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_

# newdoc id = b
1\tsleeps\tsleep\tVERB\tVBZ\t_\t0\tROOT\t_\t_
";

    #[test]
    fn corpus_from_string() {
        let docs: Vec<_> = Corpus::from_string(TWO_DOCS).into_iter().collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].context.doc_id, "a");
        assert_eq!(docs[1].context.doc_id, "b");
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let text = "\
# newdoc id = good
1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_

# newdoc id = bad
1\tbroken

# newdoc id = alsogood
1\tsleeps\tsleep\tVERB\tVBZ\t_\t0\tROOT\t_\t_
";
        let docs: Vec<_> = Corpus::from_string(text).into_iter().collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].context.doc_id, "good");
        assert_eq!(docs[1].context.doc_id, "alsogood");
    }

    mod files {
        use super::*;
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::fs;
        use std::io::Write;
        use tempfile::tempdir;

        #[test]
        fn corpus_from_paths_in_order() {
            let dir = tempdir().unwrap();
            let a = dir.path().join("a.conllu");
            let b = dir.path().join("b.conllu");
            fs::write(&a, "# newdoc id = one\n1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n")
                .unwrap();
            fs::write(&b, "# newdoc id = two\n1\tsleeps\tsleep\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n")
                .unwrap();

            let docs: Vec<_> = Corpus::from_paths(vec![a, b]).into_iter().collect();
            assert_eq!(docs.len(), 2);
            assert_eq!(docs[0].context.doc_id, "one");
            assert_eq!(docs[1].context.doc_id, "two");
        }

        #[test]
        fn corpus_from_glob_sorted() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("2.conllu"),
                "# newdoc id = second\n1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n",
            )
            .unwrap();
            fs::write(
                dir.path().join("1.conllu"),
                "# newdoc id = first\n1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n",
            )
            .unwrap();
            fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

            let pattern = format!("{}/*.conllu", dir.path().display());
            let docs: Vec<_> = Corpus::from_glob(&pattern).unwrap().into_iter().collect();
            assert_eq!(docs.len(), 2);
            assert_eq!(docs[0].context.doc_id, "first");
            assert_eq!(docs[1].context.doc_id, "second");
        }

        #[test]
        fn missing_file_is_skipped() {
            let dir = tempdir().unwrap();
            let good = dir.path().join("good.conllu");
            fs::write(&good, "1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n").unwrap();
            let missing = dir.path().join("missing.conllu");

            let docs: Vec<_> = Corpus::from_paths(vec![good.clone(), missing, good])
                .into_iter()
                .collect();
            assert_eq!(docs.len(), 2);
        }

        #[test]
        fn gzipped_files_are_read() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("corpus.conllu.gz");
            let file = fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder
                .write_all(b"# newdoc id = zipped\n1\truns\trun\tVERB\tVBZ\t_\t0\tROOT\t_\t_\n")
                .unwrap();
            encoder.finish().unwrap();

            let docs: Vec<_> = Corpus::from_file(&path).into_iter().collect();
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].context.doc_id, "zipped");
        }
    }
}
