//! CoNLL-U corpus reading
//!
//! Streams dependency-parsed documents from CoNLL-U text, one document at
//! a time, so peak memory stays independent of corpus size. Per-line
//! scratch buffers live only until the document is yielded.
//!
//! Beyond the ten standard columns, the reader understands the comment
//! lines the upstream parser emits:
//!
//! - `# newdoc id = ...` starts a new document
//! - `# native_language = ...` and `# cefr = ...` set document metadata
//! - `# noun_chunks = 1-3:3 5:5` declares the following sentence's noun
//!   chunks as 1-indexed inclusive ranges with a designated head
//!
//! `SpaceAfter=No` in the MISC column is honored so sentence text can be
//! rebuilt with its original spacing. Dependency labels and tags are
//! consumed verbatim; all other parser-internal columns (FEATS, DEPS,
//! remaining MISC pairs) are discarded at this boundary.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::graph::{Context, Doc, NounChunk, Sentence, Token};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

/// Error while parsing a document
#[derive(Debug)]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl ParseError {
    fn new(line_num: usize, message: String) -> Self {
        Self { line_num, message }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at line {}: {}", self.line_num, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Reader that iterates over documents in a CoNLL-U stream
///
/// A malformed document yields one `Err` and reading continues with the
/// next document; one bad document never blocks the rest of the stream.
pub struct DocReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
    /// Doc id from a `# newdoc` line that opens the next document
    pending_doc_id: Option<String>,
    done: bool,
}

impl<R: BufRead> DocReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            pending_doc_id: None,
            done: false,
        }
    }
}

impl DocReader<BufReader<Box<dyn Read>>> {
    /// Open a corpus file; `.gz` files are decompressed transparently
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(BufReader::new(reader)))
    }
}

impl DocReader<BufReader<std::io::Cursor<String>>> {
    /// Read from an in-memory CoNLL-U string
    pub fn from_string(text: &str) -> Self {
        Self::new(BufReader::new(std::io::Cursor::new(text.to_string())))
    }
}

impl<R: BufRead> Iterator for DocReader<R> {
    type Item = Result<Doc, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done && self.pending_doc_id.is_none() {
            return None;
        }

        let mut context = Context::default();
        let mut saw_content = false;
        if let Some(id) = self.pending_doc_id.take() {
            context.doc_id = id;
            saw_content = true;
        }

        let mut sentences: Vec<Sentence> = Vec::new();
        let mut error: Option<ParseError> = None;
        let mut token_lines: Vec<(usize, String)> = Vec::new();
        let mut chunk_line: Option<(usize, String)> = None;

        loop {
            self.line_num += 1;
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ParseError::new(
                        self.line_num,
                        format!("IO error: {}", e),
                    )));
                }
                Some(Ok(line)) => line,
            };
            let line = line.trim();

            if line.is_empty() {
                flush_sentence(
                    &mut token_lines,
                    &mut chunk_line,
                    &mut sentences,
                    &mut error,
                );
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                match split_comment(comment) {
                    Some(("newdoc id", value)) => {
                        if saw_content {
                            // boundary: this line opens the next document
                            flush_sentence(
                                &mut token_lines,
                                &mut chunk_line,
                                &mut sentences,
                                &mut error,
                            );
                            self.pending_doc_id = Some(value.to_string());
                            break;
                        }
                        context.doc_id = value.to_string();
                        saw_content = true;
                    }
                    Some(("native_language", value)) => {
                        context.native_language = value.to_string();
                        saw_content = true;
                    }
                    Some(("cefr", value)) => {
                        context.cefr = value.to_string();
                        saw_content = true;
                    }
                    Some(("noun_chunks", value)) => {
                        chunk_line = Some((self.line_num, value.to_string()));
                    }
                    _ => {} // sent_id, text, other metadata
                }
                continue;
            }

            token_lines.push((self.line_num, line.to_string()));
            saw_content = true;
        }

        flush_sentence(
            &mut token_lines,
            &mut chunk_line,
            &mut sentences,
            &mut error,
        );

        if !saw_content && sentences.is_empty() && error.is_none() {
            return None; // trailing blank lines
        }
        if let Some(e) = error {
            return Some(Err(e));
        }
        Some(Ok(Doc::new(sentences, context)))
    }
}

/// Parse the buffered sentence block, keeping only the first error so the
/// whole malformed document is reported and skipped as one unit
fn flush_sentence(
    token_lines: &mut Vec<(usize, String)>,
    chunk_line: &mut Option<(usize, String)>,
    sentences: &mut Vec<Sentence>,
    error: &mut Option<ParseError>,
) {
    if token_lines.is_empty() {
        *chunk_line = None;
        return;
    }
    match parse_sentence(token_lines, chunk_line.as_ref()) {
        Ok(sentence) => sentences.push(sentence),
        Err(e) => {
            error.get_or_insert(e);
        }
    }
    token_lines.clear();
    *chunk_line = None;
}

/// Split a comment into "key = value"
fn split_comment(comment: &str) -> Option<(&str, &str)> {
    let comment = comment.trim();
    let eq = comment.find('=')?;
    Some((comment[..eq].trim(), comment[eq + 1..].trim()))
}

/// Parse accumulated token lines (plus optional chunk annotation) into a
/// Sentence
fn parse_sentence(
    lines: &[(usize, String)],
    chunk_line: Option<&(usize, String)>,
) -> Result<Sentence, ParseError> {
    let mut sentence = Sentence::new();
    // 1-indexed head per token, resolved after all tokens exist
    let mut heads: Vec<Option<usize>> = Vec::with_capacity(lines.len());

    for (line_num, line) in lines {
        if let Some((token, head)) = parse_token_line(line, *line_num, sentence.len())? {
            sentence.add_token(token);
            heads.push(head);
        }
    }

    let n = sentence.len();
    for (idx, head) in heads.into_iter().enumerate() {
        match head {
            None => sentence.root = Some(idx),
            Some(h) if h < n => sentence.set_head(idx, h),
            Some(h) => {
                return Err(ParseError::new(
                    lines[idx].0,
                    format!("HEAD {} out of range for sentence of {} tokens", h + 1, n),
                ));
            }
        }
    }

    if let Some((line_num, spec)) = chunk_line {
        sentence.chunks = parse_chunks(spec, *line_num, n)?;
    }

    Ok(sentence)
}

/// Parse one token line into a Token plus its 0-indexed head
///
/// Returns None for multiword-token and empty-node lines; the matcher
/// operates on basic tokens only.
fn parse_token_line(
    line: &str,
    line_num: usize,
    idx: usize,
) -> Result<Option<(Token, Option<usize>)>, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 10 {
        return Err(ParseError::new(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    // Multiword ranges (1-2) and empty nodes (2.1) carry no dependency
    // structure of their own
    if fields[0].contains('-') || fields[0].contains('.') {
        return Ok(None);
    }
    if fields[0].parse::<usize>().is_err() {
        return Err(ParseError::new(
            line_num,
            format!("Invalid token ID: {}", fields[0]),
        ));
    }

    let form = fields[1].to_string();
    let lemma = if fields[2] == "_" {
        form.clone()
    } else {
        fields[2].to_string()
    };
    let pos = fields[3].to_string();
    let tag = if fields[4] == "_" {
        String::new()
    } else {
        fields[4].to_string()
    };

    let head = match fields[6] {
        "0" | "_" => None,
        s => {
            let h: usize = s
                .parse()
                .map_err(|_| ParseError::new(line_num, format!("Invalid HEAD: {}", s)))?;
            // 1-indexed in the file, 0-indexed here
            h.checked_sub(1)
        }
    };

    let dep = fields[7].to_string();
    let ws = if misc_has_no_space(fields[9]) {
        String::new()
    } else {
        " ".to_string()
    };

    let mut token = Token::new(idx, &form, &lemma, &pos, &tag, &dep);
    token.ws = ws;
    Ok(Some((token, head)))
}

fn misc_has_no_space(misc: &str) -> bool {
    misc != "_" && misc.split('|').any(|pair| pair == "SpaceAfter=No")
}

/// Parse a noun-chunk annotation: whitespace- or comma-separated
/// `start-end:head` items, 1-indexed inclusive; `start:head` for
/// single-token chunks
fn parse_chunks(spec: &str, line_num: usize, n_tokens: usize) -> Result<Vec<NounChunk>, ParseError> {
    let mut chunks = Vec::new();
    for item in spec.split(|c: char| c == ',' || c.is_whitespace()) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let invalid = || ParseError::new(line_num, format!("Invalid noun chunk: {}", item));
        let (range, head) = item.split_once(':').ok_or_else(invalid)?;
        let (start, end) = match range.split_once('-') {
            Some((s, e)) => (
                s.parse::<usize>().map_err(|_| invalid())?,
                e.parse::<usize>().map_err(|_| invalid())?,
            ),
            None => {
                let s = range.parse::<usize>().map_err(|_| invalid())?;
                (s, s)
            }
        };
        let head: usize = head.parse().map_err(|_| invalid())?;
        if start == 0 || end < start || end > n_tokens || head < start || head > end {
            return Err(invalid());
        }
        chunks.push(NounChunk {
            start: start - 1,
            end: end - 1,
            head: head - 1,
        });
    }
    Ok(chunks)
}
