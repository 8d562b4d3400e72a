//! Character-budget text splitter for scraped pages.
//!
//! Paragraphs (blank-line separated) are broken into sentences and packed
//! greedily into chunks of at most `max_chars` characters. Consecutive chunks
//! share up to `overlap_chars` characters of trailing context, snapped forward
//! to the next sentence start; when the tail holds no sentence start the chunks
//! do not overlap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::CorpusError;
use crate::domain::models::{Chunk, METADATA_SOURCE, METADATA_TOPIC};

pub const DEFAULT_MAX_CHARS: usize = 1200;
pub const DEFAULT_OVERLAP_CHARS: usize = 150;

const SENTENCE_BREAKS: [&str; 4] = [". ", "? ", "! ", "\n\n"];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    max_chars: usize,
    overlap_chars: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

impl TextSplitter {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self, CorpusError> {
        if max_chars == 0 {
            return Err(CorpusError::InvalidSplitter(
                "max_chars must be at least 1".to_string(),
            ));
        }
        if overlap_chars >= max_chars {
            return Err(CorpusError::InvalidSplitter(format!(
                "overlap_chars ({overlap_chars}) must be less than max_chars ({max_chars})"
            )));
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    /// Split `text` into chunks with ids `<slug(source)>_<n>`, numbered from 1
    pub fn split(&self, text: &str, source: &str, topic: Option<&str>) -> Vec<Chunk> {
        let prefix = slug(source);

        self.pack(text)
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let mut chunk = Chunk {
                    id: format!("{prefix}_{}", i + 1),
                    text: body,
                    metadata: Default::default(),
                }
                .with_metadata(METADATA_SOURCE, source);
                if let Some(topic) = topic {
                    chunk = chunk.with_metadata(METADATA_TOPIC, topic);
                }
                chunk
            })
            .collect()
    }

    /// Split every `.txt` file below `dir`, in path order; the file stem is the source
    pub fn split_dir(&self, dir: impl AsRef<Path>, topic: Option<&str>) -> Result<Vec<Chunk>, CorpusError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CorpusError::NotFound(dir.to_path_buf()));
        }

        let mut chunks = Vec::new();
        let mut slugs: HashMap<String, PathBuf> = HashMap::new();
        let mut files = 0usize;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }

            let text = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let source = path
                .file_stem()
                .map_or_else(String::new, |s| s.to_string_lossy().into_owned());

            // Ids are derived from the stem, so two files with the same slug would collide
            if let Some(first) = slugs.insert(slug(&source), path.to_path_buf()) {
                return Err(CorpusError::DuplicateId {
                    id: slug(&source),
                    first,
                    second: path.to_path_buf(),
                });
            }

            let produced = self.split(&text, &source, topic);
            debug!(path = %path.display(), chunks = produced.len(), "split text file");
            chunks.extend(produced);
            files += 1;
        }

        info!(dir = %dir.display(), files, chunks = chunks.len(), "split directory");
        Ok(chunks)
    }

    fn pack(&self, text: &str) -> Vec<String> {
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for paragraph in paragraphs(text) {
            let mut first_in_paragraph = true;
            for piece in sentences(&paragraph).into_iter().flat_map(|s| self.fit(s)) {
                let sep = if current.is_empty() {
                    ""
                } else if first_in_paragraph {
                    "\n\n"
                } else {
                    " "
                };
                first_in_paragraph = false;

                if char_len(&current) + sep.len() + char_len(&piece) <= self.max_chars {
                    current.push_str(sep);
                    current.push_str(&piece);
                    continue;
                }

                let tail = self.overlap_tail(&current);
                chunks.push(std::mem::take(&mut current));
                if !tail.is_empty() && char_len(&tail) + 1 + char_len(&piece) <= self.max_chars {
                    current = tail;
                    current.push(' ');
                }
                current.push_str(&piece);
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Break a sentence longer than the budget at word boundaries
    fn fit(&self, sentence: &str) -> Vec<String> {
        if char_len(sentence) <= self.max_chars {
            return vec![sentence.to_string()];
        }

        let mut pieces = Vec::new();
        let mut current = String::new();
        for word in sentence.split_whitespace() {
            for part in hard_split(word, self.max_chars) {
                let sep = usize::from(!current.is_empty());
                if char_len(&current) + sep + char_len(part) > self.max_chars {
                    pieces.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(part);
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }

    /// Trailing context carried into the next chunk
    fn overlap_tail(&self, chunk: &str) -> String {
        if self.overlap_chars == 0 {
            return String::new();
        }
        let total = char_len(chunk);
        if total <= self.overlap_chars {
            return String::new();
        }

        let start = chunk
            .char_indices()
            .nth(total - self.overlap_chars)
            .map_or(chunk.len(), |(i, _)| i);

        // Look two characters back so a boundary ending exactly at `start` counts
        let window = chunk[..start]
            .char_indices()
            .rev()
            .nth(1)
            .map_or(0, |(i, _)| i);
        let region = &chunk[window..];

        SENTENCE_BREAKS
            .iter()
            .filter_map(|b| region.find(*b).map(|i| window + i + b.len()))
            .min()
            .map(|i| chunk[i..].trim().to_string())
            .unwrap_or_default()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Blank-line separated paragraphs with inner whitespace collapsed
fn paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let mut out = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                out.push(collapse(&lines.join(" ")));
                lines.clear();
            }
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        out.push(collapse(&lines.join(" ")));
    }
    out
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sentences end at `.`, `!` or `?` followed by whitespace
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            let end = i + c.len_utf8();
            out.push(paragraph[start..end].trim());
            start = end;
        }
    }
    out.push(paragraph[start..].trim());
    out.retain(|s| !s.is_empty());
    out
}

/// Split a single token that alone exceeds the budget
fn hard_split(word: &str, max_chars: usize) -> Vec<&str> {
    if char_len(word) <= max_chars {
        return vec![word];
    }
    let mut parts = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, _) in word.char_indices() {
        if count == max_chars {
            parts.push(&word[start..i]);
            start = i;
            count = 0;
        }
        count += 1;
    }
    parts.push(&word[start..]);
    parts
}

/// Lowercase ASCII alphanumerics; every other run becomes a single `_`
pub fn slug(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "chunk".to_string()
    } else {
        trimmed.to_string()
    }
}
