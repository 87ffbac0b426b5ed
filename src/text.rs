//! Text helpers: grapheme base sequences and frames derived from text.
//!
//! Every helper here works on a text array (an array of `String` values)
//! and registers cells relative to that array's viewpoint frame, one cell
//! index per array value.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::array::concat;
use crate::error::{OcularError, Result};
use crate::registry::Registry;
use crate::span::Span;

/// Registry over the grapheme clusters of `text`, registered as base `key`,
/// with concatenation as the default combiner.
pub fn text_registry(key: &str, text: &str) -> Result<Registry<String>> {
    let mut reg = Registry::with_combiner(concat());
    reg.register_base(key, graphemes(text))?;
    Ok(reg)
}

/// Split `text` into extended grapheme clusters.
pub fn graphemes(text: &str) -> Vec<String> {
    text.graphemes(true).map(str::to_string).collect()
}

fn is_space(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_whitespace)
}

fn is_newline(s: &str) -> bool {
    matches!(s, "\n" | "\r\n" | "\r")
}

/// The concatenated text of an array, with the byte offset each value starts at.
struct TextIndex {
    text: String,
    starts: Vec<usize>,
    viewpoint: String,
}

impl TextIndex {
    fn of(reg: &Registry<String>, array: &str) -> Result<Self> {
        let arr = reg
            .array(array)
            .ok_or_else(|| OcularError::UnknownArray(array.to_string()))?;
        let mut text = String::new();
        let mut starts = Vec::with_capacity(arr.len());
        for v in arr.values() {
            starts.push(text.len());
            text.push_str(v);
        }
        Ok(TextIndex {
            text,
            starts,
            viewpoint: arr.viewpoint().to_string(),
        })
    }

    /// Value indices covering the byte range `[lo, hi)`.
    fn span_of(&self, lo: usize, hi: usize) -> Span {
        let first = self.starts.partition_point(|&s| s <= lo).saturating_sub(1);
        let last = self.starts.partition_point(|&s| s < hi);
        Span::new(first, last)
    }

    /// Register `spans` as cells; matches landing in a shared value collapse into one cell.
    fn register(&self, reg: &mut Registry<String>, key: &str, spans: Vec<Span>) -> Result<()> {
        reg.new_frame(key, &self.viewpoint, fold_shared(spans))
    }
}

/// Fold each span into its predecessor when they share a value index.
fn fold_shared(spans: Vec<Span>) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match out.last_mut() {
            Some(prev) if span.lo < prev.hi => prev.hi = prev.hi.max(span.hi),
            _ => out.push(span),
        }
    }
    out
}

/// Words as found by unicode word boundaries, punctuation and spaces excluded.
pub fn add_word_frame(reg: &mut Registry<String>, key: &str, array: &str) -> Result<()> {
    let index = TextIndex::of(reg, array)?;
    let spans = index
        .text
        .unicode_word_indices()
        .map(|(at, w)| index.span_of(at, at + w.len()))
        .collect();
    index.register(reg, key, spans)
}

/// Sentences as found by unicode sentence boundaries, trailing whitespace trimmed.
pub fn add_sentence_frame(reg: &mut Registry<String>, key: &str, array: &str) -> Result<()> {
    let index = TextIndex::of(reg, array)?;
    let spans = index
        .text
        .split_sentence_bound_indices()
        .filter_map(|(at, s)| {
            let trimmed = s.trim_end();
            if trimmed.trim_start().is_empty() {
                return None;
            }
            let lead = trimmed.len() - trimmed.trim_start().len();
            Some(index.span_of(at + lead, at + trimmed.len()))
        })
        .collect();
    index.register(reg, key, spans)
}

/// Matches of `pattern` over the text; empty matches are skipped.
pub fn add_regex_frame(
    reg: &mut Registry<String>,
    key: &str,
    array: &str,
    pattern: &Regex,
) -> Result<()> {
    let index = TextIndex::of(reg, array)?;
    let spans = pattern
        .find_iter(&index.text)
        .filter(|m| !m.as_str().is_empty())
        .map(|m| index.span_of(m.start(), m.end()))
        .collect();
    index.register(reg, key, spans)
}

/// Maximal runs of values that are not line breaks.
pub fn add_line_frame(reg: &mut Registry<String>, key: &str, array: &str) -> Result<()> {
    reg.new_frame_filter(key, array, |n| n.value().is_some_and(|v| !is_newline(v)), true)
}

/// Maximal runs of values that are not whitespace.
pub fn add_token_frame(reg: &mut Registry<String>, key: &str, array: &str) -> Result<()> {
    reg.new_frame_filter(key, array, |n| n.value().is_some_and(|v| !is_space(v)), true)
}
