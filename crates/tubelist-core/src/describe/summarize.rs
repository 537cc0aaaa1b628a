//! Shorten a raw description to its first few sentences.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{Segmenter, SummaryConfig};

const ELLIPSIS: char = '…';

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?i)\b(?:https?://|www\.)\S+"));
static SENTENCE_END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r#"[.!?…]+["'’”)\]]*"#));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Covered by the `heuristic_keeps_urls_whole` test.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    sentence_count: usize,
    max_chars: usize,
    segmenter: Segmenter,
}

impl Summarizer {
    pub fn new(cfg: &SummaryConfig) -> Self {
        Self {
            sentence_count: cfg.sentence_count.max(1),
            max_chars: cfg.max_chars.max(1),
            segmenter: cfg.segmenter,
        }
    }

    /// First `sentence_count` sentences joined by single spaces, cut to
    /// `max_chars` characters (ellipsis included) when still too long.
    pub fn summarize(&self, raw: &str) -> String {
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return text;
        }
        let sentences = match self.segmenter {
            Segmenter::Unicode => unicode_sentences(&text),
            Segmenter::Heuristic => heuristic_sentences(&text),
        };
        let summary = sentences
            .into_iter()
            .take(self.sentence_count)
            .collect::<Vec<_>>()
            .join(" ");
        truncate(&summary, self.max_chars)
    }
}

fn unicode_sentences(text: &str) -> Vec<&str> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split after terminal punctuation unless it sits inside a URL or directly
/// precedes a letter or digit (`3.5`, `e.g.x`).
fn heuristic_sentences(text: &str) -> Vec<&str> {
    let urls: Vec<Range<usize>> = URL_REGEX.find_iter(text).map(|m| url_span(text, m.range())).collect();
    let mut out = Vec::new();
    let mut start = 0;
    for end in SENTENCE_END_REGEX.find_iter(text) {
        if urls.iter().any(|u| u.contains(&end.start())) {
            continue;
        }
        if text[end.end()..].chars().next().is_some_and(char::is_alphanumeric) {
            continue;
        }
        let sentence = text[start..end.end()].trim();
        if !sentence.is_empty() {
            out.push(sentence);
        }
        start = end.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// A URL match without trailing punctuation, which belongs to the sentence.
fn url_span(text: &str, range: Range<usize>) -> Range<usize> {
    let trimmed = text[range.clone()].trim_end_matches(['.', ',', '!', '?', ';', ':', ')', '…']);
    range.start..range.start + trimmed.len()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.truncate(out.trim_end().len());
    out.push(ELLIPSIS);
    out
}
