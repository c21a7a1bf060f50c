use std::collections::BTreeMap;

use log::debug;

use super::{StopWords, Vocabulary};

/// Words must show up in at least this many distinct documents to be kept.
pub const DEFAULT_MIN_DOC_FREQ: usize = 5;

/// The flattened output of the tokenizer.
///
/// `words` and `doc_labels` are positionally aligned, one entry per surviving
/// occurrence, in document order.
#[derive(Debug, Clone)]
pub struct TokenizedCorpus {
    pub vocabulary: Vocabulary,
    pub words: Vec<usize>,
    pub doc_labels: Vec<usize>,
    /// Corpus wide surviving occurrences, indexed by word id.
    pub occurrences: Vec<usize>,
    /// Character length of every raw document, empty ones included.
    pub doc_lengths: Vec<usize>,
}

impl TokenizedCorpus {
    /// Number of raw documents the corpus was built from.
    #[inline]
    pub fn num_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Number of surviving tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Turns raw documents into a filtered token stream.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: StopWords,
    min_doc_freq: usize,
}

impl Tokenizer {
    /// Creates a new `Tokenizer`.
    ///
    /// # Arguments
    /// * `stop_words` - Words that never make it into the vocabulary.
    /// * `min_doc_freq` - Minimum amount of distinct documents a word must appear in.
    pub fn new(stop_words: StopWords, min_doc_freq: usize) -> Self {
        Self {
            stop_words,
            min_doc_freq,
        }
    }

    /// Tokenizes `docs` and drops rare words, stop words and the empty string.
    ///
    /// Vocabulary ids are assigned in lexicographic order of the surviving words.
    pub fn tokenize<S: AsRef<str>>(&self, docs: &[S]) -> TokenizedCorpus {
        let split: Vec<Vec<String>> = docs.iter().map(|d| split_document(d.as_ref())).collect();

        // word -> (distinct documents, last document seen)
        let mut doc_freq: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for (doc, tokens) in split.iter().enumerate() {
            for token in tokens {
                let entry = doc_freq.entry(token.as_str()).or_insert((0, usize::MAX));
                if entry.1 != doc {
                    *entry = (entry.0 + 1, doc);
                }
            }
        }

        let vocabulary: Vocabulary = doc_freq
            .into_iter()
            .filter(|&(word, (freq, _))| {
                freq >= self.min_doc_freq && !word.is_empty() && !self.stop_words.contains(word)
            })
            .map(|(word, _)| word.to_string())
            .collect();

        let mut words = Vec::new();
        let mut doc_labels = Vec::new();
        let mut occurrences = vec![0; vocabulary.len()];

        for (doc, tokens) in split.iter().enumerate() {
            for id in tokens.iter().filter_map(|t| vocabulary.id(t)) {
                words.push(id);
                doc_labels.push(doc);
                occurrences[id] += 1;
            }
        }

        debug!(
            docs = docs.len(), vocab = vocabulary.len(), tokens = words.len();
            "tokenized corpus"
        );

        TokenizedCorpus {
            vocabulary,
            words,
            doc_labels,
            occurrences,
            doc_lengths: docs.iter().map(|d| d.as_ref().chars().count()).collect(),
        }
    }
}

/// Lowercases and whitespace-splits a document.
///
/// Only the first token loses one leading punctuation character and only the
/// last token loses one trailing punctuation character, interior tokens are kept
/// verbatim. A single token document is only stripped at the front.
fn split_document(doc: &str) -> Vec<String> {
    let mut tokens: Vec<String> = doc.to_lowercase().split_whitespace().map(String::from).collect();

    if let Some(first) = tokens.first_mut() {
        if let Some(rest) = first.strip_prefix(|c: char| c.is_ascii_punctuation()) {
            *first = rest.to_string();
        }
    }

    if let [_, .., last] = tokens.as_mut_slice() {
        if let Some(rest) = last.strip_suffix(|c: char| c.is_ascii_punctuation()) {
            *last = rest.to_string();
        }
    }

    tokens
}
