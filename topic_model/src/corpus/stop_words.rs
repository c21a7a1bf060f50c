use std::{collections::HashSet, fs, path::Path};

use crate::{ModelErr, Result};

/// The set of words removed from the corpus before sampling.
///
/// Matching is case-insensitive, every entry is stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Parses a whitespace or newline separated list of stop words.
    pub fn from_text(text: &str) -> Self {
        text.split_whitespace().collect()
    }

    /// Loads a stop word resource from disk.
    ///
    /// # Arguments
    /// * `path` - The path of a whitespace separated text file.
    ///
    /// # Returns
    /// A configuration error if the resource is missing or unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ModelErr::Configuration(format!(
                "cannot read stop words from {}: {e}",
                path.display()
            ))
        })?;

        Ok(Self::from_text(&text))
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        Self { words }
    }
}
