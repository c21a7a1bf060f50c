use std::collections::HashMap;

/// A stable word to id table.
///
/// Ids are dense and assigned in the order the words are given, so every
/// counter matrix in the system can be indexed by them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Vocabulary {
    /// Returns the id of `word`, if it survived filtering.
    #[inline]
    pub fn id(&self, word: &str) -> Option<usize> {
        self.ids.get(word).copied()
    }

    /// Returns the word behind `id`.
    ///
    /// # Panics
    /// If `id` is out of range.
    #[inline]
    pub fn word(&self, id: usize) -> &str {
        &self.words[id]
    }

    #[inline]
    pub fn words(&self) -> &[String] {
        &self.words
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

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vocab = Self::default();

        for word in iter {
            let word = word.into();
            if vocab.ids.contains_key(&word) {
                continue;
            }

            vocab.ids.insert(word.clone(), vocab.words.len());
            vocab.words.push(word);
        }

        vocab
    }
}
