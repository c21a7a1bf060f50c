use std::{num::NonZeroUsize, ops::Range};

use super::TokenizedCorpus;

/// Splits `total` documents among `partitions` and returns the range for `partition`.
///
/// Properties:
/// - Ranges are contiguous, disjoint and cover `[0..total)`.
/// - Sizes differ by at most 1 (balanced partition).
pub fn shard_range(total: usize, partition: usize, partitions: usize) -> Range<usize> {
    assert!(partitions > 0);
    assert!(partition < partitions);

    let base = total / partitions;
    let rem = total % partitions;

    let start = partition * base + partition.min(rem);
    let extra = if partition < rem { 1 } else { 0 };
    let end = start + base + extra;

    start..end
}

/// How documents are assigned to partitions. Documents never span partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Balanced contiguous ranges of documents.
    #[default]
    Contiguous,
    /// A document goes to partition `chars(document) mod partitions`.
    ByLength,
}

/// One shard's private slice of the token stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionData {
    pub id: usize,
    /// Corpus level ids of the documents owned by this partition, ascending.
    pub docs: Vec<usize>,
    pub words: Vec<usize>,
    /// Index into `docs` for every token.
    pub doc_labels: Vec<usize>,
}

impl PartitionData {
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Assigns documents and their tokens into a fixed number of disjoint shards.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    strategy: PartitionStrategy,
    partitions: NonZeroUsize,
}

impl Partitioner {
    pub fn new(strategy: PartitionStrategy, partitions: NonZeroUsize) -> Self {
        Self {
            strategy,
            partitions,
        }
    }

    /// Returns the partition that owns document `doc`.
    pub fn owner(&self, corpus: &TokenizedCorpus, doc: usize) -> usize {
        let n = self.partitions.get();

        match self.strategy {
            PartitionStrategy::Contiguous => (0..n)
                .find(|&p| shard_range(corpus.num_docs(), p, n).contains(&doc))
                .unwrap_or(n - 1),
            PartitionStrategy::ByLength => corpus.doc_lengths[doc] % n,
        }
    }

    /// Splits `corpus` into `partitions` shards, some of which may be empty.
    pub fn split(&self, corpus: &TokenizedCorpus) -> Vec<PartitionData> {
        let n = self.partitions.get();
        let mut shards: Vec<PartitionData> = (0..n)
            .map(|id| PartitionData {
                id,
                ..Default::default()
            })
            .collect();

        // corpus doc -> (partition, local index)
        let mut local = Vec::with_capacity(corpus.num_docs());
        for doc in 0..corpus.num_docs() {
            let shard = &mut shards[self.owner(corpus, doc)];
            local.push((shard.id, shard.docs.len()));
            shard.docs.push(doc);
        }

        for (&word, &doc) in corpus.words.iter().zip(&corpus.doc_labels) {
            let (p, idx) = local[doc];
            shards[p].words.push(word);
            shards[p].doc_labels.push(idx);
        }

        shards
    }
}
