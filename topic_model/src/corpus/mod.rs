pub mod partition;
pub mod stop_words;
pub mod tokenizer;
pub mod vocabulary;

pub use partition::{PartitionData, PartitionStrategy, Partitioner, shard_range};
pub use stop_words::StopWords;
pub use tokenizer::{DEFAULT_MIN_DOC_FREQ, TokenizedCorpus, Tokenizer};
pub use vocabulary::Vocabulary;
