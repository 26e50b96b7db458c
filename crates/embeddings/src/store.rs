use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::options::{MalformedLinePolicy, StoreOptions};
use crate::vector::EmbeddingVector;
use crate::{hash_key, normalize};

/// One chained entry. `next` points at the previously inserted node of the same bucket.
#[derive(Debug)]
struct Node {
    key: Box<str>,
    vector: EmbeddingVector,
    next: Option<usize>,
}

fn bucket_index(key: &str, buckets: usize) -> usize {
    // buckets > 0 is checked by StoreOptions::validate
    (hash_key(key) % buckets as u64) as usize
}

/// Walks one bucket chain, most recent node first.
struct Chain<'a> {
    nodes: &'a [Node],
    cursor: Option<usize>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}

/// Mutable half of the store: owns the node arena while entries are inserted.
///
/// `finish` freezes it into an [`EmbeddingStore`].
#[derive(Debug)]
pub struct StoreBuilder {
    dimension: usize,
    heads: Vec<Option<usize>>,
    nodes: Vec<Node>,
    skipped_lines: usize,
}

impl StoreBuilder {
    /// Empty table with `options.buckets` buckets.
    pub fn new(options: &StoreOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            dimension: options.dimension,
            heads: vec![None; options.buckets],
            nodes: Vec::new(),
            skipped_lines: 0,
        })
    }

    /// Push `(word, vector)` to the front of its bucket chain.
    ///
    /// A duplicate key is not replaced; the new node shadows the old one.
    pub fn insert(&mut self, word: &str, vector: EmbeddingVector) -> Result<()> {
        if vector.dim() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                word: word.to_string(),
                expected: self.dimension,
                actual: vector.dim(),
            });
        }
        let key: Box<str> = normalize(word).into();
        let bucket = bucket_index(&key, self.heads.len());
        if let Some(head) = self.heads.get_mut(bucket) {
            let id = self.nodes.len();
            self.nodes.push(Node {
                key,
                vector,
                next: head.replace(id),
            });
        }
        Ok(())
    }

    /// Number of entries inserted so far (duplicates included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze into a read-only store.
    pub fn finish(self) -> EmbeddingStore {
        EmbeddingStore {
            dimension: self.dimension,
            heads: self.heads,
            nodes: self.nodes,
            skipped_lines: self.skipped_lines,
        }
    }

    fn read_lines<R: BufRead>(
        &mut self,
        reader: R,
        policy: MalformedLinePolicy,
        path: &Path,
    ) -> Result<()> {
        for (i, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes.map_err(|source| StoreError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
            let line_no = i + 1;
            let parsed = decode_line(&bytes).and_then(|line| parse_line(line, self.dimension));
            match parsed {
                Ok(Some((word, values))) => self.insert(word, EmbeddingVector::new(values))?,
                Ok(None) => continue,
                Err(reason) => match policy {
                    MalformedLinePolicy::Fail => {
                        return Err(StoreError::MalformedEmbeddingLine {
                            line: line_no,
                            reason,
                        })
                    }
                    MalformedLinePolicy::Skip => {
                        warn!(line = line_no, %reason, "skipping malformed embedding line");
                        self.skipped_lines += 1;
                    }
                },
            }
        }
        Ok(())
    }
}

/// UTF-8 text of one raw line, without the trailing `\r` of CRLF input.
fn decode_line(bytes: &[u8]) -> std::result::Result<&str, String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))
}

/// Split `word v1 .. vD` on single spaces. `Ok(None)` for a blank line.
fn parse_line(line: &str, dimension: usize) -> std::result::Result<Option<(&str, Vec<f32>)>, String> {
    let mut fields = line.split(' ').filter(|f| !f.is_empty());
    let Some(word) = fields.next() else {
        return Ok(None);
    };
    let mut values = Vec::with_capacity(dimension);
    for field in fields {
        if values.len() == dimension {
            return Err(format!("{word:?} has more than {dimension} vector fields"));
        }
        let value = field
            .parse::<f32>()
            .map_err(|e| format!("{word:?} field {} ({field:?}): {e}", values.len() + 1))?;
        values.push(value);
    }
    if values.len() < dimension {
        return Err(format!(
            "{word:?} has {} vector fields, expected {dimension}",
            values.len()
        ));
    }
    Ok(Some((word, values)))
}

/// Summary of table occupancy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreStats {
    /// chained entries, duplicates included
    pub entries: usize,
    /// fixed bucket count
    pub buckets: usize,
    /// buckets with at least one entry
    pub occupied_buckets: usize,
    /// length of the longest chain
    pub longest_chain: usize,
    /// entries / buckets
    pub load_factor: f64,
    /// lines dropped under `MalformedLinePolicy::Skip`
    pub skipped_lines: usize,
}

/// Read-only word → vector table.
///
/// Keys are lower-cased at insertion and at lookup. Lookups return the most
/// recently inserted vector for a key.
#[derive(Debug)]
pub struct EmbeddingStore {
    dimension: usize,
    heads: Vec<Option<usize>>,
    nodes: Vec<Node>,
    skipped_lines: usize,
}

impl EmbeddingStore {
    /// Build from an embedding file (`word v1 .. vD` per line, no header).
    pub fn build(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StoreError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::load(BufReader::new(file), options, path)?;
        info!(
            path = %path.display(),
            entries = store.len(),
            buckets = store.bucket_count(),
            load_factor = store.load_factor(),
            "embedding store built"
        );
        Ok(store)
    }

    /// Build from any buffered reader in the embedding file format.
    pub fn from_reader<R: BufRead>(reader: R, options: &StoreOptions) -> Result<Self> {
        Self::load(reader, options, Path::new("<reader>"))
    }

    fn load<R: BufRead>(reader: R, options: &StoreOptions, path: &Path) -> Result<Self> {
        let mut builder = StoreBuilder::new(options)?;
        builder.read_lines(reader, options.on_malformed, path)?;
        debug!(entries = builder.len(), skipped = builder.skipped_lines, "embedding lines read");
        Ok(builder.finish())
    }

    fn chain(&self, bucket: usize) -> Chain<'_> {
        Chain {
            nodes: &self.nodes,
            cursor: self.heads.get(bucket).copied().flatten(),
        }
    }

    /// Vector for `word` after normalization, or `None` if absent.
    pub fn lookup(&self, word: &str) -> Option<&EmbeddingVector> {
        let key = normalize(word);
        let bucket = bucket_index(&key, self.heads.len());
        self.chain(bucket)
            .find(|node| *node.key == *key)
            .map(|node| &node.vector)
    }

    /// Every vector chained under `word`, most recent first.
    pub fn lookup_all<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a EmbeddingVector> + 'a {
        let key = normalize(word).into_owned();
        let bucket = bucket_index(&key, self.heads.len());
        self.chain(bucket)
            .filter(move |node| *node.key == *key)
            .map(|node| &node.vector)
    }

    /// True if `word` has a vector.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    /// Chained entries, duplicates included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Vector dimension D.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fixed bucket count B.
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// Entries per bucket.
    pub fn load_factor(&self) -> f64 {
        self.nodes.len() as f64 / self.heads.len() as f64
    }

    /// Occupancy summary. Walks every chain.
    pub fn stats(&self) -> StoreStats {
        let mut occupied_buckets = 0;
        let mut longest_chain = 0;
        for head in self.heads.iter().copied() {
            if head.is_none() {
                continue;
            }
            occupied_buckets += 1;
            let length = Chain {
                nodes: &self.nodes,
                cursor: head,
            }
            .count();
            longest_chain = longest_chain.max(length);
        }
        StoreStats {
            entries: self.len(),
            buckets: self.bucket_count(),
            occupied_buckets,
            longest_chain,
            load_factor: self.load_factor(),
            skipped_lines: self.skipped_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const FILE: &str = "the 0.1 0.2 0.3\nOlivia 1 2 3\nbrown -1.5 0 2e-1\n";

    fn small(dimension: usize, buckets: usize) -> StoreOptions {
        StoreOptions::new(dimension, buckets)
    }

    #[test]
    fn lookup_returns_inserted_vectors() {
        let store = EmbeddingStore::from_reader(FILE.as_bytes(), &small(3, 17)).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.lookup("the").unwrap().as_slice(), &[0.1, 0.2, 0.3]);
        assert_eq!(store.lookup("brown").unwrap().as_slice(), &[-1.5, 0.0, 0.2]);
    }

    #[test]
    fn keys_are_normalized_on_both_sides() {
        let store = EmbeddingStore::from_reader(FILE.as_bytes(), &small(3, 17)).unwrap();
        // inserted as "Olivia"
        assert_eq!(store.lookup("olivia").unwrap().as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(store.lookup("OLIVIA").unwrap().as_slice(), &[1.0, 2.0, 3.0]);
        assert!(store.contains("Brown"));
    }

    #[test]
    fn missing_word_is_none() {
        let store = EmbeddingStore::from_reader(FILE.as_bytes(), &small(3, 17)).unwrap();
        assert!(store.lookup("harassment").is_none());
        assert!(store.lookup("").is_none());
    }

    #[test]
    fn most_recent_duplicate_wins_and_both_stay_chained() {
        let text = "word 1 1\nother 5 5\nWORD 2 2\n";
        let store = EmbeddingStore::from_reader(text.as_bytes(), &small(2, 4)).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.lookup("word").unwrap().as_slice(), &[2.0, 2.0]);
        let all: Vec<&[f32]> = store.lookup_all("Word").map(|v| v.as_slice()).collect();
        assert_eq!(all, vec![&[2.0, 2.0][..], &[1.0, 1.0][..]]);
    }

    #[test]
    fn single_bucket_keeps_every_entry() {
        let store = EmbeddingStore::from_reader(FILE.as_bytes(), &small(3, 1)).unwrap();
        let stats = store.stats();
        assert_eq!(stats.occupied_buckets, 1);
        assert_eq!(stats.longest_chain, 3);
        assert!((stats.load_factor - 3.0).abs() < f64::EPSILON);
        for word in ["the", "olivia", "brown"] {
            assert!(store.contains(word), "{word} lost");
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "\na 1\n\n   \nb 2\n";
        let store = EmbeddingStore::from_reader(text.as_bytes(), &small(1, 8)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn short_line_is_malformed() {
        let text = "a 1 2 3\nb 1 2\n";
        let err = EmbeddingStore::from_reader(text.as_bytes(), &small(3, 8)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedEmbeddingLine { line: 2, .. }));
    }

    #[test]
    fn long_line_and_bad_number_are_malformed() {
        let err = EmbeddingStore::from_reader("a 1 2 3 4\n".as_bytes(), &small(3, 8)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedEmbeddingLine { line: 1, .. }));
        let err = EmbeddingStore::from_reader("a 1 x 3\n".as_bytes(), &small(3, 8)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedEmbeddingLine { line: 1, .. }));
    }

    #[test]
    fn skip_policy_drops_only_bad_lines() {
        let mut options = small(2, 8);
        options.on_malformed = MalformedLinePolicy::Skip;
        let text = "a 1 2\nb 1\nc 3 4\nd 1 q\n";
        let store = EmbeddingStore::from_reader(text.as_bytes(), &options).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().skipped_lines, 2);
        assert!(store.contains("a") && store.contains("c"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn invalid_utf8_is_a_malformed_line() {
        let text: &[u8] = b"good 1\nbad\xff 2\nalso 3\n";
        let err = EmbeddingStore::from_reader(text, &small(1, 8)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedEmbeddingLine { line: 2, .. }));

        let mut options = small(1, 8);
        options.on_malformed = MalformedLinePolicy::Skip;
        let store = EmbeddingStore::from_reader(text, &options).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().skipped_lines, 1);
        assert!(store.contains("good") && store.contains("also"));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let store = EmbeddingStore::from_reader("a 1 2\r\nb 3 4\r\n".as_bytes(), &small(2, 8)).unwrap();
        assert_eq!(store.lookup("b").unwrap().as_slice(), &[3.0, 4.0]);
    }

    #[test]
    fn titlecase_keys_match_lowercased_lookups() {
        let store = EmbeddingStore::from_reader("ǅem 1\n".as_bytes(), &small(1, 8)).unwrap();
        let lowered = "ǅem".to_lowercase();
        assert_eq!(lowered, "ǆem");
        assert!(store.contains(&lowered));
        assert!(store.contains("ǅem"));
        assert!(store.contains("Ǆem"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = EmbeddingStore::build("/definitely/not/here.txt", &small(3, 8)).unwrap_err();
        assert!(matches!(err, StoreError::StoreUnavailable { .. }));
    }

    #[test]
    fn zero_buckets_or_dimension_rejected() {
        assert!(matches!(
            StoreBuilder::new(&small(3, 0)),
            Err(StoreError::InvalidOptions(_))
        ));
        assert!(matches!(
            StoreBuilder::new(&small(0, 8)),
            Err(StoreError::InvalidOptions(_))
        ));
    }

    #[test]
    fn builder_rejects_wrong_dimension() {
        let mut builder = StoreBuilder::new(&small(3, 8)).unwrap();
        let err = builder.insert("x", EmbeddingVector::new(vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch { expected: 3, actual: 1, .. }
        ));
        assert!(builder.is_empty());
    }

    proptest! {
        #[test]
        fn collisions_never_lose_entries(
            words in proptest::collection::hash_set("[a-z]{1,10}", 20..120),
            buckets in 1usize..16,
        ) {
            let mut builder = StoreBuilder::new(&small(2, buckets)).unwrap();
            let words: Vec<String> = words.into_iter().collect();
            for (i, w) in words.iter().enumerate() {
                builder.insert(w, EmbeddingVector::new(vec![i as f32, 1.0])).unwrap();
            }
            let store = builder.finish();
            prop_assert!(store.bucket_count() < words.len());
            for (i, w) in words.iter().enumerate() {
                let v = store.lookup(w);
                prop_assert!(v.is_some());
                prop_assert_eq!(v.unwrap().as_slice(), &[i as f32, 1.0][..]);
            }
        }

        #[test]
        fn absent_words_are_none(
            words in proptest::collection::hash_set("[a-m]{1,6}", 1..50),
            probe in "[n-z]{1,6}",
        ) {
            let mut builder = StoreBuilder::new(&small(1, 7)).unwrap();
            for w in &words {
                builder.insert(w, EmbeddingVector::new(vec![0.0])).unwrap();
            }
            let store = builder.finish();
            let seen: HashSet<&str> = words.iter().map(String::as_str).collect();
            prop_assert!(!seen.contains(probe.as_str()));
            prop_assert!(store.lookup(&probe).is_none());
        }
    }
}
