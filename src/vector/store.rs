//! Vector Store
//!
//! Append-only (embedding, record) collection with exact linear-scan
//! cosine search and snapshot persistence.
//!
//! Every vector is normalized on the way in, queries included, so search
//! is a plain dot product. Searches share a read lock; inserts and loads
//! take the write lock and swap in fully validated state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::record::{Record, SearchResult};
use super::similarity::{dot_product, magnitude, normalized};
use crate::error::{Error, Result};
use crate::persistence::snapshot;

/// Largest norm error accepted as already unit-length on load
const UNIT_TOLERANCE: f32 = 1e-4;

/// A stored embedding and the record it describes
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    /// Unit-length embedding
    pub embedding: Vec<f32>,
    pub record: Record,
}

impl VectorEntry {
    /// Get embedding dimension
    pub fn dim(&self) -> usize {
        self.embedding.len()
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Fixed by the first insertion
    dimension: Option<usize>,
    entries: Vec<VectorEntry>,
}

/// Shared handle to an in-memory vector store
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    inner: Arc<RwLock<Inner>>,
    snapshot_path: Option<PathBuf>,
}

impl VectorStore {
    /// Create an empty store with no persistence destination
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that saves to and loads from `path` by default
    pub fn with_snapshot_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            inner: Arc::default(),
            snapshot_path: Some(path.into()),
        }
    }

    /// Open a store backed by `path`, loading it when the file exists
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let store = Self::with_snapshot_path(path);
        if let Some(path) = store.snapshot_path.as_deref() {
            if path.exists() {
                store.load(None)?;
            } else {
                debug!(path = %path.display(), "no snapshot yet, starting empty");
            }
        }
        Ok(store)
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Established dimension, None while the store has never held a vector
    pub fn dimension(&self) -> Option<usize> {
        self.inner.read().dimension
    }

    /// Get number of stored entries
    pub fn count(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Copy of all entries in insertion order
    pub fn entries(&self) -> Vec<VectorEntry> {
        self.inner.read().entries.clone()
    }

    /// Append one entry.
    ///
    /// The first insertion fixes the store dimension; later vectors of a
    /// different length fail with `DimensionMismatch` and change nothing.
    pub fn insert(&self, embedding: Vec<f32>, record: Record) -> Result<()> {
        let mut inner = self.inner.write();
        let entry = prepare("insert", inner.dimension, &embedding, record)?;
        inner.dimension = Some(entry.dim());
        inner.entries.push(entry);
        Ok(())
    }

    /// Append a batch. Either every item is inserted or none is.
    pub fn insert_many(&self, items: Vec<(Vec<f32>, Record)>) -> Result<usize> {
        let mut inner = self.inner.write();
        commit(&mut inner, "insert_many", items)
    }

    /// Insert `items` only if the store is still empty, all under one write
    /// lock. Returns false when the store already had entries.
    pub fn seed_if_empty(&self, items: Vec<(Vec<f32>, Record)>) -> Result<bool> {
        let mut inner = self.inner.write();
        if !inner.entries.is_empty() {
            return Ok(false);
        }
        commit(&mut inner, "seed", items)?;
        Ok(true)
    }

    /// Top `k` entries by cosine similarity, highest first.
    ///
    /// Entries with equal scores keep insertion order. An empty store or
    /// `k == 0` yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read();
        if k == 0 || inner.entries.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(expected) = inner.dimension {
            if query.len() != expected {
                return Err(Error::DimensionMismatch {
                    operation: "search",
                    expected,
                    actual: query.len(),
                });
            }
        }
        let query = normalized(query).map_err(|reason| Error::InvalidVector {
            operation: "search",
            reason,
        })?;

        let mut scored: Vec<(usize, f32)> = inner
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, dot_product(&query, &entry.embedding).clamp(-1.0, 1.0)))
            .collect();

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| SearchResult {
                score,
                record: inner.entries[idx].record.clone(),
            })
            .collect())
    }

    /// Write the full store to `destination`, or to the configured
    /// snapshot path when None. Returns the path written.
    pub fn save(&self, destination: Option<&Path>) -> Result<PathBuf> {
        let path = self.resolve("save", destination)?;
        let count = {
            let inner = self.inner.read();
            snapshot::save(&path, inner.dimension, &inner.entries)?;
            inner.entries.len()
        };
        info!(path = %path.display(), entries = count, "vector store saved");
        Ok(path)
    }

    /// Replace the in-memory state with the snapshot at `source`, or at the
    /// configured snapshot path when None. Returns the loaded entry count.
    pub fn load(&self, source: Option<&Path>) -> Result<usize> {
        let path = self.resolve("load", source)?;
        let mut data = snapshot::load(&path)?;

        // Files from other writers may hold non-unit vectors; ours reload as-is
        for entry in &mut data.entries {
            if (magnitude(&entry.embedding) - 1.0).abs() > UNIT_TOLERANCE {
                entry.embedding = normalized(&entry.embedding).map_err(|reason| {
                    Error::corrupt(&path, format!("entry {}: {}", entry.record.id, reason))
                })?;
            }
        }

        let count = data.entries.len();
        {
            let mut inner = self.inner.write();
            inner.dimension = data.dimension;
            inner.entries = data.entries;
        }
        info!(path = %path.display(), entries = count, "vector store loaded");
        Ok(count)
    }

    fn resolve(&self, operation: &'static str, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .or(self.snapshot_path.as_deref())
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Configuration {
                operation,
                reason: "no snapshot path configured and none supplied".to_string(),
            })
    }
}

/// Validate and normalize one vector against the store dimension
fn prepare(
    operation: &'static str,
    dimension: Option<usize>,
    embedding: &[f32],
    record: Record,
) -> Result<VectorEntry> {
    if let Some(expected) = dimension {
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch {
                operation,
                expected,
                actual: embedding.len(),
            });
        }
    }
    let embedding =
        normalized(embedding).map_err(|reason| Error::InvalidVector { operation, reason })?;
    Ok(VectorEntry { embedding, record })
}

fn commit(inner: &mut Inner, operation: &'static str, items: Vec<(Vec<f32>, Record)>) -> Result<usize> {
    let mut dimension = inner.dimension;
    let mut prepared = Vec::with_capacity(items.len());
    for (embedding, record) in items {
        let entry = prepare(operation, dimension, &embedding, record)?;
        dimension = Some(entry.dim());
        prepared.push(entry);
    }

    let added = prepared.len();
    inner.dimension = dimension;
    inner.entries.extend(prepared);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn two_entry_store() -> VectorStore {
        let store = VectorStore::new();
        store
            .insert(vec![1.0, 0.0], Record::new("A", "tomato blight"))
            .unwrap();
        store
            .insert(vec![0.0, 1.0], Record::new("B", "healthy corn"))
            .unwrap();
        store
    }

    #[test]
    fn test_search_worked_example() {
        let store = two_entry_store();

        let results = store.search(&[0.9, 0.1], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, "A");
        assert!((results[0].score - 0.9939).abs() < 1e-3);
    }

    #[test]
    fn test_search_sorted_and_bounded() {
        let store = VectorStore::new();
        let vectors = [
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.5, 0.5, 0.5],
        ];
        for (i, v) in vectors.iter().enumerate() {
            store
                .insert(v.to_vec(), Record::new(format!("r{}", i), "x"))
                .unwrap();
        }

        for k in 1..=7 {
            let results = store.search(&[0.7, 0.2, 0.1], k).unwrap();
            assert_eq!(results.len(), k.min(vectors.len()));
            for pair in results.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for r in &results {
                assert!((-1.0..=1.0).contains(&r.score));
            }
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = VectorStore::new();
        store.insert(vec![0.0, 1.0], Record::new("other", "x")).unwrap();
        store.insert(vec![1.0, 0.0], Record::new("first", "x")).unwrap();
        store.insert(vec![2.0, 0.0], Record::new("second", "x")).unwrap();
        store.insert(vec![1.0, 0.0], Record::new("third", "x")).unwrap();

        let results = store.search(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[1].score, results[2].score);
    }

    #[test]
    fn test_empty_store_and_zero_k() {
        let store = VectorStore::new();
        assert!(store.search(&[1.0, 0.0], 5).unwrap().is_empty());

        let store = two_entry_store();
        assert!(store.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let store = two_entry_store();

        let err = store
            .insert(vec![1.0, 0.0, 0.0], Record::new("C", "wrong width"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                operation: "insert",
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(store.count(), 2);

        let err = store.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { operation: "search", .. }));
    }

    #[test]
    fn test_insert_many_is_all_or_nothing() {
        let store = two_entry_store();
        let err = store
            .insert_many(vec![
                (vec![1.0, 1.0], Record::new("C", "ok")),
                (vec![1.0], Record::new("D", "bad")),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert_eq!(store.count(), 2);

        let added = store
            .insert_many(vec![(vec![1.0, 1.0], Record::new("C", "ok"))])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_vectors_are_normalized() {
        let store = VectorStore::new();
        store.insert(vec![3.0, 4.0], Record::new("A", "x")).unwrap();
        let entries = store.entries();
        assert!((magnitude(&entries[0].embedding) - 1.0).abs() < 1e-6);

        // An unnormalized query ranks the same as its unit form
        store.insert(vec![4.0, 3.0], Record::new("B", "x")).unwrap();
        let raw = store.search(&[40.0, 30.0], 2).unwrap();
        let unit = store.search(&[0.8, 0.6], 2).unwrap();
        assert_eq!(raw[0].record.id, "B");
        for (r, u) in raw.iter().zip(&unit) {
            assert_eq!(r.record, u.record);
            assert!((r.score - u.score).abs() < 1e-6);
        }
        assert!((raw[0].score - 1.0).abs() < 1e-6);
        assert!((raw[1].score - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_vectors_rejected() {
        let store = VectorStore::new();
        let err = store.insert(vec![0.0, 0.0], Record::new("Z", "x")).unwrap_err();
        assert!(matches!(err, Error::InvalidVector { .. }));
        assert!(store.dimension().is_none());

        let store = two_entry_store();
        let err = store.search(&[f32::NAN, 0.0], 1).unwrap_err();
        assert!(matches!(err, Error::InvalidVector { operation: "search", .. }));
    }

    #[test]
    fn test_seed_if_empty() {
        let store = VectorStore::new();
        let seeded = store
            .seed_if_empty(vec![(vec![1.0, 0.0], Record::new("A", "x"))])
            .unwrap();
        assert!(seeded);
        assert_eq!(store.count(), 1);

        let seeded = store
            .seed_if_empty(vec![(vec![0.0, 1.0], Record::new("B", "x"))])
            .unwrap();
        assert!(!seeded);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.snap");

        let store = VectorStore::with_snapshot_path(&path);
        store
            .insert(vec![0.3, 0.7, 0.1], Record::new("A", "tomato blight").with_field("n", 3.0))
            .unwrap();
        store.insert(vec![0.2, 0.1, 0.9], Record::new("B", "healthy corn")).unwrap();
        store.insert(vec![0.3, 0.7, 0.1], Record::new("C", "duplicate")).unwrap();
        store.save(None).unwrap();

        let fresh = VectorStore::new();
        assert_eq!(fresh.load(Some(&path)).unwrap(), 3);
        assert_eq!(fresh.dimension(), Some(3));
        assert_eq!(fresh.entries(), store.entries());

        for query in [[0.3, 0.7, 0.1], [1.0, 0.0, 0.0], [-0.2, 0.5, 0.4]] {
            let before = store.search(&query, 3).unwrap();
            let after = fresh.search(&query, 3).unwrap();
            assert_eq!(before, after);
            for (a, b) in before.iter().zip(&after) {
                assert_eq!(a.score.to_bits(), b.score.to_bits());
            }
        }
    }

    #[test]
    fn test_load_replaces_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.snap");
        two_entry_store().save(Some(&path)).unwrap();

        let store = VectorStore::new();
        for i in 0..5 {
            store
                .insert(vec![1.0, 0.0, i as f32], Record::new(format!("x{}", i), "x"))
                .unwrap();
        }
        store.load(Some(&path)).unwrap();
        assert_eq!(store.count(), 2);
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_open_missing_then_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("kb.snap");

        let store = VectorStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.insert(vec![1.0, 0.0], Record::new("A", "x")).unwrap();
        store.save(None).unwrap();

        let reopened = VectorStore::open(&path).unwrap();
        assert_eq!(reopened.count(), 1);
        assert_eq!(reopened.snapshot_path(), Some(path.as_path()));
    }

    #[test]
    fn test_save_without_destination() {
        let store = two_entry_store();
        let err = store.save(None).unwrap_err();
        assert!(matches!(err, Error::Configuration { operation: "save", .. }));

        let err = store.load(None).unwrap_err();
        assert!(matches!(err, Error::Configuration { operation: "load", .. }));
    }

    #[test]
    fn test_save_to_unwritable_destination() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = two_entry_store()
            .save(Some(&blocker.join("kb.snap")))
            .unwrap_err();
        assert!(matches!(err, Error::Io { operation: "save", .. }));
    }

    #[test]
    fn test_load_corrupt_leaves_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.snap");
        std::fs::write(&path, b"garbage bytes").unwrap();

        let store = two_entry_store();
        let err = store.load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::CorruptData { .. }));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_load_normalizes_foreign_vectors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foreign.snap");
        let raw = [
            VectorEntry {
                embedding: vec![0.1, 0.0],
                record: Record::new("same_direction", "x"),
            },
            VectorEntry {
                embedding: vec![0.6, 0.8],
                record: Record::new("other", "x"),
            },
        ];
        std::fs::write(&path, snapshot::encode(Some(2), &raw)).unwrap();

        let store = VectorStore::new();
        assert_eq!(store.load(Some(&path)).unwrap(), 2);
        let results = store.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].record.id, "same_direction");
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - 0.6).abs() < 1e-6);
        for entry in store.entries() {
            assert!((magnitude(&entry.embedding) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_rejects_zero_vector() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero.snap");
        let raw = [VectorEntry {
            embedding: vec![0.0, 0.0],
            record: Record::new("Z", "x"),
        }];
        std::fs::write(&path, snapshot::encode(Some(2), &raw)).unwrap();

        let store = two_entry_store();
        let err = store.load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::CorruptData { .. }));
        assert!(err.to_string().contains("zero magnitude"));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_concurrent_searches() {
        let store = two_entry_store();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.search(&[0.9, 0.1], 1).unwrap())
            })
            .collect();
        for handle in handles {
            let results = handle.join().unwrap();
            assert_eq!(results[0].record.id, "A");
        }
    }
}
