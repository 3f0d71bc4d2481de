use crate::error::{MuseError, Result};
use crate::index::{DocId, IndexField, InvertedIndex};
use crate::query;
use crate::store::{Clip, ClipStore, NewClip};
use crate::tokenizer::tokenize;
use parking_lot::RwLock;
use std::path::Path;

/// Clip engine: authoritative store plus derived inverted index, mutated in
/// lockstep.
///
/// The index `RwLock` is the transactional scope the consistency contract
/// requires. Every mutation takes the write guard before touching the store
/// and applies the index delta before releasing it, so a reader holding the
/// read guard can never observe a record without its postings or postings
/// without their record. The index delta itself is in-memory and infallible
/// and runs only after the store write succeeded; a store failure therefore
/// commits nothing. On open the index is rebuilt from the store, which also
/// covers recovery after a crash mid-flush.
pub struct Engine {
    store: ClipStore,
    index: RwLock<InvertedIndex>,
}

fn field_tokens(clip: &Clip) -> Vec<(IndexField, Vec<(String, usize)>)> {
    vec![
        (IndexField::Content, tokenize(&clip.content)),
        (IndexField::Title, tokenize(clip.title.as_deref().unwrap_or(""))),
        (IndexField::Url, tokenize(clip.url.as_deref().unwrap_or(""))),
    ]
}

fn validate(new: &NewClip) -> Result<()> {
    if new.content.trim().is_empty() {
        return Err(MuseError::Validation("content must not be empty".into()));
    }
    Ok(())
}

impl Engine {
    /// Open the store at `path` and backfill the index from existing clips.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = ClipStore::open(path)?;
        let mut index = InvertedIndex::new();
        let mut backfilled = 0usize;
        for clip in store.list()? {
            index.upsert(clip.id, &field_tokens(&clip));
            backfilled += 1;
        }
        if backfilled > 0 {
            tracing::info!(clips = backfilled, "index backfilled from store");
        }
        Ok(Self { store, index: RwLock::new(index) })
    }

    /// Create a clip and index it.
    pub fn create(&self, new: NewClip) -> Result<Clip> {
        validate(&new)?;
        let mut index = self.index.write();
        let clip = self.store.insert(new)?;
        index.upsert(clip.id, &field_tokens(&clip));
        tracing::debug!(id = clip.id, "clip created");
        Ok(clip)
    }

    /// Replace a clip's fields and re-index it. The full new term set is
    /// supplied to the index — upsert's replace semantics remove the stale
    /// postings, so no old/new diffing happens here.
    pub fn update(&self, id: DocId, new: NewClip) -> Result<Clip> {
        validate(&new)?;
        let mut index = self.index.write();
        let (_old, clip) = self.store.update(id, new)?;
        index.upsert(clip.id, &field_tokens(&clip));
        tracing::debug!(id, "clip updated");
        Ok(clip)
    }

    /// Delete a clip and drop its postings.
    pub fn delete(&self, id: DocId) -> Result<()> {
        let mut index = self.index.write();
        self.store.delete(id)?;
        index.remove(id);
        tracing::debug!(id, "clip deleted");
        Ok(())
    }

    pub fn get(&self, id: DocId) -> Result<Clip> {
        self.store.get(id)?.ok_or(MuseError::NotFound(id))
    }

    /// All clips, newest first.
    pub fn list(&self) -> Result<Vec<Clip>> {
        self.store.list()
    }

    /// Ranked free-text search, materialized to full clips in rank order.
    pub fn search(&self, q: &str, limit: Option<i64>) -> Result<Vec<Clip>> {
        let ranked = {
            let index = self.index.read();
            query::search(&index, q, limit)
        };
        self.materialize(&ranked)
    }

    /// Join ranked ids back to full records, preserving the input order.
    ///
    /// Best-effort snapshot: an id ranked by the query engine but deleted
    /// before the store lookup is dropped silently rather than erroring.
    pub fn materialize(&self, ranked: &[DocId]) -> Result<Vec<Clip>> {
        let mut clips = Vec::with_capacity(ranked.len());
        for &doc_id in ranked {
            if let Some(clip) = self.store.get(doc_id)? {
                clips.push(clip);
            }
        }
        Ok(clips)
    }
}
