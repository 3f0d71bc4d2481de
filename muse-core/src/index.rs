use std::collections::HashMap;

pub type DocId = u64;

/// Which clip field a posting came from. Kept per posting so scoring can be
/// field-weighted later without an index rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    Content,
    Title,
    Url,
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
    pub field: IndexField,
}

/// In-memory inverted index over clip text.
///
/// The index is derived state: it is rebuilt from the record store on open
/// and mutated only through the engine, which serializes writers. Postings
/// for a document are always derivable from that document's current text —
/// `upsert` fully replaces any prior postings before inserting new ones.
#[derive(Default)]
pub struct InvertedIndex {
    /// term -> postings (one entry per (doc, field) pair containing the term)
    postings: HashMap<String, Vec<Posting>>,
    /// term -> number of distinct documents containing it
    doc_freqs: HashMap<String, u32>,
    /// doc -> total token count across all fields (BM25 length norm)
    doc_lens: HashMap<DocId, u32>,
    /// running sum of doc_lens values, kept exact for avgdl
    total_len: u64,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed documents.
    pub fn num_docs(&self) -> usize {
        self.doc_lens.len()
    }

    /// Total token count of one document, if indexed.
    pub fn doc_len(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lens.get(&doc_id).copied()
    }

    /// Average document length in tokens, 0.0 for an empty index.
    pub fn avg_doc_len(&self) -> f32 {
        if self.doc_lens.is_empty() {
            return 0.0;
        }
        self.total_len as f32 / self.doc_lens.len() as f32
    }

    /// Number of distinct documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Postings for a term, or an empty slice for an unknown term.
    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace all postings of `doc_id` with postings derived from the given
    /// per-field token lists. Equivalent to `remove(doc_id)` followed by a
    /// fresh insert, so no postings from a prior version can survive an edit.
    pub fn upsert(&mut self, doc_id: DocId, fields: &[(IndexField, Vec<(String, usize)>)]) {
        self.remove(doc_id);

        let mut doc_len: u32 = 0;
        let mut tf_map: HashMap<(IndexField, String), u32> = HashMap::new();
        for (field, tokens) in fields {
            doc_len += tokens.len() as u32;
            for (term, _pos) in tokens {
                *tf_map.entry((*field, term.clone())).or_insert(0) += 1;
            }
        }

        let mut seen_terms: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for ((field, term), tf) in &tf_map {
            self.postings
                .entry(term.clone())
                .or_default()
                .push(Posting { doc_id, tf: *tf, field: *field });
            if seen_terms.insert(term.as_str()) {
                *self.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
        }

        self.doc_lens.insert(doc_id, doc_len);
        self.total_len += doc_len as u64;
    }

    /// Remove every posting of `doc_id`. A no-op for unknown ids, so retries
    /// and delete-after-delete are safe. Terms whose posting list empties are
    /// dropped entirely, keeping doc_freqs exactly in sync with postings.
    pub fn remove(&mut self, doc_id: DocId) {
        let Some(doc_len) = self.doc_lens.remove(&doc_id) else {
            return;
        };
        self.total_len -= doc_len as u64;

        self.postings.retain(|term, plist| {
            let before = plist.len();
            plist.retain(|p| p.doc_id != doc_id);
            if plist.len() < before {
                // df counts distinct docs, so decrement once even if the doc
                // held the term in several fields
                match self.doc_freqs.get_mut(term) {
                    Some(df) if *df > 1 => *df -= 1,
                    _ => {
                        self.doc_freqs.remove(term);
                    }
                }
            }
            !plist.is_empty()
        });
    }
}
