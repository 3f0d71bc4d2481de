use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::tokenize;
use std::collections::HashMap;

/// Applied when a request omits the limit or supplies a non-positive one.
pub const DEFAULT_LIMIT: usize = 50;

const K1: f32 = 1.2;
const B: f32 = 0.75;

pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_LIMIT,
    }
}

/// Rank documents for a free-text query.
///
/// OR semantics: a document containing any query term is a candidate. Each
/// candidate is scored with BM25 (tf summed across fields, length-normalized
/// against the corpus average), sorted by descending score with descending
/// doc_id as tie-break, and truncated to `limit`. An empty or all-punctuation
/// query yields an empty list, never the whole corpus.
pub fn search(index: &InvertedIndex, query: &str, limit: Option<i64>) -> Vec<DocId> {
    let q_tokens = tokenize(query);
    if q_tokens.is_empty() {
        return Vec::new();
    }

    // dedupe: each distinct term contributes once per document
    let mut terms: Vec<String> = Vec::new();
    for (term, _pos) in q_tokens {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    let n = index.num_docs() as f32;
    let avgdl = index.avg_doc_len().max(1.0);

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for term in &terms {
        let df = index.doc_freq(term) as f32;
        if df == 0.0 {
            continue;
        }
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

        // sum tf across fields before saturation so a doc is not rewarded
        // twice for holding the term in both content and title
        let mut tf_by_doc: HashMap<DocId, u32> = HashMap::new();
        for p in index.postings_for(term) {
            *tf_by_doc.entry(p.doc_id).or_insert(0) += p.tf;
        }

        for (doc_id, tf) in tf_by_doc {
            let dl = index.doc_len(doc_id).unwrap_or(0) as f32;
            let tf = tf as f32;
            let contrib = idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * dl / avgdl));
            *scores.entry(doc_id).or_insert(0.0) += contrib;
        }
    }

    let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.0.cmp(&a.0))
    });
    scored
        .into_iter()
        .take(effective_limit(limit))
        .map(|(doc_id, _)| doc_id)
        .collect()
}
