use ahash::{AHashMap, AHashSet};

use kotoba_domain::script;
use kotoba_store::CorpusChunk;

const K1: f32 = 1.5;
const B: f32 = 0.75;

#[derive(Clone, Copy, Debug)]
pub struct KeywordHit {
	pub chunk_index: usize,
	/// Raw BM25 score, unbounded and ≥ 0. Normalized at fusion time.
	pub score: f32,
}

/// BM25 over the supplied chunk slice. Document statistics (IDF, average
/// document length) are computed over exactly this slice, so callers decide
/// whether scoring runs against the full corpus or a level-filtered subset.
pub fn score(query: &str, chunks: &[CorpusChunk]) -> Vec<KeywordHit> {
	if chunks.is_empty() {
		return Vec::new();
	}

	let query_terms: AHashSet<String> = script::tokenize(query).into_iter().collect();

	if query_terms.is_empty() {
		return Vec::new();
	}

	let doc_terms: Vec<Vec<String>> =
		chunks.iter().map(|chunk| script::tokenize(&chunk.content)).collect();
	let total_len: usize = doc_terms.iter().map(Vec::len).sum();
	let avg_doc_len = (total_len as f32 / chunks.len() as f32).max(1.0);
	let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();

	for terms in &doc_terms {
		let mut seen: AHashSet<&str> = AHashSet::new();

		for term in terms {
			if query_terms.contains(term.as_str()) && seen.insert(term.as_str()) {
				*document_frequency.entry(term.as_str()).or_insert(0) += 1;
			}
		}
	}

	let doc_count = chunks.len() as f32;
	let mut hits = Vec::new();

	for (chunk_index, terms) in doc_terms.iter().enumerate() {
		let doc_len = terms.len() as f32;
		let mut term_frequency: AHashMap<&str, f32> = AHashMap::new();

		for term in terms {
			if query_terms.contains(term.as_str()) {
				*term_frequency.entry(term.as_str()).or_insert(0.0) += 1.0;
			}
		}

		if term_frequency.is_empty() {
			continue;
		}

		let mut doc_score = 0.0_f32;

		for (term, tf) in &term_frequency {
			let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
			let idf = ((doc_count - df + 0.5) / (df + 0.5) + 1.0).ln();
			let saturation =
				(tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * (doc_len / avg_doc_len)));

			doc_score += idf * saturation;
		}

		if doc_score > 0.0 {
			hits.push(KeywordHit { chunk_index, score: doc_score });
		}
	}

	hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

	hits
}
