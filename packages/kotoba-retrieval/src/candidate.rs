use serde::Serialize;

use kotoba_domain::{Metadata, SourceType};

const KEY_CONTENT_PREFIX_CHARS: usize = 120;

/// A single retrieval result flowing through the pipeline. Created fresh per
/// request and discarded once the response is produced.
#[derive(Clone, Debug)]
pub struct Candidate {
	/// Stable content-derived dedup key: the document id when the source has
	/// one, otherwise a hash of the content prefix.
	pub key: String,
	pub content: String,
	pub metadata: Metadata,
	pub source_type: SourceType,
	pub semantic_score: Option<f32>,
	/// Raw BM25 score, unbounded. Never compared against semantic scores
	/// without normalization.
	pub keyword_score: Option<f32>,
	pub hybrid_score: f32,
	pub rerank_score: Option<f32>,
	pub final_score: f32,
	/// How many expanded query variants surfaced this candidate.
	pub query_matches: u32,
	pub boosts: Vec<Boost>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Boost {
	pub name: String,
	pub factor: f32,
}

impl Candidate {
	pub fn new(key: String, content: String, metadata: Metadata, source_type: SourceType) -> Self {
		Self {
			key,
			content,
			metadata,
			source_type,
			semantic_score: None,
			keyword_score: None,
			hybrid_score: 0.0,
			rerank_score: None,
			final_score: 0.0,
			query_matches: 1,
			boosts: Vec::new(),
		}
	}
}

pub fn candidate_key(id: Option<&str>, content: &str) -> String {
	if let Some(id) = id.filter(|value| !value.trim().is_empty()) {
		return id.trim().to_string();
	}

	let prefix: String = content.chars().take(KEY_CONTENT_PREFIX_CHARS).collect();
	let digest = blake3::hash(prefix.as_bytes());

	digest.to_hex()[..16].to_string()
}

/// The output total order: `final_score` descending, then `query_matches`
/// descending, then source-type priority, then original discovery order
/// (the sort is stable, so equal keys keep their relative positions).
pub fn sort_by_final_score(candidates: &mut [Candidate]) {
	candidates.sort_by(|a, b| {
		b.final_score
			.partial_cmp(&a.final_score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| b.query_matches.cmp(&a.query_matches))
			.then_with(|| b.source_type.priority().cmp(&a.source_type.priority()))
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(key: &str, source: SourceType, final_score: f32, matches: u32) -> Candidate {
		let mut out =
			Candidate::new(key.to_string(), format!("content {key}"), Metadata::default(), source);

		out.final_score = final_score;
		out.query_matches = matches;

		out
	}

	#[test]
	fn key_prefers_document_id() {
		assert_eq!(candidate_key(Some("doc-1"), "irrelevant"), "doc-1");
		assert_eq!(candidate_key(Some("  "), "same content"), candidate_key(None, "same content"));
	}

	#[test]
	fn key_is_stable_for_identical_prefixes() {
		let long_a = format!("{}{}", "あ".repeat(KEY_CONTENT_PREFIX_CHARS), "tail one");
		let long_b = format!("{}{}", "あ".repeat(KEY_CONTENT_PREFIX_CHARS), "tail two");

		assert_eq!(candidate_key(None, &long_a), candidate_key(None, &long_b));
		assert_ne!(candidate_key(None, "は"), candidate_key(None, "が"));
	}

	#[test]
	fn total_order_breaks_ties_by_matches_then_source() {
		let mut candidates = vec![
			candidate("history", SourceType::History, 0.5, 1),
			candidate("hybrid", SourceType::Hybrid, 0.5, 1),
			candidate("more-matches", SourceType::Keyword, 0.5, 2),
			candidate("top", SourceType::Internet, 0.9, 1),
		];

		sort_by_final_score(&mut candidates);

		let keys: Vec<&str> = candidates.iter().map(|c| c.key.as_str()).collect();

		assert_eq!(keys, vec!["top", "more-matches", "hybrid", "history"]);
	}

	#[test]
	fn equal_candidates_keep_discovery_order() {
		let mut candidates = vec![
			candidate("first", SourceType::Semantic, 0.4, 1),
			candidate("second", SourceType::Semantic, 0.4, 1),
		];

		sort_by_final_score(&mut candidates);

		assert_eq!(candidates[0].key, "first");
		assert_eq!(candidates[1].key, "second");
	}
}
