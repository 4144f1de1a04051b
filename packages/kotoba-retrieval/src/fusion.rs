use ahash::AHashMap;

use kotoba_domain::SourceType;
use kotoba_store::CorpusChunk;

use crate::{
	candidate::{self, Candidate},
	keyword::KeywordHit,
	semantic::SemanticHit,
};

/// Fuse one variant's semantic and keyword hits into hybrid-scored
/// candidates. Semantic hits seed the map; keyword hits either merge into an
/// existing key (upgrading the source to `Hybrid`) or seed a keyword-only
/// entry. Raw BM25 scores are normalized by the observed maximum before they
/// meet the `[0, 1]` semantic scale.
pub(crate) fn fuse_hybrid(
	semantic: Vec<SemanticHit>,
	keyword_hits: Vec<KeywordHit>,
	chunks: &[CorpusChunk],
	weights: &kotoba_config::SearchFusion,
) -> Vec<Candidate> {
	let mut ordered: Vec<Candidate> = Vec::new();
	let mut by_key: AHashMap<String, usize> = AHashMap::new();

	for hit in semantic {
		let key = candidate::candidate_key(hit.id.as_deref(), &hit.content);

		if by_key.contains_key(&key) {
			continue;
		}

		let mut entry =
			Candidate::new(key.clone(), hit.content, hit.metadata, SourceType::Semantic);

		entry.semantic_score = Some(hit.score);
		entry.hybrid_score = hit.score * weights.semantic_weight;

		by_key.insert(key, ordered.len());
		ordered.push(entry);
	}

	let keyword_max =
		keyword_hits.iter().map(|hit| hit.score).fold(0.0_f32, f32::max);

	for hit in keyword_hits {
		let Some(chunk) = chunks.get(hit.chunk_index) else {
			continue;
		};
		let normalized = if keyword_max > 0.0 { hit.score / keyword_max } else { 0.0 };
		let key = candidate::candidate_key(Some(&chunk.id), &chunk.content);

		match by_key.get(&key) {
			Some(&index) => {
				let entry = &mut ordered[index];

				entry.keyword_score = Some(hit.score);
				entry.hybrid_score += normalized * weights.keyword_weight;
				entry.source_type = SourceType::Hybrid;
			},
			None => {
				let metadata = chunk_metadata(chunk);
				let mut entry = Candidate::new(
					key.clone(),
					chunk.content.clone(),
					metadata,
					SourceType::Keyword,
				);

				entry.keyword_score = Some(hit.score);
				entry.hybrid_score = normalized * weights.keyword_weight;

				by_key.insert(key, ordered.len());
				ordered.push(entry);
			},
		}
	}

	ordered
}

/// Merge per-variant result sets. A candidate surfaced by several variants
/// keeps the maximum score seen (a strong match on any phrasing must not be
/// diluted) and counts each variant in `query_matches`.
pub(crate) fn merge_variants(variant_sets: Vec<Vec<Candidate>>) -> Vec<Candidate> {
	let mut ordered: Vec<Candidate> = Vec::new();
	let mut by_key: AHashMap<String, usize> = AHashMap::new();

	for set in variant_sets {
		for candidate in set {
			match by_key.get(&candidate.key) {
				Some(&index) => {
					let existing = &mut ordered[index];

					existing.query_matches += 1;
					existing.hybrid_score = existing.hybrid_score.max(candidate.hybrid_score);
					existing.semantic_score =
						max_option(existing.semantic_score, candidate.semantic_score);
					existing.keyword_score =
						max_option(existing.keyword_score, candidate.keyword_score);

					if candidate.source_type.priority() > existing.source_type.priority() {
						existing.source_type = candidate.source_type;
					}
				},
				None => {
					by_key.insert(candidate.key.clone(), ordered.len());
					ordered.push(candidate);
				},
			}
		}
	}

	ordered
}

/// Seed candidates for a source that has no native relevance score (web,
/// history): rank decay weighted by the source's fusion weight.
pub(crate) fn seed_ranked(
	entries: Vec<(String, String, kotoba_domain::Metadata)>,
	source_type: SourceType,
	weight: f32,
) -> Vec<Candidate> {
	entries
		.into_iter()
		.enumerate()
		.map(|(rank, (key, content, metadata))| {
			let mut entry = Candidate::new(key, content, metadata, source_type);

			entry.hybrid_score = weight / (rank as f32 + 1.0);

			entry
		})
		.collect()
}

/// Merge the hybrid pool with the single-shot sources into one deduplicated
/// list, sorted by hybrid score. The list is deliberately wider than the
/// final answer set; reranking reorders within it before truncation.
pub(crate) fn merge_sources(
	hybrid: Vec<Candidate>,
	internet: Vec<Candidate>,
	history: Vec<Candidate>,
) -> Vec<Candidate> {
	let mut ordered: Vec<Candidate> = Vec::new();
	let mut by_key: AHashMap<String, usize> = AHashMap::new();

	for candidate in hybrid.into_iter().chain(internet).chain(history) {
		match by_key.get(&candidate.key) {
			Some(&index) => {
				let existing = &mut ordered[index];

				existing.hybrid_score = existing.hybrid_score.max(candidate.hybrid_score);
				existing.query_matches = existing.query_matches.max(candidate.query_matches);

				if candidate.source_type.priority() > existing.source_type.priority() {
					existing.source_type = candidate.source_type;
				}
			},
			None => {
				by_key.insert(candidate.key.clone(), ordered.len());
				ordered.push(candidate);
			},
		}
	}

	ordered.sort_by(|a, b| {
		b.hybrid_score.partial_cmp(&a.hybrid_score).unwrap_or(std::cmp::Ordering::Equal)
	});

	ordered
}

pub(crate) fn chunk_metadata(chunk: &CorpusChunk) -> kotoba_domain::Metadata {
	kotoba_domain::Metadata {
		title: chunk.title.clone(),
		level: Some(chunk.level),
		category: chunk.category.clone(),
		source_domain: chunk.source_domain.clone(),
		url: None,
		updated_at: None,
	}
}

fn max_option(a: Option<f32>, b: Option<f32>) -> Option<f32> {
	match (a, b) {
		(Some(a), Some(b)) => Some(a.max(b)),
		(value, None) | (None, value) => value,
	}
}
