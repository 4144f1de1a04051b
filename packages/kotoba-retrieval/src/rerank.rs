use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use kotoba_domain::script;

use crate::{RerankProvider, candidate::Candidate};

const EXACT_MATCH_WEIGHT: f32 = 0.3;
const EARLY_POSITION_WEIGHT: f32 = 0.2;

#[derive(Clone, Copy, Debug)]
pub struct RerankOptions {
	pub enabled: bool,
	pub top_k: usize,
	pub min_score: f32,
	/// Blend weight of the pairwise model score against the hybrid score.
	pub weight: f32,
	pub batch_size: usize,
}

/// Applies the pairwise relevance model to the candidate pool, falling back
/// to a deterministic lexical scorer whenever the model is unavailable. The
/// model handle is read-locked for the whole scoring pass, so swapping the
/// model waits for in-flight scoring and scoring never observes a half-loaded
/// model.
pub struct RerankingEngine {
	model: RwLock<Arc<dyn RerankProvider>>,
}

impl RerankingEngine {
	pub fn new(model: Arc<dyn RerankProvider>) -> Self {
		Self { model: RwLock::new(model) }
	}

	pub async fn swap_model(&self, model: Arc<dyn RerankProvider>) {
		let mut guard = self.model.write().await;

		*guard = model;
	}

	/// Rerank, sort, filter by `min_score`, and truncate to `top_k`. Never
	/// fails: model errors degrade to hybrid scores per batch, and a model
	/// that is fully unavailable degrades to the lexical fallback.
	pub async fn rerank(
		&self,
		cfg: &kotoba_config::ProviderConfig,
		query: &str,
		mut candidates: Vec<Candidate>,
		opts: &RerankOptions,
	) -> Vec<Candidate> {
		if candidates.is_empty() {
			return candidates;
		}

		if !opts.enabled {
			lexical_fallback(query, &mut candidates);
		} else {
			let scores = self.score_batches(cfg, query, &candidates, opts.batch_size).await;

			if scores.iter().all(Option::is_none) {
				warn!("Pairwise model scored no batches; using the lexical fallback.");

				lexical_fallback(query, &mut candidates);
			} else {
				blend_scores(&mut candidates, &scores, opts.weight);
			}
		}

		candidates.retain(|candidate| candidate.final_score >= opts.min_score);

		crate::candidate::sort_by_final_score(&mut candidates);

		candidates.truncate(opts.top_k);

		candidates
	}

	/// One score per candidate; `None` marks candidates whose batch failed.
	async fn score_batches(
		&self,
		cfg: &kotoba_config::ProviderConfig,
		query: &str,
		candidates: &[Candidate],
		batch_size: usize,
	) -> Vec<Option<f32>> {
		let model = self.model.read().await;
		let batch_size = batch_size.max(1);
		let mut scores = Vec::with_capacity(candidates.len());

		for batch in candidates.chunks(batch_size) {
			let docs: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();

			match model.score_pairs(cfg, query, &docs).await {
				Ok(batch_scores) if batch_scores.len() == batch.len() => {
					scores.extend(batch_scores.into_iter().map(Some));
				},
				Ok(batch_scores) => {
					warn!(
						expected = batch.len(),
						got = batch_scores.len(),
						"Pairwise model returned a mismatched score count; batch falls back to hybrid scores."
					);
					scores.extend(std::iter::repeat_n(None, batch.len()));
				},
				Err(err) => {
					warn!(
						error = %err,
						batch_len = batch.len(),
						"Pairwise model batch failed; batch falls back to hybrid scores."
					);
					scores.extend(std::iter::repeat_n(None, batch.len()));
				},
			}
		}

		scores
	}
}

/// Blend normalized model scores with normalized hybrid scores. Candidates
/// from failed batches keep their normalized hybrid score alone.
fn blend_scores(candidates: &mut [Candidate], scores: &[Option<f32>], weight: f32) {
	let rerank_max =
		scores.iter().flatten().copied().fold(0.0_f32, f32::max);
	let hybrid_max = candidates.iter().map(|c| c.hybrid_score).fold(0.0_f32, f32::max);

	for (candidate, score) in candidates.iter_mut().zip(scores) {
		let hybrid_norm =
			if hybrid_max > 0.0 { candidate.hybrid_score / hybrid_max } else { 0.0 };

		match score {
			Some(score) => {
				let rerank_norm = if rerank_max > 0.0 { score / rerank_max } else { 0.0 };

				candidate.rerank_score = Some(rerank_norm);
				candidate.final_score = rerank_norm * weight + hybrid_norm * (1.0 - weight);
			},
			None => {
				candidate.final_score = hybrid_norm;
			},
		}
	}
}

/// Deterministic scorer used when no pairwise model is reachable: the hybrid
/// score plus a lexical boost from exact term overlap and how early in the
/// document the first match appears. Results are renormalized by the maximum
/// so the scale stays in `[0, 1]`.
fn lexical_fallback(query: &str, candidates: &mut [Candidate]) {
	let query_terms = script::tokenize(query);

	for candidate in candidates.iter_mut() {
		candidate.final_score = candidate.hybrid_score + lexical_boost(&query_terms, &candidate.content);
	}

	let max = candidates.iter().map(|c| c.final_score).fold(0.0_f32, f32::max);

	if max > 0.0 {
		for candidate in candidates.iter_mut() {
			candidate.final_score /= max;
		}
	}
}

fn lexical_boost(query_terms: &[String], content: &str) -> f32 {
	if query_terms.is_empty() {
		return 0.0;
	}

	let content_terms = script::tokenize(content);
	let mut matched = 0_usize;
	let mut first_match_index: Option<usize> = None;

	for term in query_terms {
		if let Some(position) = content_terms.iter().position(|t| t == term) {
			matched += 1;
			first_match_index =
				Some(first_match_index.map_or(position, |existing| existing.min(position)));
		}
	}

	let exact_match_ratio = matched as f32 / query_terms.len() as f32;
	let early_position_bonus =
		first_match_index.map_or(0.0, |index| 1.0 / (index as f32 + 1.0));

	exact_match_ratio * EXACT_MATCH_WEIGHT + early_position_bonus * EARLY_POSITION_WEIGHT
}

#[cfg(test)]
mod tests {
	use kotoba_domain::{Metadata, SourceType};

	use crate::BoxFuture;

	use super::*;

	struct ScriptedModel {
		scores: Vec<f32>,
	}
	impl RerankProvider for ScriptedModel {
		fn score_pairs<'a>(
			&'a self,
			_cfg: &'a kotoba_config::ProviderConfig,
			_query: &'a str,
			docs: &'a [String],
		) -> BoxFuture<'a, crate::Result<Vec<f32>>> {
			let scores = self.scores.iter().copied().take(docs.len()).collect();

			Box::pin(async move { Ok(scores) })
		}
	}

	struct FailingModel;
	impl RerankProvider for FailingModel {
		fn score_pairs<'a>(
			&'a self,
			_cfg: &'a kotoba_config::ProviderConfig,
			_query: &'a str,
			_docs: &'a [String],
		) -> BoxFuture<'a, crate::Result<Vec<f32>>> {
			Box::pin(async move {
				Err(crate::Error::Provider { message: "model is down".to_string() })
			})
		}
	}

	fn provider_cfg() -> kotoba_config::ProviderConfig {
		kotoba_config::ProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://localhost".to_string(),
			api_key: "key".to_string(),
			path: "/rerank".to_string(),
			model: "pairwise".to_string(),
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
		}
	}

	fn candidate(key: &str, content: &str, hybrid: f32) -> Candidate {
		let mut out = Candidate::new(
			key.to_string(),
			content.to_string(),
			Metadata::default(),
			SourceType::Semantic,
		);

		out.hybrid_score = hybrid;

		out
	}

	fn opts(top_k: usize) -> RerankOptions {
		RerankOptions { enabled: true, top_k, min_score: 0.0, weight: 0.7, batch_size: 8 }
	}

	#[tokio::test]
	async fn model_scores_reorder_the_pool() {
		let engine = RerankingEngine::new(Arc::new(ScriptedModel { scores: vec![0.1, 0.9] }));
		let candidates = vec![
			candidate("a", "weak match", 0.9),
			candidate("b", "strong match", 0.5),
		];
		let reranked = engine.rerank(&provider_cfg(), "query", candidates, &opts(10)).await;

		assert_eq!(reranked[0].key, "b");
		assert!(reranked.iter().all(|c| (0.0..=1.0).contains(&c.final_score)));
	}

	#[tokio::test]
	async fn failing_model_degrades_to_lexical_fallback() {
		let engine = RerankingEngine::new(Arc::new(FailingModel));
		let candidates = vec![
			candidate("a", "the particle は marks the topic", 0.5),
			candidate("b", "unrelated text", 0.5),
		];
		let reranked =
			engine.rerank(&provider_cfg(), "particle は", candidates, &opts(10)).await;

		assert_eq!(reranked.len(), 2);
		assert_eq!(reranked[0].key, "a");
		assert!(reranked.iter().all(|c| (0.0..=1.0).contains(&c.final_score)));
	}

	#[tokio::test]
	async fn disabled_model_uses_fallback_and_keeps_total_order() {
		let engine = RerankingEngine::new(Arc::new(FailingModel));
		let candidates = vec![
			candidate("a", "particle explanation", 0.4),
			candidate("b", "particle explanation too", 0.4),
		];
		let mut disabled = opts(10);

		disabled.enabled = false;

		let reranked = engine.rerank(&provider_cfg(), "particle", candidates, &disabled).await;

		assert_eq!(reranked.len(), 2);
	}

	#[tokio::test]
	async fn min_score_filters_and_top_k_truncates() {
		let engine = RerankingEngine::new(Arc::new(ScriptedModel {
			scores: vec![1.0, 0.8, 0.05],
		}));
		let candidates = vec![
			candidate("a", "first", 1.0),
			candidate("b", "second", 0.9),
			candidate("c", "third", 0.1),
		];
		let mut options = opts(1);

		options.min_score = 0.2;

		let reranked = engine.rerank(&provider_cfg(), "query", candidates, &options).await;

		assert_eq!(reranked.len(), 1);
		assert_eq!(reranked[0].key, "a");
	}

	#[tokio::test]
	async fn zero_scores_do_not_divide_by_zero() {
		let engine = RerankingEngine::new(Arc::new(ScriptedModel { scores: vec![0.0, 0.0] }));
		let candidates = vec![candidate("a", "first", 0.0), candidate("b", "second", 0.0)];
		let reranked = engine.rerank(&provider_cfg(), "query", candidates, &opts(10)).await;

		assert_eq!(reranked.len(), 2);
		assert!(reranked.iter().all(|c| c.final_score == 0.0));
	}
}
