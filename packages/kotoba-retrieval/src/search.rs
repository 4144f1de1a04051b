use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kotoba_domain::{Level, SourceType};

use crate::{
	Error, RetrievalService, Result,
	candidate::{Boost, Candidate},
	coordinator::{ResolvedOptions, SourceReport},
	expansion, fusion,
	rerank::RerankOptions,
	signals,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchRequest {
	pub query: String,
	pub level: Level,
	pub max_results: Option<u32>,
	pub include_web: Option<bool>,
	pub include_history: Option<bool>,
}

/// Per-result score breakdown, reported alongside every item so callers can
/// see how a result earned its place.
#[derive(Clone, Debug, Serialize)]
pub struct SearchExplain {
	pub semantic_score: Option<f32>,
	pub keyword_score: Option<f32>,
	pub hybrid_score: f32,
	pub rerank_score: Option<f32>,
	pub final_score: f32,
	pub query_matches: u32,
	pub boosts: Vec<Boost>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchItem {
	pub key: String,
	pub content: String,
	pub title: Option<String>,
	pub level: Option<Level>,
	pub category: Option<String>,
	pub source_domain: Option<String>,
	pub url: Option<String>,
	pub source_type: SourceType,
	/// Clamped to `[0, 1]` and rounded for presentation.
	pub final_score: f32,
	pub explain: SearchExplain,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub trace_id: Uuid,
	pub items: Vec<SearchItem>,
	pub expanded_queries: Vec<String>,
	pub sources: SourceReport,
}

impl RetrievalService {
	/// Run the full retrieval pipeline for one request: expand the query,
	/// fan out to every source, fuse, rerank, apply domain signals, and
	/// truncate to the requested result count.
	///
	/// An empty result set with a degraded source report is a successful
	/// response; the only errors are request preconditions.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.query.trim().to_string();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let max_results = req.max_results.unwrap_or(self.cfg.search.top_k);

		if max_results == 0 {
			return Err(Error::InvalidRequest {
				message: "max_results must be greater than zero.".to_string(),
			});
		}

		let trace_id = Uuid::new_v4();
		let pool_limit =
			(max_results as f32 * self.cfg.search.candidate_multiplier).ceil() as usize;
		let opts = ResolvedOptions {
			max_results: max_results as usize,
			pool_limit,
			include_web: self.cfg.search.web.enabled && req.include_web.unwrap_or(true),
			include_history: self.cfg.search.history.enabled
				&& req.include_history.unwrap_or(true),
		};
		let expansion = expansion::expand(
			&query,
			req.level,
			self.cfg.search.expansion.max_expansions as usize,
		);
		let retrieved = self.retrieve(&expansion, req.level, &opts).await;
		let report = retrieved.report;
		let mut pool =
			fusion::merge_sources(retrieved.hybrid, retrieved.internet, retrieved.history);

		pool.truncate(opts.pool_limit);

		if pool.is_empty() {
			info!(
				trace_id = %trace_id,
				query = %query,
				degraded = report.degraded(),
				"Search found no candidates in any source."
			);

			return Ok(SearchResponse {
				trace_id,
				items: Vec::new(),
				expanded_queries: expansion.combined,
				sources: report,
			});
		}

		let rerank_opts = RerankOptions {
			enabled: self.cfg.search.rerank.enabled,
			top_k: opts.pool_limit,
			min_score: self.cfg.search.rerank.min_score,
			weight: self.cfg.search.rerank.weight,
			batch_size: self.cfg.search.rerank.batch_size as usize,
		};
		let mut ranked = self
			.reranker()
			.rerank(&self.cfg.providers.rerank, &query, pool, &rerank_opts)
			.await;

		signals::adjust(&mut ranked, req.level, opts.max_results);

		let items: Vec<SearchItem> = ranked.into_iter().map(to_item).collect();

		info!(
			trace_id = %trace_id,
			query = %query,
			level = req.level.as_str(),
			variants = expansion.combined.len(),
			results = items.len(),
			degraded = report.degraded(),
			"Search completed."
		);

		Ok(SearchResponse {
			trace_id,
			items,
			expanded_queries: expansion.combined,
			sources: report,
		})
	}
}

fn to_item(candidate: Candidate) -> SearchItem {
	let reported = present_score(candidate.final_score);
	let Candidate {
		key,
		content,
		metadata,
		source_type,
		semantic_score,
		keyword_score,
		hybrid_score,
		rerank_score,
		query_matches,
		boosts,
		..
	} = candidate;

	SearchItem {
		key,
		content,
		title: metadata.title,
		level: metadata.level,
		category: metadata.category,
		source_domain: metadata.source_domain,
		url: metadata.url,
		source_type,
		final_score: reported,
		explain: SearchExplain {
			semantic_score,
			keyword_score,
			hybrid_score,
			rerank_score,
			final_score: reported,
			query_matches,
			boosts,
		},
	}
}

fn present_score(score: f32) -> f32 {
	(score.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}
