use std::time::Duration;

use serde::Serialize;
use tokio::{task::JoinSet, time::timeout};
use tracing::warn;

use kotoba_domain::{Level, Metadata, SourceType};

use crate::{
	RetrievalService,
	candidate::{self, Candidate},
	expansion::QueryExpansion,
	fusion, keyword,
	semantic::{self, SemanticHit},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
	Contributed,
	Empty,
	Failed,
	TimedOut,
	Disabled,
}

/// Which sources answered this request. Surfaced in the response so callers
/// can report degraded completeness instead of silently returning less.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SourceReport {
	pub semantic: SourceStatus,
	pub keyword: SourceStatus,
	pub internet: SourceStatus,
	pub history: SourceStatus,
}

impl SourceReport {
	pub fn degraded(&self) -> bool {
		[self.semantic, self.keyword, self.internet, self.history]
			.iter()
			.any(|status| matches!(status, SourceStatus::Failed | SourceStatus::TimedOut))
	}

	pub fn any_contributed(&self) -> bool {
		[self.semantic, self.keyword, self.internet, self.history]
			.iter()
			.any(|status| *status == SourceStatus::Contributed)
	}
}

pub(crate) struct Retrieved {
	pub hybrid: Vec<Candidate>,
	pub internet: Vec<Candidate>,
	pub history: Vec<Candidate>,
	pub report: SourceReport,
}

pub(crate) struct ResolvedOptions {
	pub max_results: usize,
	/// Candidate pool width handed to the reranker; wider than `max_results`
	/// so reranking can reorder before truncation.
	pub pool_limit: usize,
	pub include_web: bool,
	pub include_history: bool,
}

enum VariantOutcome {
	Hits(Vec<SemanticHit>),
	Failed,
	TimedOut,
}

impl RetrievalService {
	/// Fan out to every retrieval source and join on all outcomes. No
	/// fail-fast: a source that fails or times out contributes an empty list
	/// and is recorded in the report, and its siblings are not cancelled.
	pub(crate) async fn retrieve(
		&self,
		expansion: &QueryExpansion,
		level: Level,
		opts: &ResolvedOptions,
	) -> Retrieved {
		let source_timeout = Duration::from_millis(self.cfg.search.source_timeout_ms);
		let (hybrid_result, internet_result, history_result) = tokio::join!(
			self.hybrid_search(expansion, level, opts, source_timeout),
			self.internet_search(&expansion.original, opts, source_timeout),
			self.history_search(&expansion.original, level, opts, source_timeout),
		);
		let (hybrid, semantic_status, keyword_status) = hybrid_result;
		let (internet, internet_status) = internet_result;
		let (history, history_status) = history_result;

		Retrieved {
			hybrid,
			internet,
			history,
			report: SourceReport {
				semantic: semantic_status,
				keyword: keyword_status,
				internet: internet_status,
				history: history_status,
			},
		}
	}

	/// Hybrid (semantic + keyword) search, once per query variant, variants
	/// in flight concurrently, merged with the multi-variant fusion rules.
	async fn hybrid_search(
		&self,
		expansion: &QueryExpansion,
		level: Level,
		opts: &ResolvedOptions,
		source_timeout: Duration,
	) -> (Vec<Candidate>, SourceStatus, SourceStatus) {
		let chunks = self.corpus.snapshot();
		let admitted: Vec<kotoba_store::CorpusChunk> =
			chunks.iter().filter(|chunk| level.admits(chunk.level)).cloned().collect();
		let fetch = opts.pool_limit as u32;
		let variant_count = expansion.combined.len();
		let mut semantic_outcomes: Vec<VariantOutcome> =
			std::iter::repeat_with(|| VariantOutcome::Failed).take(variant_count).collect();
		let mut set = JoinSet::new();

		for (index, variant) in expansion.combined.iter().enumerate() {
			let store = self.providers.vector.clone();
			let variant = variant.clone();

			set.spawn(async move {
				let outcome = match timeout(
					source_timeout,
					semantic::search(&store, &variant, level, fetch),
				)
				.await
				{
					Ok(Ok(hits)) => VariantOutcome::Hits(hits),
					Ok(Err(err)) => {
						warn!(
							error = %err,
							variant = %variant,
							"Semantic search failed for a variant."
						);

						VariantOutcome::Failed
					},
					Err(_) => {
						warn!(variant = %variant, "Semantic search timed out for a variant.");

						VariantOutcome::TimedOut
					},
				};

				(index, outcome)
			});
		}

		while let Some(joined) = set.join_next().await {
			match joined {
				Ok((index, outcome)) => semantic_outcomes[index] = outcome,
				Err(err) => {
					warn!(error = %err, "Semantic search task aborted.");
				},
			}
		}

		let mut variant_sets = Vec::with_capacity(variant_count);
		let mut any_keyword_hits = false;

		for (index, variant) in expansion.combined.iter().enumerate() {
			let semantic_hits = match &semantic_outcomes[index] {
				VariantOutcome::Hits(hits) => hits.clone(),
				VariantOutcome::Failed | VariantOutcome::TimedOut => Vec::new(),
			};
			let keyword_hits = keyword::score(variant, &admitted);

			any_keyword_hits |= !keyword_hits.is_empty();

			variant_sets.push(fusion::fuse_hybrid(
				semantic_hits,
				keyword_hits,
				&admitted,
				&self.cfg.search.fusion,
			));
		}

		let merged = fusion::merge_variants(variant_sets);
		let semantic_status = aggregate_semantic_status(&semantic_outcomes);
		let keyword_status = if any_keyword_hits {
			SourceStatus::Contributed
		} else {
			SourceStatus::Empty
		};

		(merged, semantic_status, keyword_status)
	}

	async fn internet_search(
		&self,
		query: &str,
		opts: &ResolvedOptions,
		source_timeout: Duration,
	) -> (Vec<Candidate>, SourceStatus) {
		if !opts.include_web {
			return (Vec::new(), SourceStatus::Disabled);
		}

		let cfg = &self.cfg.providers.web_search;
		let max_results = self.cfg.search.web.max_results;

		match timeout(source_timeout, self.providers.web.search(cfg, query, max_results)).await {
			Ok(Ok(hits)) if hits.is_empty() => (Vec::new(), SourceStatus::Empty),
			Ok(Ok(hits)) => {
				let entries = hits
					.into_iter()
					.map(|hit| {
						let key = candidate::candidate_key(Some(&hit.url), &hit.snippet);
						let metadata = Metadata {
							title: Some(hit.title),
							level: None,
							category: None,
							source_domain: hit.domain,
							url: Some(hit.url),
							updated_at: None,
						};

						(key, hit.snippet, metadata)
					})
					.collect();
				let seeded = fusion::seed_ranked(
					entries,
					SourceType::Internet,
					self.cfg.search.fusion.internet_weight,
				);

				(seeded, SourceStatus::Contributed)
			},
			Ok(Err(err)) => {
				warn!(error = %err, "Web search failed.");

				(Vec::new(), SourceStatus::Failed)
			},
			Err(_) => {
				warn!("Web search timed out.");

				(Vec::new(), SourceStatus::TimedOut)
			},
		}
	}

	async fn history_search(
		&self,
		query: &str,
		level: Level,
		opts: &ResolvedOptions,
		source_timeout: Duration,
	) -> (Vec<Candidate>, SourceStatus) {
		let cfg = &self.cfg.search.history;

		// Anonymized history reads as unavailable, same as disabled.
		if !opts.include_history || cfg.anonymize {
			return (Vec::new(), SourceStatus::Disabled);
		}

		let search = self.providers.history.search(query, level, cfg.max_results);

		match timeout(source_timeout, search).await {
			Ok(Ok(hits)) if hits.is_empty() => (Vec::new(), SourceStatus::Empty),
			Ok(Ok(hits)) => {
				let entries = hits
					.into_iter()
					.map(|hit| {
						let key = candidate::candidate_key(None, &hit.content);

						(key, hit.content, hit.metadata)
					})
					.collect();
				let seeded = fusion::seed_ranked(
					entries,
					SourceType::History,
					self.cfg.search.fusion.history_weight,
				);

				(seeded, SourceStatus::Contributed)
			},
			Ok(Err(err)) => {
				warn!(error = %err, "History search failed.");

				(Vec::new(), SourceStatus::Failed)
			},
			Err(_) => {
				warn!("History search timed out.");

				(Vec::new(), SourceStatus::TimedOut)
			},
		}
	}
}

fn aggregate_semantic_status(outcomes: &[VariantOutcome]) -> SourceStatus {
	let mut any_failed = false;
	let mut any_timed_out = false;

	for outcome in outcomes {
		match outcome {
			VariantOutcome::Hits(hits) if !hits.is_empty() => return SourceStatus::Contributed,
			VariantOutcome::Hits(_) => {},
			VariantOutcome::Failed => any_failed = true,
			VariantOutcome::TimedOut => any_timed_out = true,
		}
	}

	if any_timed_out {
		SourceStatus::TimedOut
	} else if any_failed {
		SourceStatus::Failed
	} else {
		SourceStatus::Empty
	}
}
