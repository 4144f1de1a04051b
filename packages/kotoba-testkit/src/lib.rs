//! Deterministic fakes for exercising the retrieval pipeline without any
//! network service: scripted vector stores, rerank models, web search, and
//! history sources, plus a ready-made test config and sample corpus.

use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use kotoba_config::{
	Cache, Config, EmbeddingProviderConfig, ProviderConfig, Qdrant, Search, SearchExpansion,
	SearchFusion, SearchHistory, SearchRerank, SearchWeb, Storage,
};
use kotoba_domain::{Level, Metadata};
use kotoba_retrieval::{
	BoxFuture, EmbeddingProvider, HistoryHit, HistorySearchProvider, Providers, RerankProvider,
	Result, VectorHit, VectorStoreProvider, WebHit, WebSearchProvider,
};
use kotoba_store::{CorpusChunk, CorpusStore};

/// Vector store fake keyed by query text. Applies the same level predicate a
/// real store would, so over-level hits never leave the store.
pub struct StaticVectorStore {
	hits_by_query: HashMap<String, Vec<VectorHit>>,
	calls: AtomicUsize,
}

impl StaticVectorStore {
	pub fn new(hits_by_query: HashMap<String, Vec<VectorHit>>) -> Self {
		Self { hits_by_query, calls: AtomicUsize::new(0) }
	}

	pub fn empty() -> Self {
		Self::new(HashMap::new())
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl VectorStoreProvider for StaticVectorStore {
	fn query<'a>(
		&'a self,
		text: &'a str,
		level: Level,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let hits: Vec<VectorHit> = self
			.hits_by_query
			.get(text)
			.map(|hits| {
				hits.iter()
					.filter(|hit| hit.metadata.level.map(|l| level.admits(l)).unwrap_or(true))
					.take(limit as usize)
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		Box::pin(async move { Ok(hits) })
	}
}

/// A vector store that never answers within any sane deadline.
pub struct HangingVectorStore;

impl VectorStoreProvider for HangingVectorStore {
	fn query<'a>(
		&'a self,
		_text: &'a str,
		_level: Level,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(async move {
			tokio::time::sleep(Duration::from_secs(3_600)).await;

			Ok(Vec::new())
		})
	}
}

pub struct FailingVectorStore;

impl VectorStoreProvider for FailingVectorStore {
	fn query<'a>(
		&'a self,
		_text: &'a str,
		_level: Level,
		_limit: u32,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(async move {
			Err(kotoba_retrieval::Error::VectorStore {
				message: "vector store unreachable".to_string(),
			})
		})
	}
}

/// Embedding fake: a constant vector per text, dimension taken from the
/// provider config.
pub struct DummyEmbedding;

impl EmbeddingProvider for DummyEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let dim = (cfg.dimensions as usize).max(1);
		let vec = vec![0.0; dim];

		Box::pin(async move { Ok(vec![vec; texts.len()]) })
	}
}

/// Rerank fake scored by content: unknown documents score 0.
pub struct ScriptedRerank {
	scores_by_content: HashMap<String, f32>,
	calls: AtomicUsize,
}

impl ScriptedRerank {
	pub fn new(scores_by_content: HashMap<String, f32>) -> Self {
		Self { scores_by_content, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl RerankProvider for ScriptedRerank {
	fn score_pairs<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let scores: Vec<f32> = docs
			.iter()
			.map(|doc| self.scores_by_content.get(doc).copied().unwrap_or(0.0))
			.collect();

		Box::pin(async move { Ok(scores) })
	}
}

pub struct FailingRerank {
	calls: AtomicUsize,
}

impl FailingRerank {
	pub fn new() -> Self {
		Self { calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Default for FailingRerank {
	fn default() -> Self {
		Self::new()
	}
}

impl RerankProvider for FailingRerank {
	fn score_pairs<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		_docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Err(kotoba_retrieval::Error::Provider {
				message: "pairwise model unavailable".to_string(),
			})
		})
	}
}

pub struct StaticWebSearch {
	hits: Vec<WebHit>,
}

impl StaticWebSearch {
	pub fn new(hits: Vec<WebHit>) -> Self {
		Self { hits }
	}

	pub fn empty() -> Self {
		Self::new(Vec::new())
	}
}

impl WebSearchProvider for StaticWebSearch {
	fn search<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		max_results: u32,
	) -> BoxFuture<'a, Result<Vec<WebHit>>> {
		let hits: Vec<WebHit> = self.hits.iter().take(max_results as usize).cloned().collect();

		Box::pin(async move { Ok(hits) })
	}
}

pub struct FailingWebSearch;

impl WebSearchProvider for FailingWebSearch {
	fn search<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		_max_results: u32,
	) -> BoxFuture<'a, Result<Vec<WebHit>>> {
		Box::pin(async move {
			Err(kotoba_retrieval::Error::Provider { message: "web search down".to_string() })
		})
	}
}

pub struct StaticHistory {
	hits: Vec<HistoryHit>,
}

impl StaticHistory {
	pub fn new(hits: Vec<HistoryHit>) -> Self {
		Self { hits }
	}

	pub fn empty() -> Self {
		Self::new(Vec::new())
	}
}

impl HistorySearchProvider for StaticHistory {
	fn search<'a>(
		&'a self,
		_query: &'a str,
		_level: Level,
		max_results: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryHit>>> {
		let hits: Vec<HistoryHit> =
			self.hits.iter().take(max_results as usize).cloned().collect();

		Box::pin(async move { Ok(hits) })
	}
}

/// Provider bundle with every source empty; tests override the pieces they
/// exercise.
pub fn empty_providers() -> Providers {
	Providers {
		embedding: Arc::new(DummyEmbedding),
		vector: Arc::new(StaticVectorStore::empty()),
		web: Arc::new(StaticWebSearch::empty()),
		history: Arc::new(StaticHistory::empty()),
	}
}

pub fn vector_hit(id: &str, content: &str, level: Level, distance: f32) -> VectorHit {
	VectorHit {
		id: Some(id.to_string()),
		content: content.to_string(),
		metadata: Metadata::with_level(level),
		distance,
	}
}

pub fn web_hit(title: &str, snippet: &str, url: &str) -> WebHit {
	WebHit {
		title: title.to_string(),
		snippet: snippet.to_string(),
		url: url.to_string(),
		domain: None,
	}
}

pub fn history_hit(content: &str, topics: &[&str]) -> HistoryHit {
	HistoryHit {
		content: content.to_string(),
		metadata: Metadata::default(),
		topics: topics.iter().map(|t| t.to_string()).collect(),
	}
}

pub fn chunk(id: &str, content: &str, level: Level) -> CorpusChunk {
	CorpusChunk {
		id: id.to_string(),
		content: content.to_string(),
		title: None,
		level,
		category: None,
		tags: Vec::new(),
		source_domain: None,
	}
}

/// The canonical two-chunk sample corpus: a beginner particle explainer and
/// an advanced honorifics chunk.
pub fn sample_corpus() -> CorpusStore {
	CorpusStore::new(vec![
		chunk(
			"A",
			"Particle は marks the topic of a sentence. For example: 私は学生です。",
			Level::Beginner,
		),
		chunk("B", "Keigo honorific forms: 尊敬語 and 謙譲語 usage in formal settings.", Level::Advanced),
	])
}

pub fn test_config() -> Config {
	Config {
		storage: Storage {
			qdrant: Qdrant {
				url: "http://localhost:6334".to_string(),
				collection: "kotoba_chunks_test".to_string(),
				vector_dim: 8,
			},
		},
		providers: kotoba_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost:8090".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "cl-tohoku/bert-base-japanese-v3".to_string(),
				dimensions: 8,
				batch_size: 32,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			rerank: provider_config("/v1/rerank"),
			web_search: provider_config("/v1/search"),
		},
		search: Search {
			top_k: 5,
			candidate_multiplier: 2.0,
			source_timeout_ms: 250,
			expansion: SearchExpansion { max_expansions: 5 },
			fusion: SearchFusion {
				semantic_weight: 0.7,
				keyword_weight: 0.3,
				internet_weight: 0.5,
				history_weight: 0.4,
			},
			rerank: SearchRerank { enabled: true, weight: 0.7, batch_size: 8, min_score: 0.0 },
			web: SearchWeb { enabled: true, max_results: 5 },
			history: SearchHistory { enabled: true, anonymize: false, max_results: 5 },
		},
		cache: Cache { enabled: true, max_entries: 256 },
	}
}

fn provider_config(path: &str) -> ProviderConfig {
	ProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://localhost:8091".to_string(),
		api_key: "test-key".to_string(),
		path: path.to_string(),
		model: "test-model".to_string(),
		timeout_ms: 1_000,
		default_headers: serde_json::Map::new(),
	}
}
