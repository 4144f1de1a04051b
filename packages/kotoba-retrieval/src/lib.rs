pub mod cache;
pub mod candidate;
pub mod coordinator;
pub mod expansion;
pub mod keyword;
pub mod rerank;
pub mod search;
pub mod semantic;

mod error;
mod fusion;
mod signals;

use std::{future::Future, pin::Pin, sync::Arc};

pub use candidate::{Boost, Candidate};
pub use coordinator::{SourceReport, SourceStatus};
pub use error::{Error, Result};
pub use kotoba_providers::web_search::WebHit;
pub use search::{SearchExplain, SearchItem, SearchRequest, SearchResponse};

use kotoba_config::{Config, EmbeddingProviderConfig, ProviderConfig};
use kotoba_domain::{Level, Metadata};
use kotoba_store::{CorpusStore, QdrantStore};

use crate::{cache::EmbeddingCache, rerank::RerankingEngine, semantic::QdrantVectorStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A raw nearest-neighbor hit as the vector store reports it: a distance,
/// not yet a similarity.
#[derive(Clone, Debug)]
pub struct VectorHit {
	pub id: Option<String>,
	pub content: String,
	pub metadata: Metadata,
	pub distance: f32,
}

#[derive(Clone, Debug)]
pub struct HistoryHit {
	pub content: String,
	pub metadata: Metadata,
	pub topics: Vec<String>,
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn score_pairs<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait WebSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		max_results: u32,
	) -> BoxFuture<'a, Result<Vec<WebHit>>>;
}

pub trait HistorySearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a str,
		level: Level,
		max_results: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryHit>>>;
}

pub trait VectorStoreProvider
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		text: &'a str,
		level: Level,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub vector: Arc<dyn VectorStoreProvider>,
	pub web: Arc<dyn WebSearchProvider>,
	pub history: Arc<dyn HistorySearchProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(kotoba_providers::embedding::embed(cfg, texts).await?) })
	}
}

impl RerankProvider for DefaultProviders {
	fn score_pairs<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(kotoba_providers::rerank::score_pairs(cfg, query, docs).await?) })
	}
}

impl WebSearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		max_results: u32,
	) -> BoxFuture<'a, Result<Vec<WebHit>>> {
		Box::pin(async move {
			Ok(kotoba_providers::web_search::search(cfg, query, max_results).await?)
		})
	}
}

/// Stand-in history source for deployments without conversation storage
/// wired in; the coordinator reports the source as empty, never failed.
struct NoHistory;

impl HistorySearchProvider for NoHistory {
	fn search<'a>(
		&'a self,
		_query: &'a str,
		_level: Level,
		_max_results: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryHit>>> {
		Box::pin(async move { Ok(Vec::new()) })
	}
}

/// The retrieval pipeline entry point. Owns the corpus snapshot store, the
/// provider bundle, and the reranking engine; each `search` call runs the
/// full expand → retrieve → fuse → rerank → adjust pipeline.
pub struct RetrievalService {
	pub cfg: Config,
	corpus: CorpusStore,
	providers: Providers,
	reranker: RerankingEngine,
}

impl RetrievalService {
	pub fn new(cfg: Config, qdrant: QdrantStore, corpus: CorpusStore) -> Self {
		let http = Arc::new(DefaultProviders);
		let cache = Arc::new(EmbeddingCache::new(&cfg.cache));
		let vector = Arc::new(QdrantVectorStore::new(
			qdrant,
			http.clone(),
			cfg.providers.embedding.clone(),
			cache,
		));
		let providers = Providers {
			embedding: http.clone(),
			vector,
			web: http.clone(),
			history: Arc::new(NoHistory),
		};

		Self { cfg, corpus, providers, reranker: RerankingEngine::new(http) }
	}

	pub fn with_providers(
		cfg: Config,
		corpus: CorpusStore,
		providers: Providers,
		rerank_model: Arc<dyn RerankProvider>,
	) -> Self {
		Self { cfg, corpus, providers, reranker: RerankingEngine::new(rerank_model) }
	}

	pub fn corpus(&self) -> &CorpusStore {
		&self.corpus
	}

	/// Replace the pairwise relevance model. Waits for in-flight scoring so a
	/// request never mixes scores from two models.
	pub async fn swap_rerank_model(&self, model: Arc<dyn RerankProvider>) {
		self.reranker.swap_model(model).await;
	}

	pub(crate) fn reranker(&self) -> &RerankingEngine {
		&self.reranker
	}
}
