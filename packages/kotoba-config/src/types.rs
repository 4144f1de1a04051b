use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	pub cache: Cache,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: ProviderConfig,
	pub web_search: ProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_embedding_model")]
	pub model: String,
	#[serde(default = "default_embedding_dimensions")]
	pub dimensions: u32,
	#[serde(default = "default_embedding_batch_size")]
	pub batch_size: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	/// Over-fetch factor applied before reranking so the reranker can reorder
	/// within a larger candidate pool.
	#[serde(default = "default_candidate_multiplier")]
	pub candidate_multiplier: f32,
	#[serde(default = "default_source_timeout_ms")]
	pub source_timeout_ms: u64,
	pub expansion: SearchExpansion,
	pub fusion: SearchFusion,
	pub rerank: SearchRerank,
	pub web: SearchWeb,
	pub history: SearchHistory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchExpansion {
	#[serde(default = "default_max_expansions")]
	pub max_expansions: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchFusion {
	#[serde(default = "default_semantic_weight")]
	pub semantic_weight: f32,
	#[serde(default = "default_keyword_weight")]
	pub keyword_weight: f32,
	#[serde(default = "default_internet_weight")]
	pub internet_weight: f32,
	#[serde(default = "default_history_weight")]
	pub history_weight: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchRerank {
	pub enabled: bool,
	#[serde(default = "default_rerank_weight")]
	pub weight: f32,
	#[serde(default = "default_rerank_batch_size")]
	pub batch_size: u32,
	#[serde(default)]
	pub min_score: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchWeb {
	pub enabled: bool,
	#[serde(default = "default_source_results")]
	pub max_results: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchHistory {
	pub enabled: bool,
	/// When set, user history must be treated as unavailable even if enabled.
	#[serde(default)]
	pub anonymize: bool,
	#[serde(default = "default_source_results")]
	pub max_results: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cache {
	pub enabled: bool,
	#[serde(default = "default_cache_max_entries")]
	pub max_entries: u32,
}

fn default_embedding_model() -> String {
	"cl-tohoku/bert-base-japanese-v3".to_string()
}

fn default_embedding_dimensions() -> u32 {
	768
}

fn default_embedding_batch_size() -> u32 {
	32
}

fn default_top_k() -> u32 {
	5
}

fn default_candidate_multiplier() -> f32 {
	2.0
}

fn default_source_timeout_ms() -> u64 {
	5_000
}

fn default_max_expansions() -> u32 {
	5
}

fn default_semantic_weight() -> f32 {
	0.7
}

fn default_keyword_weight() -> f32 {
	0.3
}

fn default_internet_weight() -> f32 {
	0.5
}

fn default_history_weight() -> f32 {
	0.4
}

fn default_rerank_weight() -> f32 {
	0.7
}

fn default_rerank_batch_size() -> u32 {
	8
}

fn default_source_results() -> u32 {
	5
}

fn default_cache_max_entries() -> u32 {
	4_096
}
