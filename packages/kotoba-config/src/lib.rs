mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, EmbeddingProviderConfig, ProviderConfig, Providers, Qdrant, Search,
	SearchExpansion, SearchFusion, SearchHistory, SearchRerank, SearchWeb, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.batch_size == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.candidate_multiplier.is_finite()
		|| !(1.0..=4.0).contains(&cfg.search.candidate_multiplier)
	{
		return Err(Error::Validation {
			message: "search.candidate_multiplier must be in the range 1.0-4.0.".to_string(),
		});
	}
	if cfg.search.source_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.source_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.expansion.max_expansions == 0 {
		return Err(Error::Validation {
			message: "search.expansion.max_expansions must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("search.fusion.semantic_weight", cfg.search.fusion.semantic_weight),
		("search.fusion.keyword_weight", cfg.search.fusion.keyword_weight),
		("search.fusion.internet_weight", cfg.search.fusion.internet_weight),
		("search.fusion.history_weight", cfg.search.fusion.history_weight),
		("search.rerank.weight", cfg.search.rerank.weight),
		("search.rerank.min_score", cfg.search.rerank.min_score),
	] {
		if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.search.fusion.semantic_weight + cfg.search.fusion.keyword_weight <= 0.0 {
		return Err(Error::Validation {
			message: "search.fusion semantic and keyword weights must not both be zero."
				.to_string(),
		});
	}
	if cfg.search.rerank.batch_size == 0 {
		return Err(Error::Validation {
			message: "search.rerank.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.web.enabled && cfg.search.web.max_results == 0 {
		return Err(Error::Validation {
			message: "search.web.max_results must be greater than zero when enabled.".to_string(),
		});
	}
	if cfg.search.history.enabled && cfg.search.history.max_results == 0 {
		return Err(Error::Validation {
			message: "search.history.max_results must be greater than zero when enabled."
				.to_string(),
		});
	}
	if cfg.cache.enabled && cfg.cache.max_entries == 0 {
		return Err(Error::Validation {
			message: "cache.max_entries must be greater than zero when enabled.".to_string(),
		});
	}

	for (label, provider_timeout, api_key) in [
		("embedding", cfg.providers.embedding.timeout_ms, &cfg.providers.embedding.api_key),
		("rerank", cfg.providers.rerank.timeout_ms, &cfg.providers.rerank.api_key),
		("web_search", cfg.providers.web_search.timeout_ms, &cfg.providers.web_search.api_key),
	] {
		if provider_timeout == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
		if api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for api_base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.rerank.api_base,
		&mut cfg.providers.web_search.api_base,
	] {
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
