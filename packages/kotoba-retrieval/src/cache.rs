use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use unicode_normalization::UnicodeNormalization;

/// Shared embedding cache keyed by normalized text. Entries are a pure
/// function of the text and are immutable once written, so there is no
/// invalidation; when the cache is full, new entries are simply not stored.
pub struct EmbeddingCache {
	enabled: bool,
	max_entries: usize,
	inner: RwLock<AHashMap<String, Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
	pub fn new(cfg: &kotoba_config::Cache) -> Self {
		Self {
			enabled: cfg.enabled,
			max_entries: cfg.max_entries as usize,
			inner: RwLock::new(AHashMap::new()),
		}
	}

	pub fn disabled() -> Self {
		Self { enabled: false, max_entries: 0, inner: RwLock::new(AHashMap::new()) }
	}

	pub fn get(&self, text: &str) -> Option<Arc<Vec<f32>>> {
		if !self.enabled {
			return None;
		}

		let key = cache_key(text);
		let guard = self.inner.read().unwrap_or_else(|err| err.into_inner());

		guard.get(&key).cloned()
	}

	pub fn put(&self, text: &str, vector: Vec<f32>) {
		if !self.enabled {
			return;
		}

		let key = cache_key(text);
		let mut guard = self.inner.write().unwrap_or_else(|err| err.into_inner());

		if guard.len() >= self.max_entries && !guard.contains_key(&key) {
			tracing::debug!(entries = guard.len(), "Embedding cache is full; entry not stored.");

			return;
		}

		guard.entry(key).or_insert_with(|| Arc::new(vector));
	}

	pub fn len(&self) -> usize {
		self.inner.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn cache_key(text: &str) -> String {
	let normalized: String = text.trim().nfkc().flat_map(char::to_lowercase).collect();

	blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_cache(max_entries: u32) -> EmbeddingCache {
		EmbeddingCache::new(&kotoba_config::Cache { enabled: true, max_entries })
	}

	#[test]
	fn stores_and_returns_vectors() {
		let cache = test_cache(8);

		assert!(cache.get("what is wa").is_none());

		cache.put("what is wa", vec![0.1, 0.2]);

		assert_eq!(cache.get("what is wa").as_deref(), Some(&vec![0.1, 0.2]));
	}

	#[test]
	fn key_normalization_joins_equivalent_texts() {
		let cache = test_cache(8);

		cache.put("  What is WA ", vec![1.0]);

		assert!(cache.get("what is wa").is_some());
		assert!(cache.get("ｗｈａｔ ｉｓ ｗａ").is_some());
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn full_cache_refuses_new_entries() {
		let cache = test_cache(1);

		cache.put("first", vec![1.0]);
		cache.put("second", vec![2.0]);

		assert!(cache.get("first").is_some());
		assert!(cache.get("second").is_none());
	}

	#[test]
	fn disabled_cache_stores_nothing() {
		let cache = EmbeddingCache::disabled();

		cache.put("text", vec![1.0]);

		assert!(cache.get("text").is_none());
		assert!(cache.is_empty());
	}
}
