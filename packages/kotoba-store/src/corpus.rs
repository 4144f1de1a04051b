use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use kotoba_domain::Level;

/// One indexed unit of curriculum content. Chunks are immutable once
/// indexed; changing content means re-indexing, never an in-place edit.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CorpusChunk {
	pub id: String,
	pub content: String,
	#[serde(default)]
	pub title: Option<String>,
	pub level: Level,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub source_domain: Option<String>,
}

/// Read-mostly chunk corpus for keyword scoring. A rebuild constructs the
/// full replacement off to the side and publishes it with one pointer swap,
/// so concurrent readers always observe a complete snapshot.
pub struct CorpusStore {
	inner: RwLock<Arc<Vec<CorpusChunk>>>,
}

impl CorpusStore {
	pub fn new(chunks: Vec<CorpusChunk>) -> Self {
		Self { inner: RwLock::new(Arc::new(chunks)) }
	}

	pub fn empty() -> Self {
		Self::new(Vec::new())
	}

	pub fn snapshot(&self) -> Arc<Vec<CorpusChunk>> {
		self.inner.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn replace(&self, chunks: Vec<CorpusChunk>) {
		let built = Arc::new(chunks);
		let mut guard = self.inner.write().unwrap_or_else(|err| err.into_inner());

		*guard = built;
	}

	pub fn len(&self) -> usize {
		self.snapshot().len()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshot().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chunk(id: &str, level: Level) -> CorpusChunk {
		CorpusChunk {
			id: id.to_string(),
			content: format!("content of {id}"),
			title: None,
			level,
			category: None,
			tags: Vec::new(),
			source_domain: None,
		}
	}

	#[test]
	fn snapshot_is_stable_across_replace() {
		let store = CorpusStore::new(vec![chunk("a", Level::Beginner)]);
		let before = store.snapshot();

		store.replace(vec![chunk("b", Level::Advanced), chunk("c", Level::Beginner)]);

		assert_eq!(before.len(), 1);
		assert_eq!(before[0].id, "a");
		assert_eq!(store.len(), 2);
	}

	#[test]
	fn chunk_deserializes_with_optional_fields_missing() {
		let chunk: CorpusChunk = serde_json::from_str(
			r#"{"id": "a", "content": "Particle は marks the topic", "level": "beginner"}"#,
		)
		.expect("deserialize failed");

		assert_eq!(chunk.id, "a");
		assert!(chunk.tags.is_empty());
	}
}
