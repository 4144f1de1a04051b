use std::{collections::HashMap, sync::Arc};

use qdrant_client::qdrant::{
	Condition, Filter, Query, QueryPointsBuilder, ScoredPoint, Value, point_id::PointIdOptions,
	value::Kind,
};
use tracing::warn;

use kotoba_domain::{Level, Metadata};
use kotoba_store::{
	QdrantStore,
	qdrant::{
		CATEGORY_PAYLOAD_KEY, CONTENT_PAYLOAD_KEY, LEVEL_PAYLOAD_KEY, SOURCE_DOMAIN_PAYLOAD_KEY,
		TITLE_PAYLOAD_KEY,
	},
};

use crate::{
	BoxFuture, EmbeddingProvider, Error, Result, VectorHit, VectorStoreProvider,
	cache::EmbeddingCache,
};

#[derive(Clone, Debug)]
pub struct SemanticHit {
	pub id: Option<String>,
	pub content: String,
	pub metadata: Metadata,
	/// Similarity in `[0, 1]`, converted from the store's distance.
	pub score: f32,
}

/// Nearest-neighbor search shaped for the pipeline: the store's cosine
/// distance becomes a clamped similarity, and any hit tagged above the
/// requested level is dropped even if the store-side filter let it through.
pub(crate) async fn search(
	store: &Arc<dyn VectorStoreProvider>,
	query: &str,
	level: Level,
	limit: u32,
) -> Result<Vec<SemanticHit>> {
	let hits = store.query(query, level, limit).await?;
	let mut out = Vec::with_capacity(hits.len());

	for hit in hits {
		if let Some(hit_level) = hit.metadata.level
			&& !level.admits(hit_level)
		{
			warn!(
				level = hit_level.as_str(),
				requested = level.as_str(),
				"Vector store returned a hit above the requested level; dropped."
			);

			continue;
		}

		out.push(SemanticHit {
			id: hit.id,
			content: hit.content,
			metadata: hit.metadata,
			score: (1.0 - hit.distance).clamp(0.0, 1.0),
		});
	}

	Ok(out)
}

/// Default vector store: embeds the query (through the shared cache) and
/// issues a filtered nearest-neighbor query against Qdrant. The level filter
/// is pushed into the query as a keyword `$in` predicate so top-K recall is
/// preserved.
pub struct QdrantVectorStore {
	store: QdrantStore,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: kotoba_config::EmbeddingProviderConfig,
	cache: Arc<EmbeddingCache>,
}

impl QdrantVectorStore {
	pub fn new(
		store: QdrantStore,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: kotoba_config::EmbeddingProviderConfig,
		cache: Arc<EmbeddingCache>,
	) -> Self {
		Self { store, embedding, embedding_cfg, cache }
	}

	async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		if let Some(cached) = self.cache.get(text) {
			return Ok(cached.as_ref().clone());
		}

		let embeddings = self.embedding.embed(&self.embedding_cfg, &[text.to_string()]).await?;
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.store.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		self.cache.put(text, vector.clone());

		Ok(vector)
	}

	async fn query_inner(&self, text: &str, level: Level, limit: u32) -> Result<Vec<VectorHit>> {
		let vector = self.embed_query(text).await?;
		let admitted: Vec<String> =
			level.admitted().into_iter().map(|value| value.as_str().to_string()).collect();
		let filter = Filter {
			must: vec![Condition::matches(LEVEL_PAYLOAD_KEY, admitted)],
			should: Vec::new(),
			must_not: Vec::new(),
			min_should: None,
		};
		let search = QueryPointsBuilder::new(self.store.collection.clone())
			.query(Query::new_nearest(vector))
			.filter(filter)
			.limit(limit as u64)
			.with_payload(true);
		let response = self
			.store
			.client
			.query(search)
			.await
			.map_err(|err| Error::VectorStore { message: err.to_string() })?;

		Ok(response.result.iter().filter_map(point_to_hit).collect())
	}
}

impl VectorStoreProvider for QdrantVectorStore {
	fn query<'a>(
		&'a self,
		text: &'a str,
		level: Level,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
		Box::pin(self.query_inner(text, level, limit))
	}
}

fn point_to_hit(point: &ScoredPoint) -> Option<VectorHit> {
	let Some(content) = payload_str(&point.payload, CONTENT_PAYLOAD_KEY) else {
		warn!("Vector store point is missing content payload; dropped.");

		return None;
	};
	let id = point.id.as_ref().and_then(|point_id| match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(id)) => Some(id.to_string()),
		None => None,
	});
	let metadata = Metadata {
		title: payload_str(&point.payload, TITLE_PAYLOAD_KEY),
		level: payload_str(&point.payload, LEVEL_PAYLOAD_KEY)
			.as_deref()
			.and_then(Level::parse),
		category: payload_str(&point.payload, CATEGORY_PAYLOAD_KEY),
		source_domain: payload_str(&point.payload, SOURCE_DOMAIN_PAYLOAD_KEY),
		url: None,
		updated_at: None,
	};

	// Qdrant reports cosine similarity; the provider contract is distance.
	Some(VectorHit { id, content, metadata, distance: 1.0 - point.score })
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct StaticStore {
		hits: Vec<VectorHit>,
	}
	impl VectorStoreProvider for StaticStore {
		fn query<'a>(
			&'a self,
			_text: &'a str,
			_level: Level,
			_limit: u32,
		) -> BoxFuture<'a, Result<Vec<VectorHit>>> {
			let hits = self.hits.clone();

			Box::pin(async move { Ok(hits) })
		}
	}

	fn hit(content: &str, level: Level, distance: f32) -> VectorHit {
		VectorHit {
			id: None,
			content: content.to_string(),
			metadata: Metadata::with_level(level),
			distance,
		}
	}

	#[tokio::test]
	async fn distance_converts_to_clamped_similarity() {
		let store: Arc<dyn VectorStoreProvider> = Arc::new(StaticStore {
			hits: vec![
				hit("exact", Level::Beginner, 0.0),
				hit("close", Level::Beginner, 0.25),
				hit("far", Level::Beginner, 1.5),
			],
		});
		let hits = search(&store, "q", Level::Beginner, 10).await.expect("search failed");

		assert_eq!(hits[0].score, 1.0);
		assert!((hits[1].score - 0.75).abs() < 1e-6);
		assert_eq!(hits[2].score, 0.0);
	}

	#[tokio::test]
	async fn hits_above_the_requested_level_are_dropped() {
		let store: Arc<dyn VectorStoreProvider> = Arc::new(StaticStore {
			hits: vec![
				hit("beginner", Level::Beginner, 0.1),
				hit("advanced", Level::Advanced, 0.05),
			],
		});
		let hits = search(&store, "q", Level::Beginner, 10).await.expect("search failed");

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].content, "beginner");
	}
}
