use crate::Result;

/// Payload field names on indexed chunk points.
pub const CONTENT_PAYLOAD_KEY: &str = "content";
pub const TITLE_PAYLOAD_KEY: &str = "title";
pub const LEVEL_PAYLOAD_KEY: &str = "level";
pub const CATEGORY_PAYLOAD_KEY: &str = "category";
pub const SOURCE_DOMAIN_PAYLOAD_KEY: &str = "source_domain";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &kotoba_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}
}
