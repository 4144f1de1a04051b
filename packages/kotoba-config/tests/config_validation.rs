use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use kotoba_config::Error;

const SAMPLE_CONFIG_TOML: &str = r#"
[storage.qdrant]
url        = "http://localhost:6334"
collection = "kotoba_chunks"
vector_dim = 768

[providers.embedding]
provider_id = "local"
api_base    = "http://localhost:8090"
api_key     = "test-key"
path        = "/v1/embeddings"
timeout_ms  = 3000

[providers.rerank]
provider_id = "local"
api_base    = "http://localhost:8091"
api_key     = "test-key"
path        = "/v1/rerank"
model       = "pairwise-ja-v1"
timeout_ms  = 3000

[providers.web_search]
provider_id = "search"
api_base    = "http://localhost:8092"
api_key     = "test-key"
path        = "/v1/search"
model       = "default"
timeout_ms  = 5000

[search]
top_k                = 5
candidate_multiplier = 2.0
source_timeout_ms    = 5000

[search.expansion]
max_expansions = 5

[search.fusion]
semantic_weight = 0.7
keyword_weight  = 0.3

[search.rerank]
enabled    = true
weight     = 0.7
batch_size = 8

[search.web]
enabled = true

[search.history]
enabled = true

[cache]
enabled     = true
max_entries = 1024
"#;

fn mutated_toml(section_path: &[&str], key: &str, new_value: Value) -> String {
	let mut value: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = value.as_table_mut().expect("Sample config must be a table.");

	for section in section_path {
		table = table
			.get_mut(*section)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), new_value);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("kotoba_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: &str) -> kotoba_config::Result<kotoba_config::Config> {
	let path = write_temp_config(payload);
	let result = kotoba_config::load(&path);

	let _ = fs::remove_file(&path);

	result
}

#[test]
fn sample_config_loads_with_defaults() {
	let cfg = load(SAMPLE_CONFIG_TOML).expect("Sample config must load.");

	assert_eq!(cfg.providers.embedding.model, "cl-tohoku/bert-base-japanese-v3");
	assert_eq!(cfg.providers.embedding.dimensions, 768);
	assert_eq!(cfg.providers.embedding.batch_size, 32);
	assert_eq!(cfg.search.rerank.batch_size, 8);
	assert!((cfg.search.fusion.internet_weight - 0.5).abs() < 1e-6);
	assert!(!cfg.search.history.anonymize);
}

#[test]
fn rejects_zero_top_k() {
	let payload = mutated_toml(&["search"], "top_k", Value::Integer(0));

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn rejects_vector_dim_mismatch() {
	let payload = mutated_toml(&["storage", "qdrant"], "vector_dim", Value::Integer(1024));

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn rejects_out_of_range_fusion_weight() {
	let payload =
		mutated_toml(&["search", "fusion"], "semantic_weight", Value::Float(1.5));

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn rejects_both_fusion_weights_zero() {
	let payload = mutated_toml(&["search", "fusion"], "semantic_weight", Value::Float(0.0));
	let payload = {
		let mut value: Value = toml::from_str(&payload).expect("Failed to parse sample config.");
		value
			.as_table_mut()
			.and_then(|root| root.get_mut("search"))
			.and_then(Value::as_table_mut)
			.and_then(|search| search.get_mut("fusion"))
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [search.fusion].")
			.insert("keyword_weight".to_string(), Value::Float(0.0));

		toml::to_string(&value).expect("Failed to render sample config.")
	};

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn rejects_empty_api_key() {
	let payload =
		mutated_toml(&["providers", "rerank"], "api_key", Value::String("  ".to_string()));

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn rejects_excessive_candidate_multiplier() {
	let payload = mutated_toml(&["search"], "candidate_multiplier", Value::Float(8.0));

	assert!(matches!(load(&payload), Err(Error::Validation { .. })));
}

#[test]
fn normalizes_api_base_trailing_slash() {
	let payload = mutated_toml(
		&["providers", "embedding"],
		"api_base",
		Value::String("http://localhost:8090/".to_string()),
	);
	let cfg = load(&payload).expect("Config must load.");

	assert_eq!(cfg.providers.embedding.api_base, "http://localhost:8090");
}
