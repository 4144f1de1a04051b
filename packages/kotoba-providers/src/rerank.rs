use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Score `(query, doc)` pairs with the hosted pairwise relevance model.
/// Scores come back aligned to `docs`, each in `[0, 1]`.
pub async fn score_pairs(
	cfg: &kotoba_config::ProviderConfig,
	query: &str,
	docs: &[String],
) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "model": cfg.model, "query": query, "documents": docs });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_rerank_response(json, docs.len())
}

fn parse_rerank_response(json: Value, doc_count: usize) -> Result<Vec<f32>> {
	let mut scores = vec![0.0_f32; doc_count];
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		})?;

	for item in results {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result is missing index.".to_string() }
		})? as usize;

		if index >= scores.len() {
			continue;
		}

		scores[index] = item_score(item)?;
	}

	Ok(scores)
}

/// Models either emit a scalar `relevance_score`, or a binary label with a
/// confidence. The "not relevant" label's confidence maps to `1 - confidence`.
fn item_score(item: &Value) -> Result<f32> {
	if let Some(score) =
		item.get("relevance_score").or_else(|| item.get("score")).and_then(|v| v.as_f64())
	{
		return Ok(score as f32);
	}

	let label = item.get("label").and_then(|v| v.as_str());
	let confidence = item.get("confidence").and_then(|v| v.as_f64());

	if let (Some(label), Some(confidence)) = (label, confidence) {
		let score = match label {
			"relevant" | "LABEL_1" => confidence,
			_ => 1.0 - confidence,
		};

		return Ok(score as f32);
	}

	Err(Error::InvalidResponse { message: "Rerank result is missing score.".to_string() })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aligns_scores_by_index() {
		let json = serde_json::json!({
			"results": [
				{ "index": 1, "relevance_score": 0.2 },
				{ "index": 0, "relevance_score": 0.9 }
			]
		});
		let scores = parse_rerank_response(json, 2).expect("parse failed");

		assert_eq!(scores, vec![0.9, 0.2]);
	}

	#[test]
	fn maps_binary_labels_onto_scalar_scores() {
		let json = serde_json::json!({
			"results": [
				{ "index": 0, "label": "relevant", "confidence": 0.8 },
				{ "index": 1, "label": "not_relevant", "confidence": 0.9 }
			]
		});
		let scores = parse_rerank_response(json, 2).expect("parse failed");

		assert!((scores[0] - 0.8).abs() < 1e-6);
		assert!((scores[1] - 0.1).abs() < 1e-6);
	}

	#[test]
	fn out_of_range_indices_are_ignored() {
		let json = serde_json::json!({
			"results": [
				{ "index": 5, "relevance_score": 0.7 },
				{ "index": 0, "relevance_score": 0.4 }
			]
		});
		let scores = parse_rerank_response(json, 2).expect("parse failed");

		assert_eq!(scores, vec![0.4, 0.0]);
	}
}
