use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Clone, Debug, Deserialize)]
pub struct WebHit {
	pub title: String,
	pub snippet: String,
	pub url: String,
	#[serde(default)]
	pub domain: Option<String>,
}

pub async fn search(
	cfg: &kotoba_config::ProviderConfig,
	query: &str,
	max_results: u32,
) -> Result<Vec<WebHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "q": query, "max_results": max_results });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json, max_results as usize)
}

fn parse_search_response(json: Value, max_results: usize) -> Result<Vec<WebHit>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Web search response is missing results array.".to_string(),
		})?;
	let mut out = Vec::with_capacity(results.len().min(max_results));

	for item in results.iter().take(max_results) {
		let hit: WebHit = serde_json::from_value(item.clone())?;

		if hit.url.trim().is_empty() {
			continue;
		}

		out.push(hit);
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_results_and_caps_count() {
		let json = serde_json::json!({
			"results": [
				{ "title": "Particles", "snippet": "は marks the topic", "url": "https://a.example/1", "domain": "a.example" },
				{ "title": "Keigo", "snippet": "Honorific speech", "url": "https://b.example/2" },
				{ "title": "Extra", "snippet": "Dropped", "url": "https://c.example/3" }
			]
		});
		let hits = parse_search_response(json, 2).expect("parse failed");

		assert_eq!(hits.len(), 2);
		assert_eq!(hits[0].domain.as_deref(), Some("a.example"));
		assert!(hits[1].domain.is_none());
	}

	#[test]
	fn skips_entries_without_a_url() {
		let json = serde_json::json!({
			"results": [
				{ "title": "No URL", "snippet": "", "url": "  " }
			]
		});
		let hits = parse_search_response(json, 5).expect("parse failed");

		assert!(hits.is_empty());
	}
}
