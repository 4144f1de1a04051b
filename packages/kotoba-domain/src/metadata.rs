use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Where a candidate was first retrieved from. Priority feeds the ranking
/// tie-break: `Hybrid > Semantic > Keyword > Internet > History`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
	Semantic,
	Keyword,
	Internet,
	History,
	Hybrid,
}

impl SourceType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "semantic",
			Self::Keyword => "keyword",
			Self::Internet => "internet",
			Self::History => "history",
			Self::Hybrid => "hybrid",
		}
	}

	pub fn priority(self) -> u8 {
		match self {
			Self::Hybrid => 4,
			Self::Semantic => 3,
			Self::Keyword => 2,
			Self::Internet => 1,
			Self::History => 0,
		}
	}
}

/// Validated candidate metadata. Fields are named and optional; validation
/// happens once at ingestion, never by probing downstream.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Metadata {
	pub title: Option<String>,
	pub level: Option<Level>,
	pub category: Option<String>,
	pub source_domain: Option<String>,
	pub url: Option<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub updated_at: Option<time::OffsetDateTime>,
}

impl Metadata {
	pub fn with_level(level: Level) -> Self {
		Self { level: Some(level), ..Self::default() }
	}
}
