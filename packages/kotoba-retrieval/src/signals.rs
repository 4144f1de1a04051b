use kotoba_domain::{Level, patterns, script};

use crate::candidate::{Boost, Candidate, sort_by_final_score};

const LEVEL_MATCH_BOOST: f32 = 1.15;
const LENGTH_BOOST: f32 = 1.1;
const LENGTH_SWEET_SPOT: std::ops::Range<usize> = 200..1_000;
const SCRIPT_DENSITY_THRESHOLD: f32 = 0.2;
const SCRIPT_DENSITY_WEIGHT: f32 = 0.2;
const EXAMPLE_BOOST: f32 = 1.15;
const GRAMMAR_TERM_BOOST: f32 = 1.1;

/// Final heuristic pass: domain signals compose multiplicatively on top of
/// the blended score, then the list is re-sorted by the output total order
/// and truncated. Scores are not re-clamped here; only the publicly reported
/// score is clamped at presentation time.
pub(crate) fn adjust(candidates: &mut Vec<Candidate>, level: Level, max_results: usize) {
	for candidate in candidates.iter_mut() {
		let mut boosts = Vec::new();

		if candidate.metadata.level == Some(level) {
			boosts.push(Boost { name: "level_match".to_string(), factor: LEVEL_MATCH_BOOST });
		}

		let length = candidate.content.chars().count();

		if LENGTH_SWEET_SPOT.contains(&length) {
			boosts.push(Boost { name: "length_sweet_spot".to_string(), factor: LENGTH_BOOST });
		}

		let density = script::japanese_density(&candidate.content);

		if density > SCRIPT_DENSITY_THRESHOLD {
			boosts.push(Boost {
				name: "script_density".to_string(),
				factor: 1.0 + density * SCRIPT_DENSITY_WEIGHT,
			});
		}
		if patterns::has_example_marker(&candidate.content) {
			boosts.push(Boost { name: "example".to_string(), factor: EXAMPLE_BOOST });
		}
		if patterns::has_grammar_term(&candidate.content) {
			boosts.push(Boost { name: "grammar_term".to_string(), factor: GRAMMAR_TERM_BOOST });
		}

		for boost in &boosts {
			candidate.final_score *= boost.factor;
		}

		candidate.boosts = boosts;
	}

	sort_by_final_score(candidates);

	candidates.truncate(max_results);
}

#[cfg(test)]
mod tests {
	use kotoba_domain::{Metadata, SourceType};

	use super::*;

	fn candidate(key: &str, content: &str, level: Option<Level>, score: f32) -> Candidate {
		let metadata = match level {
			Some(level) => Metadata::with_level(level),
			None => Metadata::default(),
		};
		let mut out = Candidate::new(
			key.to_string(),
			content.to_string(),
			metadata,
			SourceType::Semantic,
		);

		out.hybrid_score = score;
		out.final_score = score;

		out
	}

	#[test]
	fn exact_level_match_outranks_lower_level_content() {
		let mut candidates = vec![
			candidate("lower", "plain text", Some(Level::Beginner), 0.5),
			candidate("exact", "plain text", Some(Level::Intermediate), 0.5),
		];

		adjust(&mut candidates, Level::Intermediate, 10);

		assert_eq!(candidates[0].key, "exact");
		assert!(candidates[0].boosts.iter().any(|b| b.name == "level_match"));
		assert!(candidates[1].boosts.is_empty());
	}

	#[test]
	fn sweet_spot_length_is_boosted() {
		let mut candidates = vec![
			candidate("short", "tiny", None, 0.5),
			candidate("right", &"a".repeat(400), None, 0.5),
			candidate("long", &"a".repeat(2_000), None, 0.5),
		];

		adjust(&mut candidates, Level::Beginner, 10);

		assert_eq!(candidates[0].key, "right");
		assert!((candidates[0].final_score - 0.55).abs() < 1e-6);
	}

	#[test]
	fn japanese_density_scales_with_density() {
		let mut candidates = vec![
			candidate("dense", "助詞は文の主題を示す", None, 0.5),
			candidate("latin", "plain english text", None, 0.5),
		];

		adjust(&mut candidates, Level::Beginner, 10);

		let dense = &candidates[0];

		assert_eq!(dense.key, "dense");

		let density_boost =
			dense.boosts.iter().find(|b| b.name == "script_density").expect("boost missing");

		assert!((density_boost.factor - 1.2).abs() < 1e-3);
	}

	#[test]
	fn example_and_grammar_markers_compose_multiplicatively() {
		let mut candidates = vec![candidate(
			"both",
			"例えば、助詞のはを使います",
			None,
			0.5,
		)];

		adjust(&mut candidates, Level::Beginner, 10);

		let expected_base = 0.5 * EXAMPLE_BOOST * GRAMMAR_TERM_BOOST;

		// The fully Japanese content also earns the density boost.
		assert!(candidates[0].final_score > expected_base);
		assert!(candidates[0].boosts.len() >= 3);
	}

	#[test]
	fn truncates_to_max_results() {
		let mut candidates = (0..10)
			.map(|i| candidate(&format!("c{i}"), "text", None, 1.0 - i as f32 * 0.05))
			.collect::<Vec<_>>();

		adjust(&mut candidates, Level::Beginner, 3);

		assert_eq!(candidates.len(), 3);
		assert_eq!(candidates[0].key, "c0");
	}
}
