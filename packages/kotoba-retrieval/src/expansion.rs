use kotoba_domain::{Level, patterns, translit};

/// Synonym table entries carry the level at which the synonym becomes
/// appropriate; an entry above the requested level is never surfaced.
const SYNONYMS: &[(&str, &[(&str, Level)])] = &[
	("wa", &[("topic particle", Level::Beginner), ("は particle", Level::Beginner)]),
	("ga", &[("subject particle", Level::Beginner), ("が particle", Level::Beginner)]),
	("wo", &[("object particle", Level::Beginner)]),
	("particle", &[("joshi", Level::Beginner), ("助詞", Level::Elementary)]),
	("polite", &[("formal speech", Level::Beginner), ("teineigo", Level::Elementary)]),
	(
		"honorific",
		&[
			("keigo", Level::Intermediate),
			("敬語", Level::Intermediate),
			("humble speech", Level::Advanced),
		],
	),
	("keigo", &[("honorific speech", Level::Intermediate), ("尊敬語", Level::Advanced)]),
	("verb", &[("doushi", Level::Elementary), ("動詞", Level::Elementary)]),
	("adjective", &[("keiyoushi", Level::Elementary)]),
	("counter", &[("josuushi", Level::Intermediate), ("counting word", Level::Beginner)]),
	("kanji", &[("chinese characters", Level::Beginner)]),
	("greeting", &[("aisatsu", Level::Beginner)]),
	("conditional", &[("ba form", Level::Intermediate), ("tara form", Level::Intermediate)]),
	("passive", &[("ukemi", Level::Advanced)]),
];

#[derive(Clone, Debug, Default)]
pub struct QueryExpansion {
	pub original: String,
	pub synonyms: Vec<String>,
	pub related: Vec<String>,
	pub grammar_variants: Vec<String>,
	pub transliterations: Vec<String>,
	/// All variants to search, the unmodified original always first,
	/// capped at `max_expansions + 1`.
	pub combined: Vec<String>,
}

/// Expand a query into search variants. Never fails: when no table matches,
/// the expansion degrades to the original query alone and the rest of the
/// pipeline runs single-variant.
pub fn expand(query: &str, level: Level, max_expansions: usize) -> QueryExpansion {
	let needle = query.to_lowercase();
	let mut synonyms = Vec::new();

	for (term, entries) in SYNONYMS {
		if !needle.contains(term) {
			continue;
		}

		for (synonym, synonym_level) in *entries {
			if level.admits(*synonym_level) {
				push_unique(&mut synonyms, synonym);
			}
		}
	}

	let related = patterns::related_terms(query);
	let grammar_variants = patterns::grammar_variants(query);
	let transliterations = translit::phrase_transliterations(query);
	let mut combined = Vec::with_capacity(max_expansions + 1);

	push_unique(&mut combined, query);

	for variant in
		synonyms.iter().chain(&related).chain(&grammar_variants).chain(&transliterations)
	{
		if combined.len() > max_expansions {
			break;
		}

		push_unique(&mut combined, variant);
	}

	QueryExpansion {
		original: query.to_string(),
		synonyms,
		related,
		grammar_variants,
		transliterations,
		combined,
	}
}

fn push_unique(out: &mut Vec<String>, value: &str) {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return;
	}

	let key = trimmed.to_lowercase();

	if !out.iter().any(|existing| existing.to_lowercase() == key) {
		out.push(trimmed.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn original_is_always_first() {
		let expansion = expand("what is wa", Level::Beginner, 5);

		assert_eq!(expansion.combined[0], "what is wa");
		assert!(expansion.combined.len() > 1);
	}

	#[test]
	fn synonyms_above_the_requested_level_are_never_surfaced() {
		let beginner = expand("honorific forms", Level::Beginner, 10);

		assert!(beginner.synonyms.is_empty());

		let advanced = expand("honorific forms", Level::Advanced, 10);

		assert!(advanced.synonyms.contains(&"keigo".to_string()));
		assert!(advanced.synonyms.contains(&"humble speech".to_string()));
	}

	#[test]
	fn combined_is_capped_at_max_expansions_plus_original() {
		let expansion = expand("polite honorific particle conjugation", Level::Advanced, 2);

		assert!(expansion.combined.len() <= 3);
		assert_eq!(expansion.combined[0], "polite honorific particle conjugation");
	}

	#[test]
	fn unknown_query_degrades_to_single_variant() {
		let expansion = expand("zzz unmatched query", Level::Advanced, 5);

		assert_eq!(expansion.combined, vec!["zzz unmatched query".to_string()]);
	}

	#[test]
	fn transliterations_bridge_romaji_and_kana() {
		let expansion = expand("what is wa", Level::Beginner, 5);

		assert!(expansion.transliterations.contains(&"は".to_string()));

		let reverse = expand("は の使い方", Level::Beginner, 5);

		assert!(reverse.transliterations.contains(&"wa".to_string()));
	}

	#[test]
	fn variants_are_deduplicated_case_insensitively() {
		let expansion = expand("Particle particle", Level::Elementary, 10);
		let mut seen = std::collections::HashSet::new();

		for variant in &expansion.combined {
			assert!(seen.insert(variant.to_lowercase()));
		}
	}
}
