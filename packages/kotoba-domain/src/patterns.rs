use std::sync::LazyLock;

use regex::Regex;

static EXAMPLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\b(for example|e\.g\.|example[s]?\s*[:：]|example sentence)|例えば|例文|例[:：]|【例】")
		.expect("example marker pattern is valid")
});

static GRAMMAR_TERM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)\b(particle|conjugat\w*|verb|adjective|tense|polite form|honorific|counter|grammar|transitive|intransitive|causative|passive|conditional)\b|助詞|動詞|形容詞|活用|敬語|丁寧語|文法|受身|使役|条件形",
	)
	.expect("grammar term pattern is valid")
});

/// Topic keywords that widen a query with curriculum-adjacent phrasings.
const TOPIC_RELATED: &[(&str, &[&str])] = &[
	("food", &["restaurant phrases", "ordering food in Japanese"]),
	("travel", &["asking for directions", "train station vocabulary"]),
	("greeting", &["aisatsu", "self introduction"]),
	("number", &["counters", "counting in Japanese"]),
	("time", &["telling time", "days of the week"]),
	("family", &["family terms", "honorific family words"]),
	("weather", &["weather expressions", "seasonal vocabulary"]),
	("shopping", &["asking prices", "store phrases"]),
];

/// Grammatical-construction keywords and the structural variants they imply.
const GRAMMAR_VARIANTS: &[(&str, &[&str])] = &[
	("particle", &["particle usage", "は vs が"]),
	("conjugation", &["verb conjugation rules", "て form"]),
	("te form", &["て form conjugation"]),
	("masu", &["ます form", "polite verb form"]),
	("keigo", &["honorific speech", "尊敬語 and 謙譲語"]),
	("polite", &["丁寧語", "polite speech patterns"]),
	("past tense", &["た form"]),
	("negative", &["ない form"]),
	("conditional", &["ば form", "たら conditional"]),
	("passive", &["られる passive form"]),
];

pub fn has_example_marker(text: &str) -> bool {
	EXAMPLE_MARKER.is_match(text)
}

pub fn has_grammar_term(text: &str) -> bool {
	GRAMMAR_TERM.is_match(text)
}

/// Curriculum topics related to any keyword appearing in the query.
pub fn related_terms(query: &str) -> Vec<String> {
	let needle = query.to_lowercase();
	let mut out = Vec::new();

	for (keyword, related) in TOPIC_RELATED {
		if needle.contains(keyword) {
			for term in *related {
				push_unique(&mut out, term);
			}
		}
	}

	out
}

/// Structural variants for grammatical constructions named in the query.
pub fn grammar_variants(query: &str) -> Vec<String> {
	let needle = query.to_lowercase();
	let mut out = Vec::new();

	for (keyword, variants) in GRAMMAR_VARIANTS {
		if needle.contains(keyword) {
			for variant in *variants {
				push_unique(&mut out, variant);
			}
		}
	}

	out
}

fn push_unique(out: &mut Vec<String>, value: &str) {
	if !out.iter().any(|existing| existing == value) {
		out.push(value.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_example_markers_in_both_scripts() {
		assert!(has_example_marker("For example: 私は学生です"));
		assert!(has_example_marker("例えば、こう言います"));
		assert!(has_example_marker("例文: これはペンです"));
		assert!(!has_example_marker("この文は普通です"));
	}

	#[test]
	fn detects_grammar_terms_in_both_scripts() {
		assert!(has_grammar_term("The particle は marks the topic"));
		assert!(has_grammar_term("助詞の使い方"));
		assert!(!has_grammar_term("sushi and ramen"));
	}

	#[test]
	fn related_terms_match_topic_keywords() {
		let related = related_terms("how do I order food politely");
		assert!(related.contains(&"restaurant phrases".to_string()));
		assert!(related_terms("quantum chromodynamics").is_empty());
	}

	#[test]
	fn grammar_variants_match_construction_keywords() {
		let variants = grammar_variants("explain the te form");
		assert!(variants.contains(&"て form conjugation".to_string()));
		assert!(grammar_variants("sushi").is_empty());
	}
}
