/// Romanization pairs for terms learners type either way. Lookup is exact on
/// a lowercased, trimmed term; both directions are returned so a romaji query
/// can reach kana-indexed content and vice versa.
const ROMAJI_KANA: &[(&str, &str)] = &[
	("wa", "は"),
	("ga", "が"),
	("wo", "を"),
	("ni", "に"),
	("de", "で"),
	("no", "の"),
	("ka", "か"),
	("ne", "ね"),
	("yo", "よ"),
	("keigo", "敬語"),
	("kanji", "漢字"),
	("hiragana", "ひらがな"),
	("katakana", "カタカナ"),
	("kana", "かな"),
	("teineigo", "丁寧語"),
	("sonkeigo", "尊敬語"),
	("kenjougo", "謙譲語"),
	("arigatou", "ありがとう"),
	("konnichiwa", "こんにちは"),
	("sumimasen", "すみません"),
	("onegaishimasu", "お願いします"),
	("desu", "です"),
	("masu", "ます"),
	("kudasai", "ください"),
	("sensei", "先生"),
	("benkyou", "勉強"),
	("bunpou", "文法"),
	("tango", "単語"),
	("kaiwa", "会話"),
];

/// Script variants of a single term: romaji → kana/kanji and the reverse.
/// Unknown terms return an empty list.
pub fn transliterations(term: &str) -> Vec<String> {
	let needle = term.trim().to_lowercase();

	if needle.is_empty() {
		return Vec::new();
	}

	let mut out = Vec::new();

	for (romaji, kana) in ROMAJI_KANA {
		if needle == *romaji {
			out.push((*kana).to_string());
		} else if needle == *kana {
			out.push((*romaji).to_string());
		}
	}

	out
}

/// Transliterations for every whitespace-delimited term of a phrase.
pub fn phrase_transliterations(phrase: &str) -> Vec<String> {
	let mut out = Vec::new();

	for term in phrase.split_whitespace() {
		for variant in transliterations(term) {
			if !out.contains(&variant) {
				out.push(variant);
			}
		}
	}

	out
}
