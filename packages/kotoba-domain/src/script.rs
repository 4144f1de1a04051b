use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

pub fn is_hiragana(ch: char) -> bool {
	matches!(ch as u32, 0x3040..=0x309F)
}

pub fn is_katakana(ch: char) -> bool {
	matches!(ch as u32, 0x30A0..=0x30FF | 0x31F0..=0x31FF)
}

pub fn is_kanji(ch: char) -> bool {
	matches!(ch as u32, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF)
}

/// Any character of the Japanese writing system, punctuation excluded.
pub fn is_japanese(ch: char) -> bool {
	if is_hiragana(ch) || is_katakana(ch) || is_kanji(ch) {
		return true;
	}

	matches!(ch.script(), Script::Hiragana | Script::Katakana | Script::Han)
}

pub fn contains_japanese(input: &str) -> bool {
	input.chars().any(is_japanese)
}

/// Fraction of Japanese-script characters among non-whitespace characters.
/// Returns 0.0 for whitespace-only or empty input.
pub fn japanese_density(input: &str) -> f32 {
	let mut japanese = 0_usize;
	let mut non_space = 0_usize;

	for ch in input.chars() {
		if ch.is_whitespace() {
			continue;
		}

		non_space += 1;

		if is_japanese(ch) {
			japanese += 1;
		}
	}

	if non_space == 0 {
		return 0.0;
	}

	japanese as f32 / non_space as f32
}

/// Tokenize mixed-script text for keyword scoring.
///
/// Japanese has no word delimiters, so every Japanese character becomes its
/// own token; Latin-script runs are segmented on word boundaries and
/// lowercased. Input is NFKC-normalized first so fullwidth Latin and
/// halfwidth katakana collapse onto their canonical forms.
pub fn tokenize(input: &str) -> Vec<String> {
	let normalized: String = input.nfkc().collect();
	let mut tokens = Vec::new();

	for word in normalized.unicode_words() {
		if word.chars().any(is_japanese) {
			let mut latin_run = String::new();

			for ch in word.chars() {
				if is_japanese(ch) {
					if !latin_run.is_empty() {
						tokens.push(std::mem::take(&mut latin_run));
					}

					tokens.push(ch.to_string());
				} else {
					latin_run.extend(ch.to_lowercase());
				}
			}
			if !latin_run.is_empty() {
				tokens.push(latin_run);
			}
		} else {
			tokens.push(word.to_lowercase());
		}
	}

	tokens
}
