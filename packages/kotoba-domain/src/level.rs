use serde::{Deserialize, Serialize};

/// Proficiency level of a learner request or a corpus chunk.
///
/// The ordering is load-bearing: a request at level L may only be answered
/// with content tagged at L or below.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
	Beginner,
	Elementary,
	Intermediate,
	Advanced,
}

impl Level {
	pub const ALL: [Level; 4] =
		[Level::Beginner, Level::Elementary, Level::Intermediate, Level::Advanced];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Beginner => "beginner",
			Self::Elementary => "elementary",
			Self::Intermediate => "intermediate",
			Self::Advanced => "advanced",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"beginner" => Some(Self::Beginner),
			"elementary" => Some(Self::Elementary),
			"intermediate" => Some(Self::Intermediate),
			"advanced" => Some(Self::Advanced),
			_ => None,
		}
	}

	/// Whether content tagged `content_level` may be surfaced to a request at
	/// `self`. Cumulative downward: equal or lower levels are admitted.
	pub fn admits(self, content_level: Level) -> bool {
		content_level <= self
	}

	/// The levels admitted by a request at `self`, lowest first.
	pub fn admitted(self) -> Vec<Level> {
		Self::ALL.into_iter().filter(|level| self.admits(*level)).collect()
	}
}
