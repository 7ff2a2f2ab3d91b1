use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a speaker listing is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerOrder {
    /// First occurrence across documents in arrival order.
    #[default]
    FirstSeen,
    /// Lexicographic by the speaker string.
    Alphabetical,
}

impl SpeakerOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeakerOrder::FirstSeen => "first_seen",
            SpeakerOrder::Alphabetical => "alphabetical",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SpeakerOrder::FirstSeen => SpeakerOrder::Alphabetical,
            SpeakerOrder::Alphabetical => SpeakerOrder::FirstSeen,
        }
    }
}

impl fmt::Display for SpeakerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeakerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_seen" | "first-seen" => Ok(SpeakerOrder::FirstSeen),
            "alphabetical" => Ok(SpeakerOrder::Alphabetical),
            other => Err(format!(
                "unknown speaker order '{other}' (expected first_seen or alphabetical)"
            )),
        }
    }
}
