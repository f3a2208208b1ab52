use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }

    /// Pacing line embedded in every scene prompt.
    pub fn pacing(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Keep the plot simple and the dangers mild.",
            Difficulty::Hard => {
                "Make the plot complex and dangerous, with real threats and tricky decisions."
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("easy") {
            Ok(Difficulty::Easy)
        } else if trimmed.eq_ignore_ascii_case("hard") {
            Ok(Difficulty::Hard)
        } else {
            Err(format!("unknown difficulty '{}', expected easy or hard", trimmed))
        }
    }
}
