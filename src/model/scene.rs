use serde::{Deserialize, Serialize};

/// Separator between the description and each option in model output.
pub const SCENE_DELIMITER: &str = "||";

/// One rendered unit of narrative: a description plus the selectable options.
/// No options means the game has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub description: String,
    pub options: Vec<String>,
}

impl Scene {
    pub fn new(description: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            description: description.into(),
            options,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }

    /// Canonical `description||opt1||opt2` text. Terminal scenes keep a
    /// trailing delimiter so the ending stays explicit.
    pub fn to_wire(&self) -> String {
        let mut out = self.description.clone();
        if self.options.is_empty() {
            out.push_str(SCENE_DELIMITER);
            return out;
        }
        for option in &self.options {
            out.push_str(SCENE_DELIMITER);
            out.push_str(option);
        }
        out
    }
}
