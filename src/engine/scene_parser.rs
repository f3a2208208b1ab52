use serde_json::Value;

use crate::model::scene::{Scene, SCENE_DELIMITER};

/// Description used when there is nothing usable to parse.
pub const PARSE_FAILURE_DESCRIPTION: &str = "The story could not be parsed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScene {
    pub scene: Scene,

    /// Whether the raw text contained the delimiter at all.
    pub delimited: bool,
}

impl ParsedScene {
    fn failure() -> Self {
        Self {
            scene: Scene::new(PARSE_FAILURE_DESCRIPTION, Vec::new()),
            delimited: false,
        }
    }
}

pub fn parse_scene(raw: &str) -> ParsedScene {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParsedScene::failure();
    }

    let mut segments = raw.split(SCENE_DELIMITER);
    // split always yields at least one segment
    let description = segments.next().unwrap_or_default().trim().to_string();
    let delimited = raw.contains(SCENE_DELIMITER);

    let options = segments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    ParsedScene {
        scene: Scene::new(description, options),
        delimited,
    }
}

/// Parse a JSON value that should hold the model text. Anything other than a
/// string degrades to the failure scene.
pub fn parse_scene_value(value: &Value) -> ParsedScene {
    match value {
        Value::String(text) => parse_scene(text),
        _ => ParsedScene::failure(),
    }
}
