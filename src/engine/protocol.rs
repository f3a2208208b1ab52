use serde::{Deserialize, Serialize};

use crate::model::scene::Scene;
use crate::model::session::Turn;

/// Body of a story request. Every field is optional on the wire so that
/// missing values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    #[serde(default)]
    pub current_choice: Option<String>,

    #[serde(default)]
    pub difficulty: Option<String>,

    /// Client-held history; only used to rehydrate a session the server does not know.
    #[serde(default)]
    pub game_history: Option<Vec<Turn>>,

    #[serde(default)]
    pub choice_count: Option<u32>,

    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    /// Canonical `description||option...` text for clients that parse locally.
    pub response: String,
    pub description: String,
    pub options: Vec<String>,
    pub game_over: bool,

    /// Absent for stateless turns, where the client holds the history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub choice_count: u32,
    pub turns_remaining: u32,
}

impl StoryResponse {
    pub fn new(session_id: Option<&str>, scene: Scene, choice_count: u32, max_turns: u32) -> Self {
        let game_over = scene.is_terminal();
        let turns_remaining = if game_over {
            0
        } else {
            max_turns.saturating_sub(choice_count)
        };

        Self {
            response: scene.to_wire(),
            description: scene.description,
            options: scene.options,
            game_over,
            session_id: session_id.map(str::to_string),
            choice_count,
            turns_remaining,
        }
    }
}
