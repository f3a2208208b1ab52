use serde::{Deserialize, Serialize};

use crate::model::difficulty::Difficulty;

/// One completed exchange: what the player chose and the scene it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub choice: String,
    #[serde(default)]
    pub response: String,
}

impl Turn {
    pub fn new(choice: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            choice: choice.into(),
            response: response.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no hidden goal assigned yet.
    Uninitialized,
    Active,
    /// A terminal scene has been served; no further turns are accepted.
    Finished,
}

/// Server-side record of one player's game.
#[derive(Debug, Clone)]
pub struct Session {
    hidden_goal: Option<String>,
    pub history: Vec<Turn>,
    choice_count: u32,
    finished: bool,
    /// Used when a request does not name a difficulty.
    pub difficulty: Difficulty,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            hidden_goal: None,
            history: Vec::new(),
            choice_count: 0,
            finished: false,
            difficulty: Difficulty::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.finished {
            SessionState::Finished
        } else if self.hidden_goal.is_some() {
            SessionState::Active
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn hidden_goal(&self) -> Option<&str> {
        self.hidden_goal.as_deref()
    }

    /// Sets the goal if none is held yet. Returns false when a goal already exists.
    pub fn assign_goal(&mut self, goal: String) -> bool {
        if self.hidden_goal.is_some() {
            return false;
        }
        self.hidden_goal = Some(goal);
        true
    }

    pub fn choice_count(&self) -> u32 {
        self.choice_count
    }

    /// Raises the counter to `count`; lower values are ignored.
    pub fn advance_choice_count(&mut self, count: u32) {
        self.choice_count = self.choice_count.max(count);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn record_turn(&mut self, choice: &str, description: &str) {
        self.history.push(Turn::new(choice, description));
    }

    /// Seeds an unknown session from client-held history, e.g. after a restart.
    pub fn rehydrate(&mut self, history: Vec<Turn>, choice_count: u32) {
        if !self.history.is_empty() {
            return;
        }
        let seeded = history.len() as u32;
        self.history = history;
        self.advance_choice_count(seeded.max(choice_count));
    }
}
