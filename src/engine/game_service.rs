use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::settings::ServerSettings;
use crate::engine::errors::GameError;
use crate::engine::llm_client::{GenerationConfig, TextGenerator};
use crate::engine::prompt_builder::{PromptBuilder, StoryPrompt};
use crate::engine::protocol::{StoryRequest, StoryResponse};
use crate::engine::scene_parser::parse_scene;
use crate::engine::scene_rules::review_scene;
use crate::engine::session_store::{new_session_id, SessionStore};
use crate::model::difficulty::Difficulty;
use crate::model::scene::Scene;
use crate::model::session::{Session, Turn};

pub const MAX_CHOICE_LEN: usize = 500;
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Mechanical game limits and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub max_turns: u32,
    pub history_window: usize,
    pub scene: GenerationConfig,
    pub goal: GenerationConfig,
    pub generate_goals: bool,
    pub fallback_mission: String,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for GameRules {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            max_turns: settings.max_turns,
            history_window: settings.history_window,
            scene: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.scene_max_tokens,
            },
            goal: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.goal_max_tokens,
            },
            generate_goals: settings.generate_goals,
            fallback_mission: settings.fallback_mission.clone(),
        }
    }
}

/// A request that passed validation.
#[derive(Debug)]
struct PlayerTurn {
    choice: String,
    /// None means keep the session's last difficulty.
    difficulty: Option<Difficulty>,
    session_id: Option<String>,
    history: Vec<Turn>,
    client_count: u32,
}

/// Runs one story turn per request: session lookup, prompt, generation,
/// parsing and the session update.
pub struct GameService {
    store: SessionStore,
    generator: Arc<dyn TextGenerator>,
    rules: GameRules,
}

impl GameService {
    pub fn new(generator: Arc<dyn TextGenerator>, rules: GameRules) -> Self {
        Self {
            store: SessionStore::new(),
            generator,
            rules,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }

    pub async fn play(&self, request: StoryRequest) -> Result<StoryResponse, GameError> {
        let turn = validate(request, self.rules.max_turns)?;

        match turn.session_id.clone() {
            Some(id) => self.play_session(id, turn).await,
            None if turn.history.is_empty() => self.play_session(new_session_id(), turn).await,
            None => self.play_stateless(turn).await,
        }
    }

    /// Turn for a stored session; creates it on first sight of the id.
    async fn play_session(
        &self,
        session_id: String,
        mut turn: PlayerTurn,
    ) -> Result<StoryResponse, GameError> {
        let (handle, created) = self.store.get_or_create(&session_id).await;
        let mut session = handle.lock().await;

        if session.is_finished() {
            return Err(GameError::GameOver);
        }

        if created && !turn.history.is_empty() {
            info!(
                session = %session_id,
                turns = turn.history.len(),
                "rehydrating unknown session from client history"
            );
            session.rehydrate(std::mem::take(&mut turn.history), turn.client_count);
        }

        let turn_index = session.choice_count().max(turn.client_count);
        if turn_index >= self.rules.max_turns {
            session.finish();
            return Err(GameError::GameOver);
        }

        if session.hidden_goal().is_none() {
            let goal = self.generate_goal().await;
            debug!(session = %session_id, goal = %goal, "assigned hidden goal");
            session.assign_goal(goal);
        }

        let scene = self
            .run_turn(&session_id, &mut session, &turn, turn_index)
            .await?;

        Ok(StoryResponse::new(
            Some(&session_id),
            scene,
            session.choice_count(),
            self.rules.max_turns,
        ))
    }

    /// Turn for a client that holds the history and sent no session id.
    /// Nothing is stored and no hidden goal is generated.
    async fn play_stateless(&self, mut turn: PlayerTurn) -> Result<StoryResponse, GameError> {
        let mut session = Session::new();
        session.rehydrate(std::mem::take(&mut turn.history), turn.client_count);

        let turn_index = session.choice_count();
        if turn_index >= self.rules.max_turns {
            return Err(GameError::GameOver);
        }

        let scene = self
            .run_turn("stateless", &mut session, &turn, turn_index)
            .await?;

        Ok(StoryResponse::new(
            None,
            scene,
            session.choice_count(),
            self.rules.max_turns,
        ))
    }

    /// Prompt, generate, check and record one scene on `session`.
    async fn run_turn(
        &self,
        label: &str,
        session: &mut Session,
        turn: &PlayerTurn,
        turn_index: u32,
    ) -> Result<Scene, GameError> {
        let max_turns = self.rules.max_turns;
        let difficulty = turn.difficulty.unwrap_or(session.difficulty);

        let prompt = PromptBuilder::build(&StoryPrompt {
            choice: &turn.choice,
            history: &session.history,
            difficulty,
            goal: session.hidden_goal(),
            turn_index,
            max_turns,
            history_window: self.rules.history_window,
        });

        let raw = self
            .generator
            .generate(&prompt, self.rules.scene)
            .await
            .map_err(|e| {
                error!(session = %label, error = %e, "scene generation failed");
                GameError::from(e)
            })?;

        let final_turn = turn_index + 1 >= max_turns;
        let review = review_scene(parse_scene(&raw), final_turn).map_err(|e| {
            warn!(session = %label, error = %e, raw = %raw, "model broke the scene format");
            e
        })?;

        for (option, reason) in review.rejected() {
            warn!(session = %label, option = %option, reason = %reason, "dropped option");
        }
        if review.forced_ending {
            info!(session = %label, "turn cap reached, ending game");
        }

        let scene = review.scene;
        session.record_turn(&turn.choice, &scene.description);
        session.advance_choice_count(turn_index + 1);
        session.difficulty = difficulty;
        if scene.is_terminal() {
            session.finish();
        }

        info!(
            session = %label,
            choice_count = session.choice_count(),
            options = scene.options.len(),
            game_over = scene.is_terminal(),
            "served scene"
        );

        Ok(scene)
    }

    async fn generate_goal(&self) -> String {
        if !self.rules.generate_goals {
            return self.rules.fallback_mission.clone();
        }

        match self
            .generator
            .generate(&PromptBuilder::build_goal(), self.rules.goal)
            .await
        {
            Ok(raw) => clean_goal(&raw).unwrap_or_else(|| {
                warn!(raw = %raw, "goal response was empty, using fallback mission");
                self.rules.fallback_mission.clone()
            }),
            Err(e) => {
                warn!(error = %e, "goal generation failed, using fallback mission");
                self.rules.fallback_mission.clone()
            }
        }
    }
}

fn validate(request: StoryRequest, max_turns: u32) -> Result<PlayerTurn, GameError> {
    let choice = request
        .current_choice
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| GameError::Validation("currentChoice is required".to_string()))?;

    if choice.chars().count() > MAX_CHOICE_LEN {
        return Err(GameError::Validation(format!(
            "currentChoice is longer than {} characters",
            MAX_CHOICE_LEN
        )));
    }

    let difficulty = request
        .difficulty
        .as_deref()
        .map(|raw| raw.parse::<Difficulty>().map_err(GameError::Validation))
        .transpose()?;

    let session_id = match request.session_id.map(|s| s.trim().to_string()) {
        None => None,
        Some(id) if id.is_empty() => None,
        Some(id) => {
            let valid = id.len() <= MAX_SESSION_ID_LEN && id.chars().all(|c| c.is_ascii_graphic());
            if !valid {
                return Err(GameError::Validation(
                    "sessionId must be up to 128 printable ASCII characters".to_string(),
                ));
            }
            Some(id)
        }
    };

    let client_count = request.choice_count.unwrap_or(0);
    if client_count > max_turns {
        return Err(GameError::Validation(format!(
            "choiceCount {} exceeds the turn cap of {}",
            client_count, max_turns
        )));
    }

    let history = request.game_history.unwrap_or_default();
    if history.len() > max_turns as usize {
        return Err(GameError::Validation(format!(
            "gameHistory has more than {} turns",
            max_turns
        )));
    }

    Ok(PlayerTurn {
        choice,
        difficulty,
        session_id,
        history,
        client_count,
    })
}

/// First non-empty line of the goal reply, without quotes or a "Goal:" label.
fn clean_goal(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("goal:"))
        .map(|_| &line[5..])
        .unwrap_or(line);
    let goal = line.trim().trim_matches('"').trim();

    if goal.is_empty() {
        None
    } else {
        Some(goal.to_string())
    }
}
