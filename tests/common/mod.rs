#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ventura::engine::errors::ProviderError;
use ventura::engine::game_service::{GameRules, GameService};
use ventura::engine::llm_client::{GenerationConfig, TextGenerator};

pub const GOAL: &str = "Recover the stolen lantern of the lighthouse keeper";
pub const FATAL_CHOICE: &str = "touch the fire";

type Reply = Box<dyn Fn(&str, GenerationConfig) -> Result<String, ProviderError> + Send + Sync>;

/// Stand-in for the provider: answers through a closure and records calls.
pub struct FakeGenerator {
    reply: Reply,
    goal_calls: AtomicUsize,
    scene_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&str, GenerationConfig) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            reply: Box::new(reply),
            goal_calls: AtomicUsize::new(0),
            scene_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// A small storyteller: fixed goal, an opening with one banned option,
    /// a fatal ending for [`FATAL_CHOICE`], and an ordinary scene otherwise.
    pub fn storyteller() -> Arc<Self> {
        Self::new(|prompt, _| {
            if is_goal_prompt(prompt) {
                return Ok(format!("\"{}\"", GOAL));
            }
            Ok(story_scene(prompt).to_string())
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_, _| {
            Err(ProviderError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        })
    }

    pub fn goal_calls(&self) -> usize {
        self.goal_calls.load(Ordering::SeqCst)
    }

    pub fn scene_calls(&self) -> usize {
        self.scene_calls.load(Ordering::SeqCst)
    }

    pub fn scene_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !is_goal_prompt(p))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, ProviderError> {
        if is_goal_prompt(prompt) {
            self.goal_calls.fetch_add(1, Ordering::SeqCst);
        } else {
            self.scene_calls.fetch_add(1, Ordering::SeqCst);
        }
        self.prompts.lock().unwrap().push(prompt.to_string());

        // let overlapping requests interleave here, like a real network call
        tokio::task::yield_now().await;

        (self.reply)(prompt, config)
    }
}

pub fn is_goal_prompt(prompt: &str) -> bool {
    prompt.contains("Respond with only the goal text")
}

pub fn story_scene(prompt: &str) -> &'static str {
    if prompt.contains(&format!("PLAYER CHOICE:\n\"{}\"", FATAL_CHOICE)) {
        "You touch the fire and the flames swallow you whole.||"
    } else if !prompt.contains("PLAYER CHOICE:") {
        "You wake in a moonlit forest beside a cold campfire.||Follow the north path||Climb the old oak||Sleep until dawn"
    } else {
        "The path winds down to an iron gate.||Open the gate||Cross the stream"
    }
}

pub fn service(generator: Arc<FakeGenerator>) -> GameService {
    GameService::new(generator, GameRules::default())
}

pub fn service_with(generator: Arc<FakeGenerator>, rules: GameRules) -> GameService {
    GameService::new(generator, rules)
}
