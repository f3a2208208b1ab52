use crate::engine::errors::GameError;
use crate::engine::scene_parser::ParsedScene;
use crate::model::scene::Scene;

/// Option wording the model is told never to offer.
pub const BORING_OPTION_TERMS: &[&str] = &[
    "sleep",
    "rest",
    "hide",
    "run away",
    "return",
    "remain silent",
];

pub const MAX_OPTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionOutcome {
    Kept,
    Rejected { reason: String },
}

/// A parsed scene after the mechanical rules have been applied.
#[derive(Debug, Clone)]
pub struct SceneReview {
    pub scene: Scene,
    pub outcomes: Vec<(String, OptionOutcome)>,

    /// The turn cap ended the game regardless of what the model offered.
    pub forced_ending: bool,
}

impl SceneReview {
    pub fn rejected(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(option, outcome)| match outcome {
            OptionOutcome::Rejected { reason } => Some((option.as_str(), reason.as_str())),
            OptionOutcome::Kept => None,
        })
    }
}

/// First denylisted term the option mentions, matched on whole words.
pub fn boring_term(option: &str) -> Option<&'static str> {
    let lowered = option.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();

    BORING_OPTION_TERMS.iter().copied().find(|term| {
        let needle: Vec<&str> = term.split_whitespace().collect();
        words.windows(needle.len()).any(|window| window == needle.as_slice())
    })
}

/// Enforce the scene contract: delimited output, a description, no banned
/// options, at most three options, and an ending on the final turn.
pub fn review_scene(parsed: ParsedScene, final_turn: bool) -> Result<SceneReview, GameError> {
    if !parsed.delimited {
        return Err(GameError::Parse(
            "response did not use the || scene format".to_string(),
        ));
    }

    let Scene {
        description,
        options,
    } = parsed.scene;

    if description.is_empty() {
        return Err(GameError::Parse("scene description is empty".to_string()));
    }

    let offered = options.len();
    let mut kept = Vec::new();
    let mut outcomes = Vec::with_capacity(offered);

    for option in options {
        let outcome = if let Some(term) = boring_term(&option) {
            OptionOutcome::Rejected {
                reason: format!("uses banned term '{}'", term),
            }
        } else if kept.len() >= MAX_OPTIONS {
            OptionOutcome::Rejected {
                reason: format!("more than {} options", MAX_OPTIONS),
            }
        } else {
            kept.push(option.clone());
            OptionOutcome::Kept
        };
        outcomes.push((option, outcome));
    }

    if offered > 0 && kept.is_empty() {
        return Err(GameError::Parse(format!(
            "all {} offered options were rejected",
            offered
        )));
    }

    let forced_ending = final_turn && !kept.is_empty();
    if forced_ending {
        kept.clear();
    }

    Ok(SceneReview {
        scene: Scene::new(description, kept),
        outcomes,
        forced_ending,
    })
}
