use crate::engine::scene_rules::BORING_OPTION_TERMS;
use crate::model::difficulty::Difficulty;
use crate::model::session::Turn;

/// Everything a scene prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct StoryPrompt<'a> {
    pub choice: &'a str,
    pub history: &'a [Turn],
    pub difficulty: Difficulty,
    pub goal: Option<&'a str>,

    /// Zero-based index of the turn being generated.
    pub turn_index: u32,
    pub max_turns: u32,

    /// How many of the most recent turns are written out in full.
    pub history_window: usize,
}

impl StoryPrompt<'_> {
    fn is_final_turn(&self) -> bool {
        self.turn_index + 1 >= self.max_turns
    }
}

/// Builds the text prompts sent to the model.
/// Only formats text: no parsing, no networking, no session logic.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(prompt: &StoryPrompt<'_>) -> String {
        if prompt.history.is_empty() {
            OpeningPromptBuilder::build(prompt)
        } else {
            ContinuationPromptBuilder::build(prompt)
        }
    }

    /// One-shot prompt asking for the session's hidden goal.
    pub fn build_goal() -> String {
        "You are the master of a text-based adventure game. Create a mysterious and exciting goal \
for the player to achieve over the course of the game.\n\n\
Rules:\n\
- The goal is hidden from the player and is only used to steer the story.\n\
- It must take several steps to achieve and must not be trivially easy.\n\
- Keep it to one short sentence.\n\
- Example goals: \"Find the lost treasure of the pirate king, Harold\", \
\"Rescue the captured princess, Tina\", \"Defeat the evil sorcerer\".\n\n\
Respond with only the goal text and nothing else. Do not add quotes, labels or any explanation.\n"
            .to_string()
    }
}

struct OpeningPromptBuilder;

impl OpeningPromptBuilder {
    fn build(prompt: &StoryPrompt<'_>) -> String {
        let mut out = String::new();

        push_role(&mut out, prompt);
        push_output_format(&mut out);
        push_difficulty(&mut out, prompt.difficulty);
        push_goal(&mut out, prompt.goal);

        out.push_str("TASK:\n");
        out.push_str(
            "Create the opening scene of a new adventure (10-20 words) with 1, 2, or 3 options, \
whichever feels right. Occasionally give the player items they can use later in the game.\n\n",
        );

        push_option_rules(&mut out);
        out
    }
}

struct ContinuationPromptBuilder;

impl ContinuationPromptBuilder {
    fn build(prompt: &StoryPrompt<'_>) -> String {
        let mut out = String::new();

        push_role(&mut out, prompt);
        push_output_format(&mut out);
        push_difficulty(&mut out, prompt.difficulty);
        push_goal(&mut out, prompt.goal);
        push_history(&mut out, prompt.history, prompt.history_window);
        push_player_choice(&mut out, prompt.choice);

        out.push_str("TASK:\n");
        out.push_str(
            "Based on the player's choice, write the next scene (10-20 words) with 1, 2, or 3 \
options, whichever feels right. Keep the story moving with new challenges, characters or \
locations. Occasionally give the player items they can use later in the game.\n\n",
        );

        push_ending_rules(&mut out, prompt.goal.is_some());
        push_option_rules(&mut out);

        if prompt.is_final_turn() {
            out.push_str(
                "FINAL TURN:\nThis is the last turn of the game. Conclude the story now with a \
terminal scene and no options.\n",
            );
        }

        out
    }
}

fn push_role(out: &mut String, prompt: &StoryPrompt<'_>) {
    out.push_str("You are a text adventure game master.\n");
    out.push_str(&format!(
        "This is turn {} of at most {}.\n\n",
        prompt.turn_index + 1,
        prompt.max_turns
    ));
}

fn push_output_format(out: &mut String) {
    out.push_str(
        "OUTPUT FORMAT:\n\
Respond with exactly one line and nothing else:\n\
<description of the scene>||<option 1>||<option 2>||<option 3>\n\
Example:\n\
You walk down the path and the trees part to reveal a clearing with a large stone at its center.||Look around the stone||Wait and see who is approaching||Continue down the path\n\
The option list may contain zero entries. Zero options means the game is over; \
write such a terminal scene as:\n\
<one dramatic ending sentence>||\n\n",
    );
}

fn push_difficulty(out: &mut String, difficulty: Difficulty) {
    out.push_str(&format!("DIFFICULTY: {}\n", difficulty));
    out.push_str(difficulty.pacing());
    out.push_str("\n\n");
}

fn push_goal(out: &mut String, goal: Option<&str>) {
    let Some(goal) = goal else {
        return;
    };

    out.push_str("HIDDEN GOAL:\n");
    out.push_str(&format!("\"{}\"\n", goal));
    out.push_str(
        "Steer the story toward this goal. Do NOT reveal or state the goal to the player.\n\n",
    );
}

fn push_history(out: &mut String, history: &[Turn], window: usize) {
    if history.is_empty() {
        return;
    }

    let skip = history.len().saturating_sub(window.max(1));

    out.push_str("GAME HISTORY:\n");
    if skip > 0 {
        out.push_str(&format!("({} earlier turns omitted)\n", skip));
    }
    for (index, turn) in history.iter().enumerate().skip(skip) {
        out.push_str(&format!(
            "Choice {}: {} -> {}\n",
            index + 1,
            turn.choice.trim(),
            turn.response.trim()
        ));
    }
    out.push('\n');
}

fn push_player_choice(out: &mut String, choice: &str) {
    out.push_str("PLAYER CHOICE:\n");
    out.push_str(&format!("\"{}\"\n\n", choice.trim()));
}

fn push_ending_rules(out: &mut String, has_goal: bool) {
    out.push_str("ENDINGS:\n");
    out.push_str(
        "- End the game IMMEDIATELY with a terminal scene if the player makes a fatal decision \
(for example poking a snake, touching fire, trusting a shady person). Say how they lost.\n",
    );
    if has_goal {
        out.push_str(
            "- End the game IMMEDIATELY with a satisfying win and a terminal scene if the player \
achieves the hidden goal.\n",
        );
    } else {
        out.push_str(
            "- End the game with a satisfying win and a terminal scene if the player reaches a \
good outcome (for example discovering a treasure or place, or winning someone's trust).\n",
        );
    }
    out.push('\n');
}

fn push_option_rules(out: &mut String) {
    out.push_str("RULES:\n");
    out.push_str(
        "- Do NOT repeat or rephrase scenes or options that already appear in the game history.\n",
    );
    out.push_str(&format!(
        "- Do NOT give boring options that include any of these words: {}.\n",
        BORING_OPTION_TERMS.join(", ")
    ));
    out.push_str("- Do NOT add explanations, markdown or quotes around the line.\n\n");
}
