mod common;

use common::{FakeGenerator, FATAL_CHOICE, GOAL};
use ventura::engine::errors::GameError;
use ventura::engine::game_service::GameRules;
use ventura::engine::protocol::StoryRequest;
use ventura::engine::scene_rules::boring_term;
use ventura::model::session::{SessionState, Turn};

fn request(choice: &str, session_id: &str) -> StoryRequest {
    StoryRequest {
        current_choice: Some(choice.into()),
        difficulty: Some("easy".into()),
        game_history: Some(Vec::new()),
        choice_count: None,
        session_id: Some(session_id.into()),
    }
}

#[tokio::test]
async fn opening_scene_has_clean_options() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let resp = service.play(request("start", "s1")).await.unwrap();

    assert!(!resp.description.is_empty());
    assert!((1..=3).contains(&resp.options.len()));
    assert!(resp.options.iter().all(|o| boring_term(o).is_none()));
    assert_eq!(resp.options, vec!["Follow the north path", "Climb the old oak"]);
    assert!(!resp.game_over);
    assert_eq!(resp.choice_count, 1);
    assert_eq!(resp.turns_remaining, 11);
    assert_eq!(resp.session_id.as_deref(), Some("s1"));

    let prompts = generator.scene_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("opening scene"));
    assert!(prompts[0].contains(GOAL));
}

#[tokio::test]
async fn fatal_choice_ends_the_game() {
    let service = common::service(FakeGenerator::storyteller());

    service.play(request("start", "s1")).await.unwrap();
    let resp = service.play(request(FATAL_CHOICE, "s1")).await.unwrap();

    assert!(resp.options.is_empty());
    assert!(resp.game_over);
    assert!(resp.description.contains("flames"));
    assert_eq!(resp.response, format!("{}||", resp.description));
    assert_eq!(resp.turns_remaining, 0);

    let err = service.play(request("look around", "s1")).await.unwrap_err();
    assert!(matches!(err, GameError::GameOver));

    let handle = service.sessions().get("s1").await.unwrap();
    assert_eq!(handle.lock().await.state(), SessionState::Finished);
}

#[tokio::test]
async fn hidden_goal_is_generated_once_per_session() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    service.play(request("start", "s1")).await.unwrap();
    // a second "empty history" request must not regenerate the goal
    service.play(request("start", "s1")).await.unwrap();
    assert_eq!(generator.goal_calls(), 1);

    service.play(request("start", "s2")).await.unwrap();
    assert_eq!(generator.goal_calls(), 2);

    let handle = service.sessions().get("s1").await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.hidden_goal(), Some(GOAL));
    assert_eq!(session.choice_count(), 2);
}

#[tokio::test]
async fn goal_failure_falls_back_to_fixed_mission() {
    let generator = FakeGenerator::new(|prompt, _| {
        if common::is_goal_prompt(prompt) {
            Err(ventura::engine::errors::ProviderError::Malformed("boom".into()))
        } else {
            Ok(common::story_scene(prompt).to_string())
        }
    });
    let service = common::service(generator.clone());

    service.play(request("start", "s1")).await.unwrap();

    let handle = service.sessions().get("s1").await.unwrap();
    assert_eq!(
        handle.lock().await.hidden_goal(),
        Some(GameRules::default().fallback_mission.as_str())
    );
}

#[tokio::test]
async fn goal_generation_can_be_disabled() {
    let generator = FakeGenerator::storyteller();
    let rules = GameRules {
        generate_goals: false,
        fallback_mission: "Find the lost husband of the old lady".into(),
        ..GameRules::default()
    };
    let service = common::service_with(generator.clone(), rules);

    service.play(request("start", "s1")).await.unwrap();

    assert_eq!(generator.goal_calls(), 0);
    assert!(generator.scene_prompts()[0].contains("Find the lost husband of the old lady"));
}

#[tokio::test]
async fn history_from_prior_turns_reaches_the_prompt() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    service.play(request("start", "s1")).await.unwrap();
    service.play(request("Climb the old oak", "s1")).await.unwrap();

    let prompts = generator.scene_prompts();
    assert!(prompts[1].contains("Choice 1: start -> You wake in a moonlit forest"));
    assert!(prompts[1].contains("PLAYER CHOICE:\n\"Climb the old oak\""));
}

#[tokio::test]
async fn turn_cap_forces_an_ending() {
    let rules = GameRules {
        max_turns: 3,
        ..GameRules::default()
    };
    let generator = FakeGenerator::storyteller();
    let service = common::service_with(generator.clone(), rules);

    let first = service.play(request("start", "s1")).await.unwrap();
    let second = service.play(request("Open the gate", "s1")).await.unwrap();
    let third = service.play(request("Open the gate", "s1")).await.unwrap();

    assert!(!first.game_over);
    assert!(!second.game_over);
    assert!(third.game_over);
    assert!(third.options.is_empty());
    assert_eq!(third.choice_count, 3);
    assert!(generator.scene_prompts()[2].contains("FINAL TURN"));

    let err = service.play(request("Open the gate", "s1")).await.unwrap_err();
    assert!(matches!(err, GameError::GameOver));
    assert_eq!(generator.scene_calls(), 3);
}

#[tokio::test]
async fn concurrent_requests_for_one_session_are_serialised() {
    let service = common::service(FakeGenerator::storyteller());
    service.play(request("start", "s1")).await.unwrap();

    let (a, b) = tokio::join!(
        service.play(request("Open the gate", "s1")),
        service.play(request("Cross the stream", "s1")),
    );

    let mut counts = vec![a.unwrap().choice_count, b.unwrap().choice_count];
    counts.sort_unstable();
    assert_eq!(counts, vec![2, 3]);

    let handle = service.sessions().get("s1").await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.choice_count(), 3);
    assert_eq!(session.history.len(), 3);
}

#[tokio::test]
async fn sessions_are_independent() {
    let service = common::service(FakeGenerator::storyteller());

    let (a, b) = tokio::join!(
        service.play(request("start", "alpha")),
        service.play(request("start", "beta")),
    );

    assert_eq!(a.unwrap().choice_count, 1);
    assert_eq!(b.unwrap().choice_count, 1);
    assert_eq!(service.sessions().len().await, 2);
}

#[tokio::test]
async fn provider_failure_leaves_session_untouched() {
    let service = common::service(FakeGenerator::failing());

    let err = service.play(request("start", "s1")).await.unwrap_err();
    assert!(matches!(err, GameError::Provider(_)));

    let handle = service.sessions().get("s1").await.unwrap();
    let session = handle.lock().await;
    assert_eq!(session.choice_count(), 0);
    assert!(session.history.is_empty());
    assert!(!session.is_finished());
}

#[tokio::test]
async fn unformatted_reply_is_a_parse_error() {
    let generator = FakeGenerator::new(|prompt, _| {
        if common::is_goal_prompt(prompt) {
            Ok(GOAL.to_string())
        } else {
            Ok("You stand there and nothing much happens".to_string())
        }
    });
    let service = common::service(generator);

    let err = service.play(request("start", "s1")).await.unwrap_err();
    assert!(matches!(err, GameError::Parse(_)));
}

#[tokio::test]
async fn unknown_session_is_rehydrated_from_client_history() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let req = StoryRequest {
        current_choice: Some("Open the gate".into()),
        difficulty: Some("HARD".into()),
        game_history: Some(vec![
            Turn::new("start", "A ruined chapel under a red sky."),
            Turn::new("Enter the chapel", "Bats burst from the rafters."),
        ]),
        choice_count: Some(2),
        session_id: Some("restored".into()),
    };
    let resp = service.play(req).await.unwrap();

    assert_eq!(resp.choice_count, 3);
    let prompt = &generator.scene_prompts()[0];
    assert!(prompt.contains("Choice 2: Enter the chapel -> Bats burst from the rafters."));
    assert!(prompt.contains("DIFFICULTY: hard"));
}

#[tokio::test]
async fn missing_session_id_is_minted() {
    let service = common::service(FakeGenerator::storyteller());

    let resp = service
        .play(StoryRequest {
            current_choice: Some("start".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let id = resp.session_id.expect("minted id");
    assert_eq!(id.len(), 16);
    assert!(service.sessions().get(&id).await.is_some());
}

#[tokio::test]
async fn invalid_requests_never_reach_the_provider() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let err = service
        .play(StoryRequest {
            current_choice: Some("   ".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::Validation(_)));
    assert_eq!(generator.scene_calls() + generator.goal_calls(), 0);
    assert!(service.sessions().is_empty().await);
}

#[tokio::test]
async fn client_held_history_without_session_id_is_stateless() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let mut history = vec![Turn::new("start", "You wake in a moonlit forest.")];
    for (i, choice) in ["Climb the old oak", "Open the gate", "Cross the stream"]
        .into_iter()
        .enumerate()
    {
        let resp = service
            .play(StoryRequest {
                current_choice: Some(choice.into()),
                difficulty: Some("easy".into()),
                game_history: Some(history.clone()),
                choice_count: Some(history.len() as u32),
                session_id: None,
            })
            .await
            .unwrap();

        assert!(resp.session_id.is_none());
        assert_eq!(resp.choice_count, i as u32 + 2);
        history.push(Turn::new(choice, resp.description));
    }

    assert_eq!(generator.goal_calls(), 0);
    assert_eq!(generator.scene_calls(), 3);
    assert!(service.sessions().is_empty().await);
    assert!(generator.scene_prompts()[2].contains("Choice 3: Open the gate"));
}

#[tokio::test]
async fn capped_request_for_unknown_session_skips_goal_generation() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let err = service
        .play(StoryRequest {
            current_choice: Some("Open the gate".into()),
            choice_count: Some(GameRules::default().max_turns),
            session_id: Some("late".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GameError::GameOver));
    assert_eq!(generator.goal_calls(), 0);
    assert_eq!(generator.scene_calls(), 0);
}

#[tokio::test]
async fn omitted_difficulty_keeps_the_session_setting() {
    let generator = FakeGenerator::storyteller();
    let service = common::service(generator.clone());

    let mut first = request("start", "s1");
    first.difficulty = Some("hard".into());
    service.play(first).await.unwrap();

    let mut second = request("Open the gate", "s1");
    second.difficulty = None;
    service.play(second).await.unwrap();

    let prompts = generator.scene_prompts();
    assert!(prompts[1].contains("DIFFICULTY: hard"));
}
