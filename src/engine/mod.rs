pub mod errors;
pub mod game_service;
pub mod llm_client;
pub mod prompt_builder;
pub mod protocol;
pub mod scene_parser;
pub mod scene_rules;
pub mod session_store;
