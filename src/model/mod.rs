pub mod difficulty;
pub mod llm_decode;
pub mod scene;
pub mod session;
