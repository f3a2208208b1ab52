use serde::Deserialize;
use serde_json::Value;

use crate::engine::errors::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn into_text(self) -> Result<String, ProviderError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ProviderError::Empty { reason });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!("finish reason {}", r))
                .unwrap_or_else(|| "empty candidate".to_string());
            return Err(ProviderError::Empty { reason });
        }

        Ok(text)
    }
}

/// Decode a raw `generateContent` body into the generated text.
pub fn decode_generated_text(json: &str) -> Result<String, ProviderError> {
    let response: GenerateContentResponse = serde_json::from_str(json)
        .map_err(|e| ProviderError::Malformed(format!("Invalid generateContent body: {}", e)))?;
    response.into_text()
}

/// Number of entries in a `models.list` body.
pub fn decode_model_count(json: &str) -> Result<usize, ProviderError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ProviderError::Malformed(format!("Invalid models body: {}", e)))?;

    let Some(models) = value.get("models").and_then(|m| m.as_array()) else {
        return Err(ProviderError::Malformed("models must be a JSON array".to_string()));
    };

    Ok(models.len())
}
