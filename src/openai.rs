use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::assessment::EvaluationPromptBuilder;
use crate::config::Config;
use crate::rubric::Rubric;

const PERSONA: &str = "You are an expert brand strategy consultant.";

const CHAT_SYSTEM_PROMPT: &str = "You are an expert brand strategy consultant. \
    Answer questions about brand strategy, positioning, market research, and \
    brand measurement. If a question is outside the context of brand strategy, \
    reply exactly: \"Sorry, this question is outside the context of brand strategy.\"";

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("no response choices from model")]
    EmptyResponse,
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Scoring seam: the service layer talks to this, tests stub it.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn evaluate_answers(&self, answers: &Value) -> Result<EvaluationResult, ScoringError>;
}

/// The strictly-validated result of one scoring call.
///
/// Keys are human-readable criterion labels; they are rubric data, not a
/// fixed enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationResult {
    pub scores: BTreeMap<String, u8>,
    pub feedback: BTreeMap<String, String>,
    pub recommendations: BTreeMap<String, String>,
    pub overall: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvaluation {
    scores: BTreeMap<String, i64>,
    feedback: BTreeMap<String, String>,
    recommendations: BTreeMap<String, String>,
    overall: String,
}

impl EvaluationResult {
    /// Parses the model's raw reply. Missing fields, extra fields, wrong
    /// value types, out-of-range scores, or empty maps all fail - a partial
    /// result is never returned.
    pub fn from_response_text(text: &str) -> Result<Self, ScoringError> {
        let cleaned = strip_code_fences(text);

        let raw: RawEvaluation = serde_json::from_str(cleaned)
            .map_err(|e| ScoringError::MalformedResponse(e.to_string()))?;

        if raw.scores.is_empty() {
            return Err(ScoringError::MalformedResponse("scores map is empty".to_string()));
        }
        if raw.feedback.is_empty() || raw.recommendations.is_empty() {
            return Err(ScoringError::MalformedResponse(
                "feedback or recommendations map is empty".to_string(),
            ));
        }
        if raw.overall.trim().is_empty() {
            return Err(ScoringError::MalformedResponse("overall summary is empty".to_string()));
        }

        let mut scores = BTreeMap::new();
        for (label, score) in raw.scores {
            if !(1..=10).contains(&score) {
                return Err(ScoringError::MalformedResponse(format!(
                    "score {} for '{}' is outside 1-10",
                    score, label
                )));
            }
            scores.insert(label, score as u8);
        }

        Ok(EvaluationResult {
            scores,
            feedback: raw.feedback,
            recommendations: raw.recommendations,
            overall: raw.overall,
        })
    }
}

// Models regularly wrap JSON in ```json fences despite the instruction not to.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    prompt_builder: Arc<EvaluationPromptBuilder>,
}

impl OpenAIClient {
    pub fn new(config: &Config, rubric: Arc<Rubric>) -> Self {
        Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            prompt_builder: Arc::new(EvaluationPromptBuilder::new(rubric)),
        }
    }

    /// Free-form consultant chat. Shares the client, not the scoring path.
    pub async fn chat_response(&self, message: &str) -> Result<String, ScoringError> {
        self.chat_completion(CHAT_SYSTEM_PROMPT, message, 1000, 0.6).await
    }

    /// Short literal title for a conversation seed. Low temperature to bias
    /// toward terse, deterministic phrasing.
    pub async fn generate_title(&self, seed: &str) -> Result<String, ScoringError> {
        let user_prompt = format!(
            "Generate a short literal title (at most six words) for a brand \
             strategy conversation that starts with:\n{}\n\nReturn only the \
             title text, no quotes, no formatting.",
            seed
        );
        let title = self.chat_completion(PERSONA, &user_prompt, 60, 0.3).await?;
        Ok(title.trim().trim_matches('"').to_string())
    }

    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ScoringError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens,
            temperature,
            stream: false,
        };

        info!("Sending request to OpenAI with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoringError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error: {}", error_text);
            return Err(ScoringError::Upstream(error_text));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ScoringError::Upstream(e.to_string()))?;

        if let Some(usage) = &openai_response.usage {
            info!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        openai_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or(ScoringError::EmptyResponse)
    }
}

#[async_trait]
impl Scorer for OpenAIClient {
    /// One-shot scoring call. No retry; on failure nothing is persisted and
    /// the caller may simply re-submit.
    async fn evaluate_answers(&self, answers: &Value) -> Result<EvaluationResult, ScoringError> {
        let prompt = self.prompt_builder.build(answers);
        let reply = self.chat_completion(PERSONA, &prompt, 2000, 0.6).await?;
        let result = EvaluationResult::from_response_text(&reply)?;
        info!("Evaluation parsed with {} scored criteria", result.scores.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> String {
        r#"{
            "scores": {"Market Research Quality": 7, "Consumer Segmentation": 4},
            "feedback": {"Market Research Quality": "solid", "Consumer Segmentation": "thin"},
            "recommendations": {"Market Research Quality": "keep cadence", "Consumer Segmentation": "add behaviour data"},
            "overall": "A promising foundation with segmentation gaps."
        }"#
        .to_string()
    }

    #[test]
    fn parses_a_valid_response() {
        let result = EvaluationResult::from_response_text(&valid_body()).unwrap();
        assert_eq!(result.scores["Market Research Quality"], 7);
        assert_eq!(result.feedback.len(), 2);
        assert!(result.overall.starts_with("A promising"));
    }

    #[test]
    fn parses_a_fenced_response() {
        let fenced = format!("```json\n{}\n```", valid_body());
        assert!(EvaluationResult::from_response_text(&fenced).is_ok());
    }

    #[test]
    fn rejects_non_json() {
        let err = EvaluationResult::from_response_text("The brand scores well overall.");
        assert!(matches!(err, Err(ScoringError::MalformedResponse(_))));
    }

    #[test]
    fn rejects_missing_field() {
        let body = r#"{"scores": {"A": 5}, "feedback": {"A": "x"}, "overall": "y"}"#;
        assert!(matches!(
            EvaluationResult::from_response_text(body),
            Err(ScoringError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_extra_field() {
        let body = r#"{
            "scores": {"A": 5}, "feedback": {"A": "x"},
            "recommendations": {"A": "y"}, "overall": "z", "confidence": 0.9
        }"#;
        assert!(matches!(
            EvaluationResult::from_response_text(body),
            Err(ScoringError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_score() {
        let body = r#"{
            "scores": {"A": 11}, "feedback": {"A": "x"},
            "recommendations": {"A": "y"}, "overall": "z"
        }"#;
        assert!(matches!(
            EvaluationResult::from_response_text(body),
            Err(ScoringError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_non_integer_score() {
        let body = r#"{
            "scores": {"A": "seven"}, "feedback": {"A": "x"},
            "recommendations": {"A": "y"}, "overall": "z"
        }"#;
        assert!(matches!(
            EvaluationResult::from_response_text(body),
            Err(ScoringError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_empty_scores_map() {
        let body = r#"{
            "scores": {}, "feedback": {"A": "x"},
            "recommendations": {"A": "y"}, "overall": "z"
        }"#;
        assert!(matches!(
            EvaluationResult::from_response_text(body),
            Err(ScoringError::MalformedResponse(_))
        ));
    }
}
