//! Reply generation
//!
//! Two interchangeable strategies: a pluggable text-generation backend and the
//! deterministic templates in [`crate::templates`]. Backend failures come back
//! as a typed [`GenerationError`] so the engine can decide how to degrade.

use crate::classifier::EmotionTag;
use crate::logging;
use crate::marker::{parse_tagged_reply, TaggedReply};
use crate::phase::Phase;
use crate::prompts::{phase_guidance, render_turn_prompt, SYSTEM_PROMPT};
use crate::templates::ResponseTemplates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Attempts per turn before falling back to templates
pub const MAX_ATTEMPTS: usize = 2;

// ============ Request / Error ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub phase: Phase,
    pub guidance: String,
    pub message: String,
    pub summary: String,
    pub history: Vec<String>,
}

impl GenerationRequest {
    pub fn new(
        phase: Phase,
        turn_count: u32,
        message: &str,
        summary: &str,
        history: Vec<String>,
    ) -> Self {
        Self {
            instructions: SYSTEM_PROMPT.to_string(),
            phase,
            guidance: phase_guidance(phase, turn_count),
            message: message.to_string(),
            summary: summary.to_string(),
            history,
        }
    }

    /// User-side prompt text sent alongside the instructions
    pub fn prompt(&self) -> String {
        render_turn_prompt(&self.summary, &self.history, &self.guidance, &self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("No generative backend configured")]
    Unavailable,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Rate limits and bad output are not worth a second attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Timeout | GenerationError::Other(_))
    }

    /// Map a non-success HTTP response to an error category
    pub fn from_api_status(provider: &str, status: u16, body: &str) -> Self {
        if status == 429 || body.to_lowercase().contains("quota") {
            GenerationError::RateLimited(format!("{} API error ({})", provider, status))
        } else {
            GenerationError::Other(format!("{} API error ({}): {}", provider, status, body))
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_decode() {
            GenerationError::MalformedOutput(err.to_string())
        } else {
            GenerationError::Other(err.to_string())
        }
    }
}

/// Pluggable text-generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Raw model output, expected to end with an emotion marker line
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Generative,
    Template,
}

// ============ Response Generator ============

pub struct ResponseGenerator {
    backend: Option<Box<dyn TextGenerator>>,
    templates: ResponseTemplates,
    max_attempts: usize,
}

impl ResponseGenerator {
    pub fn new(backend: Option<Box<dyn TextGenerator>>, templates: ResponseTemplates) -> Self {
        Self {
            backend,
            templates,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Template-only generator
    pub fn offline() -> Self {
        Self::new(None, ResponseTemplates::default())
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// Ask the backend for a reply, retrying once on transient failures
    pub async fn generate(&self, request: &GenerationRequest) -> Result<TaggedReply, GenerationError> {
        let backend = self.backend.as_ref().ok_or(GenerationError::Unavailable)?;
        let mut last_error = GenerationError::Unavailable;

        for attempt in 1..=self.max_attempts {
            match backend.generate(request).await {
                Ok(raw) => {
                    let parsed = parse_tagged_reply(&raw);
                    if parsed.text.is_empty() {
                        return Err(GenerationError::MalformedOutput(
                            "empty reply text".to_string(),
                        ));
                    }
                    return Ok(parsed);
                }
                Err(e) if e.is_retryable() => {
                    logging::log_generation(None, &format!(
                        "{} attempt {}/{} failed: {}",
                        backend.name(), attempt, self.max_attempts, e
                    ));
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    /// Deterministic templated reply, parsed the same way as model output
    pub fn fallback(&self, phase: Phase, emotion: EmotionTag, user_message: &str) -> TaggedReply {
        parse_tagged_reply(&self.templates.render(phase, emotion, user_message))
    }
}
