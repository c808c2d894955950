use crate::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::openai::{build_messages, ChatMessage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const CLAUDE_HAIKU: &str = "claude-3-5-haiku-20241022";
const COMPANION_TEMPERATURE: f32 = 0.7;
const COMPANION_MAX_TOKENS: u32 = 300;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, model: Option<&str>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.to_string(),
            model: model.unwrap_or(CLAUDE_HAIKU).to_string(),
        }
    }

    /// Send a messages request and return the final text block
    pub async fn chat_completion(
        &self,
        system_prompt: Option<&str>,
        messages: Vec<AnthropicMessage>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, GenerationError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: max_tokens.unwrap_or(COMPANION_MAX_TOKENS),
            system: system_prompt.map(|s| s.to_string()),
            messages,
            temperature,
        };

        let response = self.client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse structured error
            let detail = match serde_json::from_str::<AnthropicError>(&error_text) {
                Ok(parsed) => format!("{} - {}", parsed.error.error_type, parsed.error.message),
                Err(_) => error_text,
            };
            return Err(GenerationError::from_api_status("Anthropic", status, &detail));
        }

        let completion: MessagesResponse = response.json().await?;

        completion.content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .next_back()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::MalformedOutput("No text response from Claude".to_string()))
    }
}

/// Helper to convert OpenAI-style messages to Anthropic format
/// Extracts system message and returns (system_prompt, messages)
pub fn convert_messages(messages: Vec<ChatMessage>) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system_prompt: Option<String> = None;
    let mut anthropic_messages = Vec::new();

    for msg in messages {
        if msg.role == "system" {
            system_prompt = Some(match system_prompt {
                Some(existing) => format!("{}\n\n{}", existing, msg.content),
                None => msg.content,
            });
        } else {
            anthropic_messages.push(AnthropicMessage {
                role: msg.role,
                content: msg.content,
            });
        }
    }

    (system_prompt, anthropic_messages)
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let (system, messages) = convert_messages(build_messages(request));
        self.chat_completion(
            system.as_deref(),
            messages,
            COMPANION_TEMPERATURE,
            Some(COMPANION_MAX_TOKENS),
        ).await
    }
}
