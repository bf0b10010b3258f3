//! Model-based intent extraction and clarification
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. Both entry
//! points fail closed: any transport or parse problem surfaces as an
//! `Err` that the orchestrator swallows in favor of the heuristic path.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::TourGuideConfig;
use crate::intent::{Clarifier, Intent, IntentResolver};
use crate::models::conversation::{self, CONTEXT_WINDOW, Role, Turn};

const EXTRACTOR_PROMPT: &str = "You extract travel intent from the latest user message. \
Reply with ONLY a JSON object of the shape \
{\"place\": string or null, \"needs_weather\": boolean, \"needs_places\": boolean}. \
No markdown, no explanation. `place` is the destination the user is asking about, \
or null when none is named.";

const CLARIFIER_PROMPT: &str = "You are a friendly travel assistant. The user has not \
named a destination yet. Using the conversation so far, ask one short question that \
helps pin down where they want to go. Reply with the question only.";

/// Shared chat-completions client for the resolver and the clarifier.
#[derive(Clone)]
pub struct ModelClient {
    client: ClientWithMiddleware,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ModelClient {
    pub fn new(config: &TourGuideConfig) -> Result<Self> {
        Ok(Self {
            client: crate::api_client(&config.http)?,
            base_url: config.model.base_url.clone(),
            model: config.model.model.clone(),
            api_key: config.model.api_key.clone(),
        })
    }

    /// One completion over the trailing history window. The window's last
    /// turn is the user message being answered.
    #[instrument(skip(self, system, history), fields(model = %self.model))]
    async fn complete(&self, system: &str, history: &[Turn]) -> Result<String> {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        }];
        for turn in conversation::recent(history, CONTEXT_WINDOW) {
            messages.push(ChatMessage {
                role: match turn.role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: turn.content.clone(),
            });
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Model endpoint returned {status}: {body}"));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let text = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("No choices in chat completion response"))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("Empty completion"));
        }
        Ok(text.to_string())
    }
}

/// Model-based [`IntentResolver`]; capability-equivalent to the pattern
/// resolver and only ever used behind its fallback.
pub struct ModelResolver {
    client: ModelClient,
}

impl ModelResolver {
    #[must_use]
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentResolver for ModelResolver {
    async fn resolve(&self, _utterance: &str, history: &[Turn]) -> Result<Intent> {
        let text = self.client.complete(EXTRACTOR_PROMPT, history).await?;
        let raw: RawIntent = serde_json::from_str(first_json_object(&text)?)
            .context("Model reply is not the expected intent object")?;
        Ok(raw.into())
    }
}

/// Model-based [`Clarifier`] for the no-place branch.
pub struct ModelClarifier {
    client: ModelClient,
}

impl ModelClarifier {
    #[must_use]
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Clarifier for ModelClarifier {
    async fn respond(&self, _utterance: &str, history: &[Turn]) -> Result<String> {
        self.client.complete(CLARIFIER_PROMPT, history).await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Permissive shape for what the model returns
#[derive(Debug, Deserialize)]
struct RawIntent {
    place: Option<String>,
    #[serde(default)]
    needs_weather: bool,
    #[serde(default)]
    needs_places: bool,
}

impl From<RawIntent> for Intent {
    fn from(raw: RawIntent) -> Self {
        let place = raw
            .place
            .map(|place| place.trim().to_string())
            .filter(|place| !place.is_empty());
        Intent {
            place,
            needs_weather: raw.needs_weather,
            needs_places: raw.needs_places,
        }
    }
}

/// First balanced `{...}` block in the reply; models like to wrap their
/// JSON in prose or code fences.
fn first_json_object(text: &str) -> Result<&str> {
    let start = text
        .find('{')
        .ok_or_else(|| anyhow!("No JSON object in model reply"))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(anyhow!("Unbalanced JSON object in model reply"))
}
