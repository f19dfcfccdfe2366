//! Chat-completions client that asks a language model where a company is
//! based, given its website.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use onset_core::{AppConfig, LocationTriple};

use crate::error::EnrichError;
use crate::parse::parse_location_answer;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 100;

const PROMPT_TEMPLATE: &str = "Acesse o site oficial da empresa: {website}\n\
Procure por qualquer menção ao endereço, localização, cidade, estado ou país da empresa.\n\
Priorize informações em seções como \"Contato\", \"Sobre\", rodapé ou página institucional.\n\
Se encontrar, responda apenas no formato:\n\
Cidade: [cidade]\n\
Estado: [estado]\n\
País: [país]\n\
Se não encontrar, responda apenas com: Cidade: N/A, Estado: N/A, País: N/A.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct LocationInferenceClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

impl std::fmt::Debug for LocationInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationInferenceClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl LocationInferenceClient {
    /// Creates a client for the public OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, EnrichError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL, timeout_secs)
    }

    /// Creates a client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`EnrichError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("onset/0.1 (lead-collection)")
            .build()?;

        let raw = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|e| EnrichError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            model: model.to_owned(),
        })
    }

    /// Builds a client from `OPENAI_API_KEY`, `ONSET_OPENAI_BASE_URL` and
    /// `ONSET_OPENAI_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MissingApiKey`] when no key is configured, or
    /// any error from [`LocationInferenceClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(EnrichError::MissingApiKey)?;
        Self::with_base_url(
            api_key,
            &config.openai_base_url,
            &config.openai_model,
            config.apollo_request_timeout_secs,
        )
    }

    /// Asks the model for the city, state and country behind `website`.
    ///
    /// Parts the model cannot determine come back as empty strings.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::RateLimited`] on HTTP 429.
    /// - [`EnrichError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`EnrichError::Deserialize`] if the body is not a chat completion.
    /// - [`EnrichError::Http`] on network failure.
    pub async fn infer_location(&self, website: &str) -> Result<LocationTriple, EnrichError> {
        let prompt = PROMPT_TEMPLATE.replace("{website}", website);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichError::RateLimited);
        }
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: format!("chat completion for {website}"),
                source: e,
            })?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(parse_location_answer(&answer))
    }
}
