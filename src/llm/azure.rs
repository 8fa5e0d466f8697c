use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument};

use super::{parse_estimate, EstimateError, NutritionEstimate, NutritionEstimator};
use crate::config::LlmConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

const PROMPT_TEMPLATE: &str = "\
Analyse the nutrition of the food described below.
Answer with one JSON object with the numeric keys \"calorie\" (kcal), \
\"carbohydrate\" (g), \"protein\" (g) and \"fat\" (g) for the whole amount described.
For example \"ate 2 pork cutlets\" gives {\"calorie\": 1400, \"carbohydrate\": 50, \"protein\": 90, \"fat\": 60}.

Food: ";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completions client for an Azure OpenAI deployment.
#[derive(Clone)]
pub struct AzureOpenAiEstimator {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
}

impl AzureOpenAiEstimator {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: completions_url(cfg),
            api_key: cfg.api_key.clone(),
            temperature: cfg.temperature,
        })
    }
}

fn completions_url(cfg: &LlmConfig) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        cfg.endpoint.trim_end_matches('/'),
        cfg.deployment,
        cfg.api_version
    )
}

fn build_request(description: &str, temperature: f32) -> ChatRequest<'static> {
    ChatRequest {
        messages: vec![ChatMessage {
            role: "user",
            content: format!("{PROMPT_TEMPLATE}{}", description.trim()),
        }],
        temperature,
        response_format: json!({ "type": "json_object" }),
    }
}

#[async_trait]
impl NutritionEstimator for AzureOpenAiEstimator {
    #[instrument(skip(self))]
    async fn estimate(&self, description: &str) -> Result<NutritionEstimate, EstimateError> {
        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&build_request(description, self.temperature))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to reach model");
                EstimateError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EstimateError::Transport(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(EstimateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| EstimateError::Parse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EstimateError::Parse("model returned no content".into()))?;
        debug!(%content, "model output");

        parse_estimate(description, &content)
    }
}
