//! Gemini `generateContent` client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::AiError;
use crate::model::{GenerateRequest, LanguageModel, ModelReply, ToolCall, ToolDeclaration, Turn};

#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Ok(None)` when `GEMINI_API_KEY` is not set.
    pub fn from_env() -> Result<Option<Self>, AiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Option<Self>, AiError> {
        let Some(api_key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };

        let mut config = Self::new(api_key.trim());
        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup("GEMINI_TIMEOUT_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|e| AiError::InvalidInput(format!("GEMINI_TIMEOUT_MS: {e}")))?;
            if ms == 0 {
                return Err(AiError::InvalidInput(
                    "GEMINI_TIMEOUT_MS must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_millis(ms);
        }
        Ok(Some(config))
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelReply, AiError> {
        let body = GeminiRequest::from(request);
        debug!(model = %self.config.model, turns = request.turns.len(), "gemini request");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::InferenceFailed(format!("gemini timed out after {:?}", self.config.timeout))
                } else {
                    AiError::InferenceFailed(format!("gemini request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini returned an error status");
            return Err(AiError::InferenceFailed(format!(
                "gemini returned HTTP {}: {}",
                status.as_u16(),
                api_error_message(&text)
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AiError::InferenceFailed(format!("malformed gemini response: {}", e.without_url())))?;
        parsed.into_reply()
    }
}

/// Pull `error.message` out of a Gemini error body, or fall back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: JsonValue,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: JsonValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<ToolDeclaration>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

impl Content {
    fn with_role(role: &str, part: Part) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![part],
        }
    }
}

impl From<&GenerateRequest> for GeminiRequest {
    fn from(request: &GenerateRequest) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| match turn {
                Turn::User(text) => Content::with_role("user", Part::text(text)),
                Turn::Model(text) => Content::with_role("model", Part::text(text)),
                Turn::ToolCall(call) => Content::with_role(
                    "model",
                    Part {
                        function_call: Some(FunctionCall {
                            name: call.name.clone(),
                            args: call.args.clone(),
                        }),
                        ..Part::default()
                    },
                ),
                Turn::ToolResult { name, output } => Content::with_role(
                    "user",
                    Part {
                        function_response: Some(FunctionResponse {
                            name: name.clone(),
                            response: serde_json::json!({ "result": output }),
                        }),
                        ..Part::default()
                    },
                ),
            })
            .collect();

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolSet {
                function_declarations: request.tools.clone(),
            }]
        };

        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(&request.system)],
            },
            contents,
            tools,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GeminiResponse {
    fn into_reply(self) -> Result<ModelReply, AiError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AiError::InferenceFailed("gemini returned no candidates".to_string()))?;

        let mut text = String::new();
        for part in candidate.content.parts {
            if let Some(call) = part.function_call {
                return Ok(ModelReply::ToolCall(ToolCall {
                    name: call.name,
                    args: call.args,
                }));
            }
            if let Some(chunk) = part.text {
                text.push_str(&chunk);
            }
        }
        Ok(ModelReply::Text(text))
    }
}
