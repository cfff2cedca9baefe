//! Provider-neutral generation request/response types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AiError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One prior message of the conversation, as sent by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// A tool the model may ask to invoke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: JsonValue,
}

/// The model's request to run a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: JsonValue,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    Model(String),
    ToolCall(ToolCall),
    ToolResult { name: String, output: String },
}

impl From<&ChatMessage> for Turn {
    fn from(message: &ChatMessage) -> Self {
        match message.role {
            Role::User => Turn::User(message.content.clone()),
            Role::Model => Turn::Model(message.content.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system: String,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolDeclaration>,
}

impl GenerateRequest {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            turns: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn with_tool(mut self, tool: ToolDeclaration) -> Self {
        self.tools.push(tool);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    ToolCall(ToolCall),
}

/// A hosted generative model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelReply, AiError>;
}
