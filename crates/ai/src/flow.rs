//! The "La Brújula" chat flow.
//!
//! One or two model calls per request:
//! 1. generate with the system instructions (and the tools, in inventory context);
//! 2. if the model asked for a tool, run it and generate again with its output.
//!
//! There is a single tool round. A model that asks for a second one gets an error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AiError;
use crate::model::{ChatMessage, GenerateRequest, LanguageModel, ModelReply, ToolCall, Turn};
use crate::tools::ChatTool;

const PERSONA: &str = "Eres 'La Brújula', el asistente personal del equipo para gestionar el \
     ecosistema de proyectos y el negocio de repuestos. ";

const INVENTORY_INSTRUCTIONS: &str = "Actúa como experto en el inventario de RepuestosMOM. \
     Responde de forma clara y ejecutiva. Para cualquier pregunta de stock, disponibilidad o \
     precios usa la herramienta de búsqueda de inventario y basa tu respuesta solo en su \
     resultado; nunca inventes productos. Si el resultado indica que no hubo coincidencia \
     exacta, dilo explícitamente antes de sugerir alternativas.";

const PROJECT_INSTRUCTIONS: &str =
    "Ofrece consejos sobre gestión de proyectos y prioridades Scrum.";

/// Which assistant persona a request wants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContextType {
    /// Inventory expert for the spare-parts business (`context_type: "MOM"`).
    Inventory,
    /// Project management / Scrum advice (anything else).
    Projects,
}

impl ContextType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("MOM") => ContextType::Inventory,
            _ => ContextType::Projects,
        }
    }

    pub fn system_instructions(&self) -> String {
        let extra = match self {
            ContextType::Inventory => INVENTORY_INSTRUCTIONS,
            ContextType::Projects => PROJECT_INSTRUCTIONS,
        };
        format!("{PERSONA}{extra}")
    }
}

/// Input of one chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    pub prompt: String,
    #[serde(default)]
    pub context_type: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl ChatInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context_type: None,
            history: Vec::new(),
        }
    }

    pub fn with_context(mut self, context_type: impl Into<String>) -> Self {
        self.context_type = Some(context_type.into());
        self
    }
}

pub struct ChatFlow {
    model: Arc<dyn LanguageModel>,
    tools: Vec<Arc<dyn ChatTool>>,
}

impl ChatFlow {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            tools: Vec::new(),
        }
    }

    /// Register a tool offered to the model in inventory context.
    pub fn with_tool(mut self, tool: Arc<dyn ChatTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub async fn run(&self, input: &ChatInput) -> Result<String, AiError> {
        let prompt = input.prompt.trim();
        if prompt.is_empty() {
            return Err(AiError::InvalidInput("prompt cannot be empty".to_string()));
        }

        let context = ContextType::parse(input.context_type.as_deref());
        info!(?context, history = input.history.len(), "chat flow started");

        let mut request = input
            .history
            .iter()
            .fold(
                GenerateRequest::new(context.system_instructions()),
                |req, message| req.with_turn(Turn::from(message)),
            )
            .with_turn(Turn::User(prompt.to_string()));

        if context == ContextType::Inventory {
            for tool in &self.tools {
                request = request.with_tool(tool.declaration());
            }
        }

        let call = match self.model.generate(&request).await? {
            ModelReply::Text(text) => {
                info!("chat flow answered without tools");
                return Ok(text);
            }
            ModelReply::ToolCall(call) => call,
        };

        let output = self.call_tool(&request, &call).await?;
        let request = request
            .with_turn(Turn::ToolCall(call.clone()))
            .with_turn(Turn::ToolResult {
                name: call.name.clone(),
                output,
            });

        match self.model.generate(&request).await? {
            ModelReply::Text(text) => {
                info!(tool = %call.name, "chat flow answered after tool round");
                Ok(text)
            }
            ModelReply::ToolCall(second) => {
                warn!(tool = %second.name, "model requested a second tool round");
                Err(AiError::InferenceFailed(format!(
                    "model requested another tool call ({}) after a tool round",
                    second.name
                )))
            }
        }
    }

    async fn call_tool(&self, request: &GenerateRequest, call: &ToolCall) -> Result<String, AiError> {
        // Only tools that were actually offered may be called.
        let offered = request.tools.iter().any(|t| t.name == call.name);
        let tool = self
            .tools
            .iter()
            .find(|t| offered && t.declaration().name == call.name)
            .ok_or_else(|| {
                AiError::InferenceFailed(format!("model requested unknown tool {}", call.name))
            })?;

        info!(tool = %call.name, args = %call.args, "running tool");
        Ok(tool.call(&call.args).await)
    }
}
