//! `brujula-ai`
//!
//! **Responsibility:** the conversational layer.
//!
//! - Builds the system instructions for the requested context.
//! - Calls a hosted LLM through the [`LanguageModel`] seam.
//! - Runs at most one tool round (the inventory search) and feeds the tool
//!   output back for the final answer.
//!
//! The LLM call itself is an external collaborator; this crate never touches
//! the ERP directly, only through the tools it is given.

pub mod error;
pub mod flow;
pub mod gemini;
pub mod model;
pub mod tools;

pub use error::AiError;
pub use flow::{ChatFlow, ChatInput, ContextType};
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{ChatMessage, GenerateRequest, LanguageModel, ModelReply, Role, ToolCall, ToolDeclaration, Turn};
pub use tools::ChatTool;
