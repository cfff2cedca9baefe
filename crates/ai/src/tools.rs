//! Tools the chat flow can hand to the model.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use brujula_inventory::{InventoryTool, ProductCatalog};

use crate::model::ToolDeclaration;

/// A callable tool. Calls always produce text for the model; failures are
/// rendered into that text rather than raised.
#[async_trait]
pub trait ChatTool: Send + Sync {
    fn declaration(&self) -> ToolDeclaration;

    async fn call(&self, args: &JsonValue) -> String;
}

#[async_trait]
impl<C: ProductCatalog + 'static> ChatTool for InventoryTool<C> {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.input_schema(),
        }
    }

    /// A missing `query` argument searches with an empty query (fallback tier).
    async fn call(&self, args: &JsonValue) -> String {
        let query = args.get("query").and_then(JsonValue::as_str).unwrap_or_default();
        self.run(query).await
    }
}
