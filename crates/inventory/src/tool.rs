//! The inventory search as an LLM-callable tool.

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::error;

use crate::catalog::ProductCatalog;
use crate::grounding::render_grounding;
use crate::search::TieredSearch;

pub const TOOL_NAME: &str = "searchInventory";

/// Prefix of the text returned instead of a grounding when the ERP is unreachable.
pub const UPSTREAM_ERROR_PREFIX: &str = "Error connecting to inventory";

const TOOL_DESCRIPTION: &str = "Searches the RepuestosMOM inventory (Odoo) for spare parts by \
     name and returns stock and price for up to 5 products. Use it whenever the user asks about \
     availability, stock or prices.";

/// Wraps the search engine and always answers with text.
///
/// Upstream failures become a readable error line so the conversation can
/// still produce a reply.
pub struct InventoryTool<C> {
    engine: Arc<TieredSearch<C>>,
}

impl<C> Clone for InventoryTool<C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<C: ProductCatalog> InventoryTool<C> {
    pub fn new(engine: Arc<TieredSearch<C>>) -> Self {
        Self { engine }
    }

    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// JSON schema of the tool input: `{ "query": string }`.
    pub fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Product name or keywords, e.g. \"Radiador Corsa\""
                }
            },
            "required": ["query"]
        })
    }

    pub async fn run(&self, query: &str) -> String {
        match self.engine.search(query).await {
            Ok(result) => render_grounding(query, &result),
            Err(e) => {
                error!(query, error = %e, "inventory tool failed");
                format!("{UPSTREAM_ERROR_PREFIX}: {}", e.message())
            }
        }
    }
}
