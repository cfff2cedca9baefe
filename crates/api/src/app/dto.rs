use serde::{Deserialize, Serialize};

use brujula_core::Product;
use brujula_inventory::{MatchTier, SearchResult};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct InventorySearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct HighlightsQuery {
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Grounding text, exactly as the model receives it.
#[derive(Debug, Serialize)]
pub struct ToolTextResponse {
    pub text: String,
}

/// Structured search outcome for the dashboard.
#[derive(Debug, Serialize)]
pub struct InventorySearchResponse {
    pub query: String,
    pub match_tier: MatchTier,
    pub elapsed_ms: u64,
    pub products: Vec<Product>,
}

impl InventorySearchResponse {
    pub fn new(query: String, result: SearchResult) -> Self {
        Self {
            query,
            match_tier: result.match_tier,
            elapsed_ms: result.elapsed_ms,
            products: result.products,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighlightsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub result: String,
}
