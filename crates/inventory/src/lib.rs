//! Inventory search heuristic.
//!
//! Turns a free-text question ("¿tienes pastillas de freno?") into a short,
//! ranked product list and a grounding text an LLM can rely on. The crate does
//! no IO of its own: the ERP is reached through the [`ProductCatalog`] seam,
//! implemented over XML-RPC in `brujula-odoo` and in memory for dev/tests.

pub mod catalog;
pub mod grounding;
pub mod normalize;
pub mod search;
pub mod tool;

pub use catalog::{InMemoryCatalog, ProductCatalog, SharedCatalog};
pub use grounding::{FALLBACK_WARNING_MARKER, render_grounding};
pub use normalize::{Terms, clean_query, normalize};
pub use search::{FALLBACK_ORDER, MatchTier, RESULT_LIMIT, SearchResult, TieredSearch};
pub use tool::{InventoryTool, TOOL_NAME, UPSTREAM_ERROR_PREFIX};
