//! Odoo adapter: XML-RPC transport, lazily authenticated session and the
//! [`ProductCatalog`](brujula_inventory::ProductCatalog) implementation backed
//! by `product.product`.

pub mod catalog;
pub mod client;
pub mod config;
pub mod session;
pub mod xmlrpc;

pub use catalog::PRODUCT_MODEL;
pub use client::{OdooClient, RpcError};
pub use config::{ConfigError, OdooConfig};
pub use session::OdooSession;
pub use xmlrpc::{Value, XmlRpcError};
