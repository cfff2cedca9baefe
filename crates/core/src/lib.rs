//! `brujula-core`: shared vocabulary for the inventory assistant.
//!
//! This crate contains **pure** types (no IO): the product record as the ERP
//! exposes it, the search domain language, identifiers and the error model.

pub mod domain;
pub mod error;
pub mod id;
pub mod product;

pub use domain::{Clause, DomainValue, Operator, SearchDomain};
pub use error::{ErrorKind, HubError, HubResult};
pub use id::{ErpUid, ProductId};
pub use product::{Product, ProductType};
