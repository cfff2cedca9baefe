//! Product catalog seam.
//!
//! The ERP's RPC contract is a two-step protocol: `search` returns ids for a
//! domain, `read` returns the requested fields for those ids. The engine only
//! depends on this trait, so the XML-RPC client, the in-memory demo catalog and
//! test doubles are interchangeable.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use brujula_core::{Clause, DomainValue, HubResult, Operator, Product, ProductId, SearchDomain};

/// Read-only access to the ERP product catalog (`product.product`).
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Ids of the products matching `domain`, at most `limit`, optionally ordered
    /// server-side (`"qty_available desc"`).
    async fn search(
        &self,
        domain: &SearchDomain,
        limit: usize,
        order: Option<&str>,
    ) -> HubResult<Vec<ProductId>>;

    /// Product rows for `ids`. Implementations must return `[]` for an empty id
    /// list without contacting the ERP.
    async fn read(&self, ids: &[ProductId], fields: &[&str]) -> HubResult<Vec<Product>>;
}

/// Type-erased catalog shared across request handlers.
pub type SharedCatalog = Arc<dyn ProductCatalog>;

#[async_trait]
impl<T: ProductCatalog + ?Sized> ProductCatalog for Arc<T> {
    async fn search(
        &self,
        domain: &SearchDomain,
        limit: usize,
        order: Option<&str>,
    ) -> HubResult<Vec<ProductId>> {
        (**self).search(domain, limit, order).await
    }

    async fn read(&self, ids: &[ProductId], fields: &[&str]) -> HubResult<Vec<Product>> {
        (**self).read(ids, fields).await
    }
}

/// In-memory catalog (dev/test).
///
/// Evaluates domains locally with the same semantics the ERP applies to the
/// operators the search heuristic emits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    fn matches(product: &Product, domain: &SearchDomain) -> bool {
        domain.clauses().iter().all(|clause| clause_matches(product, clause))
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn search(
        &self,
        domain: &SearchDomain,
        limit: usize,
        order: Option<&str>,
    ) -> HubResult<Vec<ProductId>> {
        let mut hits: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| Self::matches(p, domain))
            .collect();

        if let Some(order) = order {
            apply_order(&mut hits, order);
        }

        Ok(hits.into_iter().take(limit).map(|p| p.id).collect())
    }

    async fn read(&self, ids: &[ProductId], _fields: &[&str]) -> HubResult<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.iter().find(|p| p.id == *id).cloned())
            .collect())
    }
}

fn apply_order(hits: &mut [&Product], order: &str) {
    let mut parts = order.split_whitespace();
    let field = parts.next().unwrap_or_default();
    let descending = parts
        .next()
        .is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));

    let key = |p: &Product| -> f64 {
        match field {
            "qty_available" => p.qty_available,
            "list_price" => p.list_price,
            _ => p.id.get() as f64,
        }
    };

    hits.sort_by(|a, b| {
        let ord = key(a).total_cmp(&key(b));
        if descending { ord.reverse() } else { ord }
    });
}

fn clause_matches(product: &Product, clause: &Clause) -> bool {
    match clause.field.as_str() {
        "name" => text_matches(&product.name, clause.operator, &clause.value),
        "type" => text_matches(product.product_type.as_str(), clause.operator, &clause.value),
        "qty_available" => number_matches(product.qty_available, clause.operator, &clause.value),
        "list_price" => number_matches(product.list_price, clause.operator, &clause.value),
        "id" => number_matches(product.id.get() as f64, clause.operator, &clause.value),
        _ => false,
    }
}

fn text_matches(actual: &str, op: Operator, value: &DomainValue) -> bool {
    match (op, value) {
        (Operator::Eq, DomainValue::Str(expected)) => actual == expected,
        (Operator::Ilike, DomainValue::Str(needle)) => {
            actual.to_lowercase().contains(&needle.to_lowercase())
        }
        (Operator::In, DomainValue::List(options)) => options
            .iter()
            .any(|o| matches!(o, DomainValue::Str(s) if s == actual)),
        _ => false,
    }
}

fn number_matches(actual: f64, op: Operator, value: &DomainValue) -> bool {
    let expected = match value {
        DomainValue::Int(v) => *v as f64,
        DomainValue::Float(v) => *v,
        DomainValue::List(options) if op == Operator::In => {
            return options.iter().any(|o| match o {
                DomainValue::Int(v) => *v as f64 == actual,
                DomainValue::Float(v) => *v == actual,
                _ => false,
            });
        }
        _ => return false,
    };

    match op {
        Operator::Eq => actual.total_cmp(&expected) == Ordering::Equal,
        Operator::Gt => actual > expected,
        _ => false,
    }
}
