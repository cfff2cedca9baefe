//! Tiered product search.
//!
//! Escalation per query, stopping at the first tier that yields products:
//!
//! 1. `Exact`:    every term must appear in the name (AND).
//! 2. `Partial`:  the single longest term must appear in the name.
//! 3. `Fallback`: best-stocked products, no name constraint.
//!
//! Tiers 1 and 2 are skipped when the query produced no terms. Every tier is
//! restricted to sellable product types. A remote failure at any point aborts
//! the whole search; no partial list is ever returned.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use brujula_core::{HubError, HubResult, Product, ProductId, SearchDomain};

use crate::catalog::ProductCatalog;
use crate::normalize::{Terms, normalize};

/// Maximum number of products any tier returns.
pub const RESULT_LIMIT: usize = 5;

/// Server-side order requested for the fallback tier.
pub const FALLBACK_ORDER: &str = "qty_available desc";

const MAX_HIGHLIGHTS: usize = 50;

/// Which tier produced a [`SearchResult`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchTier {
    Exact,
    Partial,
    Fallback,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Partial => "partial",
            MatchTier::Fallback => "fallback",
        }
    }
}

/// Outcome of one search. Built fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub match_tier: MatchTier,
    pub elapsed_ms: u64,
}

/// The tiered search engine over an injected catalog.
#[derive(Debug, Clone)]
pub struct TieredSearch<C> {
    catalog: C,
}

impl<C: ProductCatalog> TieredSearch<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// `type in [product, consu]` followed by one `name ilike` clause per term, in order.
    pub fn exact_domain(terms: &Terms) -> SearchDomain {
        terms
            .iter()
            .fold(SearchDomain::new().and(SearchDomain::sellable_types()), |domain, term| {
                domain.and(SearchDomain::name_contains(term))
            })
    }

    pub fn partial_domain(term: &str) -> SearchDomain {
        SearchDomain::new()
            .and(SearchDomain::sellable_types())
            .and(SearchDomain::name_contains(term))
    }

    pub fn fallback_domain() -> SearchDomain {
        SearchDomain::new()
            .and(SearchDomain::in_stock())
            .and(SearchDomain::sellable_types())
    }

    /// Normalize `query` and run the tiers.
    pub async fn search(&self, query: &str) -> HubResult<SearchResult> {
        let terms = normalize(query);
        debug!(query, terms = ?terms, "normalized inventory query");
        self.run_tiers(query, &terms).await
    }

    async fn run_tiers(&self, query: &str, terms: &Terms) -> HubResult<SearchResult> {
        let started = Instant::now();

        for (tier, domain) in Self::plan(terms) {
            let products = match self.run_tier(tier, &domain, RESULT_LIMIT).await {
                Ok(products) => products,
                Err(e) => {
                    warn!(
                        query,
                        terms = ?terms,
                        tier = tier.as_str(),
                        elapsed_ms = elapsed_ms(started),
                        error = %e,
                        "inventory search aborted"
                    );
                    return Err(e);
                }
            };

            if !products.is_empty() {
                return Ok(finish(terms, tier, products, started));
            }
            debug!(tier = tier.as_str(), "tier returned no products");
        }

        Ok(finish(terms, MatchTier::Fallback, Vec::new(), started))
    }

    /// Best-stocked sellable products ("productos estrella").
    pub async fn highlights(&self, limit: usize) -> HubResult<Vec<Product>> {
        if limit == 0 || limit > MAX_HIGHLIGHTS {
            return Err(HubError::validation(format!(
                "limit must be between 1 and {MAX_HIGHLIGHTS}"
            )));
        }
        self.run_tier(MatchTier::Fallback, &Self::fallback_domain(), limit)
            .await
    }

    fn plan(terms: &Terms) -> Vec<(MatchTier, SearchDomain)> {
        let mut plan = Vec::with_capacity(3);
        if let Some(longest) = terms.longest() {
            plan.push((MatchTier::Exact, Self::exact_domain(terms)));
            plan.push((MatchTier::Partial, Self::partial_domain(longest)));
        }
        plan.push((MatchTier::Fallback, Self::fallback_domain()));
        plan
    }

    async fn run_tier(
        &self,
        tier: MatchTier,
        domain: &SearchDomain,
        limit: usize,
    ) -> HubResult<Vec<Product>> {
        let order = (tier == MatchTier::Fallback).then_some(FALLBACK_ORDER);
        let ids = self.catalog.search(domain, limit, order).await?;

        let mut products = self.read(&ids).await?;
        products.truncate(limit);

        if tier == MatchTier::Fallback {
            products.sort_by(|a, b| b.qty_available.total_cmp(&a.qty_available));
        }
        Ok(products)
    }

    async fn read(&self, ids: &[ProductId]) -> HubResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.catalog.read(ids, &Product::READ_FIELDS).await
    }
}

fn finish(terms: &Terms, tier: MatchTier, products: Vec<Product>, started: Instant) -> SearchResult {
    let result = SearchResult {
        products,
        match_tier: tier,
        elapsed_ms: elapsed_ms(started),
    };
    info!(
        terms = ?terms,
        tier = tier.as_str(),
        hits = result.products.len(),
        elapsed_ms = result.elapsed_ms,
        "inventory search finished"
    );
    result
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
