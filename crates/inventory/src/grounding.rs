//! Grounding text for the LLM prompt.
//!
//! The text is opaque once produced: it is prompt context, not a payload
//! anyone parses. The one hard rule is that fallback products are never
//! presented as answers to the user's question.

use std::fmt::Write as _;

use brujula_core::Product;

use crate::search::{MatchTier, SearchResult};

/// Leading marker of every fallback grounding text.
pub const FALLBACK_WARNING_MARKER: &str = "WARNING: NO EXACT MATCH";

/// Render `result` for the query the user actually typed.
pub fn render_grounding(query: &str, result: &SearchResult) -> String {
    if result.products.is_empty() {
        return format!(
            "No products found in inventory for \"{query}\" (search took {} ms).",
            result.elapsed_ms
        );
    }

    let mut out = String::new();
    match result.match_tier {
        MatchTier::Fallback => {
            let _ = writeln!(
                out,
                "{FALLBACK_WARNING_MARKER} for \"{query}\". These are the best-stocked products, \
                 listed for reference only ({} ms):",
                result.elapsed_ms
            );
            push_bullets(&mut out, &result.products);
            let _ = write!(
                out,
                "IMPORTANT: do not present these products as matching \"{query}\". \
                 Tell the user no exact match was found and offer them as alternatives."
            );
        }
        MatchTier::Exact | MatchTier::Partial => {
            let _ = writeln!(
                out,
                "Found {} product(s) for \"{query}\" ({} match, {} ms):",
                result.products.len(),
                result.match_tier.as_str(),
                result.elapsed_ms
            );
            push_bullets(&mut out, &result.products);
            trim_trailing_newline(&mut out);
        }
    }
    out
}

fn push_bullets(out: &mut String, products: &[Product]) {
    for p in products {
        let _ = writeln!(
            out,
            "- {}: {} units (${})",
            p.name,
            format_number(p.qty_available),
            format_number(p.list_price)
        );
    }
}

fn trim_trailing_newline(out: &mut String) {
    if out.ends_with('\n') {
        out.pop();
    }
}

// Whole quantities/prices print without a decimal part ("24", not "24.0").
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}
