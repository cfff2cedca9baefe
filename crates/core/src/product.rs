//! Product record as read from the ERP catalog.

use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Odoo product type.
///
/// Only `product` (storable) and `consu` (consumable) are sellable stock;
/// services never show up in inventory answers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Product,
    Consu,
    Service,
    Combo,
    #[serde(other)]
    Other,
}

impl ProductType {
    /// The types every search tier is restricted to.
    pub const SELLABLE: [ProductType; 2] = [ProductType::Product, ProductType::Consu];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Product => "product",
            ProductType::Consu => "consu",
            ProductType::Service => "service",
            ProductType::Combo => "combo",
            ProductType::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "product" => ProductType::Product,
            "consu" => ProductType::Consu,
            "service" => ProductType::Service,
            "combo" => ProductType::Combo,
            _ => ProductType::Other,
        }
    }

    pub fn is_sellable(&self) -> bool {
        Self::SELLABLE.contains(self)
    }
}

/// A `product.product` row. Owned by the ERP; never created or mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub qty_available: f64,
    pub list_price: f64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

impl Product {
    /// Fields requested by every `read` call.
    pub const READ_FIELDS: [&'static str; 4] = ["name", "qty_available", "list_price", "type"];

    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        qty_available: f64,
        list_price: f64,
        product_type: ProductType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            qty_available,
            list_price,
            product_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_deserializes_as_other() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Kit",
            "qty_available": 1.0,
            "list_price": 2.0,
            "type": "bundle"
        }))
        .unwrap();
        assert_eq!(p.product_type, ProductType::Other);
        assert!(!p.product_type.is_sellable());
    }

    #[test]
    fn sellable_types_are_product_and_consu() {
        assert!(ProductType::parse("product").is_sellable());
        assert!(ProductType::parse("consu").is_sellable());
        assert!(!ProductType::parse("service").is_sellable());
    }
}
