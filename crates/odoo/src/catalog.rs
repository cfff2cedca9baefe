//! `product.product` as a [`ProductCatalog`].

use std::collections::BTreeMap;

use async_trait::async_trait;

use brujula_core::{HubResult, Product, ProductId, ProductType, SearchDomain};
use brujula_inventory::ProductCatalog;

use crate::client::RpcError;
use crate::session::OdooSession;
use crate::xmlrpc::Value;

/// Product variants hold the actual stock (templates do not).
pub const PRODUCT_MODEL: &str = "product.product";

#[async_trait]
impl ProductCatalog for OdooSession {
    async fn search(
        &self,
        domain: &SearchDomain,
        limit: usize,
        order: Option<&str>,
    ) -> HubResult<Vec<ProductId>> {
        let mut kwargs = BTreeMap::new();
        kwargs.insert(
            "limit".to_string(),
            Value::Int(i64::try_from(limit).unwrap_or(i64::MAX)),
        );
        if let Some(order) = order {
            kwargs.insert("order".to_string(), Value::from(order));
        }

        let value = self
            .execute(PRODUCT_MODEL, "search", vec![Value::from(domain)], kwargs)
            .await?;

        Ok(ids_from_value(&value)?)
    }

    async fn read(&self, ids: &[ProductId], fields: &[&str]) -> HubResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = ids.iter().map(|id| Value::Int(id.get())).collect();
        let fields = fields.iter().map(|f| Value::from(*f)).collect();
        let mut kwargs = BTreeMap::new();
        kwargs.insert("fields".to_string(), Value::Array(fields));

        let value = self
            .execute(PRODUCT_MODEL, "read", vec![Value::Array(ids)], kwargs)
            .await?;

        let rows = value
            .as_array()
            .ok_or_else(|| RpcError::UnexpectedShape("read did not return a list".to_string()))?;
        Ok(rows
            .iter()
            .map(product_from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn ids_from_value(value: &Value) -> Result<Vec<ProductId>, RpcError> {
    let items = value
        .as_array()
        .ok_or_else(|| RpcError::UnexpectedShape("search did not return a list".to_string()))?;
    items
        .iter()
        .map(|v| {
            v.as_i64()
                .map(ProductId::new)
                .ok_or_else(|| RpcError::UnexpectedShape(format!("non-integer id {v:?}")))
        })
        .collect()
}

fn product_from_record(record: &Value) -> Result<Product, RpcError> {
    let id = record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| RpcError::UnexpectedShape("record without id".to_string()))?;

    // Odoo sends `false` for empty fields.
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let qty_available = record
        .get("qty_available")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let list_price = record
        .get("list_price")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let product_type = record
        .get("type")
        .and_then(Value::as_str)
        .map(ProductType::parse)
        .unwrap_or(ProductType::Other);

    Ok(Product::new(id, name, qty_available, list_price, product_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_false_fields_maps_to_defaults() {
        let mut members = BTreeMap::new();
        members.insert("id".to_string(), Value::Int(9));
        members.insert("name".to_string(), Value::Bool(false));
        members.insert("qty_available".to_string(), Value::Int(4));
        members.insert("type".to_string(), Value::from("product"));

        let product = product_from_record(&Value::Struct(members)).unwrap();
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.name, "");
        assert_eq!(product.qty_available, 4.0);
        assert_eq!(product.list_price, 0.0);
        assert_eq!(product.product_type, ProductType::Product);
    }

    #[test]
    fn non_integer_ids_are_rejected() {
        let value = Value::Array(vec![Value::Int(1), Value::from("2")]);
        assert!(matches!(
            ids_from_value(&value),
            Err(RpcError::UnexpectedShape(_))
        ));
    }
}
