//! Search domains: the filter language of the ERP's `search` method.
//!
//! A domain is a list of `[field, operator, value]` triplets that the ERP
//! AND-s together. [`SearchDomain`] serializes to exactly that shape, so the
//! JSON rendering doubles as a readable form in logs and tests.

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::product::ProductType;

/// Comparison operator of a domain clause.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    In,
    /// Case-insensitive substring match.
    Ilike,
    Gt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::In => "in",
            Operator::Ilike => "ilike",
            Operator::Gt => ">",
        }
    }
}

/// Right-hand side of a domain clause.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<DomainValue>),
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        DomainValue::Str(value.to_string())
    }
}

impl From<String> for DomainValue {
    fn from(value: String) -> Self {
        DomainValue::Str(value)
    }
}

impl From<i64> for DomainValue {
    fn from(value: i64) -> Self {
        DomainValue::Int(value)
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        DomainValue::Float(value)
    }
}

impl Serialize for DomainValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DomainValue::Int(v) => serializer.serialize_i64(*v),
            DomainValue::Float(v) => serializer.serialize_f64(*v),
            DomainValue::Str(v) => serializer.serialize_str(v),
            DomainValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// One `[field, operator, value]` triplet.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub value: DomainValue,
}

impl Clause {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<DomainValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.field)?;
        seq.serialize_element(self.operator.as_str())?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

/// Conjunctive filter over the product catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchDomain {
    clauses: Vec<Clause>,
}

impl SearchDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause (builder style).
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// `type in ['product', 'consu']`.
    pub fn sellable_types() -> Clause {
        let types = ProductType::SELLABLE
            .iter()
            .map(|t| DomainValue::from(t.as_str()))
            .collect();
        Clause::new("type", Operator::In, DomainValue::List(types))
    }

    /// `name ilike <term>`.
    pub fn name_contains(term: &str) -> Clause {
        Clause::new("name", Operator::Ilike, term)
    }

    /// `qty_available > 0`.
    pub fn in_stock() -> Clause {
        Clause::new("qty_available", Operator::Gt, 0_i64)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl Serialize for SearchDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.clauses.len()))?;
        for clause in &self.clauses {
            seq.serialize_element(clause)?;
        }
        seq.end()
    }
}
