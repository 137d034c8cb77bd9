//! Immutable query descriptions.
//!
//! A query names one collection and one equality filter. It carries no
//! ordering or limit, so results come back in the service's natural order.

use serde_json::json;

use crate::document::{Document, Value};

/// Comparison applied by a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
}

impl FilterOp {
    /// Operator name in the REST API.
    pub fn as_wire(self) -> &'static str {
        match self {
            FilterOp::Equal => "EQUAL",
        }
    }
}

/// Single-field filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    /// Checks whether a document satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self.op {
            FilterOp::Equal => doc.field(&self.field) == Some(&self.value),
        }
    }
}

/// Collection-scoped query with one equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filter: Option<FieldFilter>,
}

impl Query {
    /// Starts a query over every document in `collection`.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: None,
        }
    }

    /// Restricts the query to documents where `field == value`.
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            filter: Some(FieldFilter {
                field: field.into(),
                op: FilterOp::Equal,
                value: value.into(),
            }),
            ..self
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection
    }

    pub fn filter(&self) -> Option<&FieldFilter> {
        self.filter.as_ref()
    }

    /// Checks whether a document in this query's collection is selected.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter.matches(doc))
    }

    /// Builds the `runQuery` request body.
    pub fn to_structured_query(&self) -> serde_json::Value {
        let mut structured = json!({
            "from": [{ "collectionId": self.collection }]
        });

        if let Some(filter) = &self.filter {
            structured["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": filter.op.as_wire(),
                    "value": filter.value.to_wire()
                }
            });
        }

        json!({ "structuredQuery": structured })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_query_body() {
        let query = Query::collection("words").where_eq("word", "tafel");

        assert_eq!(
            query.to_structured_query(),
            json!({
                "structuredQuery": {
                    "from": [{ "collectionId": "words" }],
                    "where": {
                        "fieldFilter": {
                            "field": { "fieldPath": "word" },
                            "op": "EQUAL",
                            "value": { "stringValue": "tafel" }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_unfiltered_query_has_no_where_clause() {
        let body = Query::collection("words").to_structured_query();

        assert!(body["structuredQuery"].get("where").is_none());
    }

    #[test]
    fn test_equality_matching_is_exact() {
        let query = Query::collection("words").where_eq("word", "huis");

        assert!(query.matches(&Document::new("a").with_field("word", "huis")));
        assert!(!query.matches(&Document::new("b").with_field("word", "Huis")));
        assert!(!query.matches(&Document::new("c").with_field("word", "huisje")));
        assert!(!query.matches(&Document::new("d").with_field("article", "huis")));
    }
}
