//! Query parameters accepted by the remote data service.
//!
//! Queries are a thin, serializable description: a conjunction of property
//! clauses plus an optional result limit. The remote service interprets them;
//! the client never filters fetch results locally (local filtering is the
//! filter/search engine's job and operates on already-synchronized state).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a [`WhereClause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhereOperator {
    /// Property equals the value.
    Eq,
    /// Property differs from the value.
    Ne,
    /// Property is strictly less than the value.
    Lt,
    /// Property is less than or equal to the value.
    Le,
    /// Property is strictly greater than the value.
    Gt,
    /// Property is greater than or equal to the value.
    Ge,
    /// Property is an array containing the value.
    ArrayContains,
    /// Property equals one of the values in the (array) value.
    In,
}

/// One conjunct of a query: `property <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Property path on the remote record.
    pub property: String,
    /// Comparison operator.
    pub operator: WhereOperator,
    /// Comparison value (JSON-typed, as the wire format carries it).
    pub value: Value,
}

/// Query parameters for `fetch_many`.
///
/// # Examples
///
/// ```
/// use fitsync_core::query::{Query, WhereOperator};
/// use serde_json::json;
///
/// let query = Query::new()
///     .filter("visibility", WhereOperator::Eq, json!("public"))
///     .with_limit(50);
/// assert_eq!(query.where_clauses.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Conjunction of property clauses; empty means "match everything".
    pub where_clauses: Vec<WhereClause>,
    /// Optional cap on the number of returned records.
    pub limit: Option<usize>,
}

impl Query {
    /// Query matching everything.
    #[must_use]
    pub const fn new() -> Self {
        Self { where_clauses: Vec::new(), limit: None }
    }

    /// Add a where clause.
    #[must_use]
    pub fn filter(mut self, property: impl Into<String>, operator: WhereOperator, value: Value) -> Self {
        self.where_clauses.push(WhereClause {
            property: property.into(),
            operator,
            value,
        });
        self
    }

    /// Cap the number of returned records.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
