//! Filter/order/limit description shared by every gateway implementation.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Posts,
    Moods,
    WritingPrompts,
    Photos,
    Ideas,
}

impl Entity {
    pub fn table(self) -> &'static str {
        match self {
            Entity::Posts => "posts",
            Entity::Moods => "moods",
            Entity::WritingPrompts => "writing_prompts",
            Entity::Photos => "photos",
            Entity::Ideas => "ideas",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    /// PostgREST operator prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Whether `record` passes this filter. Missing columns never match.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = record.get(&self.column) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => compare(actual, &self.value) == Some(Ordering::Equal),
            FilterOp::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// A list request: every filter must pass, orders apply left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filter(mut self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Compare two records by this query's ordering.
    pub fn cmp_records(&self, a: &Value, b: &Value) -> Ordering {
        for order in &self.order {
            let left = a.get(&order.column).unwrap_or(&Value::Null);
            let right = b.get(&order.column).unwrap_or(&Value::Null);
            let ord = compare(left, right).unwrap_or(Ordering::Equal);
            let ord = if order.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Filter, sort and truncate an in-memory table.
    pub fn apply<'a>(&self, records: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        let mut rows: Vec<Value> = records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| self.cmp_records(a, b));
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Render a filter value the way it appears in a PostgREST query string.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Order JSON scalars of the same type. Nulls sort first; mixed types and
/// containers are incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        // Ids travel as strings but may be stored as numbers.
        (Value::Number(x), Value::String(y)) | (Value::String(y), Value::Number(x))
            if x.to_string() == *y =>
        {
            Some(Ordering::Equal)
        }
        _ => None,
    }
}
