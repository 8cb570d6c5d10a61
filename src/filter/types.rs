use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Column equals the value
    #[serde(rename = "$eq")] Eq,
    /// Column is one of the values
    #[serde(rename = "$in")] In,
    /// Row is linked to at least one of the given ids through a relation
    #[serde(rename = "$any")] Any,
    /// Row is linked to at least one row through a relation
    #[serde(rename = "$linked")] Linked,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// A many-to-many join table seen from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub table: &'static str,
    /// Column holding the id of the row being filtered
    pub source: &'static str,
    /// Column holding the id on the other side
    pub target: &'static str,
}

const LINKS: &[(&str, &str, Link)] = &[
    ("recipes", "tags", Link { table: "recipe_tags", source: "recipe_id", target: "tag_id" }),
    ("recipes", "ingredients", Link { table: "recipe_ingredients", source: "recipe_id", target: "ingredient_id" }),
    ("tags", "recipes", Link { table: "recipe_tags", source: "tag_id", target: "recipe_id" }),
    ("ingredients", "recipes", Link { table: "recipe_ingredients", source: "ingredient_id", target: "recipe_id" }),
];

pub fn link_for(table: &str, relation: &str) -> Option<Link> {
    LINKS
        .iter()
        .find(|(t, r, _)| *t == table && *r == relation)
        .map(|(_, _, link)| *link)
}

/// Row access used when a filter is evaluated outside of SQL.
pub trait FilterTarget {
    /// Plain column value, `None` when the column does not exist
    fn column(&self, name: &str) -> Option<Value>;

    /// Ids on the other side of a many-to-many relation
    fn linked_ids(&self, relation: &str) -> Vec<i64>;
}
