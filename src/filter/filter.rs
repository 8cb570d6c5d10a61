use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{link_for, FilterOp, FilterOrderInfo, FilterTarget, FilterWhereInfo, SqlResult};

/// Query specification for one table: AND-combined conditions, ordering and paging.
///
/// Built by consuming steps and handed to a store once; stores either render it
/// to SQL (`to_sql`) or evaluate it over rows they hold (`apply`).
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Result<Self, FilterError> {
        Self::validate_column(column)?;
        self.conditions.push(FilterWhereInfo {
            column: column.to_string(),
            operator: FilterOp::Eq,
            data: value.into(),
        });
        Ok(self)
    }

    pub fn where_in(mut self, column: &str, ids: &[i64]) -> Result<Self, FilterError> {
        Self::validate_column(column)?;
        self.conditions.push(FilterWhereInfo {
            column: column.to_string(),
            operator: FilterOp::In,
            data: Value::from(ids.to_vec()),
        });
        Ok(self)
    }

    /// Keep rows linked through `relation` to any of `ids`.
    pub fn where_any(mut self, relation: &str, ids: &[i64]) -> Result<Self, FilterError> {
        self.validate_relation(relation)?;
        self.conditions.push(FilterWhereInfo {
            column: relation.to_string(),
            operator: FilterOp::Any,
            data: Value::from(ids.to_vec()),
        });
        Ok(self)
    }

    /// Keep rows linked through `relation` to at least one row.
    pub fn where_linked(mut self, relation: &str) -> Result<Self, FilterError> {
        self.validate_relation(relation)?;
        self.conditions.push(FilterWhereInfo {
            column: relation.to_string(),
            operator: FilterOp::Linked,
            data: Value::Null,
        });
        Ok(self)
    }

    pub fn order(mut self, order: Vec<FilterOrderInfo>) -> Result<Self, FilterError> {
        for info in &order {
            Self::validate_column(&info.column)?;
        }
        self.order_data = order;
        Ok(self)
    }

    pub fn limit(mut self, limit: Option<i64>, offset: Option<i64>) -> Result<Self, FilterError> {
        if let Some(l) = limit { if l < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); } }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit.unwrap_or(i64::MAX);
        self.limit = limit.map(|l| {
            if l > max_limit {
                if crate::config::CONFIG.filter.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, max_limit);
                }
                max_limit
            } else {
                l
            }
        });
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self, select_clause: &str) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.table_name, &self.conditions, 0)?;
        let order_clause = FilterOrder::generate(&self.table_name, &self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn matches<T: FilterTarget>(&self, row: &T) -> bool {
        FilterWhere::matches(&self.conditions, row)
    }

    /// In-process equivalent of running `to_sql`: filter, sort, then page.
    pub fn apply<T: FilterTarget>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut matched: Vec<T> = rows.into_iter().filter(|row| self.matches(row)).collect();
        matched.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let limit = self.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        matched.into_iter().skip(offset).take(limit).collect()
    }

    fn validate_relation(&self, relation: &str) -> Result<(), FilterError> {
        if link_for(&self.table_name, relation).is_none() {
            return Err(FilterError::UnknownRelation {
                table: self.table_name.clone(),
                relation: relation.to_string(),
            });
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() { return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string())); }
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        if column.is_empty() { return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string())); }
        if !Self::is_identifier(column) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
