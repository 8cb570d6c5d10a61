use serde_json::Value;

use super::error::FilterError;
use super::types::{link_for, FilterOp, FilterTarget, FilterWhereInfo};

pub struct FilterWhere<'a> {
    table_name: &'a str,
    param_values: Vec<Value>,
    param_index: usize,
}

impl<'a> FilterWhere<'a> {
    pub fn new(table_name: &'a str, starting_param_index: usize) -> Self {
        Self {
            table_name,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Render conditions as an AND-joined SQL predicate with positional parameters.
    /// An empty condition list renders as an empty string.
    pub fn generate(
        table_name: &str,
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = FilterWhere::new(table_name, starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let table = self.table_name;
        match condition.operator {
            FilterOp::Eq => {
                let column = format!("\"{}\".\"{}\"", table, condition.column);
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", column))
                } else {
                    Ok(format!("{} = {}", column, self.param(condition.data.clone())))
                }
            }
            FilterOp::In => {
                let column = format!("\"{}\".\"{}\"", table, condition.column);
                let values = Self::array(condition)?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                Ok(format!("{} IN ({})", column, params.join(", ")))
            }
            FilterOp::Any => {
                let link = self.link(&condition.column)?;
                let values = Self::array(condition)?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                Ok(format!(
                    "\"{table}\".\"id\" IN (SELECT \"{link_table}\".\"{source}\" FROM \"{link_table}\" WHERE \"{link_table}\".\"{target}\" IN ({params}))",
                    table = table,
                    link_table = link.table,
                    source = link.source,
                    target = link.target,
                    params = params.join(", "),
                ))
            }
            FilterOp::Linked => {
                let link = self.link(&condition.column)?;
                Ok(format!(
                    "\"{table}\".\"id\" IN (SELECT \"{link_table}\".\"{source}\" FROM \"{link_table}\")",
                    table = table,
                    link_table = link.table,
                    source = link.source,
                ))
            }
        }
    }

    /// Evaluate conditions against a row, with the same semantics as the SQL rendering.
    pub fn matches<T: FilterTarget>(conditions: &[FilterWhereInfo], row: &T) -> bool {
        conditions.iter().all(|condition| match condition.operator {
            FilterOp::Eq => row.column(&condition.column).unwrap_or(Value::Null) == condition.data,
            FilterOp::In => match (&condition.data, row.column(&condition.column)) {
                (Value::Array(values), Some(value)) => values.contains(&value),
                _ => false,
            },
            FilterOp::Any => {
                let wanted = match &condition.data {
                    Value::Array(values) => values.iter().filter_map(Value::as_i64).collect::<Vec<_>>(),
                    _ => return false,
                };
                row.linked_ids(&condition.column).iter().any(|id| wanted.contains(id))
            }
            FilterOp::Linked => !row.linked_ids(&condition.column).is_empty(),
        })
    }

    fn link(&self, relation: &str) -> Result<super::types::Link, FilterError> {
        link_for(self.table_name, relation).ok_or_else(|| FilterError::UnknownRelation {
            table: self.table_name.to_string(),
            relation: relation.to_string(),
        })
    }

    fn array(condition: &FilterWhereInfo) -> Result<&Vec<Value>, FilterError> {
        condition.data.as_array().ok_or_else(|| {
            FilterError::InvalidOperatorData(format!("{} requires an array of values", condition.column))
        })
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(column: &str, operator: FilterOp, data: Value) -> FilterWhereInfo {
        FilterWhereInfo { column: column.to_string(), operator, data }
    }

    #[test]
    fn renders_equality_and_relation_predicates() {
        let conditions = vec![
            cond("tags", FilterOp::Any, json!([3, 4])),
            cond("user_id", FilterOp::Eq, json!(7)),
        ];
        let (sql, params) = FilterWhere::generate("recipes", &conditions, 0).unwrap();
        assert_eq!(
            sql,
            "\"recipes\".\"id\" IN (SELECT \"recipe_tags\".\"recipe_id\" FROM \"recipe_tags\" WHERE \"recipe_tags\".\"tag_id\" IN ($1, $2)) AND \"recipes\".\"user_id\" = $3"
        );
        assert_eq!(params, vec![json!(3), json!(4), json!(7)]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let conditions = vec![cond("id", FilterOp::In, json!([]))];
        let (sql, params) = FilterWhere::generate("tags", &conditions, 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn linked_renders_without_parameters() {
        let conditions = vec![cond("recipes", FilterOp::Linked, Value::Null)];
        let (sql, params) = FilterWhere::generate("ingredients", &conditions, 0).unwrap();
        assert_eq!(
            sql,
            "\"ingredients\".\"id\" IN (SELECT \"recipe_ingredients\".\"ingredient_id\" FROM \"recipe_ingredients\")"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn unknown_relation_is_rejected() {
        let conditions = vec![cond("owners", FilterOp::Any, json!([1]))];
        let err = FilterWhere::generate("tags", &conditions, 0).unwrap_err();
        assert!(matches!(err, FilterError::UnknownRelation { .. }));
    }
}
