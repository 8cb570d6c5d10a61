use std::cmp::Ordering;

use serde_json::Value;

use super::types::{FilterOrderInfo, FilterTarget, SortDirection};

/// Text columns are ordered by byte value so SQL and in-memory sorting agree
const TEXT_COLUMNS: &[&str] = &["name", "title", "email", "link", "image"];

pub struct FilterOrder;

impl FilterOrder {
    /// Parse "name desc, id desc" style order strings. Direction defaults to ascending.
    pub fn parse(s: &str) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        out
    }

    pub fn generate(table_name: &str, infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| {
                let collate = if TEXT_COLUMNS.contains(&i.column.as_str()) { " COLLATE \"C\"" } else { "" };
                format!("\"{}\".\"{}\"{} {}", table_name, i.column, collate, i.sort.to_sql())
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    pub fn compare<T: FilterTarget>(infos: &[FilterOrderInfo], a: &T, b: &T) -> Ordering {
        for info in infos {
            let left = a.column(&info.column).unwrap_or(Value::Null);
            let right = b.column(&info.column).unwrap_or(Value::Null);
            let ordering = match info.sort {
                SortDirection::Asc => compare_values(&left, &right),
                SortDirection::Desc => compare_values(&right, &left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

// NULL sorts after everything, as PostgreSQL does for ascending order
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
