use serde_json::Value;
use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgPool};

use crate::access::OwnedEntity;
use crate::database::manager::DatabaseError;
use crate::filter::Filter;

/// Entity that can be read back with a filter-rendered SELECT.
pub trait PgEntity: OwnedEntity + for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Column list placed after SELECT; may add computed columns
    const SELECT: &'static str;
}

/// Filter-driven reads for one table
pub struct Repository<'p, T> {
    pool: &'p PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<'p, T: PgEntity> Repository<'p, T> {
    pub fn new(pool: &'p PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn base_filter() -> Result<Filter, DatabaseError> {
        Ok(Filter::new(T::TABLE)?)
    }

    pub async fn select_any(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        if filter.table_name() != T::TABLE {
            return Err(DatabaseError::QueryError(format!(
                "Filter for {} used on {}",
                filter.table_name(),
                T::TABLE
            )));
        }

        let sql_result = filter.to_sql(T::SELECT)?;
        tracing::debug!("{}", sql_result.query);

        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(self.pool).await?;
        Ok(rows)
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        let filter = Self::base_filter()?.where_eq("id", id)?;
        self.select_any(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // FilterWhere expands arrays into one placeholder per element
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
