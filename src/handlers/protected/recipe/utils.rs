use axum::extract::{rejection::PathRejection, Path};
use serde::Deserialize;

use crate::access::{parse_count, parse_flag, Identity, ListOptions, OwnedAccess, OwnedEntity};
use crate::database::{EntityStore, Store};
use crate::error::ApiError;
use crate::serializers::{FieldErrors, NamedOut};

#[derive(Debug, Deserialize)]
pub struct NamedQuery {
    /// `1` or `true` keeps only rows attached to at least one recipe
    pub assigned_only: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub fn list_options(limit: Option<&str>, offset: Option<&str>) -> Result<ListOptions, FieldErrors> {
    Ok(ListOptions {
        limit: parse_count("limit", limit)?,
        offset: parse_count("offset", offset)?,
    })
}

/// Record id from the path. An id that is not an integer cannot name a row.
pub fn record_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!("Unusable record id: {}", rejection.body_text());
            Err(ApiError::not_found("Not found."))
        }
    }
}

/// Shared list for tags and ingredients
pub async fn list_named<E>(
    access: &OwnedAccess<E, dyn Store>,
    identity: &Identity,
    query: &NamedQuery,
) -> Result<Vec<NamedOut>, ApiError>
where
    E: OwnedEntity,
    dyn Store: EntityStore<E>,
    for<'a> NamedOut: From<&'a E>,
{
    let options = list_options(query.limit.as_deref(), query.offset.as_deref())?;
    let mut filter = access.filter(&options)?;
    if parse_flag("assigned_only", query.assigned_only.as_deref())? {
        filter = filter.where_linked("recipes")?;
    }

    let rows = access.list(identity, filter).await?;
    Ok(rows.iter().map(NamedOut::from).collect())
}
