//! Ownership-scoped reads and writes.
//!
//! Every call takes the requesting [`Identity`] explicitly. Lists are always
//! narrowed to the identity's rows, single-row lookups of someone else's row
//! report `NotFound`, and creates stamp the identity as owner.

pub mod params;
pub mod recipe;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::database::models::UserId;
use crate::database::{DatabaseError, EntityStore};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{Filter, FilterError};
use crate::serializers::{FieldErrors, Validate};
use crate::services::image_store::ImageError;

pub use params::{parse_count, parse_flag, parse_id_list};
pub use recipe::{ImageUpload, RecipeAccess, RecipeDetail};

/// The user an access-layer call acts for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// A row kind owned by exactly one user.
pub trait OwnedEntity: Clone + Serialize + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Human-readable name used in not-found messages
    const LABEL: &'static str;
    /// Order applied to every list, written as "column dir, column dir"
    const DEFAULT_ORDER: &'static str;

    /// Validated values for an insert, without the owner
    type Fields: Send + Sync + 'static;

    fn id(&self) -> i64;
    fn owner(&self) -> UserId;
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error(transparent)]
    Validation(#[from] FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Paging for list operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List, retrieve and create for one owned entity kind.
pub struct OwnedAccess<E, S: ?Sized> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S: ?Sized> Clone for OwnedAccess<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E, S> OwnedAccess<E, S>
where
    E: OwnedEntity,
    S: EntityStore<E> + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Starting point for a list: the entity's table, default order and paging.
    /// Callers may add predicates before handing it to [`OwnedAccess::list`].
    pub fn filter(&self, options: &ListOptions) -> Result<Filter, AccessError> {
        let filter = Filter::new(E::TABLE)?
            .order(FilterOrder::parse(E::DEFAULT_ORDER))?
            .limit(options.limit, options.offset)?;
        Ok(filter)
    }

    pub async fn list(&self, identity: &Identity, filter: Filter) -> Result<Vec<E>, AccessError> {
        if filter.table_name() != E::TABLE {
            return Err(FilterError::InvalidTableName(format!(
                "{} filter used to list {}",
                filter.table_name(),
                E::TABLE
            ))
            .into());
        }

        let scoped = filter.where_eq("user_id", identity.user_id)?;
        let rows = self.store.filter(&scoped).await?;
        debug!("Listed {} {} rows for user {}", rows.len(), E::TABLE, identity.user_id);
        Ok(rows)
    }

    pub async fn retrieve(&self, identity: &Identity, id: i64) -> Result<E, AccessError> {
        let filter = Filter::new(E::TABLE)?
            .where_eq("id", id)?
            .where_eq("user_id", identity.user_id)?;
        self.store
            .filter(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AccessError::NotFound(format!("{} {} not found", E::LABEL, id)))
    }

    /// Owned rows among `ids`, in default order. Unknown and foreign ids are skipped.
    pub async fn owned_among(&self, identity: &Identity, ids: &[i64]) -> Result<Vec<E>, AccessError> {
        let filter = self.filter(&ListOptions::default())?.where_in("id", ids)?;
        self.list(identity, filter).await
    }

    pub async fn create<P>(&self, identity: &Identity, payload: P) -> Result<E, AccessError>
    where
        P: Validate<Output = E::Fields>,
    {
        let fields = payload.validate()?;
        self.insert(identity, fields).await
    }

    /// Insert already-validated fields with `identity` as owner
    pub async fn insert(&self, identity: &Identity, fields: E::Fields) -> Result<E, AccessError> {
        let row = self.store.insert(identity.user_id, fields).await?;
        debug!("Created {} {} for user {}", E::LABEL, row.id(), identity.user_id);
        Ok(row)
    }
}
