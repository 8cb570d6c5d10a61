use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, AuthError, Claims};
use crate::database::models::user::normalize_email;
use crate::database::models::{NewUser, User, UserChanges, UserId};
use crate::database::{DatabaseError, UserStore};
use crate::serializers::user::{CredentialsPayload, UserPayload};
use crate::serializers::{FieldErrors, Validate};

pub const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Users must have an email address")]
    MissingEmail,

    #[error(transparent)]
    Validation(#[from] FieldErrors),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(column) => {
                UserError::Validation(FieldErrors::single(column, "user with this email already exists."))
            }
            DatabaseError::NotFound(_) => UserError::NotFound,
            other => UserError::Database(other),
        }
    }
}

/// Account creation, login and self-service profile changes
pub struct UserService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: UserStore + ?Sized> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Normalize the email and hash the password, then insert an active regular user.
    pub async fn create_user(&self, email: &str, password: &str, name: &str) -> Result<User, UserError> {
        let email = Self::require_email(email)?;
        let hash = auth::hash_password(password)?;
        let user = self
            .store
            .insert_user(NewUser::regular(email, name.to_string(), hash))
            .await?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, UserError> {
        let email = Self::require_email(email)?;
        let hash = auth::hash_password(password)?;
        let user = self.store.insert_user(NewUser::superuser(email, hash)).await?;
        info!("Created superuser {}", user.id);
        Ok(user)
    }

    pub async fn register(&self, payload: UserPayload) -> Result<User, UserError> {
        let registration = payload.validate()?;
        self.create_user(&registration.email, &registration.password, &registration.name)
            .await
    }

    /// Check credentials and issue a bearer token
    pub async fn issue_token(&self, payload: CredentialsPayload) -> Result<String, UserError> {
        let credentials = payload.validate().map_err(|_| UserError::InvalidCredentials)?;
        let email = normalize_email(&credentials.email);

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if user.is_active && auth::verify_password(&credentials.password, &user.password) => user,
            _ => {
                warn!("Rejected login for {}", email);
                return Err(UserError::InvalidCredentials);
            }
        };

        let token = auth::generate_jwt(&Claims::for_user(&user))?;
        info!("Issued token for user {}", user.id);
        Ok(token)
    }

    pub async fn find_active(&self, id: UserId) -> Result<Option<User>, UserError> {
        Ok(self.store.find_user(id).await?.filter(|user| user.is_active))
    }

    /// PUT (`partial == false`) or PATCH of the caller's own profile
    pub async fn update_profile(&self, id: UserId, payload: UserPayload, partial: bool) -> Result<User, UserError> {
        let changes = payload.changes(partial)?;
        let password = match changes.password {
            Some(password) => Some(auth::hash_password(&password)?),
            None => None,
        };
        let changes = UserChanges {
            email: changes.email.as_deref().map(normalize_email),
            name: changes.name,
            password,
        };

        if changes.is_empty() {
            return self.store.find_user(id).await?.ok_or(UserError::NotFound);
        }
        Ok(self.store.update_user(id, changes).await?)
    }

    fn require_email(email: &str) -> Result<String, UserError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(UserError::MissingEmail);
        }
        Ok(email)
    }
}
