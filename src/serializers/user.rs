use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldErrors, FieldReader, Validate};
use crate::database::models::User;

const EMAIL_MAX: usize = 255;
const NAME_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 5;

/// Registration fields with the password still in clear text
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Self-service profile update, password in clear text
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/user/create/` and `PUT|PATCH /api/user/me/`
#[derive(Debug, Clone)]
pub struct UserPayload(pub Map<String, Value>);

impl UserPayload {
    pub fn changes(self, partial: bool) -> Result<ProfileChanges, FieldErrors> {
        let required = !partial;
        let mut reader = FieldReader::new(&self.0);
        let changes = ProfileChanges {
            email: read_email(&mut reader, required),
            password: read_password(&mut reader, required),
            name: reader.string("name", required, false, NAME_MAX),
        };
        reader.errors.check(changes)
    }
}

impl Validate for UserPayload {
    type Output = Registration;

    fn validate(self) -> Result<Registration, FieldErrors> {
        let mut reader = FieldReader::new(&self.0);
        let email = read_email(&mut reader, true);
        let password = read_password(&mut reader, true);
        let name = reader.string("name", true, false, NAME_MAX);

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) if reader.errors.is_empty() => {
                Ok(Registration { email, password, name })
            }
            _ => Err(reader.errors),
        }
    }
}

/// Body of `POST /api/user/token/`
#[derive(Debug, Clone)]
pub struct CredentialsPayload(pub Map<String, Value>);

impl Validate for CredentialsPayload {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut reader = FieldReader::new(&self.0);
        let email = reader.string("email", true, false, EMAIL_MAX);
        let password = reader.string("password", true, false, usize::MAX);

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(reader.errors),
        }
    }
}

fn read_email(reader: &mut FieldReader<'_>, required: bool) -> Option<String> {
    let email = reader.string("email", required, false, EMAIL_MAX)?;
    if !looks_like_email(&email) {
        reader.errors.add("email", "Enter a valid email address.");
        return None;
    }
    Some(email)
}

fn read_password(reader: &mut FieldReader<'_>, required: bool) -> Option<String> {
    let password = reader.string("password", required, false, 128)?;
    if password.chars().count() < PASSWORD_MIN {
        reader.errors.add(
            "password",
            format!("Ensure this field has at least {} characters.", PASSWORD_MIN),
        );
        return None;
    }
    Some(password)
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !local.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Public view of an account; never includes the password
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOut {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
