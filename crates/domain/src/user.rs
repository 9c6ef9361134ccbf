use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};

use crate::{CreateError, DeleteError, Name, ReadError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn register_user(&self, full_name: Name) -> Result<User, CreateError>;
    async fn login_user(&self) -> Result<User, ReadError>;
    async fn get_user(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;

    fn validate_full_name(&self, full_name: &str) -> Result<Name, ValidationError> {
        Name::new(full_name).map_err(|err| ValidationError::Other(err.into()))
    }
}

/// Account records are owned by the backend. The identity provider itself is out of reach of
/// this crate, the bearer token is handed to the storage layer by the caller.
#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn register_user(&self, full_name: Name) -> Result<User, CreateError>;
    async fn login_user(&self) -> Result<User, ReadError>;
    async fn read_user(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub firebase_uid: String,
    pub email: String,
    pub full_name: String,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserID(String);

impl UserID {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
