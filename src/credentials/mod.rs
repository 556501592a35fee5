//! Username/password accounts backed by a flat JSON file.
//!
//! The whole mapping is loaded and saved on every call; there is no locking, so
//! two concurrent signups can lose one of the updates. Passwords are compared in
//! plain text.

mod store;

pub use store::{JsonFileStore, MemoryStore};

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, instrument};

/// `username -> password` as persisted in the credential file.
pub type Users = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Username already exists.")]
    DuplicateUser,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("credential file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CredentialError {
    /// Storage failures are server-side; everything else is caused by the form input.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Json(_))
    }
}

pub trait UserStore: Send + Sync {
    /// Current mapping, creating an empty store when none exists yet.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> Result<Users, CredentialError>;

    /// Overwrite the stored mapping.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, users: &Users) -> Result<(), CredentialError>;
}

/// Register a new account and return the stored username.
///
/// Blank fields and a mismatching confirmation are rejected before the store is read.
///
/// # Errors
/// `InvalidInput`, `DuplicateUser`, or a storage error.
#[instrument(skip(store, password, confirm))]
pub fn signup(
    store: &dyn UserStore,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<String, CredentialError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(CredentialError::InvalidInput("Please fill in all fields."));
    }
    if password != confirm {
        return Err(CredentialError::InvalidInput("Passwords do not match."));
    }

    let mut users = store.load()?;
    if users.contains_key(username) {
        return Err(CredentialError::DuplicateUser);
    }

    users.insert(username.to_string(), password.to_string());
    store.save(&users)?;
    debug!("registered user");

    Ok(username.to_string())
}

/// Check a username/password pair and return the stored username.
///
/// # Errors
/// `InvalidInput` for blank fields, `InvalidCredentials` for an unknown user or
/// wrong password, or a storage error.
#[instrument(skip(store, password))]
pub fn login(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<String, CredentialError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(CredentialError::InvalidInput("Please fill in all fields."));
    }

    let users = store.load()?;
    match users.get(username) {
        Some(stored) if stored == password => Ok(username.to_string()),
        _ => Err(CredentialError::InvalidCredentials),
    }
}
