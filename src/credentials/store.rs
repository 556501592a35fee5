use super::{CredentialError, UserStore, Users};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, info};

/// Credential file on local disk, read and rewritten wholesale.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Result<Users, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Users::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("Creating credential file {}", self.path.display());
                let users = Users::new();
                self.save(&users)?;
                Ok(users)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, users: &Users) -> Result<(), CredentialError> {
        let json = serde_json::to_string_pretty(users)?;
        fs::write(&self.path, json)?;
        debug!("saved {} users to {}", users.len(), self.path.display());
        Ok(())
    }
}

/// In-process store, used by tests and throwaway instances.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_users(users: Users) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

impl UserStore for MemoryStore {
    fn load(&self) -> Result<Users, CredentialError> {
        self.users
            .read()
            .map(|users| users.clone())
            .map_err(|_| std::io::Error::other("memory store lock poisoned").into())
    }

    fn save(&self, users: &Users) -> Result<(), CredentialError> {
        let mut guard = self
            .users
            .write()
            .map_err(|_| std::io::Error::other("memory store lock poisoned"))?;
        guard.clone_from(users);
        Ok(())
    }
}
