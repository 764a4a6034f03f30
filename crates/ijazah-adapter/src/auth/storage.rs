/*
[INPUT]:  Serialized user blob and credential token
[OUTPUT]: Two persisted string slots, cleared together on logout
[POS]:    Auth layer - client-side session persistence
[UPDATE]: When slot names or storage format change
*/

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

use super::CredentialToken;
use crate::types::User;

/// Slot holding the serialized [`User`]
pub const USER_SLOT: &str = "auth_user";
/// Slot holding the credential token
pub const TOKEN_SLOT: &str = "auth_token";

/// Opaque string slots keyed by fixed names
pub trait SessionStorage: Send + Sync {
    fn load(&self, slot: &str) -> io::Result<Option<String>>;
    fn save(&self, slot: &str, value: &str) -> io::Result<()>;
    fn remove(&self, slot: &str) -> io::Result<()>;
}

/// A restored session: both slots present and the user blob readable
#[derive(Debug, Clone)]
pub struct PersistedSession {
    pub user: User,
    pub token: CredentialToken,
}

/// Read both slots; a missing slot or unreadable user blob yields `None`
pub fn load_session(storage: &dyn SessionStorage) -> io::Result<Option<PersistedSession>> {
    let (Some(user_blob), Some(token)) = (storage.load(USER_SLOT)?, storage.load(TOKEN_SLOT)?)
    else {
        return Ok(None);
    };

    match serde_json::from_str::<User>(&user_blob) {
        Ok(user) if user.is_authenticated && !token.trim().is_empty() => Ok(Some(PersistedSession {
            user,
            token: CredentialToken::new(token.trim()),
        })),
        Ok(_) => Ok(None),
        Err(err) => {
            warn!(error = %err, "discarding unreadable persisted user");
            Ok(None)
        }
    }
}

pub fn save_session(
    storage: &dyn SessionStorage,
    user: &User,
    token: &CredentialToken,
) -> io::Result<()> {
    let blob = serde_json::to_string(user).map_err(io::Error::other)?;
    storage.save(USER_SLOT, &blob)?;
    storage.save(TOKEN_SLOT, token.as_str())
}

/// Remove both slots; attempts the second even when the first fails
pub fn clear_session(storage: &dyn SessionStorage) -> io::Result<()> {
    let user = storage.remove(USER_SLOT);
    let token = storage.remove(TOKEN_SLOT);
    user.and(token)
}

/// Slots as files in a directory, readable by the owner only
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Create a new storage rooted at the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the file path backing a slot
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, slot: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, slot: &str, value: &str) -> io::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let path = self.slot_path(slot);
        fs::write(&path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    fn remove(&self, slot: &str) -> io::Result<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Process-local slots; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, slot: &str) -> io::Result<Option<String>> {
        Ok(self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slot)
            .cloned())
    }

    fn save(&self, slot: &str, value: &str) -> io::Result<()> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> io::Result<()> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(slot);
        Ok(())
    }
}
