use secrecy::Secret;
use std::sync::RwLock;

/// Where the admin credential lives between calls.
///
/// Implementations must be scoped to one client session and never persist
/// the credential across process restarts.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> Option<Secret<String>>;
    fn store(&self, credentials: Secret<String>);
    fn clear(&self);
}

/// Process-scoped in-memory slot; the default storage.
#[derive(Default)]
pub struct MemoryStorage {
    slot: RwLock<Option<Secret<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Option<Secret<String>> {
        // A poisoned lock still holds a whole value; writes are single assignments.
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, credentials: Secret<String>) {
        match self.slot.write() {
            Ok(mut guard) => *guard = Some(credentials),
            Err(poisoned) => *poisoned.into_inner() = Some(credentials),
        }
    }

    fn clear(&self) {
        match self.slot.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
