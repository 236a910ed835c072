//! `KeychainPort` adapters.

use cwctl_core::{KeychainError, KeychainPort};
use zeroize::Zeroizing;

/// Platform keyring: macOS Keychain, Windows Credential Manager, or on Linux the
/// kernel keyring backed by the Secret Service.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeychain;

impl OsKeychain {
    pub const fn new() -> Self {
        Self
    }
}

fn entry(service: &str, account: &str) -> Result<keyring::Entry, KeychainError> {
    keyring::Entry::new(service, account).map_err(map_keyring_error)
}

fn map_keyring_error(err: keyring::Error) -> KeychainError {
    match err {
        keyring::Error::NoStorageAccess(e) => KeychainError::AccessDenied(e.to_string()),
        keyring::Error::PlatformFailure(e) => KeychainError::Unavailable(e.to_string()),
        keyring::Error::BadEncoding(_) => {
            KeychainError::InvalidValue("stored value is not valid UTF-8".to_string())
        }
        keyring::Error::TooLong(name, max) => {
            KeychainError::InvalidValue(format!("{name} is longer than {max} characters"))
        }
        keyring::Error::Invalid(attr, reason) => {
            KeychainError::InvalidValue(format!("{attr}: {reason}"))
        }
        other => KeychainError::Unavailable(other.to_string()),
    }
}

impl KeychainPort for OsKeychain {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<String>>, KeychainError> {
        match entry(service, account)?.get_password() {
            Ok(secret) => Ok(Some(Zeroizing::new(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        entry(service, account)?
            .set_password(secret)
            .map_err(map_keyring_error)
    }

    fn delete(&self, service: &str, account: &str) -> Result<bool, KeychainError> {
        match entry(service, account)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(map_keyring_error(e)),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryKeychain;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use cwctl_core::{KeychainError, KeychainPort};
    use zeroize::Zeroizing;

    type Key = (String, String);

    /// In-process keychain with failure injection and a write counter.
    #[derive(Default)]
    pub struct MemoryKeychain {
        entries: Mutex<HashMap<Key, Zeroizing<String>>>,
        failure: Mutex<Option<KeychainError>>,
        writes: AtomicUsize,
    }

    impl MemoryKeychain {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed an entry without counting it as a write.
        pub fn insert(&self, service: &str, account: &str, secret: &str) {
            lock(&self.entries).insert(
                (service.to_string(), account.to_string()),
                Zeroizing::new(secret.to_string()),
            );
        }

        /// Current value of an entry.
        pub fn secret(&self, service: &str, account: &str) -> Option<String> {
            lock(&self.entries)
                .get(&(service.to_string(), account.to_string()))
                .map(|s| s.as_str().to_owned())
        }

        /// Make every subsequent call fail with `error`.
        pub fn fail_with(&self, error: KeychainError) {
            *lock(&self.failure) = Some(error);
        }

        pub fn clear_failure(&self) {
            *lock(&self.failure) = None;
        }

        /// Number of successful `set`/`delete` calls.
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<(), KeychainError> {
            lock(&self.failure).clone().map_or(Ok(()), Err)
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl KeychainPort for MemoryKeychain {
        fn get(
            &self,
            service: &str,
            account: &str,
        ) -> Result<Option<Zeroizing<String>>, KeychainError> {
            self.check()?;
            Ok(lock(&self.entries)
                .get(&(service.to_string(), account.to_string()))
                .cloned())
        }

        fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
            self.check()?;
            lock(&self.entries).insert(
                (service.to_string(), account.to_string()),
                Zeroizing::new(secret.to_string()),
            );
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn delete(&self, service: &str, account: &str) -> Result<bool, KeychainError> {
            self.check()?;
            let existed = lock(&self.entries)
                .remove(&(service.to_string(), account.to_string()))
                .is_some();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(existed)
        }
    }
}
