//! Handler test fixture: a real service over in-memory ports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cwctl_core::{
    AuthContext, Connection, DispatchError, RegistryCredentials, RegistrySecret,
    RegistrySecretService, RegistrySecretsPort,
};
use cwctl_store::{FileConnectionRegistry, KeychainCredentialStore, MemoryKeychain};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::bootstrap::CliContext;

/// Remote registry list kept in memory.
#[derive(Default)]
pub struct StaticRemote {
    secrets: Mutex<Vec<RegistrySecret>>,
    calls: AtomicUsize,
}

impl StaticRemote {
    pub fn seed(&self, secret: RegistrySecret) {
        self.secrets.lock().unwrap().push(secret);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<RegistrySecret> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.secrets.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrySecretsPort for StaticRemote {
    async fn list(
        &self,
        _connection: &Connection,
        _origin: &Url,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        Ok(self.snapshot())
    }

    async fn add(
        &self,
        _connection: &Connection,
        _origin: &Url,
        address: &str,
        credentials: &RegistryCredentials,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        {
            let mut secrets = self.secrets.lock().unwrap();
            secrets.retain(|s| s.address != address);
            secrets.push(RegistrySecret::new(address, credentials.username()));
        }
        Ok(self.snapshot())
    }

    async fn remove(
        &self,
        _connection: &Connection,
        _origin: &Url,
        address: &str,
    ) -> Result<Vec<RegistrySecret>, DispatchError> {
        self.secrets.lock().unwrap().retain(|s| s.address != address);
        Ok(self.snapshot())
    }
}

pub struct TestContext {
    pub ctx: CliContext,
    pub remote: Arc<StaticRemote>,
    pub keychain: Arc<MemoryKeychain>,
}

impl TestContext {
    /// The built-in local connection plus one bearer-authenticated remote.
    pub fn new() -> Self {
        let remote_connection = Connection::remote(
            "remote",
            "Remote",
            "https://codewind.example.com",
            AuthContext::Bearer {
                authority: "https://auth.example.com/auth".to_string(),
                realm: "codewind".to_string(),
                client_id: "codewind-backend".to_string(),
                username: "developer".to_string(),
            },
        );
        let connections = Arc::new(
            FileConnectionRegistry::from_connections(
                vec![remote_connection],
                Url::parse("http://127.0.0.1:10000").unwrap(),
            )
            .unwrap(),
        );

        let remote = Arc::new(StaticRemote::default());
        let keychain = Arc::new(MemoryKeychain::new());
        let store = Arc::new(KeychainCredentialStore::new(keychain.clone(), "test.cwctl"));
        let secrets = RegistrySecretService::new(connections.clone(), remote.clone(), store);

        Self {
            ctx: CliContext::new(secrets, connections, CancellationToken::new()),
            remote,
            keychain,
        }
    }
}
