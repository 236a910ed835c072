//! CLI bootstrap - the composition root.
//!
//! The only place where concrete adapters are wired together:
//! - Connection registry and keychain credential store (via cwctl-store)
//! - Reqwest transport, keychain authenticator and registry client (via cwctl-http)
//! - The registry secret service (via cwctl-core)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cwctl_core::{
    ConnectionRegistry, DEFAULT_KEYCHAIN_NAMESPACE, RegistrySecretService, connections_path,
};
use cwctl_http::{DispatchConfig, KeychainAuthenticator, RegistrySecretsClient, ReqwestBackend};
use cwctl_store::StoreFactory;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::CliError;

/// Overrides the origin of the local connection.
pub const LOCAL_URL_ENV: &str = "CWCTL_LOCAL_URL";

/// Overrides the keychain service prefix.
pub const KEYCHAIN_NAMESPACE_ENV: &str = "CWCTL_KEYCHAIN_NAMESPACE";

/// Where the local Codewind instance listens by default.
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:10000";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Path to `connections.json`.
    pub connections_path: PathBuf,
    /// Origin used for the local connection.
    pub local_origin: Url,
    /// Keychain service prefix.
    pub keychain_namespace: String,
    /// Transport settings.
    pub dispatch: DispatchConfig,
}

impl CliConfig {
    /// Create config from the data directory and environment.
    pub fn with_defaults() -> Result<Self> {
        let local_origin = parse_local_origin(std::env::var(LOCAL_URL_ENV).ok().as_deref())?;
        let keychain_namespace = std::env::var(KEYCHAIN_NAMESPACE_ENV)
            .ok()
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KEYCHAIN_NAMESPACE.to_string());

        Ok(Self {
            connections_path: connections_path().map_err(CliError::from)?,
            local_origin,
            keychain_namespace,
            dispatch: DispatchConfig::default(),
        })
    }

    /// Apply a `--timeout` override, in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        if let Some(seconds) = seconds {
            self.dispatch = self.dispatch.with_timeout(Duration::from_secs(seconds));
        }
        self
    }
}

fn parse_local_origin(raw: Option<&str>) -> Result<Url, CliError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LOCAL_URL);
    Url::parse(raw).map_err(|e| CliError::Config(format!("{LOCAL_URL_ENV}={raw}: {e}")))
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    secrets: RegistrySecretService,
    connections: Arc<dyn ConnectionRegistry>,
    cancel: CancellationToken,
}

impl CliContext {
    pub fn new(
        secrets: RegistrySecretService,
        connections: Arc<dyn ConnectionRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            secrets,
            connections,
            cancel,
        }
    }

    /// Access the registry secret service.
    pub const fn secrets(&self) -> &RegistrySecretService {
        &self.secrets
    }

    /// Access the connection registry.
    pub fn connections(&self) -> &dyn ConnectionRegistry {
        self.connections.as_ref()
    }

    /// Cancelled when the user presses Ctrl-C.
    pub const fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Bootstrap the CLI with all dependencies wired.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    debug!(
        connections = %config.connections_path.display(),
        local_origin = %config.local_origin,
        "Bootstrapping"
    );

    let connections: Arc<dyn ConnectionRegistry> =
        StoreFactory::connection_registry(&config.connections_path, config.local_origin)
            .map_err(CliError::from)?;

    let keychain = StoreFactory::os_keychain();
    let store = StoreFactory::credential_store(Arc::clone(&keychain), &config.keychain_namespace);

    let backend = ReqwestBackend::new(&config.dispatch)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let authenticator = Arc::new(KeychainAuthenticator::new(
        keychain,
        config.keychain_namespace.clone(),
        backend.clone(),
    ));
    let remote = Arc::new(RegistrySecretsClient::with_backend(backend, authenticator));

    let secrets = RegistrySecretService::new(Arc::clone(&connections), remote, store);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling in-flight request");
            on_interrupt.cancel();
        }
    });

    Ok(CliContext::new(secrets, connections, cancel))
}
