use crate::base::clienterror::{TlsClientError, TlsClientResult};
use crate::client::{
    ClientConstructor, ClientHandle, ClientOptions, FingerprintConstructor, HttpClient,
};
use crate::config::FactoryConfig;
use crate::fingerprint::{resolve_profile, BuiltinCatalog, ProfileCatalog, ProfileSource};
use crate::input::RequestInput;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, trace};

/// Map from session id to the one live client of that session.
///
/// A single lock guards lookup, creation and modification, so concurrent
/// first use of an id constructs exactly one client and mutations of one
/// session never interleave. Requests never run under the lock.
pub struct SessionRegistry {
    clients: Mutex<HashMap<String, ClientHandle>>,
    constructor: Arc<dyn ClientConstructor>,
    catalog: Arc<dyn ProfileCatalog>,
    config: FactoryConfig,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Registry with the built-in catalog and transport.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SessionRegistryBuilder {
        SessionRegistryBuilder::default()
    }

    /// Process-wide registry, configured from the environment on first use.
    pub fn global() -> &'static SessionRegistry {
        static GLOBAL: OnceLock<SessionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::builder().config(FactoryConfig::from_env()).build())
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientHandle>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the client bound to the input's session id, creating it on
    /// first use and applying proxy and redirect changes on later use.
    ///
    /// An absent or empty session id gets a fresh UUID. The resolved id is
    /// returned with the handle and carried by any error.
    pub fn resolve(&self, input: &RequestInput) -> TlsClientResult<(ClientHandle, String)> {
        let session_id = input
            .session_id()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        match self.resolve_session(&session_id, input) {
            Ok(client) => Ok((client, session_id)),
            Err(e) => Err(e.with_session_id(session_id)),
        }
    }

    fn resolve_session(
        &self,
        session_id: &str,
        input: &RequestInput,
    ) -> TlsClientResult<ClientHandle> {
        let source = ProfileSource::from_input(input)?;

        let mut clients = self.lock();

        if let Some(client) = clients.get(session_id) {
            let client = Arc::clone(client);
            apply_modification(client.as_ref(), input)?;
            trace!(session_id = %session_id, "reusing session client");
            return Ok(client);
        }

        let profile = resolve_profile(&source, self.catalog.as_ref())?;
        let options = ClientOptions {
            timeout: self.config.timeout_for(input.timeout_seconds),
            follow_redirects: input.follow_redirects,
            max_redirects: self.config.max_redirects,
            proxy_url: input.proxy_url.clone().filter(|p| !p.is_empty()),
            insecure_skip_verify: input.insecure_skip_verify,
        };
        let profile_name = profile.name();
        let client = self.constructor.construct(profile, options).map_err(|e| {
            TlsClientError::construction("failed to create http client", e)
        })?;

        clients.insert(session_id.to_string(), Arc::clone(&client));
        debug!(
            session_id = %session_id,
            profile = %profile_name,
            sessions = clients.len(),
            "created session client"
        );
        Ok(client)
    }

    /// Live client of `session_id`, if any.
    pub fn get(&self, session_id: &str) -> Option<ClientHandle> {
        self.lock().get(session_id).cloned()
    }

    /// Drop the session's client. The next call with this id builds a new one.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.lock().remove(session_id).is_some();
        if removed {
            debug!(session_id, "removed session client");
        }
        removed
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn clear(&self) {
        let mut clients = self.lock();
        let n = clients.len();
        clients.clear();
        debug!(removed = n, "cleared session registry");
    }
}

/// Bring an existing client in line with the input. The proxy is applied
/// first; if the client rejects it nothing else is changed.
fn apply_modification(client: &dyn HttpClient, input: &RequestInput) -> TlsClientResult<()> {
    if let Some(proxy) = input.proxy_url.as_deref() {
        if client.proxy() != proxy {
            client.set_proxy(proxy).map_err(|e| {
                TlsClientError::modification("failed to change proxy url of client", e)
            })?;
            debug!("session proxy changed");
        }
    }
    if client.follow_redirects() != input.follow_redirects {
        client.set_follow_redirects(input.follow_redirects);
        debug!(follow = input.follow_redirects, "session redirect policy changed");
    }
    Ok(())
}

/// Builder for [`SessionRegistry`].
#[must_use]
#[derive(Default)]
pub struct SessionRegistryBuilder {
    constructor: Option<Arc<dyn ClientConstructor>>,
    catalog: Option<Arc<dyn ProfileCatalog>>,
    config: FactoryConfig,
}

impl SessionRegistryBuilder {
    pub fn constructor(mut self, constructor: Arc<dyn ClientConstructor>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn ProfileCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> SessionRegistry {
        SessionRegistry {
            clients: Mutex::new(HashMap::new()),
            constructor: self
                .constructor
                .unwrap_or_else(|| Arc::new(FingerprintConstructor)),
            catalog: self.catalog.unwrap_or_else(|| Arc::new(BuiltinCatalog)),
            config: self.config,
        }
    }
}
