use super::registry::SessionRegistry;
use crate::base::clienterror::{TlsClientError, TlsClientResult};
use crate::client::ClientHandle;
use crate::http::{build_request, build_response, cookies_from_headers, Response};
use crate::input::RequestInput;
use std::sync::Arc;
use tracing::debug;

/// Entry point tying the registry to request and response translation.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    registry: Arc<SessionRegistry>,
}

impl Default for SessionFactory {
    fn default() -> Self {
        Self::new(Arc::new(SessionRegistry::new()))
    }
}

impl SessionFactory {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Client for the input's session plus the session id actually used.
    pub fn get_client_from_input(
        &self,
        input: &RequestInput,
    ) -> TlsClientResult<(ClientHandle, String)> {
        self.registry.resolve(input)
    }

    pub fn remove_session(&self, session_id: &str) -> bool {
        self.registry.remove(session_id)
    }

    /// Resolve the session client, send the described request and read the
    /// whole response. Cookies come from the response's `Set-Cookie` headers.
    pub async fn request(&self, input: &RequestInput) -> TlsClientResult<Response> {
        let (client, session_id) = self.get_client_from_input(input)?;
        let request = build_request(input).map_err(|e| e.with_session_id(&session_id))?;

        debug!(
            session_id = %session_id,
            method = %request.method(),
            uri = %request.uri(),
            "executing request"
        );
        let response = client.execute(request).await.map_err(|e| {
            TlsClientError::transport("failed to do request", e).with_session_id(&session_id)
        })?;

        let cookies = cookies_from_headers(response.headers());
        build_response(&session_id, response, &cookies)
            .await
            .map_err(|e| e.with_session_id(&session_id))
    }
}
