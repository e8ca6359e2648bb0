use super::catalog::ProfileCatalog;
use super::h2::{H2Fingerprint, PriorityFrame, SettingId, StreamDependency};
use super::ja3::Ja3Spec;
use super::{ClientHelloId, ClientProfile};
use crate::base::clienterror::{TlsClientError, TlsClientResult};
use crate::input::{CustomTlsClient, RequestInput};
use tracing::debug;

/// Where a session's profile comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    Named(String),
    Custom(CustomTlsClient),
}

impl ProfileSource {
    /// Pick the profile source of `input`. Exactly one of identifier and
    /// custom definition must be present; an empty identifier counts as absent.
    pub fn from_input(input: &RequestInput) -> TlsClientResult<Self> {
        let named = input
            .tls_client_identifier
            .as_deref()
            .filter(|id| !id.is_empty());
        match (named, &input.custom_tls_client) {
            (Some(_), Some(_)) => Err(TlsClientError::validation(
                "cannot build client with both defined tlsClientIdentifier and customTlsClient",
            )),
            (None, None) => Err(TlsClientError::validation(
                "cannot build client without tlsClientIdentifier or customTlsClient",
            )),
            (Some(id), None) => Ok(ProfileSource::Named(id.to_string())),
            (None, Some(custom)) => Ok(ProfileSource::Custom(custom.clone())),
        }
    }
}

/// Resolve a source into a concrete profile.
///
/// Named lookups never fail. A custom definition fails only when its JA3
/// string does not parse.
pub fn resolve_profile(
    source: &ProfileSource,
    catalog: &dyn ProfileCatalog,
) -> TlsClientResult<ClientProfile> {
    match source {
        ProfileSource::Named(id) => Ok(catalog.get_or_default(id)),
        ProfileSource::Custom(custom) => custom_profile(custom),
    }
}

fn custom_profile(custom: &CustomTlsClient) -> TlsClientResult<ClientProfile> {
    let spec: Ja3Spec = custom
        .ja3_string
        .parse()
        .map_err(|e| TlsClientError::construction("cannot build client hello spec from ja3", e))?;

    let h2 = H2Fingerprint {
        settings: custom
            .h2_settings
            .iter()
            .map(|(id, value)| (SettingId::from(*id), *value))
            .collect(),
        settings_order: custom
            .h2_settings_order
            .iter()
            .map(|id| SettingId::from(*id))
            .collect(),
        pseudo_header_order: custom.pseudo_header_order.clone(),
        connection_flow: custom.connection_flow,
        priorities: custom
            .priority_frames
            .iter()
            .map(|frame| {
                PriorityFrame::new(
                    frame.stream_id,
                    StreamDependency::new(
                        frame.priority_param.stream_dep,
                        frame.priority_param.weight,
                        frame.priority_param.exclusive,
                    ),
                )
            })
            .collect(),
    };

    debug!(
        ciphers = spec.cipher_suites.len(),
        extensions = spec.extensions.len(),
        settings = h2.settings.len(),
        "resolved custom profile"
    );

    Ok(ClientProfile::new(ClientHelloId::custom(spec), h2))
}
