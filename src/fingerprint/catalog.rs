use super::profiles::{BUILTIN, DEFAULT_PROFILE};
use super::ClientProfile;

/// Source of named profiles.
pub trait ProfileCatalog: Send + Sync {
    /// Profile registered under `identifier`, matched exactly.
    fn get(&self, identifier: &str) -> Option<ClientProfile>;

    /// Profile used when an identifier is unknown.
    fn default_profile(&self) -> ClientProfile;

    /// Named lookup that falls back to the default; never fails.
    fn get_or_default(&self, identifier: &str) -> ClientProfile {
        self.get(identifier)
            .unwrap_or_else(|| self.default_profile())
    }
}

/// Catalog of the profiles compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }
}

impl ProfileCatalog for BuiltinCatalog {
    fn get(&self, identifier: &str) -> Option<ClientProfile> {
        BUILTIN
            .iter()
            .find(|(name, _)| *name == identifier)
            .map(|(_, make)| make())
    }

    fn default_profile(&self) -> ClientProfile {
        BUILTIN
            .iter()
            .find(|(name, _)| *name == DEFAULT_PROFILE)
            .map(|(_, make)| make())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        let catalog = BuiltinCatalog;
        assert!(catalog.get("firefox_120").is_some());
        assert!(catalog.get("Firefox_120").is_none());
        assert!(catalog.get("firefox_120 ").is_none());
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        let catalog = BuiltinCatalog;
        let profile = catalog.get_or_default("netscape_4");
        assert_eq!(profile.hello().client, "Chrome");
        assert_eq!(profile.hello().version, "124");
    }

    #[test]
    fn test_identifiers_listed() {
        let ids: Vec<_> = BuiltinCatalog.identifiers().collect();
        assert!(ids.contains(&"safari_16_0"));
        assert!(ids.contains(&"okhttp4_android_13"));
    }
}
