//! HTTP/2 fingerprint types.
//!
//! Anti-bot systems fingerprint HTTP/2 at several levels:
//! - SETTINGS frame values and the order they are sent in
//! - pseudo-header order in HEADERS frames
//! - the connection-level WINDOW_UPDATE increment
//! - PRIORITY frames sent right after the preface
//!
//! Every sequence here is kept in caller order; nothing is sorted or deduplicated.

use std::collections::BTreeMap;

/// SETTINGS parameter identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingId {
    /// SETTINGS_HEADER_TABLE_SIZE (0x1)
    HeaderTableSize,
    /// SETTINGS_ENABLE_PUSH (0x2)
    EnablePush,
    /// SETTINGS_MAX_CONCURRENT_STREAMS (0x3)
    MaxConcurrentStreams,
    /// SETTINGS_INITIAL_WINDOW_SIZE (0x4)
    InitialWindowSize,
    /// SETTINGS_MAX_FRAME_SIZE (0x5)
    MaxFrameSize,
    /// SETTINGS_MAX_HEADER_LIST_SIZE (0x6)
    MaxHeaderListSize,
    /// SETTINGS_ENABLE_CONNECT_PROTOCOL (0x8, RFC 8441)
    EnableConnectProtocol,
    /// SETTINGS_NO_RFC7540_PRIORITIES (0x9, RFC 9218)
    NoRfc7540Priorities,
    /// Any id without a name; still sent as given.
    Unknown(u16),
}

impl From<u16> for SettingId {
    fn from(id: u16) -> Self {
        match id {
            1 => SettingId::HeaderTableSize,
            2 => SettingId::EnablePush,
            3 => SettingId::MaxConcurrentStreams,
            4 => SettingId::InitialWindowSize,
            5 => SettingId::MaxFrameSize,
            6 => SettingId::MaxHeaderListSize,
            8 => SettingId::EnableConnectProtocol,
            9 => SettingId::NoRfc7540Priorities,
            other => SettingId::Unknown(other),
        }
    }
}

impl From<SettingId> for u16 {
    fn from(id: SettingId) -> u16 {
        match id {
            SettingId::HeaderTableSize => 1,
            SettingId::EnablePush => 2,
            SettingId::MaxConcurrentStreams => 3,
            SettingId::InitialWindowSize => 4,
            SettingId::MaxFrameSize => 5,
            SettingId::MaxHeaderListSize => 6,
            SettingId::EnableConnectProtocol => 8,
            SettingId::NoRfc7540Priorities => 9,
            SettingId::Unknown(other) => other,
        }
    }
}

/// Dependency part of a PRIORITY frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamDependency {
    pub stream_dep: u32,
    pub exclusive: bool,
    pub weight: u8,
}

impl StreamDependency {
    pub fn new(stream_dep: u32, weight: u8, exclusive: bool) -> Self {
        Self {
            stream_dep,
            exclusive,
            weight,
        }
    }
}

/// A PRIORITY frame sent after connection establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriorityFrame {
    pub stream_id: u32,
    pub dependency: StreamDependency,
}

impl PriorityFrame {
    pub fn new(stream_id: u32, dependency: StreamDependency) -> Self {
        Self {
            stream_id,
            dependency,
        }
    }
}

/// HTTP/2 half of a client profile.
///
/// Empty collections and a zero `connection_flow` mean "not specified"; the
/// transport then uses its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct H2Fingerprint {
    pub settings: BTreeMap<SettingId, u32>,
    pub settings_order: Vec<SettingId>,
    pub pseudo_header_order: Vec<String>,
    pub connection_flow: u32,
    pub priorities: Vec<PriorityFrame>,
}

impl H2Fingerprint {
    pub fn builder() -> H2FingerprintBuilder {
        H2FingerprintBuilder::default()
    }

    pub fn setting(&self, id: SettingId) -> Option<u32> {
        self.settings.get(&id).copied()
    }

    /// Settings in emission order: `settings_order` first, then any
    /// remaining configured settings by id.
    pub fn ordered_settings(&self) -> Vec<(SettingId, u32)> {
        let mut out: Vec<(SettingId, u32)> = self
            .settings_order
            .iter()
            .filter_map(|id| self.setting(*id).map(|v| (*id, v)))
            .collect();
        for (id, value) in &self.settings {
            if !self.settings_order.contains(id) {
                out.push((*id, *value));
            }
        }
        out
    }

    /// Akamai-style text form: `settings|window|priorities|pseudo`.
    pub fn akamai_string(&self) -> String {
        let settings = self
            .ordered_settings()
            .iter()
            .map(|(id, v)| format!("{}:{}", u16::from(*id), v))
            .collect::<Vec<_>>()
            .join(";");
        let priorities = if self.priorities.is_empty() {
            "0".to_string()
        } else {
            self.priorities
                .iter()
                .map(|p| {
                    format!(
                        "{}:{}:{}:{}",
                        p.stream_id,
                        u8::from(p.dependency.exclusive),
                        p.dependency.stream_dep,
                        u16::from(p.dependency.weight) + 1
                    )
                })
                .collect::<Vec<_>>()
                .join(",")
        };
        let pseudo = self
            .pseudo_header_order
            .iter()
            .filter_map(|h| h.trim_start_matches(':').chars().next())
            .collect::<String>();
        format!(
            "{}|{}|{}|{}",
            settings, self.connection_flow, priorities, pseudo
        )
    }
}

/// Builder for H2Fingerprint.
#[derive(Debug, Default)]
pub struct H2FingerprintBuilder {
    inner: H2Fingerprint,
}

impl H2FingerprintBuilder {
    /// Add a setting; its position in the SETTINGS frame is the call order.
    pub fn setting(mut self, id: SettingId, value: u32) -> Self {
        self.inner.settings.insert(id, value);
        self.inner.settings_order.push(id);
        self
    }

    pub fn pseudo_header_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.pseudo_header_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn connection_flow(mut self, flow: u32) -> Self {
        self.inner.connection_flow = flow;
        self
    }

    pub fn priority(mut self, stream_id: u32, dependency: StreamDependency) -> Self {
        self.inner
            .priorities
            .push(PriorityFrame::new(stream_id, dependency));
        self
    }

    pub fn build(self) -> H2Fingerprint {
        self.inner
    }
}
