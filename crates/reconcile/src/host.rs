//! Proxy host records and the full-replacement update payload

use crate::types::PolicyFlags;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One reverse-proxy entry as listed by the administration API
///
/// Only the managed flags are interpreted; everything else is carried
/// through to the update payload unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostRecord {
    pub id: u64,
    #[serde(default)]
    pub domain_names: Vec<String>,
    #[serde(default)]
    pub forward_scheme: String,
    #[serde(default)]
    pub forward_host: String,
    #[serde(default)]
    pub forward_port: u16,
    #[serde(default)]
    pub access_list_id: Option<u64>,
    #[serde(default)]
    pub certificate_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub ssl_forced: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub http2_support: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hsts_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hsts_subdomains: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub block_exploits: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub caching_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub allow_websocket_upgrade: Option<bool>,
    #[serde(default)]
    pub locations: Option<Vec<Value>>,
    #[serde(default)]
    pub advanced_config: Option<String>,
    #[serde(default)]
    pub meta: Option<HostMeta>,
}

/// Host metadata; only `dns_challenge` is read
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostMeta {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub dns_challenge: Option<bool>,
}

impl HostRecord {
    /// First domain name, used for exemption matching
    pub fn primary_domain(&self) -> &str {
        self.domain_names.first().map(String::as_str).unwrap_or("")
    }

    /// All domain names joined for display
    pub fn label(&self) -> String {
        self.domain_names.join(", ")
    }

    /// Forward target as `scheme://host:port`
    pub fn forward_target(&self) -> String {
        format!(
            "{}://{}:{}",
            self.forward_scheme, self.forward_host, self.forward_port
        )
    }

    /// Advanced config text, `None` when absent or blank
    pub fn advanced_config_text(&self) -> Option<&str> {
        self.advanced_config
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    fn dns_challenge(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|m| m.dns_challenge)
            .unwrap_or(false)
    }
}

/// Full replacement body sent to the update endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostUpdate {
    pub domain_names: Vec<String>,
    pub forward_scheme: String,
    pub forward_host: String,
    pub forward_port: u16,
    pub access_list_id: u64,
    pub certificate_id: Option<Value>,
    pub ssl_forced: bool,
    pub http2_support: bool,
    pub hsts_enabled: bool,
    pub hsts_subdomains: bool,
    pub block_exploits: bool,
    pub caching_enabled: bool,
    pub allow_websocket_upgrade: bool,
    pub locations: Vec<Value>,
    pub advanced_config: String,
    pub meta: UpdateMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateMeta {
    pub letsencrypt_agree: bool,
    pub dns_challenge: bool,
}

/// An approved change: host identifier plus its replacement record
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIntent {
    pub host_id: u64,
    pub payload: HostUpdate,
}

impl UpdateIntent {
    /// Build the replacement record for `host` with `desired` flags
    pub fn new(host: &HostRecord, desired: &PolicyFlags) -> Self {
        let payload = HostUpdate {
            domain_names: host.domain_names.clone(),
            forward_scheme: host.forward_scheme.clone(),
            forward_host: host.forward_host.clone(),
            forward_port: host.forward_port,
            access_list_id: host.access_list_id.unwrap_or(0),
            certificate_id: host.certificate_id.clone(),
            ssl_forced: desired.ssl_forced,
            http2_support: desired.http2_support,
            hsts_enabled: desired.hsts_enabled,
            hsts_subdomains: desired.hsts_subdomains,
            block_exploits: desired.block_exploits,
            caching_enabled: desired.caching_enabled,
            allow_websocket_upgrade: desired.allow_websocket_upgrade,
            locations: host.locations.clone().unwrap_or_default(),
            advanced_config: host.advanced_config.clone().unwrap_or_default(),
            meta: UpdateMeta {
                letsencrypt_agree: true,
                dns_challenge: host.dns_challenge(),
            },
        };

        Self {
            host_id: host.id,
            payload,
        }
    }
}

/// Accept `true`/`false`, `0`/`1`, or null for flag fields
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    }))
}
