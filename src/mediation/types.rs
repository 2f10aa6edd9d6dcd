//! Mediation wire types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ResponseConfig;

/// Decode a JSON `null` as the field's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One ad-network call described by the client.
///
/// Every field is optional on the wire; absent or `null` fields decode to
/// their empty value. Only `url` is checked, the rest is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdRequest {
    /// Target URL of the ad call. Must be non-empty.
    #[serde(alias = "URL", alias = "Url", deserialize_with = "null_as_default")]
    pub url: String,
    /// Opaque request body to forward.
    #[serde(alias = "Body", deserialize_with = "null_as_default")]
    pub body: String,
    /// Headers to forward.
    #[serde(alias = "Headers", deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    /// HTTP method to use for the ad call.
    #[serde(alias = "Method", deserialize_with = "null_as_default")]
    pub method: String,
    /// Per-call budget in milliseconds. Not enforced.
    #[serde(deserialize_with = "null_as_default")]
    pub timeout_ms: u64,
    /// Ad network identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub adnet_id: u64,
}

impl AdRequest {
    /// Whether the request names a target URL.
    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Multi-network request envelope.
///
/// Accepted by nothing today: `/mediate` takes a single [`AdRequest`].
/// Kept so the batch wire format stays documented alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediationRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timeout_ms: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub ad_requests: Vec<AdRequest>,
}

/// Mediation result returned to the client.
///
/// `dc_responses` is ordered so repeated serialization is byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediationResponse {
    pub request_id: i64,
    pub dc_responses: BTreeMap<String, String>,
}

impl From<&ResponseConfig> for MediationResponse {
    fn from(config: &ResponseConfig) -> Self {
        Self {
            request_id: config.request_id,
            dc_responses: config.dc_responses.clone(),
        }
    }
}

impl Default for MediationResponse {
    fn default() -> Self {
        Self::from(&ResponseConfig::default())
    }
}
