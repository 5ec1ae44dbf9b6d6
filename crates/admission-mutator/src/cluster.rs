//! The `Cluster` resource, reduced to what the CNI mutation touches.
//!
//! Fields that are not modelled here are kept in the `extra` maps, so that
//! decoding and re-encoding an object does not drop anything the API server
//! sent. `metadata` is kept as raw JSON: its null fields (`creationTimestamp`
//! on create) must go back out as they came in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: ClusterSpec,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(rename = "cniPlugin", skip_serializing_if = "Option::is_none")]
    pub cni_plugin: Option<CniPluginSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CniPluginSettings {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cluster {
    /// Value of the label `key`, when it's set to a non-empty string.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .get("labels")
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn labels(&self) -> Option<&Value> {
        self.metadata.get("labels")
    }
}

// An explicit `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
