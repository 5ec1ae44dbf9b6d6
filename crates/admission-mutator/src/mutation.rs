use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cluster::{CniPluginSettings, Cluster};

pub const DEFAULT_CNI_TYPE_LABEL: &str = "hackaton-cni";
pub const DEFAULT_CNI_VERSION_LABEL: &str = "hackaton-cni-version";

/// Outcome of running a [`Mutator`] against an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The rule had nothing to do, the object was not touched.
    Unchanged,
    /// The rule edited the object. The edit may still turn out to be a no-op
    /// once diffed against the original.
    Mutated,
}

/// A rule deciding whether and how to alter an object before it's admitted.
///
/// Rules are pure: they only look at the object they are given and must not
/// fail. Missing or irrelevant input is reported as [`Mutation::Unchanged`].
pub trait Mutator: Send + Sync {
    type Object: DeserializeOwned + Serialize;

    fn name(&self) -> &str;

    fn mutate(&self, object: &mut Self::Object) -> Mutation;
}

/// Select the CNI plugin of a `Cluster` from its labels.
#[derive(Debug, Clone)]
pub struct ClusterCniMutator {
    type_label: String,
    version_label: String,
}

impl Default for ClusterCniMutator {
    fn default() -> Self {
        ClusterCniMutator::new(DEFAULT_CNI_TYPE_LABEL, DEFAULT_CNI_VERSION_LABEL)
    }
}

impl ClusterCniMutator {
    pub fn new(type_label: impl Into<String>, version_label: impl Into<String>) -> Self {
        ClusterCniMutator {
            type_label: type_label.into(),
            version_label: version_label.into(),
        }
    }
}

impl Mutator for ClusterCniMutator {
    type Object = Cluster;

    fn name(&self) -> &str {
        "cluster-cni"
    }

    fn mutate(&self, cluster: &mut Cluster) -> Mutation {
        let plugin_type = cluster.label(&self.type_label).map(str::to_owned);
        let version = cluster.label(&self.version_label).map(str::to_owned);

        if plugin_type.is_none() && version.is_none() {
            debug!(
                labels = ?cluster.labels(),
                "no CNI labels set, nothing to do"
            );
            return Mutation::Unchanged;
        }

        let settings = cluster
            .spec
            .cni_plugin
            .get_or_insert_with(CniPluginSettings::default);
        if plugin_type.is_some() {
            settings.plugin_type = plugin_type;
        }
        if version.is_some() {
            settings.version = version;
        }

        Mutation::Mutated
    }
}
