// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use k8s_openapi::api::core::v1::EnvVar;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// DeploymentCopySpec declares how to derive a copy of an existing Deployment
/// in the same namespace.
#[derive(CustomResource, Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "duplication.k8s.wantedly.com",
    version = "v1beta1",
    kind = "DeploymentCopy",
    plural = "deploymentcopies"
)]
#[kube(shortname = "dc", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCopySpec {
    /// Merged over the source labels. Each key is also written into the pod
    /// template labels and the selector's matchLabels of the copy.
    #[serde(default)]
    pub custom_labels: BTreeMap<String, String>,

    /// Merged over the source annotations.
    #[serde(default)]
    pub custom_annotations: BTreeMap<String, String>,

    /// Replica count for the copy. Zero inherits the source's count, so a copy
    /// can never be explicitly scaled to zero through this field.
    #[serde(default)]
    pub replicas: i32,

    /// Name of the Deployment to copy.
    pub target_deployment_name: String,

    /// Overrides the pod hostname when non-empty.
    #[serde(default)]
    pub hostname: String,

    /// Suffix of the copy's name. Falls back to `.metadata.name` when empty.
    #[serde(default)]
    pub name_suffix: String,

    #[serde(default)]
    pub target_containers: Vec<TargetContainer>,
}

/// Per-container override, matched to the source's containers by name.
#[derive(Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct TargetContainer {
    pub name: String,
    pub image: String,
    /// Appended after the container's existing env, duplicates included.
    #[serde(default)]
    pub env: Vec<EnvVar>,
}

impl Default for DeploymentCopy {
    fn default() -> Self {
        Self {
            metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta::default(),
            spec: DeploymentCopySpec::default(),
        }
    }
}
