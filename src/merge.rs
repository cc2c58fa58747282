// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::common::*;
use crate::deploymentcopy_types::*;
use crate::error::Error;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Annotations kube-controller-manager stamps on every Deployment it rolls
/// out. They belong to the object they are found on and are never copied.
pub const SERVER_MANAGED_ANNOTATIONS: &[&str] = &["deployment.kubernetes.io/revision"];

/// The state a derived Deployment should have, computed from its source and
/// the DeploymentCopy that declares it. Ownership is not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredDeployment {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub spec: DeploymentSpec,
}

impl DesiredDeployment {
    pub fn make_deployment(&self) -> Deployment {
        let mut deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..ObjectMeta::default()
            },
            ..Deployment::default()
        };
        self.apply_to(&mut deployment);
        deployment
    }

    /// Overwrites labels, annotations and spec of `deployment` as a whole,
    /// except for the server-managed annotations `deployment` already has.
    /// Everything else (resourceVersion, uid, status, owner references) is
    /// left as it is.
    pub fn apply_to(&self, deployment: &mut Deployment) {
        let mut annotations = self.annotations.clone();
        if let Some(current) = deployment.metadata.annotations.as_ref() {
            for key in SERVER_MANAGED_ANNOTATIONS {
                if let Some(value) = current.get(*key) {
                    annotations.insert(key.to_string(), value.clone());
                }
            }
        }
        deployment.metadata.labels = non_empty(&self.labels);
        deployment.metadata.annotations = non_empty(&annotations);
        deployment.spec = Some(self.spec.clone());
    }
}

// The API server drops empty maps, so writing Some({}) would never compare
// equal to what is read back.
fn non_empty(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    if map.is_empty() {
        None
    } else {
        Some(map.clone())
    }
}

/// Computes the derived Deployment for `dc` from `source`.
///
/// The result depends only on the two arguments. The source is cloned, never
/// modified.
pub fn merge(source: &Deployment, dc: &DeploymentCopy) -> Result<DesiredDeployment, Error> {
    let source_name = source
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| Error::MissingObjectKey("Deployment .metadata.name"))?;
    let namespace = deployment_copy_namespace(dc)?;
    let suffix = effective_suffix(dc)?;

    let mut spec = source.spec.clone().unwrap_or_default();

    if !dc.spec.hostname.is_empty() {
        spec.template
            .spec
            .get_or_insert_with(PodSpec::default)
            .hostname = Some(dc.spec.hostname.clone());
    }
    // TODO: replace the zero sentinel with Option<i32> so a copy can be scaled to zero.
    if dc.spec.replicas != 0 {
        spec.replicas = Some(dc.spec.replicas);
    }

    let labels = merge_labels(source, &dc.spec.custom_labels, &mut spec);

    let mut annotations = source.metadata.annotations.clone().unwrap_or_default();
    annotations.extend(
        dc.spec
            .custom_annotations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    annotations.retain(|key, _| !SERVER_MANAGED_ANNOTATIONS.contains(&key.as_str()));

    override_containers(&mut spec, &dc.spec.target_containers);

    Ok(DesiredDeployment {
        name: derived_deployment_name(source_name, suffix),
        namespace: namespace.to_string(),
        labels,
        annotations,
        spec,
    })
}

// Custom labels win over the source's and are kept in lock-step across the
// object labels, the pod template labels and the selector.
fn merge_labels(
    source: &Deployment,
    custom_labels: &BTreeMap<String, String>,
    spec: &mut DeploymentSpec,
) -> BTreeMap<String, String> {
    let mut labels = source.metadata.labels.clone().unwrap_or_default();
    if custom_labels.is_empty() {
        return labels;
    }
    let template_labels = spec
        .template
        .metadata
        .get_or_insert_with(ObjectMeta::default)
        .labels
        .get_or_insert_with(BTreeMap::new);
    let match_labels = spec.selector.match_labels.get_or_insert_with(BTreeMap::new);
    for (key, value) in custom_labels {
        labels.insert(key.clone(), value.clone());
        template_labels.insert(key.clone(), value.clone());
        match_labels.insert(key.clone(), value.clone());
    }
    labels
}

fn override_containers(spec: &mut DeploymentSpec, targets: &[TargetContainer]) {
    // Later entries with the same name take precedence.
    let overrides: BTreeMap<&str, &TargetContainer> =
        targets.iter().map(|t| (t.name.as_str(), t)).collect();
    if overrides.is_empty() {
        return;
    }
    let pod_spec = match spec.template.spec.as_mut() {
        Some(pod_spec) => pod_spec,
        None => return,
    };
    for container in pod_spec.containers.iter_mut() {
        if let Some(target) = overrides.get(container.name.as_str()) {
            container.image = Some(target.image.clone());
            if !target.env.is_empty() {
                container
                    .env
                    .get_or_insert_with(Vec::new)
                    .extend(target.env.iter().cloned());
            }
        }
    }
}
