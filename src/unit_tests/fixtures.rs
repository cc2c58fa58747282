// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::deploymentcopy_types::*;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

pub const NAMESPACE: &str = "some-namespace";

pub fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..EnvVar::default()
    }
}

pub fn make_container(name: &str, image: &str) -> Container {
    Container {
        name: name.to_string(),
        image: Some(image.to_string()),
        ..Container::default()
    }
}

pub fn make_container_with_env(name: &str, image: &str, env: Vec<EnvVar>) -> Container {
    Container {
        env: Some(env),
        ..make_container(name, image)
    }
}

/// A Deployment whose object labels, template labels and selector all carry `labels`.
pub fn make_deployment(
    name: &str,
    labels: &[(&str, &str)],
    containers: Vec<Container>,
) -> Deployment {
    let labels = string_map(labels);
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            labels: Some(labels.clone()),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers,
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    }
}

pub fn target_container(name: &str, image: &str, env: Vec<EnvVar>) -> TargetContainer {
    TargetContainer {
        name: name.to_string(),
        image: image.to_string(),
        env,
    }
}

pub fn make_deployment_copy(
    name: &str,
    target: &str,
    target_containers: Vec<TargetContainer>,
) -> DeploymentCopy {
    DeploymentCopy {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            uid: Some(format!("{}-uid", name)),
            ..ObjectMeta::default()
        },
        spec: DeploymentCopySpec {
            target_deployment_name: target.to_string(),
            target_containers,
            ..DeploymentCopySpec::default()
        },
    }
}

pub fn containers_of(deploy: &Deployment) -> &Vec<Container> {
    &deploy
        .spec
        .as_ref()
        .unwrap()
        .template
        .spec
        .as_ref()
        .unwrap()
        .containers
}
