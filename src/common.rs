// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::deploymentcopy_types::*;
use crate::error::Error;

pub fn deployment_copy_name(dc: &DeploymentCopy) -> Result<&str, Error> {
    dc.metadata
        .name
        .as_deref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.name"))
}

pub fn deployment_copy_namespace(dc: &DeploymentCopy) -> Result<&str, Error> {
    dc.metadata
        .namespace
        .as_deref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.namespace"))
}

/// The suffix appended to the source name: `.spec.nameSuffix` when set,
/// otherwise the DeploymentCopy's own name.
pub fn effective_suffix(dc: &DeploymentCopy) -> Result<&str, Error> {
    if dc.spec.name_suffix.is_empty() {
        deployment_copy_name(dc)
    } else {
        Ok(dc.spec.name_suffix.as_str())
    }
}

pub fn derived_deployment_name(source_name: &str, suffix: &str) -> String {
    format!("{}-{}", source_name, suffix)
}
