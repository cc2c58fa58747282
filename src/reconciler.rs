// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::deploymentcopy_types::*;
use crate::error::Error;
use crate::merge::{merge, DesiredDeployment};
use crate::ownership::set_controller_reference;
use crate::store::{ObjectStore, StoreError};
use k8s_openapi::api::apps::v1::Deployment;
use std::fmt;
use tracing::*;

/// What a reconcile pass found and did.
///
/// `DeclarationMissing` and `SourceMissing` leave nothing to do until the
/// missing object shows up; the other variants mean the derived Deployment
/// matches the desired state when the pass returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    DeclarationMissing,
    SourceMissing { source: String },
    Created { name: String },
    Updated { name: String },
    Unchanged { name: String },
}

impl ReconcileOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::Created { .. }
                | ReconcileOutcome::Updated { .. }
                | ReconcileOutcome::Unchanged { .. }
        )
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::DeclarationMissing => write!(f, "DeploymentCopy not found"),
            ReconcileOutcome::SourceMissing { source } => {
                write!(f, "source Deployment {} not found", source)
            }
            ReconcileOutcome::Created { name } => write!(f, "created Deployment {}", name),
            ReconcileOutcome::Updated { name } => write!(f, "updated Deployment {}", name),
            ReconcileOutcome::Unchanged { name } => write!(f, "Deployment {} is up to date", name),
        }
    }
}

/// Runs one reconcile pass for the DeploymentCopy `namespace/name`.
///
/// The DeploymentCopy is read once and used for the whole pass.
pub async fn reconcile_deployment_copy<S: ObjectStore>(
    store: &S,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, Error> {
    // Get the DeploymentCopy before taking any reconciliation actions.
    let dc = match store
        .get::<DeploymentCopy>(namespace, name)
        .await
        .map_err(Error::GetDeclarationFailed)?
    {
        Some(dc) => dc,
        None => {
            info!("DeploymentCopy {}/{} not found, end reconcile", namespace, name);
            return Ok(ReconcileOutcome::DeclarationMissing);
        }
    };

    let source_name = dc.spec.target_deployment_name.as_str();
    if source_name.is_empty() {
        return Err(Error::MissingObjectKey(".spec.targetDeploymentName"));
    }
    let source = match store
        .get::<Deployment>(namespace, source_name)
        .await
        .map_err(|e| Error::GetSourceFailed {
            name: source_name.to_string(),
            source: e,
        })? {
        Some(source) => source,
        None => {
            info!(
                "Source Deployment {}/{} not found, waiting for it to appear",
                namespace, source_name
            );
            return Ok(ReconcileOutcome::SourceMissing {
                source: source_name.to_string(),
            });
        }
    };

    let desired = merge(&source, &dc)?;
    debug!(
        "Copying Deployment {} to {}/{}",
        source_name, desired.namespace, desired.name
    );
    reconcile_deployment(store, &dc, &desired).await
}

/// Creates the derived Deployment or brings the existing one to `desired`.
async fn reconcile_deployment<S: ObjectStore>(
    store: &S,
    dc: &DeploymentCopy,
    desired: &DesiredDeployment,
) -> Result<ReconcileOutcome, Error> {
    let deploy_name = desired.name.as_str();
    let deploy_o = store
        .get::<Deployment>(&desired.namespace, deploy_name)
        .await
        .map_err(|e| reconcile_failed(deploy_name, e))?;

    match deploy_o {
        Some(old_deploy) => {
            let resource_version = old_deploy
                .metadata
                .resource_version
                .clone()
                .ok_or_else(|| Error::MissingObjectKey("Deployment .metadata.resourceVersion"))?;
            info!("Current rv of deployment {}: {}", deploy_name, resource_version);

            let mut updated_deploy = old_deploy.clone();
            desired.apply_to(&mut updated_deploy);
            set_controller_reference(dc, &mut updated_deploy.metadata)?;
            if updated_deploy == old_deploy {
                info!("Deployment {} is up to date", deploy_name);
                return Ok(ReconcileOutcome::Unchanged {
                    name: deploy_name.to_string(),
                });
            }

            info!("Update deployment: {}", deploy_name);
            store
                .update(&updated_deploy, &resource_version)
                .await
                .map_err(|e| reconcile_failed(deploy_name, e))?;
            Ok(ReconcileOutcome::Updated {
                name: deploy_name.to_string(),
            })
        }
        None => {
            let mut deploy = desired.make_deployment();
            set_controller_reference(dc, &mut deploy.metadata)?;

            info!("Create deployment: {}", deploy_name);
            store
                .create(&deploy)
                .await
                .map_err(|e| reconcile_failed(deploy_name, e))?;
            Ok(ReconcileOutcome::Created {
                name: deploy_name.to_string(),
            })
        }
    }
}

fn reconcile_failed(name: &str, error: StoreError) -> Error {
    match error {
        StoreError::Conflict(_) => Error::VersionConflict(name.to_string()),
        _ => Error::ReconcileDeploymentFailed {
            name: name.to_string(),
            source: error,
        },
    }
}
