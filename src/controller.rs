// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::config::ControllerConfig;
use crate::deploymentcopy_types::*;
use crate::error::Error;
use crate::reconciler::{reconcile_deployment_copy, ReconcileOutcome};
use crate::store::{KubeStore, ObjectStore};
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    api::{Api, ListParams},
    runtime::{
        controller::{self, Action, Controller},
        reflector::ObjectRef,
    },
    Client, Resource,
};
use std::sync::Arc;
use tracing::*;

pub const CONTROLLER_NAME: &str = "deployment-copy-controller";

// Data we want access to in error/reconcile calls
pub struct Data<S> {
    pub store: S,
    pub config: ControllerConfig,
}

/// Controller triggers this whenever a DeploymentCopy or a Deployment it owns changed
pub async fn reconcile<S: ObjectStore>(
    dc_from_cache: Arc<DeploymentCopy>,
    ctx: Arc<Data<S>>,
) -> Result<Action, Error> {
    let dc_name = dc_from_cache
        .metadata
        .name
        .as_ref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.name"))?;
    let dc_ns = dc_from_cache
        .metadata
        .namespace
        .as_ref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.namespace"))?;

    // The cached copy may be stale, so the reconciler reads the DeploymentCopy again.
    let outcome = reconcile_deployment_copy(&ctx.store, dc_ns, dc_name).await?;
    info!("Reconciled DeploymentCopy {}/{}: {}", dc_ns, dc_name, outcome);
    Ok(action_for(&outcome, &ctx.config))
}

pub fn action_for(outcome: &ReconcileOutcome, config: &ControllerConfig) -> Action {
    match outcome {
        ReconcileOutcome::DeclarationMissing => Action::await_change(),
        // Source Deployments are not watched, so a missing one is polled for.
        _ => Action::requeue(config.requeue_after),
    }
}

/// The controller triggers this on reconcile errors
pub fn error_policy<S>(_object: Arc<DeploymentCopy>, error: &Error, ctx: Arc<Data<S>>) -> Action {
    warn!("Reconcile failed due to error: {}", error);
    if error.is_conflict() {
        Action::requeue(ctx.config.conflict_requeue_after)
    } else {
        Action::requeue(ctx.config.error_requeue_after)
    }
}

pub fn report_controller_reconciled<K, QueueErr>(
    controller_name: &str,
    result: &Result<(ObjectRef<K>, Action), controller::Error<Error, QueueErr>>,
) where
    K: Resource,
    QueueErr: std::error::Error,
{
    match result {
        Ok((obj, _)) => {
            info!(
                controller.name = controller_name,
                object = %obj,
                "Reconciled object"
            );
        }
        Err(err) => {
            error!(
                controller.name = controller_name,
                error = err as &dyn std::error::Error,
                "Failed to reconcile object",
            );
        }
    }
}

/// Runs the DeploymentCopy controller against the cluster from the default
/// kubeconfig until a shutdown signal arrives.
pub async fn run_controller(config: ControllerConfig) -> Result<()> {
    let client = Client::try_default().await?;
    let (dc_api, deploy_api) = match config.namespace.as_deref() {
        Some(ns) => (
            Api::<DeploymentCopy>::namespaced(client.clone(), ns),
            Api::<Deployment>::namespaced(client.clone(), ns),
        ),
        None => (
            Api::<DeploymentCopy>::all(client.clone()),
            Api::<Deployment>::all(client.clone()),
        ),
    };
    let data = Arc::new(Data {
        store: KubeStore::new(client),
        config,
    });

    info!("starting {}", CONTROLLER_NAME);
    Controller::new(dc_api, ListParams::default())
        .owns(deploy_api, ListParams::default())
        .shutdown_on_signal()
        .run(reconcile::<KubeStore>, error_policy::<KubeStore>, data)
        .for_each(|res| async move { report_controller_reconciled(CONTROLLER_NAME, &res) })
        .await;
    info!("controller terminated");
    Ok(())
}
