// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::config::ControllerConfig;
use crate::controller::*;
use crate::deploymentcopy_types::*;
use crate::error::Error;
use crate::reconciler::ReconcileOutcome;
use crate::store::{MemoryStore, ObjectStore};
use crate::unit_tests::fixtures::*;
use kube::runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;

fn data(store: MemoryStore) -> Arc<Data<MemoryStore>> {
    Arc::new(Data {
        store,
        config: ControllerConfig::default(),
    })
}

#[test]
pub fn test_action_for_outcomes() {
    let config = ControllerConfig::default();
    assert_eq!(
        Action::await_change(),
        action_for(&ReconcileOutcome::DeclarationMissing, &config)
    );
    assert_eq!(
        Action::requeue(Duration::from_secs(60)),
        action_for(
            &ReconcileOutcome::SourceMissing {
                source: "web".to_string()
            },
            &config
        )
    );
    assert_eq!(
        Action::requeue(Duration::from_secs(60)),
        action_for(
            &ReconcileOutcome::Unchanged {
                name: "web-copy".to_string()
            },
            &config
        )
    );
}

#[test]
pub fn test_error_policy() {
    let ctx = data(MemoryStore::new());
    let dc = Arc::new(DeploymentCopy::default());
    assert_eq!(
        Action::requeue(Duration::from_secs(1)),
        error_policy(
            dc.clone(),
            &Error::VersionConflict("web-copy".to_string()),
            ctx.clone()
        )
    );
    assert_eq!(
        Action::requeue(Duration::from_secs(10)),
        error_policy(dc, &Error::MissingObjectKey(".metadata.name"), ctx)
    );
}

#[tokio::test]
pub async fn test_reconcile_creates_copy() {
    let store = MemoryStore::new();
    store
        .create(&make_deployment("web", &[("app", "web")], vec![make_container("app", "app:v1")]))
        .await
        .unwrap();
    let dc = store
        .create(&make_deployment_copy("copy-a", "web", vec![]))
        .await
        .unwrap();
    let ctx = data(store);

    let action = reconcile(Arc::new(dc), ctx.clone()).await.unwrap();
    assert_eq!(Action::requeue(Duration::from_secs(60)), action);
    assert!(ctx
        .store
        .get::<k8s_openapi::api::apps::v1::Deployment>(NAMESPACE, "web-copy-a")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
pub async fn test_reconcile_deleted_declaration() {
    let ctx = data(MemoryStore::new());
    let dc = make_deployment_copy("copy-a", "web", vec![]);
    let action = reconcile(Arc::new(dc), ctx).await.unwrap();
    assert_eq!(Action::await_change(), action);
}

#[tokio::test]
pub async fn test_reconcile_without_namespace() {
    let ctx = data(MemoryStore::new());
    let mut dc = make_deployment_copy("copy-a", "web", vec![]);
    dc.metadata.namespace = None;
    let result = reconcile(Arc::new(dc), ctx).await;
    assert!(matches!(
        result,
        Err(Error::MissingObjectKey(".metadata.namespace"))
    ));
}
