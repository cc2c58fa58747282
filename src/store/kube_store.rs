// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::store::{ObjectKey, ObjectStore, StoreError, StoreObject};
use async_trait::async_trait;
use kube::{
    api::{Api, PostParams},
    Client,
};
use kube_core::ErrorResponse;

/// ObjectStore backed by the Kubernetes API server. Optimistic concurrency
/// comes from sending `.metadata.resourceVersion` with every replace.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> KubeStore {
        KubeStore { client }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoreObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, StoreError> {
        let api = Api::<K>::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(StoreError::Api)
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj)?;
        let api = Api::<K>::namespaced(self.client.clone(), &key.namespace);
        api.create(&PostParams::default(), obj)
            .await
            .map_err(|e| kube_error_to_store_error(key, e))
    }

    async fn update<K: StoreObject>(
        &self,
        obj: &K,
        expected_version: &str,
    ) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj)?;
        let api = Api::<K>::namespaced(self.client.clone(), &key.namespace);
        let mut obj = obj.clone();
        obj.meta_mut().resource_version = Some(expected_version.to_string());
        api.replace(&key.name, &PostParams::default(), &obj)
            .await
            .map_err(|e| kube_error_to_store_error(key, e))
    }
}

fn kube_error_to_store_error(key: ObjectKey, error: kube::Error) -> StoreError {
    match error {
        kube_client::Error::Api(ErrorResponse { ref reason, .. }) if reason == "NotFound" => {
            StoreError::NotFound(key)
        }
        kube_client::Error::Api(ErrorResponse { ref reason, .. }) if reason == "AlreadyExists" => {
            StoreError::AlreadyExists(key)
        }
        kube_client::Error::Api(ErrorResponse { ref reason, .. }) if reason == "Conflict" => {
            StoreError::Conflict(key)
        }
        _ => StoreError::Api(error),
    }
}
