// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod kube_store;
pub mod memory;

pub use kube_store::KubeStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use core::fmt::Debug;
use kube::Resource;
use kube_core::NamespaceResourceScope;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use thiserror::Error;

/// Any namespaced object the store can hold: built-in types from k8s-openapi
/// as well as custom resources derived with `kube::CustomResource`.
pub trait StoreObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoreObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new<K: StoreObject>(namespace: &str, name: &str) -> ObjectKey {
        ObjectKey {
            kind: K::kind(&()).to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn of<K: StoreObject>(obj: &K) -> Result<ObjectKey, StoreError> {
        let meta = obj.meta();
        let name = meta
            .name
            .as_deref()
            .ok_or(StoreError::Invalid("object misses \".metadata.name\""))?;
        let namespace = meta
            .namespace
            .as_deref()
            .ok_or(StoreError::Invalid("object misses \".metadata.namespace\""))?;
        Ok(ObjectKey::new::<K>(namespace, name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(ObjectKey),

    #[error("{0} already exists")]
    AlreadyExists(ObjectKey),

    #[error("{0} has a newer resourceVersion than the one being written")]
    Conflict(ObjectKey),

    #[error("invalid object: {0}")]
    Invalid(&'static str),

    #[error("API request failed: {0}")]
    Api(#[source] kube::Error),

    #[error("failed to convert object: {0}")]
    Conversion(#[from] serde_json::Error),
}

/// Point reads and writes against a Kubernetes-style object store.
///
/// `get` reports a missing object as `Ok(None)`. `update` only succeeds when
/// the stored object is still at `expected_version`; otherwise it fails with
/// `StoreError::Conflict` and the caller is expected to re-read.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get<K: StoreObject>(&self, namespace: &str, name: &str)
        -> Result<Option<K>, StoreError>;

    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError>;

    async fn update<K: StoreObject>(&self, obj: &K, expected_version: &str)
        -> Result<K, StoreError>;
}
