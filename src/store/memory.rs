// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::store::{ObjectKey, ObjectStore, StoreError, StoreObject};
use async_trait::async_trait;
use kube::api::DynamicObject;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// An in-process ObjectStore that mimics the parts of the API server the
/// controller relies on: uid and resourceVersion assignment, conditional
/// updates, the single-controller rule for owner references, and cascading
/// deletion of dependents.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<ObjectKey, DynamicObject>,
    resource_version: u64,
    uid_counter: u64,
}

impl MemoryState {
    fn next_resource_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    fn next_uid(&mut self) -> String {
        self.uid_counter += 1;
        format!("00000000-0000-0000-0000-{:012}", self.uid_counter)
    }
}

fn to_dynamic<K: StoreObject>(obj: &K) -> Result<DynamicObject, StoreError> {
    Ok(serde_json::from_value(serde_json::to_value(obj)?)?)
}

fn from_dynamic<K: StoreObject>(obj: &DynamicObject) -> Result<K, StoreError> {
    Ok(serde_json::from_value(serde_json::to_value(obj)?)?)
}

fn metadata_validity_check(obj: &DynamicObject) -> Result<(), StoreError> {
    let controllers = obj
        .metadata
        .owner_references
        .iter()
        .flatten()
        .filter(|r| r.controller == Some(true))
        .count();
    if controllers > 1 {
        return Err(StoreError::Invalid(
            "object has more than one controller owner reference",
        ));
    }
    Ok(())
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// All objects of kind `K` in `namespace`, ordered by name.
    pub fn list<K: StoreObject>(&self, namespace: &str) -> Result<Vec<K>, StoreError> {
        let kind = K::kind(&()).to_string();
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .objects
            .iter()
            .filter(|(key, _)| key.kind == kind && key.namespace == namespace)
            .map(|(_, obj)| from_dynamic(obj))
            .collect()
    }

    /// Removes the object and, like the garbage collector, every object that
    /// transitively names it in its owner references.
    pub fn delete<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = ObjectKey::new::<K>(namespace, name);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = state
            .objects
            .remove(&key)
            .ok_or(StoreError::NotFound(key))?;

        let mut owner_uids: Vec<String> = removed.metadata.uid.into_iter().collect();
        while let Some(uid) = owner_uids.pop() {
            let dependents: Vec<ObjectKey> = state
                .objects
                .iter()
                .filter(|(key, obj)| {
                    key.namespace == namespace
                        && obj
                            .metadata
                            .owner_references
                            .iter()
                            .flatten()
                            .any(|r| r.uid == uid)
                })
                .map(|(key, _)| key.clone())
                .collect();
            for dependent in dependents {
                if let Some(obj) = state.objects.remove(&dependent) {
                    owner_uids.extend(obj.metadata.uid);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get<K: StoreObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, StoreError> {
        let key = ObjectKey::new::<K>(namespace, name);
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.objects.get(&key).map(from_dynamic).transpose()
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj)?;
        let mut created = to_dynamic(obj)?;
        metadata_validity_check(&created)?;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        if created.metadata.uid.is_none() {
            created.metadata.uid = Some(state.next_uid());
        }
        created.metadata.resource_version = Some(state.next_resource_version());
        let result = from_dynamic(&created);
        state.objects.insert(key, created);
        result
    }

    async fn update<K: StoreObject>(
        &self,
        obj: &K,
        expected_version: &str,
    ) -> Result<K, StoreError> {
        let key = ObjectKey::of(obj)?;
        let mut updated = to_dynamic(obj)?;
        metadata_validity_check(&updated)?;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = match state.objects.get(&key) {
            Some(current) => current,
            None => return Err(StoreError::NotFound(key)),
        };
        if current.metadata.resource_version.as_deref() != Some(expected_version) {
            return Err(StoreError::Conflict(key));
        }
        updated.metadata.uid = current.metadata.uid.clone();
        updated.metadata.resource_version = Some(state.next_resource_version());
        let result = from_dynamic(&updated);
        state.objects.insert(key, updated);
        result
    }
}
