// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::Resource;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OwnershipError {
    #[error("owner has no .metadata.name")]
    MissingOwnerName,

    #[error("owner {0} has no .metadata.uid yet")]
    MissingOwnerUid(String),

    #[error("object is already controlled by {kind} {name}")]
    AlreadyOwned { kind: String, name: String },
}

/// Makes `owner` the controller of the object described by `meta`.
///
/// An existing reference to the same owner (matched by uid) is replaced;
/// references to other, non-controller owners are kept. The reference blocks
/// deletion of the owner until the garbage collector removed the object.
/// Fails if a different object already controls `meta`.
pub fn set_controller_reference<K>(owner: &K, meta: &mut ObjectMeta) -> Result<(), OwnershipError>
where
    K: Resource<DynamicType = ()>,
{
    let owner_name = owner
        .meta()
        .name
        .clone()
        .ok_or(OwnershipError::MissingOwnerName)?;
    let mut oref = owner
        .controller_owner_ref(&())
        .ok_or(OwnershipError::MissingOwnerUid(owner_name))?;
    oref.block_owner_deletion = Some(true);
    let refs = meta.owner_references.get_or_insert_with(Vec::new);
    if let Some(other) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != oref.uid)
    {
        return Err(OwnershipError::AlreadyOwned {
            kind: other.kind.clone(),
            name: other.name.clone(),
        });
    }
    upsert_owner_reference(refs, oref);
    Ok(())
}

fn upsert_owner_reference(refs: &mut Vec<OwnerReference>, oref: OwnerReference) {
    match refs.iter_mut().find(|r| r.uid == oref.uid) {
        Some(existing) => *existing = oref,
        None => refs.push(oref),
    }
}
