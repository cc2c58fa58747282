// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::ownership::OwnershipError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to get DeploymentCopy: {0}")]
    GetDeclarationFailed(#[source] StoreError),

    #[error("Failed to get source Deployment {name}: {source}")]
    GetSourceFailed {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to reconcile Deployment {name}: {source}")]
    ReconcileDeploymentFailed {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Deployment {0} was modified since it was read")]
    VersionConflict(String),

    #[error("Failed to set owner reference: {0}")]
    Ownership(#[from] OwnershipError),

    #[error("MissingObjectKey: {0}")]
    MissingObjectKey(&'static str),
}

impl Error {
    /// A conflict is resolved by the next pass, which re-reads the latest
    /// version, so it can be retried without backoff.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::VersionConflict(_))
    }
}
