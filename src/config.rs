// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use clap::Args;
use std::time::Duration;

/// Settings for a running controller. Built once at startup and shared with
/// every reconcile through the controller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Watch DeploymentCopy objects in this namespace only; all namespaces when unset.
    pub namespace: Option<String>,
    /// Delay before a successful or unresolved reconcile runs again.
    pub requeue_after: Duration,
    pub error_requeue_after: Duration,
    pub conflict_requeue_after: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            namespace: None,
            requeue_after: Duration::from_secs(60),
            error_requeue_after: Duration::from_secs(10),
            conflict_requeue_after: Duration::from_secs(1),
        }
    }
}

/// Command line flags of the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Only watch DeploymentCopy objects in this namespace
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Seconds between periodic resyncs of each DeploymentCopy
    #[arg(long, env = "REQUEUE_SECS", default_value_t = 60)]
    pub requeue_secs: u64,

    /// Seconds to wait before retrying a failed reconcile
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = 10)]
    pub error_requeue_secs: u64,

    /// Seconds to wait before retrying after a write conflict
    #[arg(long, env = "CONFLICT_REQUEUE_SECS", default_value_t = 1)]
    pub conflict_requeue_secs: u64,
}

impl From<RunArgs> for ControllerConfig {
    fn from(args: RunArgs) -> Self {
        ControllerConfig {
            namespace: args.namespace,
            requeue_after: Duration::from_secs(args.requeue_secs),
            error_requeue_after: Duration::from_secs(args.error_requeue_secs),
            conflict_requeue_after: Duration::from_secs(args.conflict_requeue_secs),
        }
    }
}
