// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use anyhow::Result;
use clap::{Parser, Subcommand};
use deployment_duplicator::config::{ControllerConfig, RunArgs};
use deployment_duplicator::controller::{run_controller, CONTROLLER_NAME};
use deployment_duplicator::deploymentcopy_types::DeploymentCopy;
use kube::CustomResourceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "deployment_copy_controller", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the DeploymentCopy custom resource definition as YAML
    Export,
    /// Run the controller against the current kubeconfig context
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Export => {
            info!("exporting custom resource definition");
            println!("{}", serde_yaml::to_string(&DeploymentCopy::crd())?);
        }
        Command::Run(args) => {
            info!("running {}", CONTROLLER_NAME);
            run_controller(ControllerConfig::from(args)).await?;
        }
    }
    Ok(())
}
