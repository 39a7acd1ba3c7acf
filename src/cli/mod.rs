//! # githookctl
//!
//! Command-line companion for the GitHook Controller.
//!
//! ```bash
//! # List GitHook resources in every namespace
//! githookctl list githook
//!
//! # Show the status of one resource
//! githookctl status gh my-hook --namespace ci
//!
//! # Ask the controller to reconcile now
//! githookctl reconcile githook my-hook
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

mod list;
mod reconcile;
mod status;

/// GitHook Controller CLI
#[derive(Parser)]
#[command(name = "githookctl")]
#[command(
    about = "GitHook Controller CLI",
    long_about = None,
    after_help = "\
Available resource types:
  githook (or 'gh') - GitHook resource

Examples:
  githookctl list githook
  githookctl reconcile gh my-hook
  githookctl status githook my-hook --namespace default
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace (defaults to `default` for single resources, all namespaces for list)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Kubernetes context to use
    #[arg(short, long, global = true)]
    context: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger reconciliation for a GitHook resource
    Reconcile {
        #[arg(value_enum, value_name = "RESOURCE_TYPE")]
        resource_type: ResourceType,

        /// Name of the GitHook resource
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// List GitHook resources
    List {
        #[arg(value_enum, value_name = "RESOURCE_TYPE")]
        resource_type: ResourceType,
    },
    /// Show status of a GitHook resource
    Status {
        #[arg(value_enum, value_name = "RESOURCE_TYPE")]
        resource_type: ResourceType,

        /// Name of the GitHook resource
        #[arg(value_name = "NAME")]
        name: String,
    },
}

/// Resource types supported by githookctl
#[derive(Clone, ValueEnum)]
enum ResourceType {
    #[value(name = "githook", aliases = ["gh", "githooks"])]
    GitHook,
}

#[tokio::main]
async fn main() -> Result<()> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "githookctl=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = client_for_context(cli.context.as_deref()).await?;

    match cli.command {
        Commands::Reconcile {
            resource_type: ResourceType::GitHook,
            name,
        } => reconcile::reconcile_command(client, name, cli.namespace).await,
        Commands::List {
            resource_type: ResourceType::GitHook,
        } => list::list_command(client, cli.namespace).await,
        Commands::Status {
            resource_type: ResourceType::GitHook,
            name,
        } => status::status_command(client, name, cli.namespace).await,
    }
}

async fn client_for_context(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(context) => {
            let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..KubeConfigOptions::default()
            };
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{context}'"))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration. Ensure kubeconfig is configured.")?,
    };

    Client::try_from(config).context("Failed to create Kubernetes client")
}
