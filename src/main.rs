//! Keystead - project membership and secret administration
//!
//! Every command runs in a single database transaction that is committed only
//! when the command succeeds.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keystead_core::{
    Activity, ActivityEmitter, MemberOracle, MembershipService, ProjectRole, Secret,
    SecretService, SecretStore,
};
use keystead_db::{DbStore, Fixture};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::config::KeysteadConfig;

/// Keystead - manage who can see what in shared projects
#[derive(Parser, Debug)]
#[command(name = "keystead")]
#[command(about = "Keystead - manage project members and the secrets they can see")]
#[command(version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database URL (sqlite://... or postgres://...)
    #[arg(long, global = true, env = "KEYSTEAD_DATABASE_URL")]
    database_url: Option<String>,

    /// JSON config file with defaults for database_url and default_actor
    #[arg(long, global = true, env = "KEYSTEAD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Load users, organizations, projects, memberships and secrets from JSON
    #[command(long_about = r#"
Load a JSON fixture in one transaction. Either every record is written or
none is.

EXAMPLE FIXTURE:
  {
    "users": [{"id": "...", "name": "Ada", "email": "ada@example.com"}],
    "organizations": [{"id": "...", "name": "Acme"}],
    "projects": [{"id": "...", "organization_id": "...", "name": "infra"}],
    "organization_memberships": [{"organization_id": "...", "user_id": "...", "role": "owner"}],
    "project_memberships": [{"project_id": "...", "user_id": "...", "role": "member"}],
    "secrets": [{"id": "...", "project_id": "...", "environment_id": "...",
                 "name": "API_TOKEN", "type": "env", "payload": {"value": "..."}}]
  }
    "#)]
    Import {
        /// Fixture file
        file: PathBuf,
    },

    /// Inspect and change project memberships
    Members {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Inspect, create and archive environment secrets
    Secrets {
        #[command(subcommand)]
        command: SecretCommands,
    },
}

#[derive(Subcommand, Debug)]
enum MemberCommands {
    /// List the members of a project the actor may see
    List {
        #[arg(long)]
        project: Uuid,

        /// User to act as (defaults to default_actor from the config file)
        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,
    },

    /// Give a user an explicit project membership
    Add {
        #[arg(long)]
        project: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,

        /// User to add
        #[arg(long)]
        target: Uuid,

        /// Project role to grant (member or owner)
        #[arg(long, default_value = "member")]
        role: ProjectRole,
    },

    /// Make a user an owner of a project
    Promote {
        #[arg(long)]
        project: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,

        /// User to promote
        #[arg(long)]
        target: Uuid,
    },

    /// Remove a user's project membership (or leave, when target is the actor)
    Remove {
        #[arg(long)]
        project: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,

        /// User to remove
        #[arg(long)]
        target: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum SecretCommands {
    /// List the secrets of an environment as the actor sees them
    List {
        #[arg(long)]
        environment: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,
    },

    /// Show one secret as the actor sees it
    Show {
        id: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,
    },

    /// Create a secret. SSH secrets start pending until their key is generated.
    Create {
        #[arg(long)]
        project: Uuid,

        #[arg(long)]
        environment: Uuid,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        kind: SecretKindArg,

        /// Value of an env secret
        #[arg(long)]
        value: Option<String>,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,
    },

    /// Archive a secret so it no longer shows up anywhere
    Archive {
        id: Uuid,

        #[arg(long, env = "KEYSTEAD_ACTOR")]
        actor: Option<Uuid>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SecretKindArg {
    Ssh,
    Env,
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Hands activities to the log; delivery to other systems happens downstream
struct LogEmitter;

impl ActivityEmitter for LogEmitter {
    fn enqueue(&self, activity: Activity) {
        info!(
            activity = activity.name,
            user_id = %activity.user_id,
            project_id = %activity.project_id,
            occurred_on = %activity.occurred_on,
            "Activity enqueued"
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => KeysteadConfig::load(path)?,
        None => KeysteadConfig::default(),
    };
    let database_url = config.database_url(cli.database_url);
    debug!("Using database {}", database_url);

    let db = keystead_db::connect(&database_url)
        .await
        .context(format!("Failed to connect to database: {}", database_url))?;

    match cli.command {
        Commands::Migrate => {
            keystead_db::migrate(&db)
                .await
                .context("Failed to run migrations")?;
        }
        Commands::Import { file } => import_fixture(&db, file).await?,
        Commands::Members { command } => run_members(&db, &config, command).await?,
        Commands::Secrets { command } => run_secrets(&db, &config, command).await?,
    }

    Ok(())
}

async fn import_fixture(db: &DatabaseConnection, file: PathBuf) -> Result<()> {
    let json =
        fs::read_to_string(&file).context(format!("Failed to read fixture: {:?}", file))?;
    let fixture: Fixture =
        serde_json::from_str(&json).context(format!("Failed to parse fixture: {:?}", file))?;

    let txn = db.begin().await.context("Failed to begin transaction")?;
    let summary = keystead_db::import(&txn, &fixture)
        .await
        .context("Failed to import fixture")?;
    txn.commit().await.context("Failed to commit import")?;

    println!(
        "Imported {} users, {} organizations, {} projects, {} memberships, {} secrets",
        summary.users, summary.organizations, summary.projects, summary.memberships, summary.secrets
    );

    Ok(())
}

async fn run_members(
    db: &DatabaseConnection,
    config: &KeysteadConfig,
    command: MemberCommands,
) -> Result<()> {
    let txn = db.begin().await.context("Failed to begin transaction")?;
    let mut activity = None;

    {
        let store = DbStore::new(&txn);
        let service = MembershipService::new(&store, &store, &store);

        match command {
            MemberCommands::Add {
                project,
                actor,
                target,
                role,
            } => {
                let actor = config.actor(actor)?;
                let acting = service.resolve(actor, project).await?;
                let added = service
                    .add(project, actor, target, role, &MemberOracle::for_member(&acting))
                    .await?;
                print_json(&added)?;
            }
            MemberCommands::List { project, actor } => {
                let actor = config.actor(actor)?;
                let reader = service.resolve(actor, project).await?;
                let members = service
                    .list_members(project, &MemberOracle::for_member(&reader))
                    .await?;
                print_json(&members)?;
            }
            MemberCommands::Promote {
                project,
                actor,
                target,
            } => {
                let actor = config.actor(actor)?;
                let promoted = service.promote(project, actor, target).await?;
                print_json(&promoted)?;
            }
            MemberCommands::Remove {
                project,
                actor,
                target,
            } => {
                let actor = config.actor(actor)?;
                activity = Some(service.remove(project, actor, target).await?);
            }
        }
    }

    txn.commit().await.context("Failed to commit transaction")?;

    // Only committed changes produce activities
    if let Some(activity) = activity {
        LogEmitter.enqueue(activity);
    }

    Ok(())
}

async fn run_secrets(
    db: &DatabaseConnection,
    config: &KeysteadConfig,
    command: SecretCommands,
) -> Result<()> {
    let txn = db.begin().await.context("Failed to begin transaction")?;

    {
        let store = DbStore::new(&txn);
        let members = MembershipService::new(&store, &store, &store);
        let secrets = SecretService::new(&store);

        match command {
            SecretCommands::List { environment, actor } => {
                let actor = config.actor(actor)?;

                // Secrets of one environment share a project; the actor's role
                // there drives the oracle.
                let project = store
                    .list_environment_secrets(environment)
                    .await?
                    .first()
                    .map(|s| s.project_id);

                let listed = match project {
                    Some(project) => {
                        let reader = members.resolve(actor, project).await?;
                        secrets
                            .list_environment_secrets(
                                environment,
                                &MemberOracle::for_member(&reader),
                            )
                            .await?
                    }
                    None => Vec::new(),
                };
                print_json(&listed)?;
            }
            SecretCommands::Show { id, actor } => {
                let actor = config.actor(actor)?;
                let secret = store
                    .find_secret(id)
                    .await?
                    .ok_or_else(|| keystead_core::Error::not_found("secret", id))?;

                let reader = members.resolve(actor, secret.project_id).await?;
                let shown = secrets
                    .show(id, &MemberOracle::for_member(&reader))
                    .await?;
                print_json(&shown)?;
            }
            SecretCommands::Create {
                project,
                environment,
                name,
                kind,
                value,
                actor,
            } => {
                let actor = config.actor(actor)?;
                let secret = match (kind, value) {
                    (SecretKindArg::Ssh, None) => Secret::new_ssh(project, environment, name),
                    (SecretKindArg::Ssh, Some(_)) => {
                        bail!("SSH secrets take no --value; their key pair is generated")
                    }
                    (SecretKindArg::Env, Some(value)) => {
                        Secret::new_environment(project, environment, name, value)
                    }
                    (SecretKindArg::Env, None) => bail!("env secrets need a --value"),
                };

                let creator = members.resolve(actor, project).await?;
                let created = secrets
                    .create(secret, &MemberOracle::for_member(&creator))
                    .await?;
                print_json(&created)?;
            }
            SecretCommands::Archive { id, actor } => {
                let actor = config.actor(actor)?;
                let secret = store
                    .find_secret(id)
                    .await?
                    .ok_or_else(|| keystead_core::Error::not_found("secret", id))?;

                let archiver = members.resolve(actor, secret.project_id).await?;
                secrets
                    .archive(id, &MemberOracle::for_member(&archiver))
                    .await?;
            }
        }
    }

    txn.commit().await.context("Failed to commit transaction")?;

    Ok(())
}
