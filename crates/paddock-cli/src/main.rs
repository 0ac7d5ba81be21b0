//! Paddock CLI - typed access to a dataset-management backend
//!
//! Usage:
//!   paddock init                        Write a default paddock.toml
//!   paddock users list                  List user accounts
//!   paddock datasets list               List datasets
//!   paddock datasets download <pk>      Download a dataset archive
//!   paddock datasets upload <pk> <file> Upload a file into a dataset
//!   paddock teams members <pk>          Show a team's memberships
//!
//! Connection settings come from `paddock.toml` or the `PADDOCK_SERVER`,
//! `PADDOCK_USERNAME`, and `PADDOCK_PASSWORD` environment variables; the
//! `--server` flag overrides both.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paddock_client::Client;
use paddock_core::{
    ClientConfig, DatasetCreate, Permissions, ProjectCreate, TeamCreate,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "paddock")]
#[command(author, version, about = "Client for the Paddock dataset-management backend")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Server base URL (overrides config file and environment)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default paddock.toml to the given directory
    Init {
        /// Target directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// User accounts
    Users {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetCommands,
    },

    /// Projects
    Projects {
        #[command(subcommand)]
        action: ProjectCommands,
    },

    /// Teams and memberships
    Teams {
        #[command(subcommand)]
        action: TeamCommands,
    },

    /// Licenses known to the backend
    Licenses,

    /// Frameworks known to the backend
    Frameworks,

    /// Problem domains known to the backend
    Domains,
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all users
    List,
    /// Show one user
    Get { pk: i64 },
}

#[derive(Subcommand)]
enum DatasetCommands {
    /// List all datasets
    List,
    /// Show one dataset
    Get { pk: i64 },
    /// Create a dataset
    Create {
        name: String,
        /// Project primary key
        #[arg(long)]
        project: i64,
        /// License primary key
        #[arg(long)]
        license: i64,
        /// Make the dataset publicly readable
        #[arg(long)]
        public: bool,
    },
    /// Delete a dataset
    Delete { pk: i64 },
    /// Copy a dataset server-side under a new name
    Copy { pk: i64, new_name: String },
    /// Download the dataset archive
    Download {
        pk: i64,
        /// Output file (defaults to dataset-<pk>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a file into a dataset
    Upload { pk: i64, file: PathBuf },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List all projects
    List,
    /// Create a project
    Create {
        name: String,
        /// Owning team primary key
        #[arg(long)]
        team: i64,
    },
}

#[derive(Subcommand)]
enum TeamCommands {
    /// List all teams
    List,
    /// Create a team
    Create { name: String },
    /// Show a team's memberships
    Members { pk: i64 },
    /// Add a user to a team
    AddMember {
        pk: i64,
        username: String,
        /// Permission level: read, write, or admin
        #[arg(long, default_value = "read")]
        permissions: String,
    },
    /// Remove a user from a team
    RemoveMember { pk: i64, username: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Init { path } => {
            ClientConfig::write_default(&path)?;
            println!("Wrote {}", path.join("paddock.toml").display());
            Ok(())
        }
        command => {
            let client = build_client(cli.server.as_deref())?;
            let result = run(&client, command).await;
            client.close();
            result
        }
    }
}

fn build_client(server_override: Option<&str>) -> Result<Client> {
    let mut config =
        ClientConfig::load_or_default(Path::new(".")).context("Failed to load configuration")?;
    if let Some(server) = server_override {
        config.server_url = server.to_string();
    }
    Client::with_config(&config).context("Failed to construct client")
}

async fn run(client: &Client, command: Commands) -> Result<()> {
    match command {
        Commands::Init { .. } => unreachable!("handled before client construction"),

        Commands::Users { action } => match action {
            UserCommands::List => {
                for user in client.users().list().await? {
                    println!("{:<6} {}", user.pk, user.username);
                }
                Ok(())
            }
            UserCommands::Get { pk } => {
                let user = client.users().get(pk).await?;
                println!("{:#?}", user);
                Ok(())
            }
        },

        Commands::Datasets { action } => run_datasets(client, action).await,

        Commands::Projects { action } => match action {
            ProjectCommands::List => {
                for project in client.projects().list().await? {
                    println!("{:<6} {:<30} team {}", project.pk, project.name, project.team);
                }
                Ok(())
            }
            ProjectCommands::Create { name, team } => {
                let project = client
                    .projects()
                    .create(&ProjectCreate { name, team })
                    .await?;
                println!("Created project {} (pk {})", project.name, project.pk);
                Ok(())
            }
        },

        Commands::Teams { action } => run_teams(client, action).await,

        Commands::Licenses => {
            for license in client.licenses().list().await? {
                println!("{:<6} {}", license.pk, license.name);
            }
            Ok(())
        }

        Commands::Frameworks => {
            for framework in client.frameworks().list().await? {
                println!("{:<6} {} {}", framework.pk, framework.name, framework.version);
            }
            Ok(())
        }

        Commands::Domains => {
            for domain in client.domains().list().await? {
                println!("{:<6} {}", domain.pk, domain.name);
            }
            Ok(())
        }
    }
}

async fn run_datasets(client: &Client, action: DatasetCommands) -> Result<()> {
    match action {
        DatasetCommands::List => {
            for ds in client.datasets().list().await? {
                let marker = if ds.is_deleted() { " (deleted)" } else { "" };
                println!("{:<6} {:<30} v{}{}", ds.pk, ds.name, ds.version, marker);
            }
            Ok(())
        }
        DatasetCommands::Get { pk } => {
            let ds = client.datasets().get(pk).await?;
            println!("{:#?}", ds);
            Ok(())
        }
        DatasetCommands::Create {
            name,
            project,
            license,
            public,
        } => {
            let ds = client
                .datasets()
                .create(&DatasetCreate {
                    name,
                    project,
                    license,
                    is_public: public,
                    tags: String::new(),
                })
                .await?;
            println!("Created dataset {} (pk {})", ds.name, ds.pk);
            Ok(())
        }
        DatasetCommands::Delete { pk } => {
            client.datasets().delete(pk).await?;
            println!("Deleted dataset {}", pk);
            Ok(())
        }
        DatasetCommands::Copy { pk, new_name } => {
            let copy = client.datasets().copy(pk, &new_name).await?;
            println!("Copied dataset {} to {} (pk {})", pk, copy.name, copy.pk);
            Ok(())
        }
        DatasetCommands::Download { pk, output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(format!("dataset-{}.zip", pk)));
            let bytes = client.datasets().download(pk).await?;
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
        DatasetCommands::Upload { pk, file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("File has no usable name")?;
            client.datasets().upload_file(pk, filename, data).await?;
            println!("Uploaded {} into dataset {}", filename, pk);
            Ok(())
        }
    }
}

async fn run_teams(client: &Client, action: TeamCommands) -> Result<()> {
    match action {
        TeamCommands::List => {
            for team in client.teams().list().await? {
                println!("{:<6} {}", team.pk, team.name);
            }
            Ok(())
        }
        TeamCommands::Create { name } => {
            let team = client.teams().create(&TeamCreate { name }).await?;
            println!("Created team {} (pk {})", team.name, team.pk);
            Ok(())
        }
        TeamCommands::Members { pk } => {
            for membership in client.memberships().list().await? {
                if membership.team == pk {
                    println!("{:<20} {}", membership.username, membership.permissions);
                }
            }
            Ok(())
        }
        TeamCommands::AddMember {
            pk,
            username,
            permissions,
        } => {
            let permissions: Permissions = permissions
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            client.memberships().add(pk, &username, permissions).await?;
            println!("Added {} to team {} ({})", username, pk, permissions);
            Ok(())
        }
        TeamCommands::RemoveMember { pk, username } => {
            client.memberships().remove(pk, &username).await?;
            println!("Removed {} from team {}", username, pk);
            Ok(())
        }
    }
}
