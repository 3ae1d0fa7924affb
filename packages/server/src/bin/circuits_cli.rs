//! Operator CLI: apply migrations, seed reference data, mint tokens.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use circuits_core::common::{AuthUser, Permission};
use circuits_core::config::Config;
use circuits_core::domains::auth::JwtService;
use circuits_core::domains::circuits::models::{CircuitTypeInput, GraphType};
use circuits_core::kernel::store::{CircuitTypeStore, ReferenceStore};
use circuits_core::kernel::{PostgresStore, StoreError, StoreResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "circuits_cli")]
#[command(about = "Circuits operator tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Insert demo sites, tenants, circuit types and a provider graph
    Seed,

    /// Print a signed token for a caller
    Token {
        #[arg(long)]
        username: String,
        /// Grant every permission
        #[arg(long)]
        superuser: bool,
        /// Permission codename, e.g. circuits.change_circuit (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,circuits_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Migrate => {
            let store = connect(&config).await?;
            store.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations complete");
        }
        Commands::Seed => {
            let store = connect(&config).await?;
            seed(&store).await.context("Failed to seed reference data")?;
            tracing::info!("Seed complete");
        }
        Commands::Token {
            username,
            superuser,
            permissions,
        } => {
            // Reject typos up front; an unknown codename would silently grant nothing
            for permission in &permissions {
                permission.parse::<Permission>()?;
            }
            let user = AuthUser {
                user_id: Uuid::new_v4(),
                username,
                is_superuser: superuser,
                permissions,
            };
            let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());
            println!("{}", jwt_service.create_token(&user)?);
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<PostgresStore> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;
    PostgresStore::connect(database_url)
        .await
        .context("Failed to connect to database")
}

async fn seed(store: &PostgresStore) -> Result<()> {
    for (name, slug) in [("DC East", "dc-east"), ("DC West", "dc-west")] {
        skip_existing("site", name, store.insert_site(name, slug).await)?;
    }
    for (name, slug) in [("Operations", "operations"), ("Research", "research")] {
        skip_existing("tenant", name, store.insert_tenant(name, slug).await)?;
    }
    for (name, slug) in [
        ("Internet Transit", "internet-transit"),
        ("MPLS", "mpls"),
        ("Dark Fiber", "dark-fiber"),
    ] {
        let input = CircuitTypeInput {
            name: name.to_string(),
            slug: slug.to_string(),
        };
        skip_existing("circuit type", name, store.insert_circuit_type(&input).await)?;
    }
    if !store.graphs_exist(GraphType::Provider).await? {
        store
            .insert_graph(
                GraphType::Provider,
                "Provider traffic",
                "/graphs/provider/{{ obj.slug }}.png",
            )
            .await?;
        tracing::info!("Created provider graph");
    }
    Ok(())
}

fn skip_existing<T>(entity: &str, name: &str, result: StoreResult<T>) -> Result<()> {
    match result {
        Ok(_) => {
            tracing::info!(entity, name, "Created");
            Ok(())
        }
        Err(StoreError::Conflict { .. }) => {
            tracing::info!(entity, name, "Already present, skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
