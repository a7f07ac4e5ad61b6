use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use mimalloc::MiMalloc;
use pgkv::PostgresKeyValueStorage;
use pgkv::config::Config;
use serde_json::Value;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Inspect and edit a PostgreSQL-backed key-value table.
#[derive(Debug, Parser)]
#[command(name = "pgkv", version)]
struct Cli {
    /// Overrides `database_url` from the configuration.
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Overrides `table_name` from the configuration.
    #[arg(long, global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database and table if missing.
    Init,
    Get { key: String },
    Has { key: String },
    /// Store a JSON document under a key.
    Set { key: String, value: String },
    Delete { key: String },
    /// Print every entry as `key<TAB>json`.
    Entries,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::load()?;
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }
    if let Some(table) = cli.table {
        cfg.table_name = table;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let storage: PostgresKeyValueStorage<Value> = PostgresKeyValueStorage::with_options(
        cfg.database_url.clone(),
        cfg.table_name.clone(),
        cfg.storage_options(),
    );
    storage.initialize().await?;

    let succeeded = run(&storage, cli.command).await;
    storage.close().await;

    if succeeded? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Run one subcommand. `Ok(false)` means a lookup found nothing.
async fn run(
    storage: &PostgresKeyValueStorage<Value>,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Init => {
            info!(table = %storage.table_name(), "storage initialized");
        }
        Command::Get { key } => match storage.get(&key).await? {
            Some(value) => println!("{value}"),
            None => return Ok(false),
        },
        Command::Has { key } => println!("{}", storage.has(&key).await?),
        Command::Set { key, value } => {
            let value: Value = serde_json::from_str(&value)?;
            storage.set(&key, &value).await?;
        }
        Command::Delete { key } => println!("{}", storage.delete(&key).await?),
        Command::Entries => {
            let mut entries = storage.entries();
            while let Some((key, value)) = entries.try_next().await? {
                println!("{key}\t{value}");
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_overrides() {
        let args = ["pgkv", "--table", "sessions", "set", "abc", r#"{"exp":100}"#];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.table.as_deref(), Some("sessions"));
        assert!(matches!(
            cli.command,
            Command::Set { ref key, ref value } if key == "abc" && value == r#"{"exp":100}"#
        ));
        assert!(Cli::try_parse_from(["pgkv", "get"]).is_err());
    }

    #[tokio::test]
    async fn missing_key_reports_failure_without_exiting() {
        let Ok(url) = std::env::var("PGKV_TEST_DATABASE_URL") else {
            eprintln!("PGKV_TEST_DATABASE_URL not set; skipping");
            return;
        };
        let table = format!("cli_{}", std::process::id());
        let storage: PostgresKeyValueStorage<Value> =
            PostgresKeyValueStorage::new(url.as_str(), table.as_str());
        storage.initialize().await.unwrap();

        let get = |key: &str| Command::Get { key: key.to_string() };
        assert!(!run(&storage, get("absent")).await.unwrap());

        let set = Command::Set { key: "present".into(), value: "[1,2]".into() };
        assert!(run(&storage, set).await.unwrap());
        assert!(run(&storage, get("present")).await.unwrap());
        assert!(run(&storage, Command::Delete { key: "present".into() }).await.unwrap());

        // Still usable afterwards: the process was not torn down mid-run.
        assert!(!storage.has("present").await.unwrap());
        storage.close().await;

        let pool = sqlx::PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }
}
