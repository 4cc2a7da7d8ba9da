//! Database maintenance for the vocabulary backend.
//!
//! ```text
//! pengyou-db initdb         create an empty database file
//! pengyou-db migrate        apply pending migrations
//! pengyou-db seed [DIR]     load JSON seed files (default db/seeds)
//! pengyou-db clean          remove the database file
//! pengyou-db reset          clean, initdb, then migrate
//! ```
//!
//! The database path comes from `DATABASE_PATH` (default `./words.db`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use pengyou_backend::config::Config;
use pengyou_backend::db::migrate::run_migrations;
use pengyou_backend::db::Database;
use pengyou_backend::seed::{seed_directory, DEFAULT_SEED_DIR};

const USAGE: &str = "usage: pengyou-db <initdb|migrate|seed [DIR]|clean|reset>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let path = config.database_path;
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("initdb") => init_db(&path).await,
        Some("migrate") => migrate(&path).await,
        Some("seed") => {
            let dir = args.next().unwrap_or_else(|| DEFAULT_SEED_DIR.to_string());
            seed(&path, Path::new(&dir)).await
        }
        Some("clean") => clean(&path).await,
        Some("reset") => {
            clean(&path).await?;
            init_db(&path).await?;
            migrate(&path).await
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
        None => bail!("{USAGE}"),
    }
}

async fn init_db(path: &Path) -> anyhow::Result<()> {
    let db = Database::connect(path)
        .await
        .with_context(|| format!("creating database {}", path.display()))?;
    db.close().await;
    tracing::info!(path = %path.display(), "database initialized");
    Ok(())
}

async fn migrate(path: &Path) -> anyhow::Result<()> {
    let db = open(path).await?;
    let applied = run_migrations(&db).await;
    db.close().await;
    let applied = applied.context("applying migrations")?;
    tracing::info!(applied, "migrations completed");
    Ok(())
}

async fn seed(path: &Path, dir: &Path) -> anyhow::Result<()> {
    let db = open(path).await?;
    let summary = seed_directory(&db, dir).await;
    db.close().await;
    let summary = summary.with_context(|| format!("seeding from {}", dir.display()))?;
    tracing::info!(
        activities = summary.activities,
        groups = summary.groups,
        words = summary.words,
        "seeding completed successfully"
    );
    Ok(())
}

async fn clean(path: &Path) -> anyhow::Result<()> {
    for file in database_files(path) {
        match tokio::fs::remove_file(&file).await {
            Ok(()) => tracing::info!(path = %file.display(), "removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("removing {}", file.display()));
            }
        }
    }
    Ok(())
}

async fn open(path: &Path) -> anyhow::Result<Database> {
    if !path.exists() {
        bail!(
            "database {} does not exist, run `pengyou-db initdb` first",
            path.display()
        );
    }
    Database::connect(path)
        .await
        .with_context(|| format!("opening database {}", path.display()))
}

/// The database file plus the WAL side files SQLite leaves next to it.
fn database_files(path: &Path) -> Vec<PathBuf> {
    let mut files = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        files.push(PathBuf::from(name));
    }
    files
}
