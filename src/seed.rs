//! Loading the JSON seed files shipped under `db/seeds`.
//!
//! Two file shapes exist. An activities file (`*activities*.json`) lists the
//! study activities; every other `*.json` file describes one word group and
//! its words.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::db::{returned_row, Database, StoreContext, StoreError};

pub const DEFAULT_SEED_DIR: &str = "db/seeds";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("error reading seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
pub struct ActivitySeedFile {
    pub activities: Vec<ActivitySeed>,
}

#[derive(Debug, Deserialize)]
pub struct ActivitySeed {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WordGroupSeedFile {
    pub group: GroupSeed,
    pub words: Vec<WordSeed>,
}

#[derive(Debug, Deserialize)]
pub struct GroupSeed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WordSeed {
    pub japanese: String,
    pub romaji: String,
    pub english: String,
    #[serde(default)]
    pub parts: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub activities: usize,
    pub groups: usize,
    pub words: usize,
}

/// Seeds every `*.json` file in `dir`: activity files first, then word
/// groups, each in file-name order.
pub async fn seed_directory(db: &Database, dir: &Path) -> Result<SeedSummary, SeedError> {
    let files = seed_files(dir).await?;
    let (activity_files, group_files): (Vec<_>, Vec<_>) =
        files.into_iter().partition(|path| is_activities_file(path));

    let mut summary = SeedSummary::default();

    for file in &activity_files {
        summary.activities += seed_activities(db, file).await?;
    }

    for file in &group_files {
        summary.words += seed_word_group(db, file).await?;
        summary.groups += 1;
    }

    tracing::info!(
        activities = summary.activities,
        groups = summary.groups,
        words = summary.words,
        dir = %dir.display(),
        "seeding completed"
    );

    Ok(summary)
}

/// Upserts the activities listed in `file`. Returns how many were written.
pub async fn seed_activities(db: &Database, file: &Path) -> Result<usize, SeedError> {
    let seed: ActivitySeedFile = read_seed(file).await?;

    let mut tx = db.pool().begin().await.context("starting activity seed")?;
    for activity in &seed.activities {
        sqlx::query(
            r#"
            INSERT INTO study_activities (id, name, description, thumbnail_url)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                thumbnail_url = excluded.thumbnail_url
            "#,
        )
        .bind(activity.id)
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(&activity.thumbnail_url)
        .execute(&mut *tx)
        .await
        .context("inserting activity")?;
    }
    tx.commit().await.context("committing activity seed")?;

    tracing::info!(file = %file.display(), count = seed.activities.len(), "seeded study activities");
    Ok(seed.activities.len())
}

/// Inserts one group, its words and their associations in a single
/// transaction. Returns the number of words inserted.
pub async fn seed_word_group(db: &Database, file: &Path) -> Result<usize, SeedError> {
    let seed: WordGroupSeedFile = read_seed(file).await?;

    let mut tx = db.pool().begin().await.context("starting word group seed")?;

    let group_ids: Vec<i64> =
        sqlx::query_scalar("INSERT INTO groups (name) VALUES (?) RETURNING id")
            .bind(&seed.group.name)
            .fetch_all(&mut *tx)
            .await
            .context("inserting group")?;
    let group_id = returned_row(group_ids, "inserting group")?;

    for word in &seed.words {
        let word_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO words (japanese, romaji, english, parts)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&word.japanese)
        .bind(&word.romaji)
        .bind(&word.english)
        .bind(word.parts.as_ref().and_then(parts_text))
        .fetch_all(&mut *tx)
        .await
        .context("inserting word")?;
        let word_id = returned_row(word_ids, "inserting word")?;

        sqlx::query("INSERT INTO words_groups (word_id, group_id) VALUES (?, ?)")
            .bind(word_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .context("inserting word-group association")?;
    }

    tx.commit().await.context("committing word group seed")?;

    tracing::info!(group = %seed.group.name, words = seed.words.len(), "seeded word group");
    Ok(seed.words.len())
}

/// Stored form of a word's `parts`: strings as-is, any other JSON as its text.
pub fn parts_text(parts: &serde_json::Value) -> Option<String> {
    match parts {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn is_activities_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains("activities"))
}

async fn seed_files(dir: &Path) -> Result<Vec<PathBuf>, SeedError> {
    let io_error = |source| SeedError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_seed<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T, SeedError> {
    let content = tokio::fs::read(file).await.map_err(|source| SeedError::Io {
        path: file.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| SeedError::Parse {
        path: file.display().to_string(),
        source,
    })
}
