use serde::Serialize;

use crate::db::{Database, StoreContext, StoreError};
use crate::pagination::PageRequest;

/// A vocabulary word with its lifetime review counters.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WordWithStats {
    pub id: i64,
    pub japanese: String,
    pub romaji: String,
    pub english: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<String>,
    pub correct_count: i64,
    pub wrong_count: i64,
    /// Outcome of the latest review inside one session; only set by the session listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub session_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

pub async fn list_words(
    db: &Database,
    page: PageRequest,
) -> Result<(Vec<WordWithStats>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(db.pool())
        .await
        .context("counting words")?;

    let words = sqlx::query_as::<_, WordWithStats>(
        r#"
        SELECT
            w.id, w.japanese, w.romaji, w.english, w.parts,
            COALESCE(SUM(CASE WHEN wr.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
            COALESCE(SUM(CASE WHEN wr.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        LEFT JOIN word_review_items wr ON wr.word_id = w.id
        GROUP BY w.id
        ORDER BY w.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying words")?;

    Ok((words, total))
}

pub async fn get_word(db: &Database, word_id: i64) -> Result<Option<WordWithStats>, StoreError> {
    sqlx::query_as::<_, WordWithStats>(
        r#"
        SELECT
            w.id, w.japanese, w.romaji, w.english, w.parts,
            COALESCE(SUM(CASE WHEN wr.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
            COALESCE(SUM(CASE WHEN wr.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        LEFT JOIN word_review_items wr ON wr.word_id = w.id
        WHERE w.id = ?
        GROUP BY w.id
        "#,
    )
    .bind(word_id)
    .fetch_optional(db.pool())
    .await
    .context("getting word")
}

pub async fn list_word_groups(db: &Database, word_id: i64) -> Result<Vec<GroupRef>, StoreError> {
    sqlx::query_as::<_, GroupRef>(
        r#"
        SELECT g.id, g.name
        FROM groups g
        JOIN words_groups wg ON wg.group_id = g.id
        WHERE wg.word_id = ?
        GROUP BY g.id
        ORDER BY g.id
        "#,
    )
    .bind(word_id)
    .fetch_all(db.pool())
    .await
    .context("getting word groups")
}

/// Appends one review. Repeated reviews of the same word in a session each get their own row.
pub async fn add_word_review(
    db: &Database,
    word_id: i64,
    study_session_id: i64,
    correct: bool,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO word_review_items (word_id, study_session_id, correct)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(word_id)
    .bind(study_session_id)
    .bind(correct)
    .execute(db.pool())
    .await
    .context("adding word review")?;

    Ok(())
}
