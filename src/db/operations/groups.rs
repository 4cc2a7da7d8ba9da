use serde::Serialize;

use crate::db::operations::words::WordWithStats;
use crate::db::{Database, StoreContext, StoreError};
use crate::pagination::PageRequest;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub word_count: i64,
}

pub async fn list_groups(
    db: &Database,
    page: PageRequest,
) -> Result<(Vec<Group>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(db.pool())
        .await
        .context("counting groups")?;

    let groups = sqlx::query_as::<_, Group>(
        r#"
        SELECT g.id, g.name, COUNT(DISTINCT wg.word_id) AS word_count
        FROM groups g
        LEFT JOIN words_groups wg ON wg.group_id = g.id
        GROUP BY g.id
        ORDER BY g.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying groups")?;

    Ok((groups, total))
}

pub async fn get_group(db: &Database, group_id: i64) -> Result<Option<Group>, StoreError> {
    sqlx::query_as::<_, Group>(
        r#"
        SELECT g.id, g.name, COUNT(DISTINCT wg.word_id) AS word_count
        FROM groups g
        LEFT JOIN words_groups wg ON wg.group_id = g.id
        WHERE g.id = ?
        GROUP BY g.id
        "#,
    )
    .bind(group_id)
    .fetch_optional(db.pool())
    .await
    .context("getting group")
}

pub async fn list_group_words(
    db: &Database,
    group_id: i64,
    page: PageRequest,
) -> Result<(Vec<WordWithStats>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT word_id)
        FROM words_groups
        WHERE group_id = ?
        "#,
    )
    .bind(group_id)
    .fetch_one(db.pool())
    .await
    .context("counting group words")?;

    // Membership is a subquery so a duplicated association cannot inflate the counters.
    let words = sqlx::query_as::<_, WordWithStats>(
        r#"
        SELECT
            w.id, w.japanese, w.romaji, w.english, w.parts,
            COALESCE(SUM(CASE WHEN wr.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
            COALESCE(SUM(CASE WHEN wr.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
        FROM words w
        LEFT JOIN word_review_items wr ON wr.word_id = w.id
        WHERE w.id IN (SELECT word_id FROM words_groups WHERE group_id = ?)
        GROUP BY w.id
        ORDER BY w.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(group_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying group words")?;

    Ok((words, total))
}
