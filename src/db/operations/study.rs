use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::operations::words::WordWithStats;
use crate::db::{returned_row, Database, StoreContext, StoreError};
use crate::pagination::PageRequest;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudySession {
    pub id: i64,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
    pub study_activity_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub review_items_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudyActivity {
    pub id: i64,
    pub study_session_id: Option<i64>,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

pub async fn list_study_sessions(
    db: &Database,
    page: PageRequest,
) -> Result<(Vec<StudySession>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        "#,
    )
    .fetch_one(db.pool())
    .await
    .context("counting study sessions")?;

    let sessions = sqlx::query_as::<_, StudySession>(
        r#"
        SELECT
            s.id, s.group_id, s.created_at, s.study_activity_id,
            g.name AS group_name,
            COUNT(wr.id) AS review_items_count
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        LEFT JOIN word_review_items wr ON wr.study_session_id = s.id
        GROUP BY s.id
        ORDER BY s.created_at DESC, s.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying study sessions")?;

    Ok((sessions, total))
}

pub async fn get_study_session(
    db: &Database,
    session_id: i64,
) -> Result<Option<StudySession>, StoreError> {
    sqlx::query_as::<_, StudySession>(
        r#"
        SELECT
            s.id, s.group_id, s.created_at, s.study_activity_id,
            g.name AS group_name,
            COUNT(wr.id) AS review_items_count
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        LEFT JOIN word_review_items wr ON wr.study_session_id = s.id
        WHERE s.id = ?
        GROUP BY s.id
        "#,
    )
    .bind(session_id)
    .fetch_optional(db.pool())
    .await
    .context("getting study session")
}

/// Words reviewed in one session, in the order they were first reviewed there.
///
/// `correct_count` / `wrong_count` stay lifetime totals across all sessions;
/// `session_correct` is the outcome of the word's latest review in this session.
pub async fn list_study_session_words(
    db: &Database,
    session_id: i64,
    page: PageRequest,
) -> Result<(Vec<WordWithStats>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT word_id)
        FROM word_review_items
        WHERE study_session_id = ?
        "#,
    )
    .bind(session_id)
    .fetch_one(db.pool())
    .await
    .context("counting session words")?;

    let words = sqlx::query_as::<_, WordWithStats>(
        r#"
        WITH session_reviews AS (
            SELECT word_id, MIN(id) AS first_review_id, MAX(id) AS last_review_id
            FROM word_review_items
            WHERE study_session_id = ?
            GROUP BY word_id
        ),
        lifetime AS (
            SELECT
                word_id,
                SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END) AS correct_count,
                SUM(CASE WHEN correct = 0 THEN 1 ELSE 0 END) AS wrong_count
            FROM word_review_items
            WHERE word_id IN (SELECT word_id FROM session_reviews)
            GROUP BY word_id
        )
        SELECT
            w.id, w.japanese, w.romaji, w.english, w.parts,
            COALESCE(l.correct_count, 0) AS correct_count,
            COALESCE(l.wrong_count, 0) AS wrong_count,
            last_review.correct AS session_correct
        FROM session_reviews sr
        JOIN words w ON w.id = sr.word_id
        JOIN word_review_items first_review ON first_review.id = sr.first_review_id
        JOIN word_review_items last_review ON last_review.id = sr.last_review_id
        LEFT JOIN lifetime l ON l.word_id = sr.word_id
        ORDER BY first_review.created_at ASC, first_review.id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(session_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying session words")?;

    Ok((words, total))
}

pub async fn create_study_session(
    db: &Database,
    group_id: i64,
    study_activity_id: i64,
) -> Result<StudySession, StoreError> {
    let rows = sqlx::query_as::<_, StudySession>(
        r#"
        INSERT INTO study_sessions (group_id, study_activity_id)
        VALUES (?, ?)
        RETURNING id, group_id, created_at, study_activity_id
        "#,
    )
    .bind(group_id)
    .bind(study_activity_id)
    .fetch_all(db.pool())
    .await
    .context("creating study session")?;

    returned_row(rows, "creating study session")
}

pub async fn get_study_activity(
    db: &Database,
    activity_id: i64,
) -> Result<Option<StudyActivity>, StoreError> {
    sqlx::query_as::<_, StudyActivity>(
        r#"
        SELECT id, study_session_id, group_id, created_at, name, description, thumbnail_url
        FROM study_activities
        WHERE id = ?
        "#,
    )
    .bind(activity_id)
    .fetch_optional(db.pool())
    .await
    .context("getting study activity")
}

pub async fn list_study_activity_sessions(
    db: &Database,
    activity_id: i64,
    page: PageRequest,
) -> Result<(Vec<StudySession>, i64), StoreError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        WHERE s.study_activity_id = ?
        "#,
    )
    .bind(activity_id)
    .fetch_one(db.pool())
    .await
    .context("counting activity sessions")?;

    let sessions = sqlx::query_as::<_, StudySession>(
        r#"
        SELECT
            s.id, s.group_id, s.created_at, s.study_activity_id,
            g.name AS group_name,
            COUNT(wr.id) AS review_items_count
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        LEFT JOIN word_review_items wr ON wr.study_session_id = s.id
        WHERE s.study_activity_id = ?
        GROUP BY s.id
        ORDER BY s.created_at DESC, s.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(activity_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(db.pool())
    .await
    .context("querying activity sessions")?;

    Ok((sessions, total))
}
