use serde::Serialize;

use crate::db::operations::study::StudySession;
use crate::db::{Database, StoreContext, StoreError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudyProgress {
    pub total_words_studied: i64,
    pub total_available_words: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QuickStats {
    pub success_rate: f64,
    pub total_study_sessions: i64,
    pub total_active_groups: i64,
    pub study_streak_days: i64,
}

pub async fn get_last_study_session(db: &Database) -> Result<Option<StudySession>, StoreError> {
    sqlx::query_as::<_, StudySession>(
        r#"
        SELECT s.id, s.group_id, s.created_at, s.study_activity_id, g.name AS group_name
        FROM study_sessions s
        JOIN groups g ON g.id = s.group_id
        ORDER BY s.created_at DESC, s.id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(db.pool())
    .await
    .context("getting last study session")
}

pub async fn get_study_progress(db: &Database) -> Result<StudyProgress, StoreError> {
    sqlx::query_as::<_, StudyProgress>(
        r#"
        SELECT
            (SELECT COUNT(DISTINCT word_id) FROM word_review_items) AS total_words_studied,
            (SELECT COUNT(*) FROM words) AS total_available_words
        "#,
    )
    .fetch_one(db.pool())
    .await
    .context("getting study progress")
}

/// Success rate is a percentage over every review ever recorded (0 with no reviews).
/// Active groups and streak days only look at sessions from the last 30 days.
pub async fn get_quick_stats(db: &Database) -> Result<QuickStats, StoreError> {
    sqlx::query_as::<_, QuickStats>(
        r#"
        WITH review_stats AS (
            SELECT
                COUNT(*) AS total_reviews,
                SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END) AS correct_reviews
            FROM word_review_items
        ),
        recent_sessions AS (
            SELECT group_id, created_at
            FROM study_sessions
            WHERE created_at >= datetime('now', '-30 days')
        )
        SELECT
            COALESCE(CAST(correct_reviews AS REAL) / NULLIF(total_reviews, 0) * 100.0, 0.0) AS success_rate,
            (SELECT COUNT(*) FROM study_sessions) AS total_study_sessions,
            (SELECT COUNT(DISTINCT group_id) FROM recent_sessions) AS total_active_groups,
            (SELECT COUNT(DISTINCT date(created_at)) FROM recent_sessions) AS study_streak_days
        FROM review_stats
        "#,
    )
    .fetch_one(db.pool())
    .await
    .context("getting quick stats")
}
