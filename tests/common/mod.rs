#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pengyou_backend::db::migrate::run_migrations;
use pengyou_backend::db::Database;
use pengyou_backend::state::AppState;

pub struct TestApp {
    pub db: Database,
    pub router: Router,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::connect(temp_dir.path().join("words.db"))
        .await
        .expect("failed to open database");
    run_migrations(&db).await.expect("migration failed");
    (temp_dir, db)
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(false).await
}

pub async fn create_test_app_with(expose_error_details: bool) -> TestApp {
    let (dir, db) = create_test_db().await;
    let router = pengyou_backend::build_app(AppState::new(db.clone(), expose_error_details));
    TestApp {
        db,
        router,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.post_raw(uri, &body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

// RETURNING rows are read with fetch_all so the insert is committed before
// the pooled connection is reused.
fn first_id(ids: Vec<i64>) -> i64 {
    ids[0]
}

pub async fn insert_group(db: &Database, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO groups (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_all(db.pool())
        .await
        .map(first_id)
        .expect("insert group")
}

pub async fn insert_word(db: &Database, japanese: &str, romaji: &str, english: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO words (japanese, romaji, english, parts) VALUES (?, ?, ?, NULL) RETURNING id",
    )
    .bind(japanese)
    .bind(romaji)
    .bind(english)
    .fetch_all(db.pool())
    .await
    .map(first_id)
    .expect("insert word")
}

pub async fn link_word(db: &Database, word_id: i64, group_id: i64) {
    sqlx::query("INSERT INTO words_groups (word_id, group_id) VALUES (?, ?)")
        .bind(word_id)
        .bind(group_id)
        .execute(db.pool())
        .await
        .expect("link word to group");
}

pub async fn insert_activity(db: &Database, id: i64) {
    sqlx::query("INSERT INTO study_activities (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(format!("Activity {id}"))
        .execute(db.pool())
        .await
        .expect("insert activity");
}

/// Inserts a session with an explicit `created_at` (`YYYY-MM-DD HH:MM:SS`).
pub async fn insert_session_at(db: &Database, group_id: i64, activity_id: i64, created_at: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO study_sessions (group_id, study_activity_id, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(group_id)
    .bind(activity_id)
    .bind(created_at)
    .fetch_all(db.pool())
    .await
    .map(first_id)
    .expect("insert session")
}

pub async fn insert_review_at(
    db: &Database,
    word_id: i64,
    session_id: i64,
    correct: bool,
    created_at: &str,
) {
    sqlx::query(
        "INSERT INTO word_review_items (word_id, study_session_id, correct, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(word_id)
    .bind(session_id)
    .bind(correct)
    .bind(created_at)
    .execute(db.pool())
    .await
    .expect("insert review");
}

/// Group "Greetings" with 你好, 谢谢 and 再见, plus activity 1.
pub async fn seed_greetings(db: &Database) -> (i64, Vec<i64>) {
    let group_id = insert_group(db, "Greetings").await;
    let mut word_ids = Vec::new();
    for (japanese, romaji, english) in [
        ("你好", "nihao", "hello"),
        ("谢谢", "xiexie", "thank you"),
        ("再见", "zaijian", "goodbye"),
    ] {
        let word_id = insert_word(db, japanese, romaji, english).await;
        link_word(db, word_id, group_id).await;
        word_ids.push(word_id);
    }
    insert_activity(db, 1).await;
    (group_id, word_ids)
}
