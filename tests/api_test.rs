mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use pengyou_backend::middleware::MAX_BODY_BYTES;

use common::{create_test_app, create_test_app_with, seed_greetings};

#[tokio::test]
async fn test_greetings_study_flow() {
    let app = create_test_app().await;
    let (group_id, word_ids) = seed_greetings(&app.db).await;

    let groups = app.get("/api/groups").await;
    assert_eq!(groups.status, StatusCode::OK);
    assert_eq!(groups.body["items"][0]["name"], "Greetings");
    assert_eq!(groups.body["items"][0]["word_count"], 3);
    assert_eq!(groups.body["pagination"]["total_items"], 1);
    assert_eq!(groups.body["pagination"]["total_pages"], 1);

    let created = app
        .post_json(
            "/api/study_sessions",
            json!({ "group_id": group_id, "study_activity_id": 1 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["group_id"], group_id);
    assert_eq!(created.body["study_activity_id"], 1);
    assert!(created.body["created_at"].is_string());
    let session_id = created.body["id"].as_i64().unwrap();
    assert!(session_id > 0);

    let review = app
        .post_json(
            &format!("/api/study_sessions/{session_id}/words/{}/review", word_ids[0]),
            json!({ "correct": true }),
        )
        .await;
    assert_eq!(review.status, StatusCode::OK);
    assert_eq!(
        review.body,
        json!({
            "success": true,
            "word_id": word_ids[0],
            "study_session_id": session_id,
            "correct": true,
        })
    );

    let review = app
        .post_json(
            &format!("/api/study_sessions/{session_id}/words/{}/review", word_ids[1]),
            json!({ "correct": false }),
        )
        .await;
    assert_eq!(review.status, StatusCode::OK);
    assert_eq!(review.body["correct"], false);

    let words = app
        .get(&format!("/api/study_sessions/{session_id}/words"))
        .await;
    assert_eq!(words.status, StatusCode::OK);
    let items = words.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["japanese"], "你好");
    assert_eq!(items[0]["correct_count"], 1);
    assert_eq!(items[0]["wrong_count"], 0);
    assert_eq!(items[0]["session_correct"], true);
    assert_eq!(items[1]["japanese"], "谢谢");
    assert_eq!(items[1]["correct_count"], 0);
    assert_eq!(items[1]["wrong_count"], 1);
    assert_eq!(items[1]["session_correct"], false);

    let session = app.get(&format!("/api/study_sessions/{session_id}")).await;
    assert_eq!(session.status, StatusCode::OK);
    assert_eq!(session.body["group_name"], "Greetings");
    assert_eq!(session.body["review_items_count"], 2);

    let stats = app.get("/api/dashboard/quick-stats").await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["success_rate"], 50.0);
    assert_eq!(stats.body["total_study_sessions"], 1);
    assert_eq!(stats.body["total_active_groups"], 1);
    assert_eq!(stats.body["study_streak_days"], 1);

    let progress = app.get("/api/dashboard/study_progress").await;
    assert_eq!(
        progress.body,
        json!({ "total_words_studied": 2, "total_available_words": 3 })
    );

    let last = app.get("/api/dashboard/last_study_session").await;
    assert_eq!(last.status, StatusCode::OK);
    assert_eq!(last.body["id"], session_id);
    assert_eq!(last.body["group_name"], "Greetings");

    let activity_sessions = app.get("/api/study_activities/1/study_sessions").await;
    assert_eq!(activity_sessions.status, StatusCode::OK);
    assert_eq!(activity_sessions.body["items"][0]["id"], session_id);
    assert_eq!(activity_sessions.body["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn test_word_review_counters_accumulate() {
    let app = create_test_app().await;
    let (group_id, word_ids) = seed_greetings(&app.db).await;
    let session = app
        .post_json(
            "/api/study_sessions",
            json!({ "group_id": group_id, "study_activity_id": 1 }),
        )
        .await;
    let session_id = session.body["id"].as_i64().unwrap();
    let uri = format!("/api/study_sessions/{session_id}/words/{}/review", word_ids[2]);

    for correct in [true, true, false] {
        let response = app.post_json(&uri, json!({ "correct": correct })).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let word = app.get(&format!("/api/words/{}", word_ids[2])).await;
    assert_eq!(word.status, StatusCode::OK);
    assert_eq!(word.body["japanese"], "再见");
    assert_eq!(word.body["correct_count"], 2);
    assert_eq!(word.body["wrong_count"], 1);
    assert_eq!(word.body["groups"], json!([{ "id": group_id, "name": "Greetings" }]));

    let words = app
        .get(&format!("/api/study_sessions/{session_id}/words"))
        .await;
    assert_eq!(words.body["pagination"]["total_items"], 1);
    assert_eq!(words.body["items"][0]["session_correct"], false);
}

#[tokio::test]
async fn test_quick_stats_without_reviews() {
    let app = create_test_app().await;

    let stats = app.get("/api/dashboard/quick-stats").await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(
        stats.body,
        json!({
            "success_rate": 0.0,
            "total_study_sessions": 0,
            "total_active_groups": 0,
            "study_streak_days": 0,
        })
    );
}

#[tokio::test]
async fn test_missing_resources_return_404() {
    let app = create_test_app().await;

    for (uri, message) in [
        ("/api/words/999", "Word not found"),
        ("/api/groups/999", "Group not found"),
        ("/api/study_sessions/999", "Study session not found"),
        ("/api/study_activities/999", "Study activity not found"),
        ("/api/dashboard/last_study_session", "No study sessions found"),
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(response.body, json!({ "error": message }), "{uri}");
    }

    let response = app.get("/api/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Not found");
}

#[tokio::test]
async fn test_empty_listings_are_not_errors() {
    let app = create_test_app().await;

    for uri in [
        "/api/words",
        "/api/groups",
        "/api/groups/42/words",
        "/api/study_sessions",
        "/api/study_sessions/42/words",
        "/api/study_activities/42/study_sessions",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(response.body["items"], json!([]), "{uri}");
        assert_eq!(
            response.body["pagination"],
            json!({
                "current_page": 1,
                "total_pages": 0,
                "total_items": 0,
                "items_per_page": 100,
            }),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_malformed_path_ids_return_400() {
    let app = create_test_app().await;

    for (uri, message) in [
        ("/api/words/abc", "Invalid word ID"),
        ("/api/groups/abc", "Invalid group ID"),
        ("/api/groups/abc/words", "Invalid group ID"),
        ("/api/study_sessions/abc", "Invalid session ID"),
        ("/api/study_sessions/abc/words", "Invalid session ID"),
        ("/api/study_activities/abc", "Invalid activity ID"),
        ("/api/study_activities/abc/study_sessions", "Invalid activity ID"),
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body, json!({ "error": message }), "{uri}");
    }

    let response = app
        .post_json("/api/study_sessions/1/words/abc/review", json!({ "correct": true }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid word ID");

    let response = app
        .post_json("/api/study_sessions/abc/words/1/review", json!({ "correct": true }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid session ID");
}

#[tokio::test]
async fn test_invalid_pagination_returns_400() {
    let app = create_test_app().await;

    for query in ["page=0", "page_size=0", "page_size=101", "page=abc", "page=-1"] {
        for path in ["/api/words", "/api/groups", "/api/study_sessions"] {
            let uri = format!("{path}?{query}");
            let response = app.get(&uri).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(response.body["error"], "Invalid pagination parameters", "{uri}");
        }
    }
}

#[tokio::test]
async fn test_words_pagination_splits_pages() {
    let app = create_test_app().await;
    for i in 0..150 {
        common::insert_word(&app.db, &format!("字{i}"), &format!("zi{i}"), &format!("word {i}")).await;
    }

    let first = app.get("/api/words").await;
    assert_eq!(first.body["items"].as_array().unwrap().len(), 100);
    assert_eq!(first.body["pagination"]["total_pages"], 2);
    assert_eq!(first.body["pagination"]["total_items"], 150);

    let second = app.get("/api/words?page=2&page_size=100").await;
    let items = second.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 50);
    assert_eq!(items[0]["english"], "word 100");
    assert_eq!(second.body["pagination"]["current_page"], 2);

    let small = app.get("/api/words?page=3&page_size=7").await;
    assert_eq!(small.body["items"].as_array().unwrap().len(), 7);
    assert_eq!(small.body["items"][0]["english"], "word 14");
    assert_eq!(small.body["pagination"]["total_pages"], 22);
    assert_eq!(small.body["pagination"]["items_per_page"], 7);

    let beyond = app.get("/api/words?page=9&page_size=100").await;
    assert_eq!(beyond.status, StatusCode::OK);
    assert_eq!(beyond.body["items"], json!([]));
}

#[tokio::test]
async fn test_invalid_request_bodies_return_400() {
    let app = create_test_app().await;
    let (group_id, word_ids) = seed_greetings(&app.db).await;

    for body in [
        json!({}),
        json!({ "group_id": group_id }),
        json!({ "group_id": 0, "study_activity_id": 1 }),
        json!({ "group_id": group_id, "study_activity_id": -4 }),
        json!({ "group_id": "one", "study_activity_id": 1 }),
    ] {
        let response = app.post_json("/api/study_sessions", body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["error"], "Invalid request body", "{body}");
    }

    let response = app.post_raw("/api/study_sessions", "{not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let review_uri = format!("/api/study_sessions/1/words/{}/review", word_ids[0]);
    for body in [json!({}), json!({ "correct": "yes" })] {
        let response = app.post_json(&review_uri, body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["error"], "Invalid request body", "{body}");
    }
}

#[tokio::test]
async fn test_oversized_request_body_returns_413() {
    let app = create_test_app().await;
    seed_greetings(&app.db).await;

    let padding = " ".repeat(MAX_BODY_BYTES);
    let body = format!(r#"{{"group_id": 1, "study_activity_id": 1}}{padding}"#);
    let response = app.post_raw("/api/study_sessions", &body).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["error"], "Request body too large");

    let sessions = app.get("/api/study_sessions").await;
    assert_eq!(sessions.body["pagination"]["total_items"], 0);
}

#[tokio::test]
async fn test_created_session_is_immediately_visible() {
    let app = create_test_app().await;
    let (group_id, _) = seed_greetings(&app.db).await;

    for created_count in 1..=20 {
        let created = app
            .post_json(
                "/api/study_sessions",
                json!({ "group_id": group_id, "study_activity_id": 1 }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let id = created.body["id"].as_i64().unwrap();

        let session = app.get(&format!("/api/study_sessions/{id}")).await;
        assert_eq!(session.status, StatusCode::OK, "session {id}");
        assert_eq!(session.body["id"], id);

        let sessions = app.get("/api/study_sessions?page_size=100").await;
        assert_eq!(sessions.status, StatusCode::OK);
        assert_eq!(sessions.body["pagination"]["total_items"], created_count);
    }
}

#[tokio::test]
async fn test_session_for_unknown_group_is_rejected() {
    let app = create_test_app().await;
    seed_greetings(&app.db).await;

    let response = app
        .post_json(
            "/api/study_sessions",
            json!({ "group_id": 999, "study_activity_id": 1 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Internal server error");

    let sessions = app.get("/api/study_sessions").await;
    assert_eq!(sessions.body["pagination"]["total_items"], 0);
}

#[tokio::test]
async fn test_review_store_errors_respect_exposure_setting() {
    let hidden = create_test_app().await;
    let response = hidden
        .post_json("/api/study_sessions/77/words/88/review", json!({ "correct": true }))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Internal server error");

    let exposed = create_test_app_with(true).await;
    let response = exposed
        .post_json("/api/study_sessions/77/words/88/review", json!({ "correct": true }))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.body["error"].as_str().unwrap();
    assert!(message.starts_with("error adding word review: "), "{message}");
}

#[tokio::test]
async fn test_study_activity_includes_seeded_details() {
    let app = create_test_app().await;
    sqlx::query(
        "INSERT INTO study_activities (id, name, description, thumbnail_url) VALUES (3, 'Flashcards', 'Flip cards', '/img/flash.png')",
    )
    .execute(app.db.pool())
    .await
    .unwrap();

    let response = app.get("/api/study_activities/3").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 3);
    assert_eq!(response.body["name"], "Flashcards");
    assert_eq!(response.body["description"], "Flip cards");
    assert_eq!(response.body["thumbnail_url"], "/img/flash.png");
    assert!(response.body["study_session_id"].is_null());
    assert!(response.body["group_id"].is_null());
}

#[tokio::test]
async fn test_request_id_header_is_set_and_increasing() {
    let app = create_test_app().await;

    let first = app.get("/api/words").await;
    let second = app.get("/api/words/999").await;

    let first_id: u64 = first.headers["x-request-id"].to_str().unwrap().parse().unwrap();
    let second_id: u64 = second.headers["x-request-id"].to_str().unwrap().parse().unwrap();
    assert!(second_id > first_id);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = create_test_app().await;

    let response = app
        .send(
            Request::builder()
                .uri("/api/groups")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = create_test_app().await;

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "connected");
    assert!(response.body["uptime"].is_u64());
}
