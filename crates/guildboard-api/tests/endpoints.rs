//! End-to-end tests over the assembled router: real in-memory store,
//! real JWT middleware, no provider calls.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use guildboard_api::router;
use guildboard_api::state::{AppState, AppStateInner};
use guildboard_db::Database;
use guildboard_types::session::{Claims, GuildRef};

const GUILD: &str = "101010101010101010";
const SECRET: &str = "test-secret";

fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory store"),
        jwt_secret: SECRET.to_string(),
        provider_api_base: "http://127.0.0.1:9".to_string(),
        http: reqwest::Client::new(),
        session_ttl_days: 7,
    })
}

fn token_for(guild_ids: &[&str]) -> String {
    let claims = Claims {
        sub: "200000000000000001".to_string(),
        username: "steward".to_string(),
        is_admin: !guild_ids.is_empty(),
        guilds: guild_ids
            .iter()
            .map(|id| GuildRef {
                id: (*id).to_string(),
                name: format!("guild {id}"),
                icon: None,
            })
            .collect(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign token")
}

fn seed(state: &AppState, sql: &str) {
    state
        .db
        .with_conn(|conn| Ok(conn.execute_batch(sql)?))
        .expect("seed");
}

/// A recent day inside the default 30-day window.
fn day(offset: i64) -> String {
    (Utc::now() - Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

fn ts(offset: i64) -> String {
    (Utc::now() - Duration::days(offset))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get_raw(app: Router, uri: &str, token: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, bytes.to_vec())
}

async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn missing_session_is_401() {
    let state = test_state();
    let (status, body) = get(
        router(state),
        &format!("/api/stats/server?guildId={GUILD}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let state = test_state();
    let (status, _) = get(
        router(state),
        &format!("/api/stats/server?guildId={GUILD}"),
        Some("not-a-jwt"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_guild_id_is_400_before_any_store_call() {
    let state = test_state();
    // Empty the store entirely: any query reaching it would 500 instead,
    // so a 400 proves the gate fails first.
    seed(
        &state,
        "DROP TABLE users;
         DROP TABLE channels;
         DROP TABLE messages_daily;
         DROP TABLE voice_daily;
         DROP TABLE member_daily;
         DROP TABLE activity_sessions;
         DROP TABLE activity_catalog;
         DROP TABLE giveaway_entries;
         DROP TABLE giveaways;
         DROP TABLE moderation_actions;
         DROP TABLE event_participants;
         DROP TABLE events;
         DROP TABLE points_daily;
         DROP TABLE embed_requests;",
    );
    let token = token_for(&[GUILD]);
    let (status, body) = get(router(state), "/api/stats/users", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Guild ID is required");
}

#[tokio::test]
async fn foreign_guild_is_403_even_for_admins() {
    let state = test_state();
    // Administers some guild, just not the one being asked about.
    let token = token_for(&["999999999999999999"]);
    let (status, body) = get(
        router(state),
        &format!("/api/stats/users?guildId={GUILD}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn top_users_preserves_store_order_and_string_ids() {
    let state = test_state();
    seed(
        &state,
        &format!(
            "
            INSERT INTO users (user_id, username) VALUES
                ('300000000000000001', 'alena'),
                ('300000000000000002', 'bruno'),
                ('300000000000000003', 'chika');
            INSERT INTO messages_daily (guild_id, channel_id, user_id, day, message_count, last_message_at) VALUES
                ('{GUILD}', '1', '300000000000000001', '{d}', 50, '{t}'),
                ('{GUILD}', '1', '300000000000000002', '{d}', 200, '{t}'),
                ('{GUILD}', '1', '300000000000000003', '{d}', 120, '{t}');
            ",
            d = day(1),
            t = ts(1),
        ),
    );
    let token = token_for(&[GUILD]);
    let (status, body) = get(
        router(state),
        &format!("/api/stats/users?guildId={GUILD}"),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 3);
    // Ranking comes from the store, untouched by the handler.
    assert_eq!(rows[0]["username"], "bruno");
    assert_eq!(rows[1]["username"], "chika");
    assert_eq!(rows[2]["username"], "alena");
    // Snowflakes stay strings on the wire.
    assert!(rows[0]["user_id"].is_string());
    assert_eq!(rows[0]["user_id"], "300000000000000002");
    assert_eq!(rows[0]["message_count"], 200);
}

#[tokio::test]
async fn daily_voice_rollup_sums_minutes_per_day() {
    let state = test_state();
    seed(
        &state,
        &format!(
            "INSERT INTO voice_daily (guild_id, channel_id, user_id, day, minutes, last_joined_at) VALUES
                ('{GUILD}', '20', '300000000000000001', '{d1}', 25.5, '{t}'),
                ('{GUILD}', '20', '300000000000000002', '{d1}', 4.5, '{t}'),
                ('{GUILD}', '21', '300000000000000001', '{d0}', 90, '{t}');",
            d0 = day(1),
            d1 = day(2),
            t = ts(1),
        ),
    );
    let token = token_for(&[GUILD]);
    let (status, body) = get(
        router(state),
        &format!("/api/stats/voice?guildId={GUILD}"),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total_minutes"], 30.0);
    assert_eq!(rows[0]["active_users"], 2);
    assert_eq!(rows[1]["total_minutes"], 90.0);
}

#[tokio::test]
async fn single_aggregate_failure_is_500() {
    let state = test_state();
    // Simulate a broken store: the one table this endpoint reads is gone.
    seed(&state, "DROP TABLE moderation_actions;");
    let token = token_for(&[GUILD]);
    let (status, body) = get(
        router(state),
        &format!("/api/stats/moderation?guildId={GUILD}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn fan_out_degrades_failed_fields_and_keeps_the_rest() {
    let state = test_state();
    seed(
        &state,
        &format!(
            "
            INSERT INTO users (user_id, username) VALUES ('300000000000000001', 'alena');
            INSERT INTO activity_sessions (guild_id, user_id, activity_name, started_at, duration_seconds, streaming) VALUES
                ('{GUILD}', '300000000000000001', 'factorio', '{t}', 7200, 0);
            -- Only the type-distribution sub-query joins the catalog.
            DROP TABLE activity_catalog;
            ",
            t = ts(1),
        ),
    );
    let token = token_for(&[GUILD]);
    let (status, body) = get(
        router(state),
        &format!("/api/stats/activities?guildId={GUILD}"),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["typeDistribution"], serde_json::json!([]));
    assert_eq!(body["topActivities"][0]["activity_name"], "factorio");
    assert_eq!(body["dailyStats"].as_array().unwrap().len(), 1);
    assert_eq!(body["topUsers"][0]["username"], "alena");
    assert_eq!(body["totalUniqueUsers"], 1);
}

#[tokio::test]
async fn leaderboard_history_is_scoped_to_the_requested_top_n() {
    let state = test_state();
    seed(
        &state,
        &format!(
            "
            INSERT INTO users (user_id, username) VALUES
                ('300000000000000001', 'alena'),
                ('300000000000000002', 'bruno'),
                ('300000000000000003', 'chika');
            INSERT INTO points_daily (guild_id, user_id, day, total_points) VALUES
                ('{GUILD}', '300000000000000001', '{d1}', 100),
                ('{GUILD}', '300000000000000002', '{d1}', 300),
                ('{GUILD}', '300000000000000003', '{d1}', 200),
                ('{GUILD}', '300000000000000001', '{d0}', 150),
                ('{GUILD}', '300000000000000002', '{d0}', 400),
                ('{GUILD}', '300000000000000003', '{d0}', 250);
            ",
            d0 = day(1),
            d1 = day(2),
        ),
    );
    let token = token_for(&[GUILD]);

    let (status, board) = get(
        router(state.clone()),
        &format!("/api/stats/leaderboard?guildId={GUILD}&limit=2"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let top: Vec<String> = board
        .as_array()
        .expect("leaderboard array")
        .iter()
        .map(|row| row["user_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0], "300000000000000002");

    let (status, history) = get(
        router(state),
        &format!("/api/stats/leaderboard/history?guildId={GUILD}&limit=2"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = history.as_array().expect("history array");
    assert!(!rows.is_empty());
    for row in rows {
        let user = row["user_id"].as_str().unwrap();
        assert!(top.iter().any(|id| id == user), "unexpected user {user}");
    }
}

#[tokio::test]
async fn repeated_reads_are_byte_identical() {
    let state = test_state();
    seed(
        &state,
        &format!(
            "INSERT INTO messages_daily (guild_id, channel_id, user_id, day, message_count, last_message_at)
             VALUES ('{GUILD}', '1', '300000000000000001', '{d}', 12, '{t}');",
            d = day(1),
            t = ts(1),
        ),
    );
    let token = token_for(&[GUILD]);
    let uri = format!("/api/stats/users?guildId={GUILD}&days=7");

    let (first_status, first) = get_raw(router(state.clone()), &uri, &token).await;
    let (second_status, second) = get_raw(router(state), &uri, &token).await;
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn embed_dispatch_queues_a_pending_row() {
    let state = test_state();
    let token = token_for(&[GUILD]);
    let (status, body) = post_json(
        router(state.clone()),
        "/api/embed",
        &token,
        serde_json::json!({
            "guildId": GUILD,
            "channelId": "400000000000000001",
            "payload": {"title": "weekly digest"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_i64().expect("row id");

    let status_row: String = state
        .db
        .with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT status FROM embed_requests WHERE id = ?1",
                [id],
                |row| row.get(0),
            )?)
        })
        .expect("read back");
    assert_eq!(status_row, "pending");
}

#[tokio::test]
async fn embed_dispatch_requires_a_channel() {
    let state = test_state();
    let token = token_for(&[GUILD]);
    let (status, body) = post_json(
        router(state),
        "/api/embed",
        &token,
        serde_json::json!({"guildId": GUILD, "payload": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Channel ID is required");
}
