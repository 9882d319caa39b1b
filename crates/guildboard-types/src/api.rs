//! Wire contracts for the dashboard API.
//!
//! Snowflake identifiers (`user_id`, `channel_id`, `guild_id`,
//! `host_user_id`) are always strings; see [`crate::normalize`]. Dates and
//! per-row timestamps pass through as the store's text representation so a
//! byte-identical store yields a byte-identical response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::GuildRef;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// OAuth access token obtained by the client from the identity provider.
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub guilds: Vec<GuildRef>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

// -- Server totals --

#[derive(Debug, Clone, Serialize)]
pub struct ServerStats {
    pub guild_id: String,
    pub total_messages: i64,
    pub total_members: i64,
    pub active_members: i64,
    pub total_channels: i64,
    pub period_days: u32,
    pub last_updated: DateTime<Utc>,
}

// -- Message leaders --

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub username: String,
    pub discriminator: String,
    pub message_count: i64,
    pub last_message_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub name: String,
    pub message_count: i64,
    pub last_message_at: String,
}

/// One day of message volume for the activity chart.
#[derive(Debug, Clone, Serialize)]
pub struct DailyActivity {
    pub date: String,
    pub message_count: i64,
    pub active_users: i64,
}

// -- Voice --

#[derive(Debug, Clone, Serialize)]
pub struct VoiceUserStats {
    pub user_id: String,
    pub username: String,
    pub voice_minutes: f64,
    pub last_activity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceChannelStats {
    pub channel_id: String,
    pub name: String,
    pub voice_minutes: f64,
    pub last_activity: String,
}

/// One day of voice time for the voice activity chart.
#[derive(Debug, Clone, Serialize)]
pub struct DailyVoiceActivity {
    pub date: String,
    pub total_minutes: f64,
    pub active_users: i64,
}

// -- Member growth --

#[derive(Debug, Clone, Serialize)]
pub struct DailyMemberStats {
    pub date: String,
    pub joins: i64,
    pub leaves: i64,
    pub total_members: i64,
}

// -- Activities (presence/game tracking) --

#[derive(Debug, Clone, Serialize)]
pub struct TopActivity {
    pub activity_name: String,
    pub unique_users: i64,
    pub session_count: i64,
    pub total_seconds: i64,
    pub avg_seconds: f64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyActivityStats {
    pub date: String,
    pub total_sessions: i64,
    pub unique_users: i64,
    pub total_hours: f64,
    pub avg_session_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopUserByActivity {
    pub user_id: String,
    pub username: String,
    pub session_count: i64,
    pub total_seconds: i64,
    pub total_hours: f64,
    pub avg_session_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityTypeDistribution {
    pub activity_type: String,
    pub session_count: i64,
    pub unique_users: i64,
    pub total_hours: f64,
}

/// Composite response for the activities page: five independent aggregates
/// assembled from one concurrent fan-out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOverview {
    pub top_activities: Vec<TopActivity>,
    pub daily_stats: Vec<DailyActivityStats>,
    pub top_users: Vec<TopUserByActivity>,
    pub type_distribution: Vec<ActivityTypeDistribution>,
    pub total_unique_users: i64,
}

// -- Giveaways --

#[derive(Debug, Clone, Default, Serialize)]
pub struct GiveawayStats {
    pub total_giveaways: i64,
    pub active_giveaways: i64,
    pub ended_giveaways: i64,
    pub total_participants: i64,
    pub avg_participants_per_giveaway: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GiveawayItem {
    pub giveaway_id: i64,
    pub prize: String,
    pub winner_count: i64,
    pub host_user_id: String,
    pub ends_at: String,
    pub ended: bool,
    pub created_at: String,
    pub participant_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopParticipant {
    pub user_id: String,
    pub username: String,
    pub entry_count: i64,
    pub wins_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyParticipation {
    pub date: String,
    pub new_giveaways: i64,
    pub total_entries: i64,
    pub unique_participants: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveawayOverview {
    pub stats: GiveawayStats,
    pub giveaways: Vec<GiveawayItem>,
    pub top_participants: Vec<TopParticipant>,
    pub daily_participation: Vec<DailyParticipation>,
}

// -- Leaderboard --

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub total_points: i64,
    pub rank: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardHistoryRow {
    pub date: String,
    pub user_id: String,
    pub rank: i64,
    pub total_points: i64,
}

// -- Moderation --

#[derive(Debug, Clone, Serialize)]
pub struct ModerationStats {
    pub total_moderated: i64,
    pub last_24h: i64,
}

// -- Events --

#[derive(Debug, Clone, Serialize)]
pub struct EventStats {
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_participants: i64,
}

// -- Highlights (yearly recap superlatives) --

#[derive(Debug, Clone, Serialize)]
pub struct HighlightEntry {
    pub user_id: String,
    pub username: String,
    /// The superlative's measure: points, counts, minutes or hours
    /// depending on the category.
    pub value: f64,
    /// Category-specific context, e.g. the streamed activity's name.
    pub detail: Option<String>,
}

/// One array field per superlative category. Each category is fetched
/// independently and degrades to an empty list on sub-query failure.
#[derive(Debug, Serialize)]
pub struct Highlights {
    pub top_scores: Vec<HighlightEntry>,
    pub most_messages: Vec<HighlightEntry>,
    pub most_voice_minutes: Vec<HighlightEntry>,
    pub most_flagged: Vec<HighlightEntry>,
    pub most_activity_hours: Vec<HighlightEntry>,
    pub longest_stream: Vec<HighlightEntry>,
    pub most_event_participations: Vec<HighlightEntry>,
    pub most_distinct_games: Vec<HighlightEntry>,
}

// -- Outbound write path (embed dispatch) --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDispatchRequest {
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct EmbedRequestCreated {
    pub id: i64,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedDispatchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EmbedRequestCreated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
