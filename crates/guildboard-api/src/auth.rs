use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Deserialize;
use tracing::warn;

use guildboard_types::api::{LoginRequest, LoginResponse, SessionUser};
use guildboard_types::session::{Claims, GuildRef, can_administrate};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity-provider shapes we consume at sign-in.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ProviderGuild {
    id: String,
    name: String,
    icon: Option<String>,
    /// Permission bitmask, transported as a string integer.
    permissions: String,
}

/// Exchange a provider access token for a dashboard session.
///
/// Fetches the principal's identity and guild list, keeps the guilds where
/// the permission mask grants Administrator or Manage Guild, and issues a
/// JWT caching that admin-guild list. The cache stays valid for the token's
/// lifetime; a re-login refreshes it.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let me: ProviderUser = provider_get(&state, "/users/@me", &req.access_token).await?;
    let guilds: Vec<ProviderGuild> =
        provider_get(&state, "/users/@me/guilds", &req.access_token).await?;

    let admin_guilds: Vec<GuildRef> = guilds
        .into_iter()
        .filter(|g| {
            // The provider's mask is an opaque bitset; the capability test
            // lives in one place.
            g.permissions
                .parse::<u64>()
                .map(can_administrate)
                .unwrap_or(false)
        })
        .map(|g| GuildRef {
            id: g.id,
            name: g.name,
            icon: g.icon,
        })
        .collect();

    let claims = Claims {
        sub: me.id.clone(),
        username: me.username.clone(),
        is_admin: !admin_guilds.is_empty(),
        guilds: admin_guilds.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(state.session_ttl_days)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;

    Ok(Json(LoginResponse {
        token,
        user: SessionUser {
            id: me.id,
            username: me.username,
            is_admin: claims.is_admin,
            guilds: admin_guilds,
        },
    }))
}

/// One authenticated GET against the identity provider. Provider errors on
/// this path collapse to `Unauthorized` without echoing upstream text.
async fn provider_get<T: serde::de::DeserializeOwned>(
    state: &AppState,
    path: &str,
    access_token: &str,
) -> Result<T, ApiError> {
    let url = format!("{}{}", state.provider_api_base, path);
    let response = state
        .http
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| {
            warn!(path, error = %e, "identity provider unreachable");
            ApiError::Unauthorized
        })?;

    if !response.status().is_success() {
        warn!(path, status = %response.status(), "identity provider rejected token");
        return Err(ApiError::Unauthorized);
    }

    response.json().await.map_err(|e| {
        warn!(path, error = %e, "malformed identity provider response");
        ApiError::Unauthorized
    })
}
