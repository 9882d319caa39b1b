//! The per-guild authorization gate shared by every aggregate endpoint.

use guildboard_types::session::Claims;

use crate::error::ApiError;

/// Check order is fixed: a missing `guildId` is a client error and fails
/// before the membership check; a present guild not in the session's
/// cached admin list is forbidden, even for a globally flagged admin —
/// administration is guild-scoped.
pub fn require_guild_access(claims: &Claims, guild_id: Option<&str>) -> Result<String, ApiError> {
    let guild_id = guild_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Guild ID is required".to_string()))?;

    if !claims.administers(guild_id) {
        return Err(ApiError::Forbidden);
    }

    Ok(guild_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildboard_types::session::GuildRef;

    fn claims() -> Claims {
        Claims {
            sub: "42".into(),
            username: "mod".into(),
            is_admin: true,
            guilds: vec![GuildRef {
                id: "111".into(),
                name: "home".into(),
                icon: None,
            }],
            exp: 0,
        }
    }

    #[test]
    fn missing_guild_is_bad_request_before_membership() {
        assert!(matches!(
            require_guild_access(&claims(), None),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            require_guild_access(&claims(), Some("")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn foreign_guild_is_forbidden_even_for_admins() {
        let c = claims();
        assert!(c.is_admin);
        assert!(matches!(
            require_guild_access(&c, Some("999")),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn listed_guild_passes() {
        assert_eq!(require_guild_access(&claims(), Some("111")).unwrap(), "111");
    }
}
