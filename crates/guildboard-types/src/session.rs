use serde::{Deserialize, Serialize};

/// One guild the principal administers, as cached in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRef {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

/// JWT claims shared by the REST middleware and the sign-in flow.
/// Canonical definition lives here so the api and server crates agree.
///
/// `is_admin` is true iff `guilds` is non-empty: administration is always
/// guild-scoped, never global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub is_admin: bool,
    pub guilds: Vec<GuildRef>,
    pub exp: usize,
}

impl Claims {
    /// Whether this principal administers the given guild, against the
    /// admin-guild list cached at sign-in.
    pub fn administers(&self, guild_id: &str) -> bool {
        self.guilds.iter().any(|g| g.id == guild_id)
    }
}

/// Named capabilities inside the identity provider's permission bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Capability {
    Administrator = 0x8,
    ManageGuild = 0x20,
}

/// Test a single capability bit in a provider permission mask.
pub fn has_capability(mask: u64, cap: Capability) -> bool {
    mask & (cap as u64) == cap as u64
}

/// The dashboard admission rule: Administrator or Manage Guild grants
/// access to a guild's analytics.
pub fn can_administrate(mask: u64) -> bool {
    has_capability(mask, Capability::Administrator) || has_capability(mask, Capability::ManageGuild)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(guild_ids: &[&str]) -> Claims {
        Claims {
            sub: "123456789012345678".into(),
            username: "mod".into(),
            is_admin: !guild_ids.is_empty(),
            guilds: guild_ids
                .iter()
                .map(|id| GuildRef {
                    id: (*id).into(),
                    name: format!("guild {id}"),
                    icon: None,
                })
                .collect(),
            exp: 0,
        }
    }

    #[test]
    fn capability_bits() {
        assert!(has_capability(0x8, Capability::Administrator));
        assert!(has_capability(0x28, Capability::ManageGuild));
        assert!(!has_capability(0x20, Capability::Administrator));
        assert!(can_administrate(0x20));
        assert!(can_administrate(0x8));
        // Read Messages + Send Messages only
        assert!(!can_administrate(0x400 | 0x800));
    }

    #[test]
    fn administers_checks_the_cached_list_only() {
        let c = claims(&["111", "222"]);
        assert!(c.administers("222"));
        assert!(!c.administers("333"));
        // Globally flagged admin without the guild still fails.
        assert!(c.is_admin);
        assert!(!c.administers("999"));
    }
}
