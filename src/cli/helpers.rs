//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::store::DossierStore;
use crate::core::team::{Actor, TeamRoster};

/// Open the store of the surrounding workspace
pub fn open_store() -> Result<DossierStore> {
    DossierStore::discover().map_err(|e| miette::miette!("{}", e))
}

/// Determine who is running this command and under which role.
///
/// The name comes from `--actor`, then config. The role comes from `--role`,
/// then config, then the team roster entry matching the name.
pub fn resolve_actor(global: &GlobalOpts) -> Result<Actor> {
    let config = Config::load();
    let name = global.actor.clone().unwrap_or_else(|| config.author());

    if let Some(role) = global.role {
        return Ok(Actor::new(name, role));
    }
    if let Some(ref role_str) = config.role {
        if let Ok(role) = role_str.parse() {
            return Ok(Actor::new(name, role));
        }
    }
    if let Ok(store) = DossierStore::discover() {
        if let Some(roster) = TeamRoster::load(store.workspace()) {
            if let Some(role) = roster.find_member(&name).and_then(|m| m.primary_role()) {
                return Ok(Actor::new(name, role));
            }
        }
    }

    Err(miette::miette!(
        "cannot determine a role for '{}'; pass --role or add the user to the team roster (vct team add)",
        name
    ))
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Counts characters, not bytes, so multibyte titles never split mid-char.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Prj);
        let formatted = format_short_id(&id);
        // 3 prefix + 1 dash + 26 ULID chars, so always truncated
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // CJK project titles must truncate on character boundaries
        assert_eq!(truncate_str("阀门执行器项目", 8), "阀门执行器项目");
        assert_eq!(truncate_str("阀门执行器项目阀门执", 8), "阀门执行器...");
    }
}
