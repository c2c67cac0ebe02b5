//! Team roster and role management for lifecycle authorization

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::workspace::Workspace;

/// Team roles for authorization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Technical owner: curates selections, submits technical lists
    Engineering,
    /// Commercial reviewer: rejects/confirms versions, owns the quotation
    Commercial,
    /// Privileged role: payment confirmation, production orders, reopen
    Management,
    /// Production planning (read-mostly)
    Production,
    /// Bypasses authorization checks
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Engineering => write!(f, "engineering"),
            Role::Commercial => write!(f, "commercial"),
            Role::Management => write!(f, "management"),
            Role::Production => write!(f, "production"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "engineering" => Ok(Role::Engineering),
            "commercial" => Ok(Role::Commercial),
            "management" => Ok(Role::Management),
            "production" => Ok(Role::Production),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// An actor performing an operation: identity plus the role it acts under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// A team member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    /// Username for matching the operator (config author or $USER)
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    /// Check if member has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if member has any of the specified roles
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }

    /// Primary role used when the member does not select one explicitly
    pub fn primary_role(&self) -> Option<Role> {
        self.roles.first().copied()
    }
}

/// Team roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

fn default_version() -> u32 {
    1
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            version: 1,
            members: Vec::new(),
        }
    }
}

impl TeamRoster {
    /// Load team roster from the workspace's .vct/team.yaml
    pub fn load(workspace: &Workspace) -> Option<Self> {
        Self::load_from_path(&workspace.team_path())
    }

    /// Load team roster from a specific path
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    /// Save team roster to the workspace's .vct/team.yaml
    pub fn save(&self, workspace: &Workspace) -> std::io::Result<()> {
        self.save_to_path(&workspace.team_path())
    }

    /// Save team roster to a specific path
    pub fn save_to_path(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, contents)
    }

    /// Find member by username
    pub fn find_member(&self, username: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|m| m.active && m.username.eq_ignore_ascii_case(username))
    }

    /// Find member by email
    pub fn find_member_by_email(&self, email: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|m| m.active && m.email.eq_ignore_ascii_case(email))
    }

    /// Add a member to the roster
    pub fn add_member(&mut self, member: TeamMember) {
        self.members.push(member);
    }

    /// Remove a member by username
    pub fn remove_member(&mut self, username: &str) -> bool {
        let len_before = self.members.len();
        self.members
            .retain(|m| !m.username.eq_ignore_ascii_case(username));
        self.members.len() < len_before
    }

    /// Get all active members
    pub fn active_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| m.active)
    }

    /// Get members with a specific role
    pub fn members_with_role(&self, role: Role) -> impl Iterator<Item = &TeamMember> {
        self.members
            .iter()
            .filter(move |m| m.active && m.has_role(role))
    }

    /// Generate default team.yaml template content
    pub fn default_template() -> &'static str {
        r#"# VCT Team Roster
# Defines team members and their roles for lifecycle authorization

version: 1

members:
  # Example member entry:
  # - name: "Jane Smith"
  #   email: "jane@example.com"
  #   username: "jsmith"        # Matches config author or $USER
  #   roles: [engineering]
  #   active: true
  []

# Role options: engineering, commercial, management, production, admin
"#
    }
}
