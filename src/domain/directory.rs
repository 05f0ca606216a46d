// src/domain/directory.rs
//
// People and places the CRM data hangs off: users, teams, developments.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    User,
    Broker,
    TeamLeader,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Broker => "broker",
            Role::TeamLeader => "teamLeader",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [Role::Admin, Role::User, Role::Broker, Role::TeamLeader]
            .into_iter()
            .find(|r| r.as_str() == raw)
    }

    /// Roles that own businesses and show up in broker pickers.
    pub fn is_seller(self) -> bool {
        matches!(self, Role::Broker | Role::TeamLeader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub team_id: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub leader_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Development {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}
