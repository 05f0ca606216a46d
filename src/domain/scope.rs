// src/domain/scope.rs

use crate::domain::directory::{Role, Team, User};
use std::collections::HashSet;

/// Whose records an actor may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Everyone,
    Users(HashSet<String>),
}

impl Visibility {
    pub fn allows(&self, user_id: &str) -> bool {
        match self {
            Visibility::Everyone => true,
            Visibility::Users(ids) => ids.contains(user_id),
        }
    }
}

/// Optional narrowing picked in the team / broker filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub team_id: Option<String>,
    pub broker_id: Option<String>,
}

/// Brokers and team leaders belonging to `team`, its leader included.
pub fn team_sellers<'a>(users: &'a [User], teams: &[Team], team_id: &str) -> Vec<&'a User> {
    let leader_id = teams.iter().find(|t| t.id == team_id).map(|t| t.leader_id.as_str());
    users
        .iter()
        .filter(|u| u.role.is_seller())
        .filter(|u| u.team_id.as_deref() == Some(team_id) || Some(u.id.as_str()) == leader_id)
        .collect()
}

/// Users the actor can pick in the broker filter.
pub fn selectable_brokers<'a>(
    actor: &User,
    users: &'a [User],
    teams: &[Team],
    filter: &ScopeFilter,
) -> Vec<&'a User> {
    match actor.role {
        Role::Admin => match &filter.team_id {
            Some(team_id) => team_sellers(users, teams, team_id),
            None => users.iter().filter(|u| u.role.is_seller() && u.active).collect(),
        },
        Role::TeamLeader => match teams.iter().find(|t| t.leader_id == actor.id) {
            Some(team) => team_sellers(users, teams, &team.id),
            None => users.iter().filter(|u| u.id == actor.id).collect(),
        },
        Role::Broker | Role::User => Vec::new(),
    }
}

/// Resolves the data an actor sees given their role and the chosen filters.
///
/// Admins see everything unless they narrow to a team or broker. Team leaders see
/// their team and may narrow to one of its brokers. Everyone else sees only
/// their own records; their filters are ignored.
pub fn resolve_visibility(
    actor: &User,
    users: &[User],
    teams: &[Team],
    filter: &ScopeFilter,
) -> Visibility {
    match actor.role {
        Role::Admin => {
            let mut ids: Option<HashSet<String>> = filter.team_id.as_ref().map(|team_id| {
                team_sellers(users, teams, team_id)
                    .into_iter()
                    .map(|u| u.id.clone())
                    .collect()
            });
            if let Some(broker_id) = &filter.broker_id {
                ids = Some(match ids {
                    Some(team) if !team.contains(broker_id) => HashSet::new(),
                    _ => HashSet::from([broker_id.clone()]),
                });
            }
            ids.map(Visibility::Users).unwrap_or(Visibility::Everyone)
        }
        Role::TeamLeader => {
            let team: HashSet<String> = selectable_brokers(actor, users, teams, filter)
                .into_iter()
                .map(|u| u.id.clone())
                .chain(std::iter::once(actor.id.clone()))
                .collect();
            match &filter.broker_id {
                Some(broker_id) if team.contains(broker_id) => {
                    Visibility::Users(HashSet::from([broker_id.clone()]))
                }
                Some(_) => Visibility::Users(HashSet::new()),
                None => Visibility::Users(team),
            }
        }
        Role::Broker | Role::User => Visibility::Users(HashSet::from([actor.id.clone()])),
    }
}
