use crate::io::api::TaskApi;
use crate::model::task::Task;
use crate::model::team::{NewTeam, Team};
use crate::ops::cache::CacheSnapshot;
use crate::ops::error::DeckError;
use crate::ops::join;

pub async fn create_team(api: &dyn TaskApi, team: &NewTeam) -> Result<Team, DeckError> {
    let created = api
        .create_team(team)
        .await
        .map_err(DeckError::fetch("create team"))?;
    tracing::info!(id = %created.id, name = %created.name, members = team.members.len(), "team created");
    Ok(created)
}

/// User ids owning at least one task of `team_id`, in first-seen order.
///
/// The service stores no member list on a team, so membership is derived
/// from the current task set. A deleted task stops contributing once the
/// list is refreshed.
pub fn team_members(team_id: &str, tasks: &[Task]) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    for task in tasks.iter().filter(|t| t.team.as_deref() == Some(team_id)) {
        for owner in &task.owners {
            if !members.contains(owner) {
                members.push(owner.clone());
            }
        }
    }
    members
}

/// Display names of the team's members. Owners missing from the user list
/// show as the unknown placeholder.
pub fn team_member_names(team_id: &str, snapshot: &CacheSnapshot) -> Vec<String> {
    team_members(team_id, &snapshot.tasks)
        .iter()
        .map(|id| join::user_name(&snapshot.references, id))
        .collect()
}

/// Look up a team by id or, failing that, by exact name.
pub fn find_team<'a>(snapshot: &'a CacheSnapshot, key: &str) -> Result<&'a Team, DeckError> {
    let teams = &snapshot.references.teams;
    teams
        .iter()
        .find(|t| t.id == key)
        .or_else(|| teams.iter().find(|t| t.name == key))
        .ok_or_else(|| DeckError::NotFound {
            kind: "team",
            id: key.to_string(),
        })
}
